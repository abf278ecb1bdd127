// Domain layer: value types and ports. No I/O beyond the traits declared here.

pub mod model;
pub mod ports;
