pub mod calculator;
pub mod dilution;
pub mod engine;
pub mod format;
pub mod harvest;
pub mod numeric;
pub mod pipeline;
pub mod seeding;

pub use crate::domain::model::{
    ConfluencyPlanRequest, ConfluencyPlanResult, DilutionPlanRequest, DilutionPlanResult,
    DilutionTarget, NumericInput, VesselSpec,
};
pub use crate::domain::ports::{CatalogProvider, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
