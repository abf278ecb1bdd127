use crate::domain::model::{CellLine, ConfluencyPlanRequest, ConfluencyPlanResult};
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::require_positive;

pub const INVALID_CONCENTRATION: &str =
    "Provide a valid starting cell concentration (e.g. 1e6 cells/mL).";
pub const NON_POSITIVE_CONFLUENCY: &str = "Target confluency must be greater than zero.";
pub const NON_POSITIVE_HOURS: &str = "Time horizon must be greater than zero.";
pub const MISSING_DOUBLING_TIME: &str = "A valid doubling time is required.";
pub const INVALID_GROWTH_FACTOR: &str = "Could not compute growth factor.";

/// Converts a 0–100 percentage into a confluency fraction in (0, 1].
///
/// Out-of-range input is clamped first, so 150 % plans for a full vessel and
/// anything at or below zero is rejected.
pub fn confluency_fraction_from_percent(percent: f64) -> Result<f64> {
    let clamped = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    let fraction = clamped / 100.0;
    if fraction <= 0.0 {
        return Err(CalcError::validation(NON_POSITIVE_CONFLUENCY));
    }
    Ok(fraction)
}

/// Vessel counts below one (or unreadable) fall back to a single vessel.
pub fn resolve_vessel_count(raw: Option<i64>) -> u32 {
    match raw {
        Some(count) if count > 0 => u32::try_from(count).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// An explicit override wins; otherwise the cell line's average doubling time.
pub fn resolve_doubling_time(override_hours: Option<f64>, cell_line: Option<&CellLine>) -> Result<f64> {
    let doubling_time =
        override_hours.or_else(|| cell_line.and_then(CellLine::average_doubling_time));
    require_positive(doubling_time, MISSING_DOUBLING_TIME)
}

pub fn plan_confluency(request: &ConfluencyPlanRequest) -> Result<ConfluencyPlanResult> {
    require_positive(Some(request.starting_concentration), INVALID_CONCENTRATION)?;
    let fraction = request.target_confluency_fraction;
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(CalcError::validation(NON_POSITIVE_CONFLUENCY));
    }
    require_positive(Some(request.target_hours), NON_POSITIVE_HOURS)?;
    require_positive(Some(request.doubling_time_hours), MISSING_DOUBLING_TIME)?;
    let vessel_count = f64::from(request.vessel_count.max(1));

    let final_cells_per_vessel = request.vessel.cells_at_100_confluency * fraction;
    let final_cells_total = final_cells_per_vessel * vessel_count;
    let growth_cycles = request.target_hours / request.doubling_time_hours;
    let growth_factor = 2f64.powf(growth_cycles);
    if !(growth_factor > 0.0) {
        return Err(CalcError::validation(INVALID_GROWTH_FACTOR));
    }

    let required_cells_per_vessel = final_cells_per_vessel / growth_factor;
    let required_cells_total = required_cells_per_vessel * vessel_count;
    let volume_per_vessel_ml = required_cells_per_vessel / request.starting_concentration;
    let volume_total_ml = volume_per_vessel_ml * vessel_count;

    Ok(ConfluencyPlanResult {
        final_cells_per_vessel,
        final_cells_total,
        growth_cycles,
        growth_factor,
        required_cells_per_vessel,
        required_cells_total,
        volume_per_vessel_ml,
        volume_total_ml,
    })
}
