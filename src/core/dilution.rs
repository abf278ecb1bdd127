use crate::core::format::{format_cells, format_volume};
use crate::domain::model::{DilutionPlanRequest, DilutionPlanResult, DilutionTarget};
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::require_positive;

pub const NON_POSITIVE_TOTAL_VOLUME: &str = "Total volume must be greater than zero.";
pub const NON_POSITIVE_CELLS_TO_SEED: &str = "Number of cells to seed must be greater than zero.";
pub const NON_POSITIVE_SEED_VOLUME: &str = "Volume for seeding must be greater than zero.";
pub const NON_POSITIVE_FINAL_CONCENTRATION: &str = "Final concentration must be greater than zero.";
pub const TARGET_ABOVE_SOURCE: &str = "Target concentration is higher than the starting suspension. \
     Use a more concentrated source or reduce the final volume.";

/// Works out how much slurry and media to combine for a target suspension.
///
/// The slurry can only be diluted: a plan that needs more slurry than the
/// final volume is rejected rather than clipped.
pub fn plan_dilution(request: &DilutionPlanRequest) -> Result<DilutionPlanResult> {
    require_positive(
        Some(request.starting_concentration),
        crate::core::seeding::INVALID_CONCENTRATION,
    )?;
    let total_volume_ml = require_positive(Some(request.total_volume_ml), NON_POSITIVE_TOTAL_VOLUME)?;

    let (final_concentration, portions_prepared) = match request.target {
        DilutionTarget::Cells {
            cells_to_seed,
            volume_per_seed_ml,
        } => {
            let cells = require_positive(Some(cells_to_seed), NON_POSITIVE_CELLS_TO_SEED)?;
            let volume = require_positive(Some(volume_per_seed_ml), NON_POSITIVE_SEED_VOLUME)?;
            (cells / volume, Some(total_volume_ml / volume))
        }
        DilutionTarget::Concentration {
            final_concentration,
        } => (
            require_positive(Some(final_concentration), NON_POSITIVE_FINAL_CONCENTRATION)?,
            None,
        ),
    };

    let cells_needed = final_concentration * total_volume_ml;
    let slurry_volume_ml = cells_needed / request.starting_concentration;
    if slurry_volume_ml > total_volume_ml {
        return Err(CalcError::validation(TARGET_ABOVE_SOURCE));
    }
    let media_volume_ml = total_volume_ml - slurry_volume_ml;

    Ok(DilutionPlanResult {
        final_concentration,
        cells_needed,
        slurry_volume_ml,
        media_volume_ml,
        portions_prepared,
    })
}

/// One-line bench recipe for a dilution plan.
pub fn dilution_recipe(request: &DilutionPlanRequest, plan: &DilutionPlanResult) -> String {
    let mut note = format!(
        "Dilution planner: Combine {} of culture at {} cells/mL with {} of media to yield {} at {} cells/mL.",
        format_volume(Some(plan.slurry_volume_ml)).unwrap_or_default(),
        format_cells(Some(request.starting_concentration)),
        format_volume(Some(plan.media_volume_ml)).unwrap_or_default(),
        format_volume(Some(request.total_volume_ml)).unwrap_or_default(),
        format_cells(Some(plan.final_concentration)),
    );
    if let DilutionTarget::Cells {
        cells_to_seed,
        volume_per_seed_ml,
    } = request.target
    {
        note.push_str(&format!(
            " This delivers {} cells in {} per portion.",
            format_cells(Some(cells_to_seed)),
            format_volume(Some(volume_per_seed_ml)).unwrap_or_default(),
        ));
    }
    note
}
