//! JSON boundary of the seeding calculator. Validation short-circuits on the
//! first failure; the error carries the message and status to answer with.

use crate::core::dilution::{
    dilution_recipe, plan_dilution, NON_POSITIVE_CELLS_TO_SEED, NON_POSITIVE_FINAL_CONCENTRATION,
    NON_POSITIVE_SEED_VOLUME, NON_POSITIVE_TOTAL_VOLUME,
};
use crate::core::format::{format_cells, format_general, format_volume};
use crate::core::harvest::suggest_slurry_volume;
use crate::core::numeric::{measured_cells_total, parse_numeric};
use crate::core::seeding::{
    confluency_fraction_from_percent, plan_confluency, resolve_doubling_time,
    resolve_vessel_count, INVALID_CONCENTRATION, NON_POSITIVE_HOURS,
};
use crate::domain::model::{
    CellLine, ConfluencyPlanRequest, DilutionPlanRequest, DilutionTarget, Vessel,
};
use crate::domain::ports::CatalogProvider;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::require_positive;
use serde::Serialize;
use serde_json::Value;

const INVALID_VESSEL: &str = "Invalid vessel selection.";
const VESSEL_NOT_FOUND: &str = "Vessel not found.";
const INVALID_CONFLUENCY: &str = "Invalid confluency percentage.";
const INVALID_HOURS: &str = "Invalid time horizon.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfluencyResponse {
    pub mode: &'static str,
    pub vessel: String,
    pub vessel_id: i64,
    pub vessel_area_cm2: f64,
    pub target_confluency: f64,
    pub hours: f64,
    pub doubling_time_used: f64,
    pub growth_cycles: f64,
    pub growth_factor: f64,
    pub final_cells: f64,
    pub final_cells_formatted: String,
    pub final_cells_total: f64,
    pub final_cells_total_formatted: String,
    pub required_cells: f64,
    pub required_cells_formatted: String,
    pub required_cells_total: f64,
    pub required_cells_total_formatted: String,
    pub volume_needed_ml: f64,
    pub volume_needed_formatted: Option<String>,
    pub volume_needed_total_ml: f64,
    pub volume_needed_total_formatted: Option<String>,
    pub cell_concentration: f64,
    pub vessels_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_slurry_volume_ml: Option<f64>,
    pub note_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DilutionResponse {
    pub mode: &'static str,
    pub dilution_input_mode: &'static str,
    pub final_concentration: f64,
    pub final_concentration_formatted: String,
    pub total_volume_ml: f64,
    pub total_volume_formatted: Option<String>,
    pub cells_needed: f64,
    pub cells_needed_formatted: String,
    pub slurry_volume_ml: f64,
    pub slurry_volume_formatted: Option<String>,
    pub media_volume_ml: f64,
    pub media_volume_formatted: Option<String>,
    pub cell_concentration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells_to_seed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells_to_seed_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_per_seed_ml: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_per_seed_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portions_prepared: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_cells_total: Option<f64>,
    pub note_suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeedingResponse {
    Confluency(ConfluencyResponse),
    Dilution(DilutionResponse),
}

impl SeedingResponse {
    pub fn note_suggestion(&self) -> &str {
        match self {
            SeedingResponse::Confluency(r) => &r.note_suggestion,
            SeedingResponse::Dilution(r) => &r.note_suggestion,
        }
    }
}

pub struct SeedingCalculator<C: CatalogProvider> {
    catalog: C,
}

impl<C: CatalogProvider> SeedingCalculator<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Status code and JSON body for one request, errors included.
    pub fn respond(&self, payload: &Value) -> (u16, Value) {
        let outcome = self
            .calculate(payload)
            .and_then(|response| serde_json::to_value(response).map_err(CalcError::from));
        match outcome {
            Ok(body) => (200, body),
            Err(e) => {
                tracing::debug!("Seeding request rejected ({}): {}", e.status_code(), e);
                (e.status_code(), e.to_json())
            }
        }
    }

    pub fn calculate(&self, payload: &Value) -> Result<SeedingResponse> {
        let cell_concentration =
            require_positive(parse_numeric(payload.get("cell_concentration")), INVALID_CONCENTRATION)?;

        if payload.get("mode").and_then(Value::as_str) == Some("dilution") {
            return self
                .calculate_dilution(payload, cell_concentration)
                .map(SeedingResponse::Dilution);
        }
        self.calculate_confluency(payload, cell_concentration)
            .map(SeedingResponse::Confluency)
    }

    /// Cell lines ordered by name, as offered for doubling-time lookups.
    pub fn doubling_times(&self) -> Vec<CellLine> {
        let mut lines = self.catalog.cell_lines().to_vec();
        lines.sort_by(|a, b| a.name.cmp(&b.name));
        lines
    }

    fn calculate_confluency(
        &self,
        payload: &Value,
        cell_concentration: f64,
    ) -> Result<ConfluencyResponse> {
        let vessel_id = coerce_int(payload.get("vessel_id"))
            .ok_or_else(|| CalcError::validation(INVALID_VESSEL))?;
        let vessel = self
            .catalog
            .vessel(vessel_id)
            .ok_or_else(|| CalcError::not_found(VESSEL_NOT_FOUND))?;

        let percent = coerce_float(payload.get("target_confluency"), 0.0)
            .ok_or_else(|| CalcError::validation(INVALID_CONFLUENCY))?;
        let confluency_fraction = confluency_fraction_from_percent(percent)?;

        let hours = coerce_float(payload.get("target_hours"), 0.0)
            .ok_or_else(|| CalcError::validation(INVALID_HOURS))?;
        require_positive(Some(hours), NON_POSITIVE_HOURS)?;

        let vessel_count = resolve_vessel_count(
            payload
                .get("vessels_used")
                .map_or(Some(1), |raw| coerce_int(Some(raw))),
        );

        let cell_line = payload
            .get("culture_id")
            .filter(|raw| is_truthy(raw))
            .and_then(|raw| coerce_int(Some(raw)))
            .filter(|id| *id != 0)
            .and_then(|id| self.catalog.cell_line_for_culture(id));

        let doubling_time =
            resolve_doubling_time(parse_numeric(payload.get("doubling_time_override")), cell_line)?;

        let request = ConfluencyPlanRequest {
            vessel: vessel.spec(),
            vessel_count,
            target_confluency_fraction: confluency_fraction,
            target_hours: hours,
            doubling_time_hours: doubling_time,
            starting_concentration: cell_concentration,
        };
        let plan = plan_confluency(&request)?;

        tracing::debug!(
            vessel = %vessel.name,
            vessels = vessel_count,
            growth_cycles = plan.growth_cycles,
            "Planned confluency seeding"
        );

        Ok(ConfluencyResponse {
            mode: "confluency",
            vessel: vessel.name.clone(),
            vessel_id: vessel.id,
            vessel_area_cm2: vessel.area_cm2,
            target_confluency: confluency_fraction * 100.0,
            hours,
            doubling_time_used: doubling_time,
            growth_cycles: plan.growth_cycles,
            growth_factor: plan.growth_factor,
            final_cells: plan.final_cells_per_vessel,
            final_cells_formatted: format_cells(Some(plan.final_cells_per_vessel)),
            final_cells_total: plan.final_cells_total,
            final_cells_total_formatted: format_cells(Some(plan.final_cells_total)),
            required_cells: plan.required_cells_per_vessel,
            required_cells_formatted: format_cells(Some(plan.required_cells_per_vessel)),
            required_cells_total: plan.required_cells_total,
            required_cells_total_formatted: format_cells(Some(plan.required_cells_total)),
            volume_needed_ml: plan.volume_per_vessel_ml,
            volume_needed_formatted: format_volume(Some(plan.volume_per_vessel_ml)),
            volume_needed_total_ml: plan.volume_total_ml,
            volume_needed_total_formatted: format_volume(Some(plan.volume_total_ml)),
            cell_concentration,
            vessels_used: vessel_count,
            suggested_slurry_volume_ml: suggest_slurry_volume(Some(&vessel.name)),
            note_suggestion: seeding_note(
                vessel,
                vessel_count,
                confluency_fraction,
                hours,
                plan.required_cells_per_vessel,
            ),
        })
    }

    fn calculate_dilution(&self, payload: &Value, cell_concentration: f64) -> Result<DilutionResponse> {
        let cells_mode = payload
            .get("dilution_input_mode")
            .and_then(Value::as_str)
            .map(|mode| mode.trim().eq_ignore_ascii_case("cells"))
            .unwrap_or(false);

        let total_volume_ml =
            require_positive(parse_numeric(payload.get("total_volume_ml")), NON_POSITIVE_TOTAL_VOLUME)?;

        let target = if cells_mode {
            DilutionTarget::Cells {
                cells_to_seed: require_positive(
                    parse_numeric(payload.get("cells_to_seed")),
                    NON_POSITIVE_CELLS_TO_SEED,
                )?,
                volume_per_seed_ml: require_positive(
                    parse_numeric(payload.get("volume_per_seed_ml")),
                    NON_POSITIVE_SEED_VOLUME,
                )?,
            }
        } else {
            DilutionTarget::Concentration {
                final_concentration: require_positive(
                    parse_numeric(payload.get("final_concentration")),
                    NON_POSITIVE_FINAL_CONCENTRATION,
                )?,
            }
        };

        let request = DilutionPlanRequest {
            starting_concentration: cell_concentration,
            total_volume_ml,
            target,
        };
        let plan = plan_dilution(&request)?;

        tracing::debug!(
            input_mode = target.input_mode(),
            slurry_volume_ml = plan.slurry_volume_ml,
            "Planned dilution"
        );

        let (cells_to_seed, volume_per_seed_ml) = match target {
            DilutionTarget::Cells {
                cells_to_seed,
                volume_per_seed_ml,
            } => (Some(cells_to_seed), Some(volume_per_seed_ml)),
            DilutionTarget::Concentration { .. } => (None, None),
        };

        Ok(DilutionResponse {
            mode: "dilution",
            dilution_input_mode: target.input_mode(),
            final_concentration: plan.final_concentration,
            final_concentration_formatted: format_cells(Some(plan.final_concentration)),
            total_volume_ml,
            total_volume_formatted: format_volume(Some(total_volume_ml)),
            cells_needed: plan.cells_needed,
            cells_needed_formatted: format_cells(Some(plan.cells_needed)),
            slurry_volume_ml: plan.slurry_volume_ml,
            slurry_volume_formatted: format_volume(Some(plan.slurry_volume_ml)),
            media_volume_ml: plan.media_volume_ml,
            media_volume_formatted: format_volume(Some(plan.media_volume_ml)),
            cell_concentration,
            cells_to_seed,
            cells_to_seed_formatted: cells_to_seed.map(|cells| format_cells(Some(cells))),
            volume_per_seed_ml,
            volume_per_seed_formatted: volume_per_seed_ml.and_then(|v| format_volume(Some(v))),
            portions_prepared: plan.portions_prepared,
            measured_cells_total: measured_cells_total(
                Some(cell_concentration),
                parse_numeric(payload.get("measured_slurry_volume_ml")),
            ),
            note_suggestion: dilution_recipe(&request, &plan),
        })
    }
}

fn seeding_note(
    vessel: &Vessel,
    vessel_count: u32,
    confluency_fraction: f64,
    hours: f64,
    required_cells_per_vessel: f64,
) -> String {
    format!(
        "Seeding planner: Seed {} cells per {} ({} cm²) × {} vessel(s) to reach {:.1}% confluency in {:.1} hours.",
        format_cells(Some(required_cells_per_vessel)),
        vessel.name,
        format_general(vessel.area_cm2),
        vessel_count,
        confluency_fraction * 100.0,
        hours,
    )
}

/// Loose float coercion for form-style fields: numbers, numeric strings and
/// booleans convert; an absent key takes `default`; null, `inf`/`nan` and anything else fail.
fn coerce_float(value: Option<&Value>, default: f64) -> Option<f64> {
    let coerced = match value {
        None => Some(default),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(_) => None,
    };
    coerced.filter(|v| v.is_finite())
}

/// Integer coercion: floats truncate toward zero, strings must be whole numbers.
fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog::Catalog;
    use serde_json::json;

    fn calculator() -> SeedingCalculator<Catalog> {
        let catalog = Catalog::from_toml_str(
            r#"
[[vessels]]
id = 1
name = "T75 flask"
area_cm2 = 75.0
cells_at_100_confluency = 1.0e7

[[cell_lines]]
id = 1
name = "HeLa"
doubling_time_min_hours = 20.0
doubling_time_max_hours = 28.0

[[cultures]]
id = 5
name = "HeLa stock"
cell_line_id = 1
"#,
        )
        .unwrap();
        SeedingCalculator::new(catalog)
    }

    #[test]
    fn test_confluency_response_fields() {
        let response = calculator()
            .calculate(&json!({
                "vessel_id": 1,
                "target_confluency": 80,
                "target_hours": 48,
                "cell_concentration": "1M",
                "doubling_time_override": "24",
            }))
            .unwrap();
        let SeedingResponse::Confluency(r) = response else {
            panic!("expected a confluency plan");
        };
        assert_eq!(r.final_cells, 8e6);
        assert_eq!(r.required_cells, 2e6);
        assert_eq!(r.required_cells_formatted, "2.00 M");
        assert_eq!(r.volume_needed_ml, 2.0);
        assert_eq!(r.volume_needed_formatted.as_deref(), Some("2.00 mL"));
        assert_eq!(r.vessels_used, 1);
        assert_eq!(r.suggested_slurry_volume_ml, Some(7.0));
        assert_eq!(
            r.note_suggestion,
            "Seeding planner: Seed 2.00 M cells per T75 flask (75 cm²) × 1 vessel(s) to reach \
             80.0% confluency in 48.0 hours."
        );
    }

    #[test]
    fn test_doubling_time_from_culture_cell_line() {
        let response = calculator()
            .calculate(&json!({
                "vessel_id": "1",
                "target_confluency": "100",
                "target_hours": 24,
                "cell_concentration": 1e6,
                "culture_id": 5,
                "vessels_used": "2",
            }))
            .unwrap();
        let SeedingResponse::Confluency(r) = response else {
            panic!("expected a confluency plan");
        };
        assert_eq!(r.doubling_time_used, 24.0);
        assert_eq!(r.target_confluency, 100.0);
        assert_eq!(r.vessels_used, 2);
        assert_eq!(r.required_cells_total, 1e7);
    }

    #[test]
    fn test_validation_order_and_statuses() {
        let calc = calculator();

        let (status, body) = calc.respond(&json!({"vessel_id": 1}));
        assert_eq!(status, 400);
        assert_eq!(body["error"], INVALID_CONCENTRATION);

        let (status, body) = calc.respond(&json!({"cell_concentration": "1e6"}));
        assert_eq!(status, 400);
        assert_eq!(body["error"], INVALID_VESSEL);

        let (status, body) = calc.respond(&json!({"cell_concentration": "1e6", "vessel_id": 99}));
        assert_eq!(status, 404);
        assert_eq!(body["error"], VESSEL_NOT_FOUND);

        let (status, body) = calc.respond(&json!({
            "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": "lots"
        }));
        assert_eq!(status, 400);
        assert_eq!(body["error"], INVALID_CONFLUENCY);

        let (_, body) = calc.respond(&json!({
            "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": 0
        }));
        assert_eq!(body["error"], "Target confluency must be greater than zero.");

        let (_, body) = calc.respond(&json!({
            "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": 50,
            "target_hours": null
        }));
        assert_eq!(body["error"], INVALID_HOURS);

        let (_, body) = calc.respond(&json!({
            "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": 50,
            "target_hours": 24
        }));
        assert_eq!(body["error"], "A valid doubling time is required.");
    }

    #[test]
    fn test_dilution_concentration_mode() {
        let (status, body) = calculator().respond(&json!({
            "mode": "dilution",
            "cell_concentration": "5M",
            "total_volume_ml": 10,
            "final_concentration": "1e6",
        }));
        assert_eq!(status, 200);
        assert_eq!(body["dilution_input_mode"], "concentration");
        assert_eq!(body["slurry_volume_ml"], 2.0);
        assert_eq!(body["media_volume_ml"], 8.0);
        assert_eq!(body["slurry_volume_formatted"], "2.00 mL");
        assert!(body.get("portions_prepared").is_none());
        assert!(body.get("cells_to_seed").is_none());
    }

    #[test]
    fn test_dilution_cells_mode() {
        let (status, body) = calculator().respond(&json!({
            "mode": "dilution",
            "dilution_input_mode": " Cells ",
            "cell_concentration": "2M",
            "total_volume_ml": 20,
            "cells_to_seed": "300K",
            "volume_per_seed_ml": 2,
        }));
        assert_eq!(status, 200);
        assert_eq!(body["dilution_input_mode"], "cells");
        assert_eq!(body["final_concentration"], 150_000.0);
        assert_eq!(body["portions_prepared"], 10.0);
        assert_eq!(body["cells_to_seed_formatted"], "300.00 K");
        let note = body["note_suggestion"].as_str().unwrap();
        assert!(note.ends_with("This delivers 300.00 K cells in 2.00 mL per portion."));
        assert!(body.get("measured_cells_total").is_none());
    }

    #[test]
    fn test_dilution_cells_mode_requires_cells_to_seed() {
        let calc = calculator();
        for cells_to_seed in [json!(0), json!("none"), Value::Null] {
            let (status, body) = calc.respond(&json!({
                "mode": "dilution",
                "dilution_input_mode": "cells",
                "cell_concentration": "2M",
                "total_volume_ml": 20,
                "cells_to_seed": cells_to_seed,
                "volume_per_seed_ml": 2,
            }));
            assert_eq!(status, 400);
            assert_eq!(body["error"], NON_POSITIVE_CELLS_TO_SEED);
        }

        let (status, body) = calc.respond(&json!({
            "mode": "dilution",
            "dilution_input_mode": "cells",
            "cell_concentration": "2M",
            "total_volume_ml": 20,
            "volume_per_seed_ml": 2,
        }));
        assert_eq!(status, 400);
        assert_eq!(body["error"], NON_POSITIVE_CELLS_TO_SEED);
    }

    #[test]
    fn test_dilution_reports_measured_total() {
        let response = calculator()
            .calculate(&json!({
                "mode": "dilution",
                "cell_concentration": "2M",
                "total_volume_ml": 10,
                "final_concentration": "1M",
                "measured_slurry_volume_ml": "6",
            }))
            .unwrap();
        let SeedingResponse::Dilution(r) = response else {
            panic!("expected a dilution plan");
        };
        assert_eq!(r.measured_cells_total, Some(12_000_000.0));
    }

    #[test]
    fn test_non_finite_hours_and_confluency_rejected() {
        let calc = calculator();
        for hours in ["inf", "infinity", "-inf", "nan"] {
            let (status, body) = calc.respond(&json!({
                "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": 50,
                "target_hours": hours, "doubling_time_override": 24,
            }));
            assert_eq!(status, 400);
            assert_eq!(body["error"], INVALID_HOURS);
        }

        let (status, body) = calc.respond(&json!({
            "cell_concentration": "1e6", "vessel_id": 1, "target_confluency": "inf",
            "target_hours": 24, "doubling_time_override": 24,
        }));
        assert_eq!(status, 400);
        assert_eq!(body["error"], INVALID_CONFLUENCY);
    }

    #[test]
    fn test_dilution_rejects_concentrating() {
        let (status, body) = calculator().respond(&json!({
            "mode": "dilution",
            "cell_concentration": 1e6,
            "total_volume_ml": 10,
            "final_concentration": 2e6,
        }));
        assert_eq!(status, 400);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Target concentration is higher than the starting suspension."));
    }

    #[test]
    fn test_doubling_times_sorted_by_name() {
        let lines = calculator().doubling_times();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].average_doubling_time(), Some(24.0));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(coerce_float(None, 0.0), Some(0.0));
        assert_eq!(coerce_float(Some(&json!(" 12.5 ")), 0.0), Some(12.5));
        assert_eq!(coerce_float(Some(&Value::Null), 0.0), None);
        assert_eq!(coerce_float(Some(&json!("Infinity")), 0.0), None);
        assert_eq!(coerce_float(Some(&json!("NaN")), 0.0), None);
        assert_eq!(coerce_int(Some(&json!(2.7))), Some(2));
        assert_eq!(coerce_int(Some(&json!("2.5"))), None);
        assert_eq!(coerce_int(None), None);
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("7")));
    }
}
