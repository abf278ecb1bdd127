use crate::core::format::{format_general, format_hours};
use serde::{Deserialize, Serialize};

/// A raw field as it arrives from a form, CSV cell or JSON payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericInput<'a> {
    Missing,
    Boolean(bool),
    Number(f64),
    Text(&'a str),
}

impl<'a> From<&'a serde_json::Value> for NumericInput<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => NumericInput::Boolean(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(NumericInput::Number)
                .unwrap_or(NumericInput::Missing),
            serde_json::Value::String(s) => NumericInput::Text(s),
            _ => NumericInput::Missing,
        }
    }
}

impl<'a> From<Option<&'a serde_json::Value>> for NumericInput<'a> {
    fn from(value: Option<&'a serde_json::Value>) -> Self {
        value.map(NumericInput::from).unwrap_or(NumericInput::Missing)
    }
}

impl<'a> From<&'a str> for NumericInput<'a> {
    fn from(value: &'a str) -> Self {
        NumericInput::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for NumericInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map(NumericInput::Text).unwrap_or(NumericInput::Missing)
    }
}

impl From<f64> for NumericInput<'_> {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<i64> for NumericInput<'_> {
    fn from(value: i64) -> Self {
        NumericInput::Number(value as f64)
    }
}

impl From<bool> for NumericInput<'_> {
    fn from(value: bool) -> Self {
        NumericInput::Boolean(value)
    }
}

/// Growth-surface capacity of one culture vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    pub area_cm2: f64,
    pub cells_at_100_confluency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub id: i64,
    pub name: String,
    pub area_cm2: f64,
    pub cells_at_100_confluency: f64,
}

impl Vessel {
    pub fn spec(&self) -> VesselSpec {
        VesselSpec {
            area_cm2: self.area_cm2,
            cells_at_100_confluency: self.cells_at_100_confluency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellLine {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub doubling_time_min_hours: Option<f64>,
    #[serde(default)]
    pub doubling_time_max_hours: Option<f64>,
    #[serde(default)]
    pub reference_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CellLine {
    /// Mean of the recorded doubling-time bounds; zero bounds count as unset.
    pub fn average_doubling_time(&self) -> Option<f64> {
        let values: Vec<f64> = [self.doubling_time_min_hours, self.doubling_time_max_hours]
            .into_iter()
            .flatten()
            .filter(|v| *v != 0.0)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn display_doubling_time(&self) -> String {
        let low = self.doubling_time_min_hours.filter(|v| *v != 0.0);
        let high = self.doubling_time_max_hours.filter(|v| *v != 0.0);
        match (low, high) {
            (Some(low), Some(high)) if low != high => {
                format!("{}–{}", format_general(low), format_hours(Some(high)))
            }
            (Some(hours), _) | (None, Some(hours)) => format_hours(Some(hours)),
            (None, None) => format_hours(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Culture {
    pub id: i64,
    pub name: String,
    pub cell_line_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfluencyPlanRequest {
    pub vessel: VesselSpec,
    pub vessel_count: u32,
    pub target_confluency_fraction: f64,
    pub target_hours: f64,
    pub doubling_time_hours: f64,
    pub starting_concentration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfluencyPlanResult {
    pub final_cells_per_vessel: f64,
    pub final_cells_total: f64,
    pub growth_cycles: f64,
    pub growth_factor: f64,
    pub required_cells_per_vessel: f64,
    pub required_cells_total: f64,
    pub volume_per_vessel_ml: f64,
    pub volume_total_ml: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DilutionTarget {
    Concentration {
        final_concentration: f64,
    },
    Cells {
        cells_to_seed: f64,
        volume_per_seed_ml: f64,
    },
}

impl DilutionTarget {
    pub fn input_mode(&self) -> &'static str {
        match self {
            DilutionTarget::Concentration { .. } => "concentration",
            DilutionTarget::Cells { .. } => "cells",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilutionPlanRequest {
    pub starting_concentration: f64,
    pub total_volume_ml: f64,
    pub target: DilutionTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DilutionPlanResult {
    pub final_concentration: f64,
    pub cells_needed: f64,
    pub slurry_volume_ml: f64,
    pub media_volume_ml: f64,
    pub portions_prepared: Option<f64>,
}
