use crate::domain::model::NumericInput;

const SCALE_SUFFIXES: [(char, f64); 3] = [('K', 1_000.0), ('M', 1_000_000.0), ('B', 1_000_000_000.0)];

const ONE_MILLION: f64 = 1_000_000.0;

pub fn parse_numeric<'a>(value: impl Into<NumericInput<'a>>) -> Option<f64> {
    match value.into() {
        NumericInput::Missing | NumericInput::Boolean(_) => None,
        NumericInput::Number(n) => Some(n).filter(|v| v.is_finite()),
        NumericInput::Text(text) => parse_numeric_text(text),
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && *c != ' ')
        .collect::<String>()
        .to_uppercase();

    let scaled = SCALE_SUFFIXES.iter().find_map(|(suffix, factor)| {
        cleaned
            .strip_suffix(*suffix)
            .map(|rest| (rest, *factor))
    });

    let parsed = match scaled {
        Some((rest, factor)) => rest.parse::<f64>().ok().map(|v| v * factor),
        None => cleaned.parse::<f64>().ok(),
    };

    // forms like 300E3 that did not survive the suffix pass
    parsed
        .or_else(|| cleaned.replace('E', "e").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a yield that people usually enter in millions of cells.
///
/// A bare number below one million is read as millions (`"2.5"` is 2.5e6);
/// an explicit `M` suffix, scientific notation, a trailing `cells` word or a
/// value already at or above one million is taken literally.
pub fn parse_millions<'a>(value: impl Into<NumericInput<'a>>) -> Option<f64> {
    match value.into() {
        NumericInput::Missing | NumericInput::Boolean(_) => None,
        NumericInput::Number(n) => {
            let numeric = parse_numeric(n)?;
            Some(scale_to_millions(numeric))
        }
        NumericInput::Text(text) => {
            let mut cleaned = text.trim();
            if cleaned.is_empty() {
                return None;
            }
            if let Some(rest) = strip_suffix_ignore_case(cleaned, "cells")
                .or_else(|| strip_suffix_ignore_case(cleaned, "cell"))
            {
                cleaned = rest.trim();
            }

            let numeric = parse_numeric(cleaned)?;

            let upper = cleaned.to_uppercase();
            if upper.ends_with('M') || upper.contains('E') || upper.ends_with("CELLS") {
                return Some(numeric);
            }
            Some(scale_to_millions(numeric))
        }
    }
}

fn scale_to_millions(numeric: f64) -> f64 {
    if numeric >= ONE_MILLION {
        numeric
    } else {
        numeric * ONE_MILLION
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        value.get(..split)
    } else {
        None
    }
}

/// Total cells in a measured suspension, when both readings are usable.
pub fn measured_cells_total(concentration: Option<f64>, slurry_volume_ml: Option<f64>) -> Option<f64> {
    match (concentration, slurry_volume_ml) {
        (Some(c), Some(v)) if c != 0.0 && v > 0.0 => Some(c * v),
        _ => None,
    }
}
