const PLACEHOLDER: &str = "—";

pub fn format_cells(value: Option<f64>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    let absolute = value.abs();
    if absolute >= 1_000_000_000.0 {
        format!("{:.2} B", value / 1_000_000_000.0)
    } else if absolute >= 1_000_000.0 {
        format!("{:.2} M", value / 1_000_000.0)
    } else if absolute >= 1_000.0 {
        format!("{:.2} K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

pub fn format_volume(volume_ml: Option<f64>) -> Option<String> {
    let volume_ml = volume_ml?;
    if volume_ml < 0.0 {
        return format_volume(Some(volume_ml.abs())).map(|v| format!("-{}", v));
    }
    if volume_ml == 0.0 {
        return Some("0.00 mL".to_string());
    }
    if volume_ml < 0.01 {
        return Some(format!("{:.2} µL", volume_ml * 1000.0));
    }
    Some(format!("{:.2} mL", volume_ml))
}

/// Rounds to `digits` significant figures, e.g. `1_234_567 -> "1200000"`,
/// `0.012345 -> "0.012"`. Decimal places round from the exact binary value.
pub fn format_significant(value: Option<f64>, digits: u32) -> Option<String> {
    let value = value?;
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some("0".to_string());
    }
    let scale = decimal_scale(value, digits);
    if scale >= 0 {
        return Some(format!("{:.*}", scale as usize, value));
    }
    let factor = 10f64.powi(-scale);
    Some(format!("{:.0}", (value / factor).round_ties_even() * factor))
}

pub fn format_hours(value: Option<f64>) -> String {
    match value {
        Some(hours) => format!("{} h", format_general(hours)),
        None => PLACEHOLDER.to_string(),
    }
}

/// `%g`-style rendering: six significant digits, trailing zeros dropped,
/// exponent form below 1e-4 and from 1e6 up (`1e+06`, `1e-05`).
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value == 0.0 || value.is_infinite() {
        return format!("{}", value);
    }
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..6).contains(&exponent) {
        let fixed = format!("{:.*}", (5 - exponent) as usize, value);
        trim_fraction(&fixed).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn decimal_scale(value: f64, digits: u32) -> i32 {
    let order = value.abs().log10().floor() as i32;
    digits as i32 - 1 - order
}
