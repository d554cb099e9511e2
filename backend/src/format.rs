//! Compact number formatting for the text summary.

/// `$1.23M` from one million up, `$12.3K` below.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else {
        format!("${:.1}K", value / 1_000.0)
    }
}

/// `N/A` for a missing value, otherwise `M` / `K` suffixes by magnitude.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) if v.is_nan() => "N/A".to_string(),
        Some(v) if v.abs() >= 1_000_000.0 => format!("{:.2}M", v / 1_000_000.0),
        Some(v) if v.abs() >= 1_000.0 => format!("{:.2}K", v / 1_000.0),
        Some(v) => format!("{:.2}", v),
    }
}
