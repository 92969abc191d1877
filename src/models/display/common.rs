//! Common display helpers

/// Truncate to `max_len` characters, ending with an ellipsis when cut
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Price with two decimals and optional currency code, "-" when unknown
pub fn format_price(price: Option<f64>, currency: Option<&str>) -> String {
    match (price, currency) {
        (Some(p), Some(c)) => format!("{:.2} {}", p, c),
        (Some(p), None) => format!("{:.2}", p),
        (None, _) => "-".to_string(),
    }
}
