//! Text formatting for prices, countdowns and labels

use chrono::Duration;

/// Currency suffix shown after prices
pub const CURRENCY: &str = "DT";

/// Formats a price with two decimals and the currency suffix.
///
/// # Examples
///
/// ```
/// use storefront::app::helpers::formatting::format_price;
///
/// assert_eq!(format_price(4.5), "4.50 DT");
/// ```
pub fn format_price(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.2} {CURRENCY}")
}

/// Formats a remaining duration as `"Xh Ym"`, rounding seconds down.
pub fn format_time_remaining(remaining: Duration) -> String {
    let remaining = remaining.max(Duration::zero());
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    format!("{hours}h {minutes}m")
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.0}%", value.clamp(0.0, 100.0))
}

/// Shortens `text` to at most `max_chars` characters, ending with an
/// ellipsis when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
