//! Number formatting shared by the table, axis ticks, and data labels.
//!
//! Every rendered value goes through the same pair of functions so a cell
//! in the table, a tick on the bar chart, and a label on a pie slice all
//! read the same.

use crate::models::NumberFormat;

/// Parse the leading numeric prefix of a string, the way the loose cell
/// values are read everywhere in the dashboard: `"123abc"` is 123,
/// `"12.5 "` is 12.5, `"abc"` is nothing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let b = s.as_bytes();
    let mut i = 0;

    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_digits = digit_run(b, i);
    i += int_digits;
    let mut frac_digits = 0;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        frac_digits = digit_run(b, i);
        i += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    // An exponent only counts when at least one digit follows it; "1e" and
    // "1e+" stop before the 'e'.
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_digits = digit_run(b, j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    s[..i].parse::<f64>().ok()
}

fn digit_run(b: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    i - start
}

/// Scale a number and append the matching suffix. `None` renders the plain
/// value without a suffix.
pub fn format_value(value: f64, format: NumberFormat) -> String {
    match format {
        NumberFormat::None => format!("{}", value),
        NumberFormat::Thousands => format!("{:.2} тыс.", value / 1.0e3),
        NumberFormat::Millions => format!("{:.2} млн.", value / 1.0e6),
        NumberFormat::Trillions => format!("{:.2} трлн.", value / 1.0e12),
    }
}

/// Format a raw cell for display. Values with no numeric prefix pass
/// through unchanged instead of turning into "NaN".
pub fn format_number(raw: &str, format: NumberFormat) -> String {
    match parse_number(raw) {
        Some(v) => format_value(v, format),
        None => raw.to_string(),
    }
}
