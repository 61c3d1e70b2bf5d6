use super::model::Reading;

/// Longest non-numeric text shown in a numeric table cell.
const DISPLAY_FALLBACK_CHARS: usize = 12;

/// Leading numeric run: digits and at most one decimal point, stopping at the
/// first other character once the run has started.
fn leading_number(s: &str) -> Option<f64> {
    let mut run = String::new();
    let mut seen_dot = false;
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
        } else if ch == '.' && !seen_dot {
            seen_dot = true;
            run.push(ch);
        } else if !run.is_empty() {
            break;
        }
    }
    if run.is_empty() {
        return None;
    }
    run.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Average latency in milliseconds, formatted with one decimal place.
///
/// `"123ms"` → `"123.0"`. Input without a numeric run comes back trimmed and
/// otherwise unchanged.
pub fn normalize_latency(raw: &str) -> Reading {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Reading::passthrough("");
    }
    let cleaned = trimmed.to_lowercase().replace("ms", " ").replace(',', " ");
    match leading_number(cleaned.trim()) {
        Some(value) => Reading {
            value: Some(value),
            text: format!("{value:.1}"),
        },
        None => Reading::passthrough(trimmed),
    }
}

/// Download speed in MB/s, formatted with two decimal places.
///
/// The unit is sniffed case-insensitively: `mb` is taken as-is, `kb` is
/// divided by 1024, `b/s`, `bps` or `byte` by 1024². A bare number is
/// already MB/s.
pub fn normalize_throughput(raw: &str) -> Reading {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Reading::passthrough("");
    }
    let low = trimmed.to_lowercase().replace(',', "");
    let divisor = if low.contains("mb") {
        1.0
    } else if low.contains("kb") {
        1024.0
    } else if low.contains("b/s") || low.contains("bps") || low.contains("byte") {
        1024.0 * 1024.0
    } else {
        1.0
    };
    match leading_number(low.trim()) {
        Some(n) => {
            let value = n / divisor;
            Reading {
                value: Some(value),
                text: format!("{value:.2}"),
            }
        }
        None => Reading::passthrough(trimmed),
    }
}

/// Text for a table cell; long passthrough text is cut to keep columns tidy.
pub fn display_text(reading: &Reading) -> String {
    if reading.value.is_some() || reading.text.chars().count() <= DISPLAY_FALLBACK_CHARS {
        return reading.text.clone();
    }
    let mut short: String = reading.text.chars().take(DISPLAY_FALLBACK_CHARS).collect();
    short.push('…');
    short
}
