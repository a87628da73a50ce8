//! Free-form time and range parsing
//!
//! Accepts composite `H`/`M`/`S` suffix tokens (`8M10S`), clock forms
//! (`2:32`, `1:02:30`), and bare second counts (`152`). Two tokens joined by
//! a hyphen, an en-dash, or the word "to" form a range. Parsing is pure and
//! stateless; callers decide what a failed parse means.

use super::Segment;

/// Parse a single time token into whole seconds.
///
/// Returns `None` when the token matches none of the accepted forms.
pub fn parse_timestamp(token: &str) -> Option<u32> {
    let t = token.trim();
    if t.is_empty() {
        return None;
    }

    if let Some(seconds) = parse_hms_suffix(t) {
        return Some(seconds);
    }

    if t.contains(':') {
        return parse_clock(t);
    }

    if t.bytes().all(|b| b.is_ascii_digit()) {
        return t.parse().ok();
    }

    None
}

/// Parse a free-form range like `2:32-3:23` or `00H08M10S to 00H09M20S`.
///
/// If delimiter splitting fails, a fallback scan collects every time-like
/// substring in the text and uses the first and last that parse. Returns
/// `None` when fewer than two tokens parse or `end <= start`.
pub fn parse_range(text: &str) -> Option<Segment> {
    if let Some((a, b)) = split_on_delimiter(text) {
        if let (Some(start), Some(end)) = (parse_timestamp(a), parse_timestamp(b)) {
            if let Some(segment) = Segment::new(start, end) {
                return Some(segment);
            }
        }
    }

    // Fallback: scan for time-like substrings anywhere in the text and use
    // the first and last that parse.
    let parsed: Vec<u32> = time_like_tokens(text)
        .into_iter()
        .filter_map(|t| parse_timestamp(&t))
        .collect();
    if parsed.len() >= 2 {
        return Segment::new(parsed[0], *parsed.last().unwrap());
    }

    None
}

/// Format whole seconds as `H:MM:SS` or `M:SS`
pub fn format_hms(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Parse composite `H`/`M`/`S` suffix tokens, case-insensitive.
///
/// Any subset of the three groups may be present (`8M10S`, `45S`, `1H`), but
/// the token must consist of nothing else and contain at least one group.
fn parse_hms_suffix(t: &str) -> Option<u32> {
    let mut total: u64 = 0;
    let mut groups = 0usize;
    let mut number = String::new();
    // Units must appear in H, M, S order at most once each
    let mut next_allowed = 0u8; // 0 = H, 1 = M, 2 = S

    for c in t.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let unit = match c.to_ascii_uppercase() {
            'H' => 0u8,
            'M' => 1,
            'S' => 2,
            _ => return None,
        };
        if number.is_empty() || unit < next_allowed {
            return None;
        }
        let value: u64 = number.parse().ok()?;
        let multiplier = match unit {
            0 => 3600,
            1 => 60,
            _ => 1,
        };
        total = total.checked_add(value.checked_mul(multiplier)?)?;
        groups += 1;
        number.clear();
        next_allowed = unit + 1;
    }

    if groups == 0 || !number.is_empty() {
        return None;
    }
    u32::try_from(total).ok()
}

/// Parse clock form `mm:ss` or `hh:mm:ss`
fn parse_clock(t: &str) -> Option<u32> {
    let parts: Vec<&str> = t.split(':').collect();
    let mut values = Vec::with_capacity(parts.len());
    for part in &parts {
        let trimmed = part.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        values.push(trimmed.parse::<u32>().ok()? as u64);
    }
    // Accumulate in u64: large hour values must parse to None, not overflow
    let total = match values.as_slice() {
        [m, s] => m * 60 + s,
        [h, m, s] => h * 3600 + m * 60 + s,
        _ => return None,
    };
    u32::try_from(total).ok()
}

/// Split on the first range delimiter: hyphen, en-dash, or the word "to"
fn split_on_delimiter(text: &str) -> Option<(&str, &str)> {
    for delim in ['-', '\u{2013}'] {
        if let Some(pos) = text.find(delim) {
            let (a, b) = text.split_at(pos);
            return Some((a, &b[delim.len_utf8()..]));
        }
    }
    let lower = text.to_ascii_lowercase();
    if let Some(pos) = lower.find(" to ") {
        return Some((&text[..pos], &text[pos + 4..]));
    }
    None
}

/// Collect maximal runs of characters that can occur in a time token
fn time_like_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || c == ':' || matches!(c.to_ascii_uppercase(), 'H' | 'M' | 'S') {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
