//! Duration parsing and rendering for timeout values
//!
//! Schema descriptions declare timeouts as `90m`, `1h30m` or bare seconds;
//! documentation renders them as `90 minutes` or `1 hour`.

/// Seconds for `value` of a unit word (`hours`, `minute`, `s`, ...)
pub fn unit_seconds(value: u64, unit: &str) -> Option<u64> {
    let factor = match unit.trim().to_lowercase().as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        _ => return None,
    };
    value.checked_mul(factor)
}

/// Parse a duration such as `90m`, `1h30m`, `30 minutes` or `1800`
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(seconds) = text.parse::<u64>() {
        return Some(seconds);
    }

    let mut total = 0u64;
    let mut chars = text.chars().peekable();
    let mut parsed_any = false;

    while chars.peek().is_some() {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let mut digits = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            chars.next();
        }
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let mut unit = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_alphabetic()) {
            unit.push(c);
            chars.next();
        }
        if digits.is_empty() {
            if unit.is_empty() && chars.peek().is_none() {
                break;
            }
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(unit_seconds(value, &unit)?)?;
        parsed_any = true;

        // "1 hour and 30 minutes"
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }
        let rest: String = chars.clone().take(4).collect();
        if rest.to_lowercase().starts_with("and ") {
            for _ in 0..4 {
                chars.next();
            }
        }
    }

    parsed_any.then_some(total)
}

/// Render seconds the way the documentation states them
pub fn format_duration(seconds: u64) -> String {
    let (value, unit) = if seconds >= 3600 && seconds % 3600 == 0 {
        (seconds / 3600, "hour")
    } else if seconds >= 60 && seconds % 60 == 0 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };

    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}
