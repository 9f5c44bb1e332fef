//! Display formatting for catalog values.

/// Formats an ISO 8601 duration such as `PT1H2M3S` as `1:02:03`.
///
/// Only the `PT…H…M…S` time part is read. Anything without a `PT` marker
/// formats as `0:00`.
pub fn format_duration(iso: &str) -> String {
    let Some(start) = iso.find("PT") else {
        return "0:00".to_string();
    };

    let mut rest = &iso[start + 2..];
    let hours = take_component(&mut rest, 'H');
    let minutes = take_component(&mut rest, 'M');
    let seconds = take_component(&mut rest, 'S');

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Consumes `<digits><unit>` from the front of `rest` when present.
fn take_component(rest: &mut &str, unit: char) -> u64 {
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !rest[digits..].starts_with(unit) {
        return 0;
    }
    let value = rest[..digits].parse().unwrap_or(u64::MAX);
    *rest = &rest[digits + unit.len_utf8()..];
    value
}

/// Formats a raw view count: `1234567` → `1.2M views`, `1500` → `1.5K views`.
///
/// Leading whitespace and trailing junk are ignored. A count that does not
/// start with a number is treated as 0.
pub fn format_view_count(raw: &str) -> String {
    let count = leading_integer(raw);

    if count >= 1_000_000 {
        format!("{}M views", tenths(count, 1_000_000))
    } else if count >= 1_000 {
        format!("{}K views", tenths(count, 1_000))
    } else {
        format!("{} views", count)
    }
}

/// `count / unit` rounded half up to one decimal place.
fn tenths(count: i64, unit: i64) -> String {
    let step = i128::from(unit / 10);
    let scaled = (i128::from(count) + step / 2) / step;
    format!("{}.{}", scaled / 10, scaled % 10)
}

fn leading_integer(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().unwrap_or(0);
    if negative {
        -value
    } else {
        value
    }
}
