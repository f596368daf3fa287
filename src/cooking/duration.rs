//! Free-form step duration parsing.
//!
//! Step durations are typed by people or generated by a model, so they come
//! in shapes like `"5 minutes"`, `"30 seconds"`, `"1 hour"` or just `"10"`.
//! [`parse_duration_to_seconds`] reduces any of them to whole seconds and
//! never fails.

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3_600;

/// Convert `text` to whole seconds.
///
/// Takes the first run of ASCII digits and scales it by the unit named in
/// the text, checked in the order `minute`, `second`, `hour`.  Text with no
/// unit is read as minutes.  No digits, or a value that does not fit in a
/// `u32`, gives `0`.
///
/// ```rust
/// use cookitup::cooking::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("5 minutes"), 300);
/// assert_eq!(parse_duration_to_seconds("30 seconds"), 30);
/// assert_eq!(parse_duration_to_seconds("1 hour"), 3_600);
/// assert_eq!(parse_duration_to_seconds("10"), 600);
/// assert_eq!(parse_duration_to_seconds("quick"), 0);
/// ```
pub fn parse_duration_to_seconds(text: &str) -> u32 {
    let lower = text.trim().to_lowercase();

    let amount = match first_digit_run(&lower).and_then(|digits| digits.parse::<u32>().ok()) {
        Some(amount) => amount,
        None => return 0,
    };

    let multiplier = if lower.contains("minute") {
        SECONDS_PER_MINUTE
    } else if lower.contains("second") {
        1
    } else if lower.contains("hour") {
        SECONDS_PER_HOUR
    } else {
        SECONDS_PER_MINUTE
    };

    amount.checked_mul(multiplier).unwrap_or(0)
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
