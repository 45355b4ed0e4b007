use std::sync::OnceLock;

use regex::Regex;

/// The downstream video model only produces 8-second clips, so every script
/// is cut into 8-second segments.
pub const SEGMENT_SECONDS: f64 = 8.0;

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+(\.\d+)?)\s*(phút|minute|min|m)").unwrap())
}

fn seconds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+(\.\d+)?)\s*(giây|second|sec|s)").unwrap())
}

fn bare_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").unwrap())
}

/// Parse a free-text duration ("30 giây", "1 phút 30s", "90") into total
/// seconds.
///
/// Minute and second markers (localized or English) are summed; a bare
/// number counts as seconds. Returns `None` for anything unparseable, zero
/// or negative; malformed input degrades to "not specified" rather than
/// failing.
pub fn parse_duration_seconds(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut total = 0.0;
    if let Some(caps) = minutes_re().captures(trimmed) {
        total += caps[1].parse::<f64>().ok()? * 60.0;
    }
    if let Some(caps) = seconds_re().captures(trimmed) {
        total += caps[1].parse::<f64>().ok()?;
    }
    if total == 0.0 && bare_number_re().is_match(trimmed) {
        total = trimmed.parse::<f64>().ok()?;
    }

    (total > 0.0).then_some(total)
}

/// Number of 8-second scenes needed to cover `total_seconds`.
pub fn required_scenes(total_seconds: f64) -> u32 {
    (total_seconds / SEGMENT_SECONDS).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_only() {
        assert_eq!(parse_duration_seconds("2 phút"), Some(120.0));
        assert_eq!(parse_duration_seconds("1 minute"), Some(60.0));
        assert_eq!(parse_duration_seconds("3m"), Some(180.0));
    }

    #[test]
    fn test_seconds_only() {
        assert_eq!(parse_duration_seconds("30 giây"), Some(30.0));
        assert_eq!(parse_duration_seconds("45 seconds"), Some(45.0));
        assert_eq!(parse_duration_seconds("90s"), Some(90.0));
    }

    #[test]
    fn test_minutes_and_seconds_sum() {
        assert_eq!(parse_duration_seconds("1 phút 30 giây"), Some(90.0));
        assert_eq!(parse_duration_seconds("2m 15s"), Some(135.0));
    }

    #[test]
    fn test_bare_number_is_seconds() {
        assert_eq!(parse_duration_seconds("90"), Some(90.0));
        assert_eq!(parse_duration_seconds("7.5"), Some(7.5));
    }

    #[test]
    fn test_fractional_minutes() {
        assert_eq!(parse_duration_seconds("1.5 phút"), Some(90.0));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("   "), None);
        assert_eq!(parse_duration_seconds("ngắn thôi"), None);
        assert_eq!(parse_duration_seconds("0"), None);
    }

    #[test]
    fn test_scene_count_ceiling() {
        assert_eq!(required_scenes(30.0), 4);
        assert_eq!(required_scenes(8.0), 1);
        assert_eq!(required_scenes(9.0), 2);
        assert_eq!(required_scenes(64.0), 8);
    }
}
