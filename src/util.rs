/// Format whole seconds as `MM:SS`.
pub fn format_mmss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One-decimal accuracy percentage; 0.0 when nothing was attempted.
pub fn accuracy_percent(successes: u32, failures: u32) -> f64 {
    let total = successes + failures;
    if total == 0 {
        return 0.0;
    }
    let raw = successes as f64 / total as f64;
    (raw * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(9), "00:09");
        assert_eq!(format_mmss(61), "01:01");
        assert_eq!(format_mmss(600), "10:00");
        assert_eq!(format_mmss(3725), "62:05");
    }

    #[test]
    fn test_accuracy_three_of_four() {
        assert_eq!(accuracy_percent(3, 1), 75.0);
    }

    #[test]
    fn test_accuracy_rounds_to_one_decimal() {
        // 1/3 -> 33.333...% -> 33.3
        assert_eq!(accuracy_percent(1, 2), 33.3);
        // 2/3 -> 66.666...% -> 66.7
        assert_eq!(accuracy_percent(2, 1), 66.7);
    }

    #[test]
    fn test_accuracy_no_attempts() {
        assert_eq!(accuracy_percent(0, 0), 0.0);
    }

    #[test]
    fn test_accuracy_all_correct() {
        assert_eq!(accuracy_percent(12, 0), 100.0);
    }
}
