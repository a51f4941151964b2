pub const PHONE_DIGITS_MAX: usize = 10;
/// Length of a fully formatted number, `(555) 123-4567`.
pub const PHONE_INPUT_MAX_LEN: usize = 14;

/// Formats whatever digits the input holds as `(AAA) BBB-CCCC`, filling in
/// progressively. Extra digits past ten are dropped.
pub fn format_phone_input(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS_MAX)
        .collect();

    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGITS: &str = "5551234567";

    #[test]
    fn formats_every_prefix_length() {
        let expected = [
            "",
            "5",
            "55",
            "555",
            "(555) 1",
            "(555) 12",
            "(555) 123",
            "(555) 123-4",
            "(555) 123-45",
            "(555) 123-456",
            "(555) 123-4567",
        ];

        for (len, want) in expected.iter().enumerate() {
            assert_eq!(format_phone_input(&DIGITS[..len]), *want, "{len} digits");
        }
    }

    #[test]
    fn formatting_is_idempotent() {
        for len in 0..=DIGITS.len() {
            let once = format_phone_input(&DIGITS[..len]);
            assert_eq!(format_phone_input(&once), once);
            assert!(once.len() <= PHONE_INPUT_MAX_LEN);
        }
    }

    #[test]
    fn strips_noise_and_truncates_extra_digits() {
        assert_eq!(format_phone_input("+1 (555) 123-4567"), "(155) 512-3456");
        assert_eq!(format_phone_input("555.123.4567 ext 89"), "(555) 123-4567");
        assert_eq!(format_phone_input("abc"), "");
    }
}
