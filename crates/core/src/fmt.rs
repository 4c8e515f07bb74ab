//! Display helpers for Chilean number formatting.

/// Insert `.` every three characters counting from the right.
///
/// Operates on characters, not numeric value, so leading zeros survive:
///
/// ```
/// use hazel_lab_core::fmt::group_thousands;
///
/// assert_eq!(group_thousands("12345678"), "12.345.678");
/// assert_eq!(group_thousands("990"), "990");
/// assert_eq!(group_thousands("0012345"), "0.012.345");
/// ```
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 3);

    for (i, c) in chars.iter().enumerate() {
        let remaining = chars.len() - i;
        if i > 0 && remaining % 3 == 0 {
            out.push('.');
        }
        out.push(*c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_short_inputs() {
        assert_eq!(group_thousands(""), "");
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
    }

    #[test]
    fn test_group_boundaries() {
        assert_eq!(group_thousands("1234"), "1.234");
        assert_eq!(group_thousands("123456"), "123.456");
        assert_eq!(group_thousands("1234567"), "1.234.567");
    }
}
