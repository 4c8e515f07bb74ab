//! Chilean national identifier (RUT).
//!
//! A RUT is a numeric body followed by a check character computed with the
//! modulus-11 algorithm. The canonical display form groups the body in
//! thousands and appends the check character after a dash: `12.345.678-5`.
//!
//! The free functions in this module are the single source of truth for
//! every form that handles a RUT:
//!
//! - [`normalize`] strips formatting and splits body from check character
//! - [`compute_check_char`] runs the modulus-11 checksum over a body
//! - [`is_valid`] answers yes/no, never errors
//! - [`format`] canonicalizes and is a no-op on unparseable input
//!
//! [`Rut`] wraps a validated identifier for use in typed records.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::fmt::group_thousands;

/// Minimum length of a normalized RUT (body plus check character).
pub const MIN_NORMALIZED_LENGTH: usize = 8;

/// Maximum length of a normalized RUT (8-digit body plus check character).
pub const MAX_NORMALIZED_LENGTH: usize = 9;

/// Errors that can occur when validating a [`Rut`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    /// The input string is empty or only whitespace.
    #[error("RUT cannot be empty")]
    Empty,
    /// Fewer significant characters than a RUT can have.
    #[error("RUT must have at least {min} digits including the check character")]
    TooShort {
        /// Minimum normalized length.
        min: usize,
    },
    /// More significant characters than a RUT can have.
    #[error("RUT must have at most {max} digits including the check character")]
    TooLong {
        /// Maximum normalized length.
        max: usize,
    },
    /// The body contains something other than decimal digits.
    #[error("RUT body must contain only digits")]
    InvalidBody,
    /// The check character does not match the checksum of the body.
    #[error("RUT check character should be {expected}, found {found}")]
    CheckDigitMismatch {
        /// Check character computed from the body.
        expected: char,
        /// Check character present in the input.
        found: char,
    },
}

/// A RUT reduced to its significant characters.
///
/// The body keeps every character that survived normalization, including
/// leading zeros; only the check character is uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedRut {
    body: String,
    check: char,
}

impl NormalizedRut {
    /// The body (everything before the check character).
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The uppercased check character.
    #[must_use]
    pub const fn check(&self) -> char {
        self.check
    }

    /// Body and check character without separators, e.g. `123456785`.
    #[must_use]
    pub fn compact(&self) -> String {
        format!("{}{}", self.body, self.check)
    }

    fn len(&self) -> usize {
        self.body.chars().count() + 1
    }
}

impl fmt::Display for NormalizedRut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", group_thousands(&self.body), self.check)
    }
}

/// Strip everything except digits and `K`/`k`, then split off the check character.
///
/// Returns `None` when fewer than two significant characters remain.
///
/// ```
/// use hazel_lab_core::rut::normalize;
///
/// let rut = normalize("12.345.678-k").unwrap();
/// assert_eq!(rut.body(), "12345678");
/// assert_eq!(rut.check(), 'K');
/// assert!(normalize("-").is_none());
/// ```
#[must_use]
pub fn normalize(raw: &str) -> Option<NormalizedRut> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'k' | 'K'))
        .collect();

    let mut chars = cleaned.chars();
    let check = chars.next_back()?.to_ascii_uppercase();
    let body = chars.as_str();
    if body.is_empty() {
        return None;
    }

    Some(NormalizedRut {
        body: body.to_owned(),
        check,
    })
}

/// Compute the modulus-11 check character for a numeric body.
///
/// Digits are weighted from least to most significant with the cycle
/// `2, 3, 4, 5, 6, 7, 2, ...`. With `r = 11 - (sum mod 11)`, `11` maps to
/// `'0'`, `10` maps to `'K'`, anything else to its decimal digit.
///
/// # Errors
///
/// Returns [`RutError::Empty`] for an empty body and [`RutError::InvalidBody`]
/// if any character is not a decimal digit.
///
/// ```
/// use hazel_lab_core::rut::compute_check_char;
///
/// assert_eq!(compute_check_char("12345678"), Ok('5'));
/// assert_eq!(compute_check_char("12345670"), Ok('K'));
/// ```
pub fn compute_check_char(body: &str) -> Result<char, RutError> {
    if body.is_empty() {
        return Err(RutError::Empty);
    }

    let mut sum = 0_u32;
    let mut weight = 2_u32;
    for c in body.chars().rev() {
        let digit = c.to_digit(10).ok_or(RutError::InvalidBody)?;
        // Reduce as we go so arbitrarily long bodies cannot overflow.
        sum = (sum + digit * weight) % 11;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }

    let check = match 11 - sum {
        11 => '0',
        10 => 'K',
        n => char::from_digit(n, 10).ok_or(RutError::InvalidBody)?,
    };
    Ok(check)
}

/// Validate a RUT and return its normalized parts.
///
/// # Errors
///
/// Returns a [`RutError`] describing the first problem found.
pub fn validate(raw: &str) -> Result<NormalizedRut, RutError> {
    if raw.trim().is_empty() {
        return Err(RutError::Empty);
    }

    let rut = normalize(raw).ok_or(RutError::TooShort {
        min: MIN_NORMALIZED_LENGTH,
    })?;

    let len = rut.len();
    if len < MIN_NORMALIZED_LENGTH {
        return Err(RutError::TooShort {
            min: MIN_NORMALIZED_LENGTH,
        });
    }
    if len > MAX_NORMALIZED_LENGTH {
        return Err(RutError::TooLong {
            max: MAX_NORMALIZED_LENGTH,
        });
    }

    let expected = compute_check_char(&rut.body)?;
    if expected != rut.check {
        return Err(RutError::CheckDigitMismatch {
            expected,
            found: rut.check,
        });
    }

    Ok(rut)
}

/// Whether the input is a valid RUT.
///
/// Accepts `&str` or `Option<&str>`; absent input is invalid.
///
/// ```
/// use hazel_lab_core::rut::is_valid;
///
/// assert!(is_valid("12.345.678-5"));
/// assert!(is_valid("123456785"));
/// assert!(!is_valid("12.345.678-9"));
/// assert!(!is_valid(None));
/// ```
#[must_use]
pub fn is_valid<'a>(rut: impl Into<Option<&'a str>>) -> bool {
    rut.into().is_some_and(|raw| validate(raw).is_ok())
}

/// Canonicalize a RUT for display, e.g. `123456785` becomes `12.345.678-5`.
///
/// Formatting does not validate. Input with fewer than two significant
/// characters is returned unchanged so partially typed values are not mangled.
#[must_use]
pub fn format(raw: &str) -> String {
    normalize(raw).map_or_else(|| raw.to_owned(), |rut| rut.to_string())
}

/// A validated RUT.
///
/// Serializes as its canonical form (`12.345.678-5`). Deserialization accepts
/// any formatting and rejects identifiers whose check character is wrong.
///
/// ```
/// use hazel_lab_core::Rut;
///
/// let rut = Rut::parse("76543210-3").unwrap();
/// assert_eq!(rut.as_str(), "76.543.210-3");
/// assert!(Rut::parse("76543210-4").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
    canonical: String,
    parts: NormalizedRut,
}

impl Rut {
    /// Parse and validate a `Rut`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has the wrong length, has a
    /// non-numeric body, or its check character does not match.
    pub fn parse(s: &str) -> Result<Self, RutError> {
        let parts = validate(s)?;
        Ok(Self {
            canonical: parts.to_string(),
            parts,
        })
    }

    /// Returns the canonical form as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Returns the numeric body without separators.
    #[must_use]
    pub fn body(&self) -> &str {
        self.parts.body()
    }

    /// Returns the check character (`0`-`9` or `K`).
    #[must_use]
    pub const fn check_char(&self) -> char {
        self.parts.check()
    }

    /// Consumes the `Rut` and returns its canonical string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.canonical
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl std::str::FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rut {
    type Error = RutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.canonical
    }
}

impl AsRef<str> for Rut {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_check_chars() {
        assert_eq!(compute_check_char("12345678"), Ok('5'));
        assert_eq!(compute_check_char("76543210"), Ok('3'));
        assert_eq!(compute_check_char("11111111"), Ok('1'));
        assert_eq!(compute_check_char("12345670"), Ok('K'));
        assert_eq!(compute_check_char("10000004"), Ok('0'));
        assert_eq!(compute_check_char("19011022"), Ok('2'));
    }

    #[test]
    fn test_leading_zeros_do_not_change_checksum() {
        assert_eq!(
            compute_check_char("0012345678"),
            compute_check_char("12345678")
        );
    }

    #[test]
    fn test_compute_rejects_bad_bodies() {
        assert_eq!(compute_check_char(""), Err(RutError::Empty));
        assert_eq!(compute_check_char("12a45"), Err(RutError::InvalidBody));
        assert_eq!(compute_check_char("1234K678"), Err(RutError::InvalidBody));
    }

    #[test]
    fn test_normalize_strips_formatting() {
        let rut = normalize(" 12.345.678-5 ").unwrap();
        assert_eq!(rut.body(), "12345678");
        assert_eq!(rut.check(), '5');
        assert_eq!(rut.compact(), "123456785");
    }

    #[test]
    fn test_normalize_uppercases_check_char() {
        let rut = normalize("12345670k").unwrap();
        assert_eq!(rut.check(), 'K');
    }

    #[test]
    fn test_normalize_too_short() {
        assert!(normalize("").is_none());
        assert!(normalize("5").is_none());
        assert!(normalize("..-5").is_none());
        assert!(normalize("15").is_some());
    }

    #[test]
    fn test_is_valid_known_vectors() {
        assert!(is_valid("12345678-5"));
        assert!(is_valid("12.345.678-5"));
        assert!(is_valid("76.543.210-3"));
        assert!(is_valid("11111111-1"));
        assert!(is_valid("12.345.670-k"));
        assert!(is_valid("12.345.670-K"));
        assert!(is_valid("10.000.004-0"));
    }

    #[test]
    fn test_is_valid_rejects_mismatch() {
        assert!(!is_valid("12345678-9"));
        assert!(!is_valid("76543210-K"));
        assert!(!is_valid("11111111-2"));
    }

    #[test]
    fn test_is_valid_rejects_empty_and_absent() {
        assert!(!is_valid(""));
        assert!(!is_valid("   "));
        assert!(!is_valid(None));
        assert!(!is_valid("abc"));
    }

    #[test]
    fn test_is_valid_length_bounds() {
        // 7-digit body is the shortest accepted
        assert!(is_valid("7654321-6"));
        // 6-digit body: normalized length 7 is too short even with a correct check char
        let check = compute_check_char("512666").unwrap();
        assert!(!is_valid(format!("512666-{check}").as_str()));
        // 9-digit body is too long
        let check = compute_check_char("123456789").unwrap();
        assert!(!is_valid(format!("123456789-{check}").as_str()));
    }

    #[test]
    fn test_validate_reports_reason() {
        assert_eq!(validate(""), Err(RutError::Empty));
        assert_eq!(validate("1-9"), Err(RutError::TooShort { min: 8 }));
        assert_eq!(
            validate("12345678-9"),
            Err(RutError::CheckDigitMismatch {
                expected: '5',
                found: '9'
            })
        );
        assert_eq!(validate("1234K678-5"), Err(RutError::InvalidBody));
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format("123456785"), "12.345.678-5");
        assert_eq!(format("12345678-5"), "12.345.678-5");
        assert_eq!(format("7654321-6"), "7.654.321-6");
        assert_eq!(format("12345670k"), "12.345.670-K");
    }

    #[test]
    fn test_format_short_body_has_no_dots() {
        assert_eq!(format("15"), "1-5");
        assert_eq!(format("1234"), "123-4");
    }

    #[test]
    fn test_format_preserves_leading_zeros() {
        assert_eq!(format("012345678"), "01.234.567-8");
    }

    #[test]
    fn test_format_is_noop_on_unparseable_input() {
        assert_eq!(format(""), "");
        assert_eq!(format("1"), "1");
        assert_eq!(format("abc"), "abc");
        assert_eq!(format("1."), "1.");
    }

    #[test]
    fn test_format_does_not_validate() {
        assert_eq!(format("12345678-9"), "12.345.678-9");
    }

    #[test]
    fn test_rut_parse_canonicalizes() {
        let rut = Rut::parse("123456785").unwrap();
        assert_eq!(rut.as_str(), "12.345.678-5");
        assert_eq!(rut.body(), "12345678");
        assert_eq!(rut.check_char(), '5');
        assert_eq!(rut.to_string(), "12.345.678-5");
    }

    #[test]
    fn test_rut_serde_roundtrip() {
        let rut = Rut::parse("76543210-3").unwrap();
        let json = serde_json::to_string(&rut).unwrap();
        assert_eq!(json, "\"76.543.210-3\"");

        let parsed: Rut = serde_json::from_str("\"765432103\"").unwrap();
        assert_eq!(parsed, rut);
    }

    #[test]
    fn test_rut_deserialize_rejects_invalid() {
        let result: Result<Rut, _> = serde_json::from_str("\"76543210-4\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_rut_from_str() {
        let rut: Rut = "11.111.111-1".parse().unwrap();
        assert_eq!(rut.as_ref(), "11.111.111-1");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// A valid RUT body (7 or 8 digits, first digit non-zero) with its check char.
    fn valid_rut() -> impl Strategy<Value = (String, char)> {
        "[1-9][0-9]{6,7}".prop_map(|body| {
            let check = compute_check_char(&body).unwrap();
            (body, check)
        })
    }

    /// Decorate a compact RUT with the kinds of noise users type.
    fn decorate(body: &str, check: char, style: u8) -> String {
        match style % 4 {
            0 => format!("{body}{check}"),
            1 => format!("{body}-{check}"),
            2 => format!("{}-{}", group_thousands(body), check.to_ascii_lowercase()),
            _ => format!("  {} - {}  ", group_thousands(body), check),
        }
    }

    proptest! {
        /// Every 8-digit body yields exactly one of 0-9 or K, deterministically.
        #[test]
        fn check_char_is_deterministic_and_in_range(body in "[0-9]{8}") {
            let a = compute_check_char(&body).unwrap();
            let b = compute_check_char(&body).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.is_ascii_digit() || a == 'K');
        }

        /// Any valid RUT is accepted regardless of formatting noise.
        #[test]
        fn valid_ruts_are_accepted((body, check) in valid_rut(), style in any::<u8>()) {
            let raw = decorate(&body, check, style);
            prop_assert!(is_valid(raw.as_str()), "rejected {raw}");
        }

        /// Formatting preserves validity.
        #[test]
        fn format_preserves_validity((body, check) in valid_rut(), style in any::<u8>()) {
            let raw = decorate(&body, check, style);
            prop_assert!(is_valid(format(&raw).as_str()));
        }

        /// Formatting is idempotent for parseable input.
        #[test]
        fn format_is_idempotent(raw in "[0-9kK. -]{2,16}") {
            prop_assume!(normalize(&raw).is_some());
            let once = format(&raw);
            prop_assert_eq!(format(&once), once);
        }

        /// Changing only the check character makes the RUT invalid.
        #[test]
        fn wrong_check_char_is_rejected((body, check) in valid_rut(), wrong in "[0-9K]") {
            let wrong = wrong.chars().next().unwrap();
            prop_assume!(wrong != check);
            let raw = format!("{body}-{wrong}");
            prop_assert!(!is_valid(raw.as_str()));
        }
    }
}
