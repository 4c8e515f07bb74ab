//! RUT commands.
//!
//! # Usage
//!
//! ```bash
//! hl-cli rut check 12.345.678-5
//! hl-cli rut format 123456785
//! hl-cli rut check-digit 12345678
//! ```

use hazel_lab_core::fmt::group_thousands;
use hazel_lab_core::rut;

use super::CliError;

/// Validate a RUT and print its canonical form.
///
/// # Errors
///
/// Returns the validation failure for an invalid RUT.
pub fn check(raw: &str) -> Result<(), CliError> {
    let report = check_report(raw)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{report}");
    }
    Ok(())
}

/// Canonical and compact forms of a valid RUT, as printed by `rut check`.
fn check_report(raw: &str) -> Result<String, CliError> {
    let parsed = rut::validate(raw)?;
    Ok(format!("valid: {parsed} ({})", parsed.compact()))
}

/// Print the canonical form. Unparseable input is echoed unchanged.
pub fn format(raw: &str) {
    #[allow(clippy::print_stdout)]
    {
        println!("{}", rut::format(raw));
    }
}

/// Compute and print the check character for a numeric body.
///
/// # Errors
///
/// Returns an error if the body is empty or not numeric.
pub fn check_digit(body: &str) -> Result<(), CliError> {
    let body = body.trim().replace('.', "");
    let check = rut::compute_check_char(&body)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{check}  ({}-{check})", group_thousands(&body));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_report_shows_both_forms() {
        assert_eq!(
            check_report("12345678-5").unwrap(),
            "valid: 12.345.678-5 (123456785)"
        );
        assert_eq!(
            check_report("12.345.670-k").unwrap(),
            "valid: 12.345.670-K (12345670K)"
        );
    }

    #[test]
    fn test_check_report_rejects_bad_check_digit() {
        assert!(check_report("12.345.678-9").is_err());
    }
}
