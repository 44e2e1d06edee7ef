//! Email addresses of admins and customers.

use email_address::{EmailAddress, Options};

use crate::Error;

/// Check that `raw_email` is a valid email address and return it trimmed and
/// in lower case, the form emails are stored and compared in.
///
/// # Errors
/// Returns [Error::InvalidBody] if `raw_email` is not a valid email address.
pub fn validate_email(raw_email: &str) -> Result<String, Error> {
    let email = raw_email.trim();

    let options = Options::default()
        .with_required_tld()
        .without_display_text()
        .without_domain_literal();

    match EmailAddress::parse_with_options(email, options) {
        Ok(_) => Ok(email.to_lowercase()),
        Err(error) => {
            tracing::debug!("rejected email address: {error}");
            Err(Error::InvalidBody("email: Invalid email address".to_owned()))
        }
    }
}

#[cfg(test)]
mod email_tests {
    use crate::Error;

    use super::validate_email;

    #[test]
    fn valid_email_is_trimmed_and_lowercased() {
        assert_eq!(
            validate_email(" Ada@Bank.test "),
            Ok("ada@bank.test".to_owned())
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in [
            "",
            "not-an-email",
            "a@@b.c",
            "a b@c.d",
            "@bank.test",
            "ada@localhost",
            "Ada <ada@bank.test>",
        ] {
            assert_eq!(
                validate_email(email),
                Err(Error::InvalidBody("email: Invalid email address".to_owned())),
                "{email:?}"
            );
        }
    }
}
