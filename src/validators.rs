//! Input validation for customer-entered fields
//!
//! Every validator returns the cleaned value on success and a user-facing
//! message on failure, so forms can store the message next to the field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of children the registration form accepts
pub const MAX_CHILDREN: u8 = 4;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Strips control characters and trims, keeping at most `max_chars`
/// characters.
///
/// # Examples
///
/// ```
/// use storefront::validators::sanitize_text;
///
/// assert_eq!(sanitize_text("  Sami\u{0}  ", 64), "Sami");
/// assert_eq!(sanitize_text("abcdef", 3), "abc");
/// ```
pub fn sanitize_text(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .take(max_chars)
        .collect()
}

/// Rejects blank input.
///
/// # Errors
///
/// Returns `Err(message)` if `input` is empty after trimming.
pub fn validate_required(input: &str, message: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(message.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validates a customer's full name.
///
/// # Errors
///
/// Returns `Err` if the name is blank.
pub fn validate_full_name(input: &str) -> Result<String, String> {
    let name = validate_required(input, "Full name is required")?;
    Ok(sanitize_text(&name, 128))
}

/// Validates a phone number: exactly 8 digits.
///
/// # Errors
///
/// Returns `Err` if the number is blank or is not exactly 8 ASCII digits.
pub fn validate_phone(input: &str) -> Result<String, String> {
    let phone = validate_required(input, "Phone number is required")?;
    if phone.len() == 8 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(phone)
    } else {
        Err("Phone number must contain exactly 8 digits".to_string())
    }
}

/// Validates an email address.
///
/// Accepts `local@domain.tld` where no part contains whitespace or `@` and
/// the domain has a dot with text on both sides.
///
/// # Errors
///
/// Returns `Err` if the address is blank or malformed.
pub fn validate_email(input: &str) -> Result<String, String> {
    if input.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    let email = input;
    let invalid = || Err("Invalid email format".to_string());

    if email.chars().any(char::is_whitespace) {
        return invalid();
    }
    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty() || domain.contains('@') {
        return invalid();
    }
    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return invalid();
    }
    Ok(email.to_string())
}

/// Validates a password's length.
///
/// # Errors
///
/// Returns `Err` if the password is empty or shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(input: &str) -> Result<String, String> {
    if input.is_empty() {
        return Err("Password is required".to_string());
    }
    if input.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(input.to_string())
}

/// Parses a `YYYY-MM-DD` birth date.
///
/// # Errors
///
/// Returns `Err` if the date is blank or not a calendar date.
pub fn validate_birth_date(input: &str) -> Result<NaiveDate, String> {
    let raw = validate_required(input, "Birth date is required")?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| "Invalid birth date".to_string())
}

/// Form of address chosen at registration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Civility {
    #[strum(serialize = "Mr")]
    Mr,
    #[strum(serialize = "Mrs")]
    Mrs,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
}

impl MaritalStatus {
    /// Married and divorced customers declare their children
    pub fn declares_children(self) -> bool {
        !matches!(self, MaritalStatus::Single)
    }
}

/// Validates the declared number of children.
///
/// # Errors
///
/// Returns `Err` if the count is blank, not a number, or above
/// [`MAX_CHILDREN`].
pub fn validate_children_count(input: &str) -> Result<u8, String> {
    let raw = validate_required(input, "Number of children is required")?;
    match raw.parse::<u8>() {
        Ok(n) if n <= MAX_CHILDREN => Ok(n),
        _ => Err(format!(
            "Number of children must be between 0 and {MAX_CHILDREN}"
        )),
    }
}

/// Validates the name of child `index` (1-based).
///
/// # Errors
///
/// Returns `Err` if the name is blank.
pub fn validate_child_name(index: usize, input: &str) -> Result<String, String> {
    validate_required(input, &format!("Name of child {index} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_removes_control_chars() {
        assert_eq!(sanitize_text("a\nb\tc", 64), "abc");
        assert_eq!(sanitize_text("   ", 64), "");
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("  x ", "needed"), Ok("x".to_string()));
        assert_eq!(validate_required(" ", "needed"), Err("needed".to_string()));
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("").is_err());
        assert_eq!(validate_full_name(" Amira Trabelsi "), Ok("Amira Trabelsi".into()));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(" 21234567 "), Ok("21234567".into()));
        assert_eq!(validate_phone(""), Err("Phone number is required".into()));
        assert!(validate_phone("2123456").is_err());
        assert!(validate_phone("212345678").is_err());
        assert!(validate_phone("2123456a").is_err());
        assert!(validate_phone("２１２３４５６７").is_err());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@shop.example.tn").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert_eq!(validate_email(""), Err("Email is required".into()));
        for bad in ["plain", "@b.co", "a@b", "a@.co", "a@b.", "a b@c.de", "a@b@c.de"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("").is_err());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("éééééé").is_ok());
    }

    #[test]
    fn test_validate_birth_date() {
        assert_eq!(
            validate_birth_date("1990-02-28"),
            Ok(NaiveDate::from_ymd_opt(1990, 2, 28).unwrap())
        );
        assert_eq!(validate_birth_date(""), Err("Birth date is required".into()));
        assert_eq!(validate_birth_date("1990-02-30"), Err("Invalid birth date".into()));
    }

    #[test]
    fn test_marital_status_parse() {
        assert_eq!("married".parse::<MaritalStatus>(), Ok(MaritalStatus::Married));
        assert!(!MaritalStatus::Single.declares_children());
        assert!(MaritalStatus::Divorced.declares_children());
        assert_eq!(Civility::Mrs.to_string(), "Mrs");
    }

    #[test]
    fn test_validate_children_count() {
        assert_eq!(validate_children_count("0"), Ok(0));
        assert_eq!(validate_children_count("4"), Ok(4));
        assert!(validate_children_count("5").is_err());
        assert!(validate_children_count("").is_err());
        assert!(validate_children_count("-1").is_err());
    }

    #[test]
    fn test_validate_child_name() {
        assert_eq!(
            validate_child_name(2, ""),
            Err("Name of child 2 is required".into())
        );
    }
}
