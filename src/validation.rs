//! Field rules for the account forms, one pure function per field kind.

use email_address::{EmailAddress, Options};

/// Identifier of a form field, mapping to its validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FirstName,
    LastName,
    Email,
    Username,
    Password,
    Confirm,
    Organization,
}

/// A failed rule, carrying the message displayed under the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError(pub String);

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate `value` against the rule for `kind`. The current password value
/// is consulted only for `FieldKind::Confirm`.
pub fn validate(kind: FieldKind, value: &str, password: &str) -> Result<(), FieldError> {
    match kind {
        FieldKind::FirstName | FieldKind::LastName => validate_name(value),
        FieldKind::Email => validate_email(value),
        FieldKind::Username => validate_username(value),
        FieldKind::Password => validate_password(value),
        FieldKind::Confirm => validate_confirm(value, password),
        FieldKind::Organization => validate_organization(value),
    }
}

fn validate_name(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError("This field is required".to_string()));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FieldError(
            "Only letters and numbers are allowed".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), FieldError> {
    let length = value.chars().count();
    if length < 5 || length > 30 {
        return Err(FieldError(
            "Email must be between 5 and 30 characters".to_string(),
        ));
    }
    if EmailAddress::parse_with_options(value, Options::default().with_required_tld()).is_err() {
        return Err(FieldError("Email must be a valid address".to_string()));
    }
    Ok(())
}

fn validate_username(value: &str) -> Result<(), FieldError> {
    let length = value.chars().count();
    if length < 3 || length > 15 {
        return Err(FieldError(
            "Username must be between 3 and 15 characters".to_string(),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FieldError(
            "Only letters and numbers are allowed".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(value: &str) -> Result<(), FieldError> {
    let mut issues = Vec::new();
    let length = value.chars().count();

    if length < 8 {
        issues.push("at least 8 characters");
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push("1 lowercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("1 uppercase letter");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        issues.push("1 number");
    }
    // Underscore counts as a word character, not as a special one.
    if !value.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_') {
        issues.push("1 special character");
    }

    if !issues.is_empty() {
        return Err(FieldError(format!(
            "Password must contain: {}",
            issues.join(", ")
        )));
    }
    if length > 35 {
        return Err(FieldError(
            "Password must be at most 35 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_confirm(value: &str, password: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError("This field is required".to_string()));
    }
    if value != password {
        return Err(FieldError("Passwords do not match".to_string()));
    }
    Ok(())
}

fn validate_organization(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError("An organization is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(kind: FieldKind, value: &str) -> bool {
        validate(kind, value, "").is_ok()
    }

    #[test]
    fn username_rules() {
        assert!(check(FieldKind::Username, "abc"));
        assert!(check(FieldKind::Username, "abc123"));
        assert!(check(FieldKind::Username, "ABCdef789012345"));

        // Too short, too long.
        assert!(!check(FieldKind::Username, ""));
        assert!(!check(FieldKind::Username, "ab"));
        assert!(!check(FieldKind::Username, "abcdef7890123456"));
        // Non-alphanumeric.
        assert!(!check(FieldKind::Username, "abc_def"));
        assert!(!check(FieldKind::Username, "abc def"));
        assert!(!check(FieldKind::Username, "abc-def"));
    }

    #[test]
    fn name_rules() {
        assert!(check(FieldKind::FirstName, "Ada"));
        assert!(check(FieldKind::LastName, "X"));
        assert!(!check(FieldKind::FirstName, ""));
        assert!(!check(FieldKind::LastName, "O'Brien"));
        assert!(!check(FieldKind::LastName, "two words"));
    }

    #[test]
    fn email_rules() {
        assert!(check(FieldKind::Email, "ada@example.com"));
        assert!(!check(FieldKind::Email, "a@b"));
        assert!(!check(FieldKind::Email, "not-an-email"));
        assert!(!check(FieldKind::Email, "missing@tld"));
        // Length window is 5 to 30.
        assert!(!check(
            FieldKind::Email,
            "a-very-long-address@example.com"
        ));
    }

    #[test]
    fn password_rules() {
        assert!(check(FieldKind::Password, "Abcdef1!"));
        assert!(check(FieldKind::Password, "s0meLong&Password"));

        // Missing classes fail regardless of length.
        assert!(!check(FieldKind::Password, "abcdefg1"));
        assert!(!check(FieldKind::Password, "ABCDEFG1!"));
        assert!(!check(FieldKind::Password, "Abcdefgh!"));
        assert!(!check(FieldKind::Password, "Abcdefg1"));
        // Underscore is not a special character.
        assert!(!check(FieldKind::Password, "Abcdef1_"));
        // Length bounds: 8 to 35.
        assert!(!check(FieldKind::Password, "Abcde1!"));
        assert!(check(
            FieldKind::Password,
            "Abcdefghijklmnopqrstuvwxyz0123456!!" // 35 characters
        ));
        assert!(!check(
            FieldKind::Password,
            "Abcdefghijklmnopqrstuvwxyz01234567!!" // 36 characters
        ));
    }

    #[test]
    fn password_error_message_lists_issues() {
        let err = validate(FieldKind::Password, "abc", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must contain: at least 8 characters, 1 uppercase letter, 1 number, 1 special character"
        );
    }

    #[test]
    fn confirm_rules() {
        assert!(validate(FieldKind::Confirm, "Abcdef1!", "Abcdef1!").is_ok());
        // Case-sensitive, no trimming.
        assert!(validate(FieldKind::Confirm, "abcdef1!", "Abcdef1!").is_err());
        assert!(validate(FieldKind::Confirm, "Abcdef1! ", "Abcdef1!").is_err());
        assert!(validate(FieldKind::Confirm, "", "").is_err());
    }

    #[test]
    fn organization_rules() {
        assert!(check(FieldKind::Organization, "Acme"));
        assert!(!check(FieldKind::Organization, ""));
    }
}
