use std::sync::OnceLock;

use regex::Regex;

use super::ApiError;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Permissive shape check: local@domain.tld
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !email_regex().is_match(trimmed) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<&str, ApiError> {
    if password.len() < min_length {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }
    Ok(password)
}

/// Rejects empty or whitespace-only values for a required field.
pub fn validate_required(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn validate_status(status: &str, allowed: &[&str]) -> Result<String, ApiError> {
    if allowed.contains(&status) {
        Ok(status.to_string())
    } else {
        Err(ApiError::validation(format!(
            "Invalid status: {}. Must be one of: {}",
            status,
            allowed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert_eq!(
            validate_email("  alice@example.com  ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two words@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123!", 8).is_ok());
        assert!(validate_password("short", 8).is_err());
        assert!(validate_password("exactly8", 8).is_ok());
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("  Title  ", "Title").unwrap(), "Title");
        assert!(validate_required("", "Title").is_err());
        assert!(validate_required("   ", "Title").is_err());
    }

    #[test]
    fn test_validate_status() {
        let allowed = ["open", "closed"];
        assert!(validate_status("open", &allowed).is_ok());
        assert!(validate_status("bogus", &allowed).is_err());
    }
}
