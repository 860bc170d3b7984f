use hims_core::{DomainError, DomainResult};

/// Reject blank or whitespace-only input; returns the trimmed value.
pub(crate) fn non_blank(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Minimal shape check; deliverability is the mail provider's problem.
pub(crate) fn email(value: &str) -> DomainResult<String> {
    let trimmed = non_blank("email", value)?;
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(trimmed),
        _ => Err(DomainError::validation("email address is malformed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_rejects_whitespace() {
        assert_eq!(non_blank("name", "  Ada  ").unwrap(), "Ada");
        assert!(non_blank("name", "   ").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("warden@hostel.test").is_ok());
        assert!(email("warden@localhost").is_err());
        assert!(email("nope").is_err());
        assert!(email("@hostel.test").is_err());
    }
}
