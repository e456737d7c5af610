use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Rejects the empty string. Whitespace is not trimmed.
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("This field cannot be empty."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_rejected() {
        let err = validate_not_empty("").unwrap_err();
        assert_eq!(err.to_string(), "This field cannot be empty.");
    }

    #[test]
    fn any_other_text_passes() {
        assert!(validate_not_empty("text").is_ok());
        assert!(validate_not_empty("   ").is_ok());
        assert!(validate_not_empty("\n").is_ok());
    }
}
