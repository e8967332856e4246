use uuid::Uuid;

use crate::error::{CivicError, Result};

/// Trimmed copy of `value`, or a validation error naming `field`.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CivicError::ValidationError(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Fresh entity id with a short kind prefix, e.g. `c3f2...` for complaints.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(required("text", "   \n\t"), Err(CivicError::ValidationError(_))));
        assert_eq!(required("text", "  hello ").unwrap(), "hello");
    }

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_id("cmt");
        let b = new_id("cmt");
        assert!(a.starts_with("cmt"));
        assert_ne!(a, b);
    }
}
