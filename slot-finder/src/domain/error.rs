//! Domain error types.
//!
//! These errors are raised when a caller hands the domain layer a value
//! outside its vocabulary. They are distinct from transport errors.

/// Domain-level usage errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Ranking was requested with a criterion other than `date` or `distance`
    #[error("unsupported sort criterion: {0}")]
    UnsupportedSortCriterion(String),

    /// Search mode is neither `standard` nor `chronodose`
    #[error("unsupported search mode: {0}")]
    UnsupportedSearchMode(String),

    /// Area type is neither `municipality` nor `department`
    #[error("unsupported area kind: {0}")]
    UnsupportedAreaKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::UnsupportedSortCriterion("rating".into());
        assert_eq!(err.to_string(), "unsupported sort criterion: rating");

        let err = DomainError::UnsupportedSearchMode("express".into());
        assert_eq!(err.to_string(), "unsupported search mode: express");

        let err = DomainError::UnsupportedAreaKind("region".into());
        assert_eq!(err.to_string(), "unsupported area kind: region");
    }
}
