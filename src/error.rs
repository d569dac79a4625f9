//! Error types for loading rules data.
//!
//! Resolving a combat exchange never fails: malformed rules degrade to
//! "does not apply". `RulesError` is only produced by the loader-facing
//! helpers (registry and rules documents, dice expressions).

use thiserror::Error;

/// Errors that can occur while loading rules data.
///
/// # Examples
///
/// ```rust
/// use hitroll::RulesError;
///
/// let err = RulesError::InvalidDice("D".to_string());
/// assert_eq!(err.to_string(), "Invalid dice expression: D");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RulesError {
    /// A JSON document could not be parsed into the expected shape.
    #[error("Malformed {document} document: {message}")]
    Malformed {
        document: &'static str,
        message: String,
    },

    /// A dice expression such as `2D6+1` could not be parsed.
    #[error("Invalid dice expression: {0}")]
    InvalidDice(String),

    /// A roll rules table is internally inconsistent.
    ///
    /// Contains the offending setting and a description of the problem.
    #[error("Invalid roll rules ({0}): {1}")]
    InvalidRules(&'static str, String),
}

impl RulesError {
    pub(crate) fn malformed(document: &'static str, err: serde_json::Error) -> Self {
        RulesError::Malformed {
            document,
            message: err.to_string(),
        }
    }
}
