/// Errors raised while producing a report.
///
/// Only `InvalidInput`, `NoPlacements`, `Io` and `Document` ever
/// reach the caller of the pipeline. The others are contained inside the
/// stage that produced them and turned into missing data or fallback text.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid {field} '{value}': {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("transport error for {resource}: {reason}")]
    Transport { resource: String, reason: String },

    #[error("unrecognized response shape for {resource}: {reason}")]
    Schema { resource: String, reason: String },

    #[error("interpretation failed: {0}")]
    Interpretation(String),

    #[error("could not render {chart}: {reason}")]
    Render { chart: String, reason: String },

    #[error("no planetary placements were retrieved")]
    NoPlacements,

    #[error("document error: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn invalid(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that stop the pipeline without a document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidInput { .. }
                | ReportError::NoPlacements
                | ReportError::Document(_)
                | ReportError::Io(_)
        )
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contained_errors_are_not_fatal() {
        let transport = ReportError::Transport {
            resource: "planets".into(),
            reason: "connection refused".into(),
        };
        let render = ReportError::Render {
            chart: "Lagna".into(),
            reason: "bad markup".into(),
        };
        assert!(!transport.is_fatal());
        assert!(!render.is_fatal());
        assert!(!ReportError::Interpretation("timeout".into()).is_fatal());
        assert!(ReportError::NoPlacements.is_fatal());
        assert!(ReportError::invalid("birth date", "1998/11/26", "expected YYYY-MM-DD").is_fatal());
    }

    #[test]
    fn invalid_input_message_names_the_field() {
        let err = ReportError::invalid("birth time", "7h55", "expected HH:MM");
        assert_eq!(err.to_string(), "invalid birth time '7h55': expected HH:MM");
    }
}
