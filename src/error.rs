use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a tutorial run.
///
/// A wrong answer is not an error; it is the `false` verdict returned by
/// [`crate::Action::execute`].
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("invalid configuration for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    #[error("unsupported action kind '{0}'")]
    TypeConstraint(String),

    #[error("action was never registered with a tutorial master")]
    MasterNotBound,

    #[error("'{}' resolves outside the scratch directory {}", path.display(), root.display())]
    SandboxEscape { path: PathBuf, root: PathBuf },

    #[error("command `{command}` failed: {reason}")]
    Execution { command: String, reason: String },

    #[error("input closed before the tutorial finished")]
    InputClosed,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TutorError {
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TutorError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TutorError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TutorError>;
