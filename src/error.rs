//! Error taxonomy and user-facing run outcomes.

use thiserror::Error;

/// Everything that can terminate an import or export run.
///
/// All variants are recovered at the file-operation boundary and turned
/// into an [`Outcome`] with a human-readable message; the host process is
/// never crashed by bad input.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed JSON text or a frame element with the wrong shape.
    #[error("invalid animation JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Structurally valid JSON without a `frames` array.
    #[error("invalid animation JSON: missing 'frames' array")]
    MissingFrames,

    /// A `frames` array with nothing in it.
    #[error("no frames found in animation data")]
    EmptyFrames,

    /// Import could not resolve or create a camera to write to.
    #[error("failed to get or create a target camera")]
    TargetUnavailable,

    /// Export found no active or selected camera to read from.
    #[error("no camera found to export")]
    SourceUnavailable,

    /// Export source carries no keyframe track.
    #[error("camera has no animation data")]
    NoAnimation,

    /// A configuration field was outside its documented range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a user-invoked import or export command.
///
/// Mirrors an editor operator's exit status: a tri-state plus a status
/// message, not a process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Completed; the message summarizes what was done.
    Finished(String),
    /// Aborted before producing anything useful (bad input, no usable
    /// camera, out-of-range configuration).
    Cancelled(String),
    /// Failed on I/O or serialization partway through.
    Failed(String),
}

impl Outcome {
    /// The status message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Finished(msg) | Outcome::Cancelled(msg) | Outcome::Failed(msg) => msg,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Outcome::Finished(_))
    }

    /// Fold a pipeline result into the tri-state, routing each error class
    /// to the right variant.
    pub(crate) fn from_result<T>(
        result: Result<T, PipelineError>,
        finished: impl FnOnce(T) -> String,
    ) -> Outcome {
        match result {
            Ok(value) => Outcome::Finished(finished(value)),
            Err(err @ PipelineError::Io(_)) => Outcome::Failed(err.to_string()),
            Err(err) => Outcome::Cancelled(err.to_string()),
        }
    }
}
