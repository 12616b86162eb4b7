use std::fmt;

/// The kind of failure that aborted a single provider call (spec.md §7
/// `SynthesisFailed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisFailureKind {
    Timeout,
    Network,
    Backend,
    InvalidResponse,
}

impl fmt::Display for SynthesisFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SynthesisFailureKind::Timeout => "timeout",
            SynthesisFailureKind::Network => "network",
            SynthesisFailureKind::Backend => "backend",
            SynthesisFailureKind::InvalidResponse => "invalid_response",
        };
        f.write_str(s)
    }
}

/// The structured error taxonomy this repository commits to (spec.md §7).
///
/// `PromptParseUnmapped` is deliberately absent: the prompt interpreter
/// (`voice::prompt`) never fails, it always returns a default-filled
/// `VoiceSpec` per spec.md §4.1, so there is no variant to construct.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Validation failure of a render plan. Fatal; no result is produced.
    InvalidPlan { reason: String },
    /// Per-transition validation failure. Non-fatal: logged as a warning
    /// and the transition is dropped by the timeline engine.
    InvalidTransition { reason: String },
    /// No provider could be selected for a request.
    NoProviderAvailable,
    /// A single segment's synthesis call failed. Non-fatal in batch/line
    /// context: the caller substitutes a zero-filled buffer.
    SynthesisFailed {
        provider: String,
        kind: SynthesisFailureKind,
    },
    /// Surfaced verbatim from the codec collaborator (container encoding,
    /// resampling).
    CodecError { reason: String },
    /// A render request was cancelled at a provider-call suspension point
    /// (spec.md §5 Cancellation). Distinct from `SynthesisFailed`: this is
    /// neither success nor error, not a network/backend fault.
    Cancelled,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidPlan { reason } => write!(f, "invalid render plan: {reason}"),
            PipelineError::InvalidTransition { reason } => {
                write!(f, "invalid emotion transition: {reason}")
            }
            PipelineError::NoProviderAvailable => {
                write!(f, "no provider available for this request")
            }
            PipelineError::SynthesisFailed { provider, kind } => {
                write!(f, "synthesis failed on provider '{provider}': {kind}")
            }
            PipelineError::CodecError { reason } => write!(f, "codec error: {reason}"),
            PipelineError::Cancelled => write!(f, "render cancelled"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::CodecError {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::InvalidPlan {
            reason: format!("malformed JSON: {e}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
