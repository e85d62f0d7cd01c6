//! Unified compiler error type used across all phases.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Tag,
    Extract,
    Sanitize,
    Convert,
    Resolve,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Tag => write!(f, "Tag"),
            Phase::Extract => write!(f, "Extract"),
            Phase::Sanitize => write!(f, "Sanitize"),
            Phase::Convert => write!(f, "Convert"),
            Phase::Resolve => write!(f, "Resolve"),
        }
    }
}

/// Interpretation of free prose never fails; the only errors this crate
/// produces are configuration/programmer errors surfaced at the resolver
/// boundary (an unrecognized step type, a forced vessel that points at
/// nothing).
#[derive(Debug, Clone)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    /// Index of the offending step, when the error concerns one.
    pub step_index: Option<usize>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.step_index {
            Some(i) => write!(
                f,
                "[{}:{}] {} (step {})",
                self.phase, self.code, self.message, i
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    pub fn resolve(code: &str, message: impl Into<String>, step_index: Option<usize>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Resolve,
            message: message.into(),
            step_index,
        }
    }
}

/// Errors internal to vessel resolution. Procedure content never raises
/// here — resolution always finds some assignment. These cover the
/// closed-table contract only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("step type '{0}' has no vessel-chain template")]
    UnknownStepType(String),
    #[error("forced vessel references step index {0}, but only {1} steps were given")]
    ForcedVesselOutOfRange(usize, usize),
}

impl From<ResolveError> for CompilerError {
    fn from(e: ResolveError) -> Self {
        let step_index = match &e {
            ResolveError::ForcedVesselOutOfRange(i, _) => Some(*i),
            ResolveError::UnknownStepType(_) => None,
        };
        CompilerError::resolve("R001", e.to_string(), step_index)
    }
}
