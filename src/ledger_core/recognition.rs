//! Recognition state tracking
//!
//! Each external contract and primitive carries a one-way flag: custody must
//! be established (wrap, compute, or register) before it may be released
//! (unwrap). The flag never transitions back once set. A release attempt
//! while still unrecognized leaves the flag alone and surfaces as an outcome
//! for the caller to turn into a warning; the fold is never blocked.

/// Event direction driving a recognition transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionTrigger {
    /// Custody-establishing wrap; recognizes external contracts.
    Wrap,
    /// Custody-releasing unwrap; checks but never recognizes.
    Unwrap,
    /// Compute interaction; recognizes primitives unconditionally.
    Compute,
    /// Token registration; recognizes primitives unconditionally.
    Register,
}

/// Result of advancing the flag for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// No transition (already recognized, or a no-op trigger).
    Unchanged,
    /// The flag flipped unrecognized -> recognized.
    Recognized,
    /// A release arrived while still unrecognized; the caller should record
    /// a warning. The flag is left unchanged.
    ReleaseWhileUnrecognized,
}

/// Advance the recognition flag for one event and report what happened.
pub fn advance(recognized: &mut bool, trigger: RecognitionTrigger) -> RecognitionOutcome {
    if *recognized {
        return RecognitionOutcome::Unchanged;
    }
    match trigger {
        RecognitionTrigger::Wrap | RecognitionTrigger::Compute | RecognitionTrigger::Register => {
            *recognized = true;
            RecognitionOutcome::Recognized
        }
        RecognitionTrigger::Unwrap => RecognitionOutcome::ReleaseWhileUnrecognized,
    }
}
