//! Annotation - operator response to a detection event
//!
//! Keyed by the event's elapsed-time offset; applied retroactively onto the
//! frame log at session stop.

use serde::{Deserialize, Serialize};

/// Operator answer to a detection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationFeedback {
    /// Confirmed pothole
    Yes,
    /// Rejected detection
    No,
    /// Prompt expired unanswered
    Timeout,
}

/// One resolved detection prompt
///
/// At most one per `event_elapsed_ms`; a duplicate record takes last-write-wins,
/// though duplicates should not occur because the detector cooldown guarantees
/// event keys are at least one cooldown apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Elapsed-time key of the detection event this annotation answers
    pub event_elapsed_ms: u64,

    /// Operator verdict
    pub is_pothole: bool,

    /// How the prompt resolved
    pub feedback: AnnotationFeedback,
}

impl Annotation {
    /// Annotation for a confirmed or rejected prompt
    pub fn answered(event_elapsed_ms: u64, confirmed: bool) -> Self {
        Self {
            event_elapsed_ms,
            is_pothole: confirmed,
            feedback: if confirmed {
                AnnotationFeedback::Yes
            } else {
                AnnotationFeedback::No
            },
        }
    }

    /// Annotation for a prompt that expired unanswered
    pub fn timed_out(event_elapsed_ms: u64) -> Self {
        Self {
            event_elapsed_ms,
            is_pothole: false,
            feedback: AnnotationFeedback::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answered_maps_feedback() {
        assert_eq!(
            Annotation::answered(5000, true).feedback,
            AnnotationFeedback::Yes
        );
        assert_eq!(
            Annotation::answered(5000, false).feedback,
            AnnotationFeedback::No
        );
        assert_eq!(
            Annotation::timed_out(5000).feedback,
            AnnotationFeedback::Timeout
        );
    }
}
