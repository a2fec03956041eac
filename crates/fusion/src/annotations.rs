//! Annotation storage and post-hoc frame labeling.
//!
//! Operator responses arrive asynchronously, keyed by the detection event's
//! elapsed-time offset. At session stop every frame inside the ±window of an
//! annotation inherits its marks. Annotations are scanned in ascending event
//! time and the first match wins when windows overlap; labels are never
//! averaged or split.

use std::collections::BTreeMap;

use contracts::{
    Annotation, AnnotationConfig, AnnotationFeedback, FeedbackMark, Frame, PotholeMark,
};
use tracing::debug;

/// Store of operator responses for one session
#[derive(Debug)]
pub struct AnnotationStore {
    config: AnnotationConfig,
    /// Keyed by event elapsed time; BTreeMap iteration gives the deterministic
    /// ascending order the first-match-wins rule relies on
    entries: BTreeMap<u64, Annotation>,
}

impl AnnotationStore {
    pub fn new(config: AnnotationConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
        }
    }

    /// Record one resolved prompt. Duplicate keys take last-write-wins;
    /// duplicates should not occur because the detector cooldown spaces events.
    pub fn record(&mut self, annotation: Annotation) {
        if self
            .entries
            .insert(annotation.event_elapsed_ms, annotation)
            .is_some()
        {
            debug!(
                event_elapsed_ms = annotation.event_elapsed_ms,
                "duplicate annotation overwritten"
            );
        }
    }

    /// Number of stored annotations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the stored annotations onto the frame log.
    ///
    /// O(frames × annotations); annotation counts are human-rate so the
    /// quadratic factor is negligible next to the 100 Hz frame count.
    pub fn apply(&self, frames: &mut [Frame]) {
        if self.entries.is_empty() {
            return;
        }

        let window = self.config.window_ms;
        for frame in frames.iter_mut() {
            let matched = self.entries.values().find(|a| {
                frame.elapsed_ms >= a.event_elapsed_ms.saturating_sub(window)
                    && frame.elapsed_ms <= a.event_elapsed_ms + window
            });

            if let Some(annotation) = matched {
                let (mark, feedback) = marks_for(annotation.feedback);
                frame.is_pothole = mark;
                frame.user_feedback = feedback;
            }
        }
    }
}

/// Map an operator response to the pair of frame marks
fn marks_for(feedback: AnnotationFeedback) -> (PotholeMark, FeedbackMark) {
    match feedback {
        AnnotationFeedback::Yes => (PotholeMark::Yes, FeedbackMark::UserConfirmed),
        AnnotationFeedback::No => (PotholeMark::No, FeedbackMark::UserRejected),
        AnnotationFeedback::Timeout => (PotholeMark::Unmarked, FeedbackMark::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3;

    fn make_frames(count: usize, step_ms: u64) -> Vec<Frame> {
        (0..count)
            .map(|i| {
                Frame::new(
                    i as u64 * step_ms,
                    Vector3::new(0.0, 0.0, 9.8),
                    9.8,
                    None,
                    None,
                )
            })
            .collect()
    }

    fn new_store() -> AnnotationStore {
        AnnotationStore::new(AnnotationConfig::default())
    }

    #[test]
    fn test_confirmed_annotation_window() {
        // Frames every 1 ms from 0 to 20000
        let mut frames = make_frames(20_001, 1);
        let mut store = new_store();
        store.record(Annotation::answered(5000, true));
        store.apply(&mut frames);

        // Window is [0, 15000] after clamping at session start
        assert_eq!(frames[0].is_pothole, PotholeMark::Yes);
        assert_eq!(frames[15_000].user_feedback, FeedbackMark::UserConfirmed);
        assert!(frames[15_001].is_unannotated());
        assert!(frames[20_000].is_unannotated());
    }

    #[test]
    fn test_rejected_and_timeout_mappings() {
        let mut frames = make_frames(10, 100);
        let mut store = new_store();
        store.record(Annotation::answered(0, false));
        store.apply(&mut frames);
        assert_eq!(frames[0].is_pothole, PotholeMark::No);
        assert_eq!(frames[0].user_feedback, FeedbackMark::UserRejected);

        let mut frames = make_frames(10, 100);
        let mut store = new_store();
        store.record(Annotation::timed_out(0));
        store.apply(&mut frames);
        assert_eq!(frames[0].is_pothole, PotholeMark::Unmarked);
        assert_eq!(frames[0].user_feedback, FeedbackMark::Timeout);
    }

    #[test]
    fn test_overlapping_windows_first_match_wins() {
        // Two annotations 4 s apart: their ±10 s windows overlap heavily
        let mut frames = make_frames(30, 1000);
        let mut store = new_store();
        store.record(Annotation::answered(9000, false));
        store.record(Annotation::answered(5000, true));
        store.apply(&mut frames);

        // 5000 is the earlier key, so its window claims everything it covers
        assert_eq!(frames[0].is_pothole, PotholeMark::Yes);
        assert_eq!(frames[15].is_pothole, PotholeMark::Yes);
        // 16000..=19000 only falls inside the 9000 window
        assert_eq!(frames[16].is_pothole, PotholeMark::No);
        assert_eq!(frames[19].is_pothole, PotholeMark::No);
        assert!(frames[20].is_unannotated());
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let mut frames = make_frames(5, 100);
        let mut store = new_store();
        store.record(Annotation::answered(100, true));
        store.record(Annotation::answered(100, false));
        assert_eq!(store.len(), 1);

        store.apply(&mut frames);
        assert_eq!(frames[1].is_pothole, PotholeMark::No);
    }

    #[test]
    fn test_frames_outside_every_window_stay_unset() {
        let mut frames = make_frames(5, 100_000);
        let mut store = new_store();
        store.record(Annotation::answered(0, true));
        store.apply(&mut frames);

        assert_eq!(frames[0].is_pothole, PotholeMark::Yes);
        for frame in &frames[1..] {
            assert!(frame.is_unannotated());
        }
    }
}
