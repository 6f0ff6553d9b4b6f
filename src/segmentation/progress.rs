//! Progress reporting for batch segmentation.
//!
//! Progress is emitted from rayon worker threads when the `parallel` feature
//! is used, so implementations must be `Send + Sync`.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Segmentation phases, ordered by execution sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationPhase {
    /// Partitioning rows by object and sorting each trajectory by time
    Grouping,
    /// Scanning each trajectory for stop points and slicing trips
    DetectingStops,
    /// Assigning trip identifiers and assembling output
    AssigningTrips,
}

impl SegmentationPhase {
    const ALL: [SegmentationPhase; 3] = [
        SegmentationPhase::Grouping,
        SegmentationPhase::DetectingStops,
        SegmentationPhase::AssigningTrips,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationPhase::Grouping => "grouping",
            SegmentationPhase::DetectingStops => "detecting_stops",
            SegmentationPhase::AssigningTrips => "assigning_trips",
        }
    }
}

/// Receives progress updates during segmentation.
pub trait SegmentationProgressCallback: Send + Sync {
    /// Entering `phase`, which has `total` items.
    fn on_phase(&self, phase: SegmentationPhase, total: u32);
    /// One item of the current phase is done.
    fn on_progress(&self);
}

/// Ignores all progress.
pub struct NoopProgress;

impl SegmentationProgressCallback for NoopProgress {
    fn on_phase(&self, _phase: SegmentationPhase, _total: u32) {}
    fn on_progress(&self) {}
}

/// Lock-free tracker that another thread can poll.
#[derive(Debug, Default)]
pub struct AtomicProgressTracker {
    /// 0 before the first phase, otherwise the phase position plus one
    phase: AtomicU8,
    completed: AtomicU32,
    total: AtomicU32,
}

impl AtomicProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase last entered, if any.
    pub fn phase(&self) -> Option<SegmentationPhase> {
        let code = self.phase.load(Ordering::Acquire) as usize;
        code.checked_sub(1)
            .and_then(|i| SegmentationPhase::ALL.get(i).copied())
    }

    /// Items completed in the current phase.
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::Acquire)
    }

    /// Items in the current phase.
    pub fn total(&self) -> u32 {
        self.total.load(Ordering::Acquire)
    }
}

impl SegmentationProgressCallback for AtomicProgressTracker {
    fn on_phase(&self, phase: SegmentationPhase, total: u32) {
        let code = SegmentationPhase::ALL
            .iter()
            .position(|p| *p == phase)
            .map_or(0, |i| i as u8 + 1);
        self.completed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
        self.phase.store(code, Ordering::Release);
    }

    fn on_progress(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }
}
