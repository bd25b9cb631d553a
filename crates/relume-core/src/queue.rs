//! Priority queue for pending enhancement jobs.
//!
//! Ordering: `high > normal > low`, FIFO within a tier. A monotonic sequence
//! number assigned at submission is the tie-break, so two jobs submitted in
//! the same instant still drain in submission order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

use crate::error::EnhanceResult;
use crate::types::{EnhancedImage, Priority};

/// Reply channel a drained job resolves through.
pub type JobReply = oneshot::Sender<EnhanceResult<Arc<EnhancedImage>>>;

/// A pending enhancement job.
///
/// Owned by the queue from submission until `take_next` hands it to the
/// orchestrator for processing.
pub struct EnhanceJob {
    /// URL the source bytes were fetched from (also the cache key)
    pub source_url: String,

    /// Raw, undecoded source image bytes
    pub bytes: Vec<u8>,

    /// Queue-ordering priority
    pub priority: Priority,

    /// When the job was submitted
    pub submitted_at: Instant,

    /// Channel the orchestrator resolves once the job reaches a terminal state
    pub reply: JobReply,
}

struct Entry {
    seq: u64,
    job: EnhanceJob,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then lower sequence (earlier
        // submission) first.
        self.job
            .priority
            .cmp(&other.job.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Unbounded priority queue of pending jobs.
///
/// Submission never fails; `take_next` on an empty queue returns `None` so
/// the orchestrator can go idle.
#[derive(Default)]
pub struct JobQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job. Never fails; the queue has no depth bound.
    pub fn submit(&mut self, job: EnhanceJob) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { seq, job });
    }

    /// Remove and return the job with the highest priority, FIFO within a
    /// tier. `None` means "no job available", not an error.
    pub fn take_next(&mut self) -> Option<EnhanceJob> {
        self.heap.pop().map(|entry| entry.job)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
