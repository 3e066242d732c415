//! Background worker for full-buffer highlighting and text statistics.
//!
//! Jobs run on a dedicated thread; results travel back over a channel and are
//! applied by whoever polls the worker on the control thread. Every job records
//! the buffer length it was dispatched for, so the receiver can drop results
//! for a buffer that has since changed length. There is no cancellation.

use crate::document::DocumentId;
use crate::stats::TextStats;
use crate::syntax::{scan, StyledSpan};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::io;
use std::ops::Range;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Work sent to the background thread.
#[derive(Debug, Clone)]
pub enum Job {
    /// Scan `range` of `text` for markup spans.
    Highlight {
        document: DocumentId,
        text: String,
        range: Range<usize>,
    },
    /// Count characters, words and lines of `text`.
    Stats { document: DocumentId, text: String },
}

impl Job {
    fn dispatched_len(&self) -> usize {
        match self {
            Job::Highlight { text, .. } | Job::Stats { text, .. } => text.len(),
        }
    }
}

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    Highlight(Vec<StyledSpan>),
    Stats(TextStats),
}

/// A finished job, tagged with the buffer it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub document: DocumentId,
    /// Byte length of the buffer when the job was dispatched.
    pub dispatched_len: usize,
    pub output: JobOutput,
}

impl JobResult {
    /// True if the result still describes a buffer of `document` with `len` bytes.
    pub fn is_fresh(&self, document: DocumentId, len: usize) -> bool {
        self.document == document && self.dispatched_len == len
    }
}

/// Handle to the background thread.
pub struct Worker {
    job_tx: Option<Sender<Job>>,
    result_rx: Receiver<JobResult>,
    handle: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl Worker {
    /// Starts the worker thread.
    pub fn spawn() -> io::Result<Self> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name("luddite-worker".to_string())
            .spawn(move || run(job_rx, result_tx))?;

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            handle: Some(handle),
            in_flight: 0,
        })
    }

    /// Queues a job. Returns false if the worker thread is gone.
    pub fn submit(&mut self, job: Job) -> bool {
        let Some(tx) = &self.job_tx else {
            return false;
        };
        match tx.send(job) {
            Ok(()) => {
                self.in_flight += 1;
                true
            }
            Err(e) => {
                log::error!("Background worker is gone, dropping job: {:?}", e.0);
                false
            }
        }
    }

    /// Tries to receive a finished job (non-blocking).
    pub fn try_recv(&mut self) -> Option<JobResult> {
        let result = self.result_rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(result)
    }

    /// Waits up to `timeout` for a finished job.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<JobResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Number of submitted jobs whose results have not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the thread's loop.
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Background worker panicked");
            }
        }
    }
}

fn run(job_rx: Receiver<Job>, result_tx: Sender<JobResult>) {
    for job in job_rx {
        let dispatched_len = job.dispatched_len();
        let result = match job {
            Job::Highlight {
                document,
                text,
                range,
            } => JobResult {
                document,
                dispatched_len,
                output: JobOutput::Highlight(scan(&text, range)),
            },
            Job::Stats { document, text } => JobResult {
                document,
                dispatched_len,
                output: JobOutput::Stats(TextStats::compute(&text)),
            },
        };
        if result_tx.send(result).is_err() {
            break;
        }
    }
    log::debug!("Background worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SpanClass;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_highlight_job_round_trip() {
        let mut worker = Worker::spawn().unwrap();
        let document = DocumentId::new();
        let text = "<b>x</b>".to_string();
        assert!(worker.submit(Job::Highlight {
            document,
            range: 0..text.len(),
            text,
        }));
        assert_eq!(worker.in_flight(), 1);

        let result = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(worker.in_flight(), 0);
        assert!(result.is_fresh(document, 8));
        match result.output {
            JobOutput::Highlight(spans) => {
                assert_eq!(spans.iter().filter(|s| s.class == SpanClass::Tag).count(), 2);
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn test_stats_job_round_trip() {
        let mut worker = Worker::spawn().unwrap();
        let document = DocumentId::new();
        worker.submit(Job::Stats {
            document,
            text: "one two".to_string(),
        });
        let result = worker.recv_timeout(WAIT).unwrap();
        assert_eq!(result.output, JobOutput::Stats(TextStats::compute("one two")));
    }

    #[test]
    fn test_freshness_check() {
        let document = DocumentId::new();
        let result = JobResult {
            document,
            dispatched_len: 10,
            output: JobOutput::Stats(TextStats::default()),
        };
        assert!(result.is_fresh(document, 10));
        assert!(!result.is_fresh(document, 11));
        assert!(!result.is_fresh(DocumentId::new(), 10));
    }

    #[test]
    fn test_results_arrive_in_submission_order() {
        let mut worker = Worker::spawn().unwrap();
        let document = DocumentId::new();
        for text in ["a", "ab", "abc"] {
            worker.submit(Job::Stats {
                document,
                text: text.to_string(),
            });
        }
        let lens: Vec<usize> = (0..3)
            .filter_map(|_| worker.recv_timeout(WAIT))
            .map(|r| r.dispatched_len)
            .collect();
        assert_eq!(lens, vec![1, 2, 3]);
    }
}
