//! Sequential batch driving with a consecutive-failure circuit breaker.
//!
//! Items are grouped (for example by source host). Within a group, every
//! item whose source cannot be fetched counts towards a streak; once the
//! streak reaches the threshold the rest of the group is skipped and the
//! driver moves on to the next group. Any item whose source was fetched,
//! whether or not later stages succeed, resets the streak.

use tracing::{info, warn};

use crate::config::DEFAULT_FAILURE_THRESHOLD;
use crate::error::PipelineResult;

/// Counts consecutive I/O failures and opens at a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreaker {
    threshold: usize,
    consecutive_failures: usize,
}

impl CircuitBreaker {
    /// A threshold of 0 is treated as 1.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
        }
    }

    pub const fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    pub const fn is_open(&self) -> bool {
        self.consecutive_failures >= self.threshold
    }

    /// Resets the streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Extends the streak and reports whether the breaker is now open.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        self.is_open()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

/// Outcome counts of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupReport {
    /// Items that went through every stage.
    pub processed: usize,
    /// Items that failed at some stage.
    pub failed: usize,
    /// Items never attempted because the breaker opened.
    pub skipped: usize,
    /// Whether the breaker opened in this group.
    pub tripped: bool,
}

impl GroupReport {
    pub const fn total(&self) -> usize {
        self.processed + self.failed + self.skipped
    }
}

/// Runs `process` over a group's items in order with a fresh breaker.
///
/// Failures never propagate: each is logged with the item's label and
/// counted. Only failures for which [`PipelineError::is_io`] holds extend
/// the breaker's streak.
///
/// [`PipelineError::is_io`]: crate::error::PipelineError::is_io
pub fn run_group<T, L, F>(
    group: &str,
    items: impl IntoIterator<Item = T>,
    threshold: usize,
    mut label: L,
    mut process: F,
) -> GroupReport
where
    L: FnMut(&T) -> String,
    F: FnMut(&T) -> PipelineResult<()>,
{
    let mut breaker = CircuitBreaker::new(threshold);
    let mut report = GroupReport::default();
    let mut items = items.into_iter();

    for item in items.by_ref() {
        match process(&item) {
            Ok(()) => {
                breaker.record_success();
                report.processed += 1;
            }
            Err(err) => {
                report.failed += 1;
                warn!(group, item = %label(&item), error = %err, "item failed");
                if !err.is_io() {
                    breaker.record_success();
                } else if breaker.record_failure() {
                    warn!(
                        group,
                        failures = breaker.consecutive_failures(),
                        "too many consecutive I/O failures, skipping rest of group"
                    );
                    report.tripped = true;
                    break;
                }
            }
        }
    }

    report.skipped = items.count();
    info!(
        group,
        processed = report.processed,
        failed = report.failed,
        skipped = report.skipped,
        "group finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, PipelineError};

    fn io_error(name: &str) -> PipelineError {
        PipelineError::Io {
            path: name.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }
    }

    #[test]
    fn breaker_opens_at_threshold_and_resets() {
        let mut breaker = CircuitBreaker::new(3);
        assert!(!breaker.record_failure());
        assert!(!breaker.record_failure());
        breaker.record_success();
        assert_eq!(breaker.consecutive_failures(), 0);
        assert!(!breaker.record_failure());
        assert!(!breaker.record_failure());
        assert!(breaker.record_failure());
        assert!(breaker.is_open());
    }

    #[test]
    fn zero_threshold_opens_on_first_failure() {
        let mut breaker = CircuitBreaker::new(0);
        assert!(breaker.record_failure());
    }

    #[test]
    fn run_group_stops_after_consecutive_io_failures() {
        let items: Vec<u32> = (0..10).collect();
        let mut seen = Vec::new();

        let report = run_group(
            "example.com",
            items,
            3,
            |i| i.to_string(),
            |&i| {
                seen.push(i);
                if i >= 2 {
                    Err(io_error("x"))
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(
            report,
            GroupReport {
                processed: 2,
                failed: 3,
                skipped: 5,
                tripped: true
            }
        );
        assert_eq!(report.total(), 10);
    }

    #[test]
    fn run_group_success_breaks_the_streak() {
        let outcomes = [true, false, false, true, false, false, true];
        let report = run_group(
            "g",
            outcomes,
            3,
            |ok| ok.to_string(),
            |&ok| if ok { Ok(()) } else { Err(io_error("x")) },
        );
        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 4);
        assert!(!report.tripped);
    }

    #[test]
    fn run_group_ignores_processing_failures_for_the_breaker() {
        let report = run_group(
            "g",
            0..6,
            2,
            |i| i.to_string(),
            |_| Err(PipelineError::Segmentation(Error::InvalidParameter("x".into()))),
        );
        assert_eq!(report.failed, 6);
        assert_eq!(report.skipped, 0);
        assert!(!report.tripped);
    }

    #[test]
    fn run_group_processing_failure_resets_io_streak() {
        let plan = ["io", "io", "seg", "io", "io"];
        let report = run_group(
            "g",
            plan,
            3,
            |s| s.to_string(),
            |&kind| match kind {
                "io" => Err(io_error(kind)),
                _ => Err(PipelineError::EmptyAfterTrim),
            },
        );
        assert!(!report.tripped);
        assert_eq!(report.failed, 5);
    }
}
