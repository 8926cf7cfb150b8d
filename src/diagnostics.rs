//! Per-stage progress reporting.
//!
//! The engine reports what each stage contributed and discarded to a
//! [`DiagnosticSink`] handed to it at construction. The default
//! [`TracingSink`] turns reports into `tracing` events; [`SilentSink`] drops
//! them, which switches stage diagnostics off without touching the global
//! log filter.

use std::fmt;
use tracing::{info, warn};

/// Pipeline stage a [`StageReport`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Feeds,
    Latest,
    Archive,
    Dedup,
    RangeFilter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Feeds => "feeds",
            Stage::Latest => "latest",
            Stage::Archive => "archive",
            Stage::Dedup => "dedup",
            Stage::RangeFilter => "range_filter",
        };
        f.write_str(name)
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Items the stage passed on.
    pub contributed: usize,
    /// Candidates or items the stage dropped.
    pub discarded: usize,
    /// Pages or endpoints that could not be fetched or parsed.
    pub failed: usize,
    /// The stage did not run for this range.
    pub skipped: bool,
    /// The overall deadline cut the stage short.
    pub truncated: bool,
}

impl StageReport {
    pub fn new(stage: Stage, contributed: usize, discarded: usize) -> Self {
        Self {
            stage,
            contributed,
            discarded,
            failed: 0,
            skipped: false,
            truncated: false,
        }
    }

    pub fn skipped(stage: Stage) -> Self {
        Self {
            skipped: true,
            ..Self::new(stage, 0, 0)
        }
    }
}

/// Receiver for stage reports.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, report: &StageReport);
}

/// Emits every report as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, report: &StageReport) {
        if report.skipped {
            info!(stage = %report.stage, "Stage skipped");
        } else if report.truncated {
            warn!(
                stage = %report.stage,
                contributed = report.contributed,
                discarded = report.discarded,
                failed = report.failed,
                "Stage cut short by deadline"
            );
        } else {
            info!(
                stage = %report.stage,
                contributed = report.contributed,
                discarded = report.discarded,
                failed = report.failed,
                "Stage complete"
            );
        }
    }
}

/// Drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _report: &StageReport) {}
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Collects reports for assertions.
    #[derive(Debug, Default, Clone)]
    pub struct RecordingSink {
        reports: Arc<Mutex<Vec<StageReport>>>,
    }

    impl RecordingSink {
        pub fn take(&self) -> Vec<StageReport> {
            self.reports.lock().unwrap().drain(..).collect()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&self, report: &StageReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }
}
