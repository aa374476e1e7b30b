use std::fmt;

/// A discrete pass of the sync pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Catalog,
    Fetch,
    Dedupe,
    Sort,
    Unsort,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Catalog => "Getting maps",
            Stage::Fetch => "Downloading maps",
            Stage::Dedupe => "Removing duplicates",
            Stage::Sort => "Sorting maps",
            Stage::Unsort => "Un-sorting maps",
            Stage::Cleanup => "Removing empty directories",
        };
        f.write_str(label)
    }
}

/// Sink for pipeline status updates.
///
/// CLI implements with an indicatif spinner. All methods have default no-op
/// implementations and must never panic.
pub trait ProgressReporter: Send + Sync {
    fn on_stage_start(&self, _stage: Stage) {}
    fn report(&self, _message: &str) {}
    fn on_stage_complete(&self, _stage: Stage, _count: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
