pub mod catalog;
pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod hasher;
pub mod http;
pub mod layout;
pub mod progress;
pub mod reconcile;
pub mod scanner;

pub use catalog::{HttpRepository, MapDescriptor, MapRepository};
pub use config::AppConfig;
pub use engine::{SyncEngine, SyncSummary};
pub use error::Error;
pub use fetch::{FailedMap, FetchSummary};
pub use progress::{ProgressReporter, SilentReporter, Stage};
pub use reconcile::Reconciliation;
