//! Change detection and notification pipeline.
//!
//! - `extract`: raw record → display fields
//! - `snapshot` / `diff`: fingerprint store and change classification
//! - `format` / `dispatch`: message rendering and delivery
//! - `cycle`: one fetch → notify pass
//! - `poll`: the loop that drives cycles

pub mod cycle;
pub mod diff;
pub mod dispatch;
pub mod extract;
pub mod format;
pub mod poll;
pub mod snapshot;

pub use cycle::Relay;
pub use diff::{DiffResult, classify, detect_changes};
pub use dispatch::{BATCH_SEPARATOR, Dispatcher};
pub use extract::{Fallbacks, RecordExtractor};
pub use format::MessageFormatter;
pub use poll::{PollLoop, PollSettings, PollSummary};
pub use snapshot::SnapshotStore;
