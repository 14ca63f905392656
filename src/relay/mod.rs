//! GitHub event relaying.
//!
//! ## Module Structure
//!
//! - `events`: typed webhook payloads
//! - `router`: repository -> Discord thread mapping
//! - `dedup`: recently seen delivery ids
//! - `formatter`: event -> Discord message
//! - `simulate`: synthetic events for manual checks
//! - `pipeline`: the `Relay` tying the pieces together

pub mod dedup;
pub mod events;
pub mod formatter;
pub mod pipeline;
pub mod router;
pub mod simulate;

pub use dedup::DedupCache;
pub use events::GitHubEvent;
pub use formatter::EventFormatter;
pub use pipeline::{Relay, RelayOutcome};
pub use router::RepoRouter;
