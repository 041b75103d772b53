//! News ingestion: fetch feeds through the conversion endpoint, keep recent
//! tree-related items, normalize them and publish a capped JSON snapshot.
//!
//! Data flows one way:
//!
//! ```text
//! fetcher -> source tagging -> filter -> normalize -> rank/cap -> snapshot
//! ```

pub mod fetcher;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod snapshot;
pub mod source;

pub use fetcher::{FetchOutcome, Fetcher};
pub use model::{NormalizedArticle, RawItem, Snapshot};
pub use pipeline::{build_snapshot, run_ingest, RunStats};
pub use source::FeedSource;
