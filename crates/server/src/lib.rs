pub mod api;
pub mod ingest;
pub mod router;
pub mod startup;
pub mod state;

pub use ingest::{IngestError, IngestService, ItemOutcome};
pub use router::build_router;
pub use state::AppState;
