mod errors;
mod file_store;
pub mod preferences;
pub mod snapshot;

pub use errors::DBError as DatabaseError;
pub use preferences::{normalize_keyword, PreferenceStore, Preferences};
pub use snapshot::SnapshotCache;
