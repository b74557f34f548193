//! Repository sync: identity derivation, git transport, coordination.

pub mod coordinator;
pub mod git;
pub mod identity;

pub use coordinator::{SyncCoordinator, SyncResult};
pub use git::GitClient;
pub use identity::{cache_id, is_local_source, short_name};
