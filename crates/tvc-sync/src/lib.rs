//! Simulated remote synchronization for translation version control.
//!
//! Remotes are branch-ref tables reached through a [`RemoteTransport`]. The
//! [`RemoteRegistry`] serializes operations per remote and applies every
//! mutation in one step after the transport round trip, so a cancelled
//! fetch or push leaves the table untouched.

pub mod config;
pub mod error;
pub mod registry;
pub mod transport;
pub mod types;

pub use config::{BusyPolicy, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use registry::RemoteRegistry;
pub use transport::{RemoteTransport, SimulatedTransport};
pub use types::{FetchResult, PushResult, RefRejection, RefUpdate, Remote};
