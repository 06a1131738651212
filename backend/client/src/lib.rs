//! # Client
//!
//! Map-side state: which markers are visible, which are completed, and keeping the
//! latter in step with the server.
//!
//! ## Flow
//! - [`Session::load`] fetches the catalog and the caller's completed ids once
//! - [`filter`] narrows markers by category switches and search text
//! - [`sync`] flips completion optimistically and settles on the server's answer
//! - [`filter::map_markers`] produces what the map library draws
pub mod api;
pub mod filter;
pub mod session;
pub mod sync;

pub use api::{ClientError, HttpApi, TrackerApi};
pub use session::Session;
pub use sync::{MarkerSync, PendingToggle, SyncError};
