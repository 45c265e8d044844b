//! Filesystem side of a fetch: destination state, staging files, atomic replacement.
//!
//! Everything here is synchronous; callers on an async runtime wrap the calls
//! that may block for long (content comparison) in `spawn_blocking`.

mod compare;
mod error;
mod mode;
mod staging;
mod state;

pub use compare::{same_content, touch};
pub use error::{Error, Result};
pub use mode::FileMode;
pub use staging::{StagingFile, create_parent_dirs};
pub use state::DestinationState;
