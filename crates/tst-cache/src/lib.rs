//! TST compile cache
//!
//! Content-addressed storage for compiled script output, layered on an
//! abstract persistent medium.
//!
//! # Architecture
//!
//! ```text
//! CompileGateway → ContentAddressedCache → dyn Store (FileStore | MemoryStore)
//!                           ↑
//!                       dyn Clock
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod clock;
pub mod error;
pub mod file;
pub mod store;

pub use cache::{CacheStats, ContentAddressedCache, DEFAULT_LIFETIME_DAYS, DEFAULT_PREFIX};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CacheError, StoreError};
pub use file::FileStore;
pub use store::{MemoryStore, Store};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
