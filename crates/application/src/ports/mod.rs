//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and the host:
//! browser storage, the router, the network and the clock.

mod clock;
mod navigator;
mod storage;
mod transport;

pub use clock::Clock;
pub use navigator::Navigator;
pub use storage::{StorageArea, StorageError};
pub use transport::{HttpTransport, TransportError};
