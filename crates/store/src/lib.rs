//! SQLite adapters for the cart domain.
//!
//! Provides the `CartRepository` and `ProductLookup` implementations used by
//! the HTTP service, plus pool setup, migrations, and a demo catalog seed.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod pool;

pub use cart::SqliteCartRepository;
pub use catalog::SqliteProductCatalog;
pub use error::{Result, StoreError};
pub use pool::{connect, connect_in_memory, run_migrations};
