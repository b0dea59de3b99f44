//! Durable storage for the score repository.
//!
//! The repository persists its whole state as one [`Snapshot`] after every
//! mutation. [`KvStore`] keeps that snapshot in a fjall database;
//! [`MemoryStorage`] keeps it in memory.

mod error;
mod memory;
#[cfg(feature = "kv")]
mod store;
mod types;

pub use error::StoreError;
pub use memory::MemoryStorage;
#[cfg(feature = "kv")]
pub use store::KvStore;
pub use types::Snapshot;

/// A place the repository can load its snapshot from and save it to.
pub trait Storage {
    /// Read the stored snapshot. `None` means nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}
