//! Key-value storage contract and built-in backends for credentials, settings, and feeds.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value pairs read from or written to a store.
pub type Entries = BTreeMap<String, Value>;

/// Persistent key-value storage the rest of the crate depends on.
///
/// Values are JSON documents so credential strings, timestamps, settings maps and whole feed
/// lists share one backend. Missing keys are simply absent from the returned [`Entries`].
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Reads the values stored under `keys`.
	fn get<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Entries>;

	/// Writes every entry, replacing existing values.
	fn set(&self, entries: Entries) -> StoreFuture<'_, ()>;

	/// Deletes `keys`; absent keys are ignored.
	fn remove<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()>;

	/// Reads a single key.
	fn get_one<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Value>> {
		Box::pin(async move {
			let keys = [key];
			let mut entries = self.get(&keys).await?;

			Ok(entries.remove(key))
		})
	}

	/// Writes a single key.
	fn set_one<'a>(&'a self, key: &'a str, value: Value) -> StoreFuture<'a, ()> {
		let mut entries = Entries::new();

		entries.insert(key.to_owned(), value);

		self.set(entries)
	}
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
