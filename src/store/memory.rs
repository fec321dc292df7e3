//! Thread-safe in-memory [`KeyValueStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{Entries, KeyValueStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<String, Value>>>;

/// Thread-safe storage backend that keeps values in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of keys currently stored.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: StoreMap, keys: &[&str]) -> Entries {
		let guard = map.read();

		keys.iter()
			.filter_map(|key| guard.get(*key).map(|value| ((*key).to_owned(), value.clone())))
			.collect()
	}

	fn set_now(map: StoreMap, entries: Entries) -> Result<(), StoreError> {
		map.write().extend(entries);

		Ok(())
	}

	fn remove_now(map: StoreMap, keys: &[&str]) {
		let mut guard = map.write();

		for key in keys {
			guard.remove(*key);
		}
	}
}
impl KeyValueStore for MemoryStore {
	fn get<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Entries> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, keys)) })
	}

	fn set(&self, entries: Entries) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, entries) })
	}

	fn remove<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::remove_now(map, keys);

			Ok(())
		})
	}
}
