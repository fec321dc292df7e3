//! JSON file-backed [`KeyValueStore`] so credentials and cached feeds survive restarts.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{Entries, KeyValueStore, StoreError, StoreFuture},
};

/// Key space mirrored into a single JSON object on disk.
///
/// Reads are served from memory. Every mutation rewrites the file through a sibling `.tmp`
/// file that is renamed into place, so a crash mid-write leaves the previous snapshot intact.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	entries: Arc<RwLock<Entries>>,
}
impl FileStore {
	/// Opens the store at `path`, creating parent directories as needed. A missing or blank
	/// file yields an empty store.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			fs::create_dir_all(dir).map_err(|e| backend("create", dir, e))?;
		}

		let entries = match fs::read(&path) {
			Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Entries::new(),
			Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("{} is not a JSON object: {e}", path.display()),
			})?,
			Err(e) if e.kind() == ErrorKind::NotFound => Entries::new(),
			Err(e) => return Err(backend("read", &path, e)),
		};

		Ok(Self { path, entries: Arc::new(RwLock::new(entries)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn mutate<F>(&self, change: F) -> Result<(), StoreError>
	where
		F: FnOnce(&mut Entries) -> bool,
	{
		let mut entries = self.entries.write();

		if !change(&mut entries) {
			return Ok(());
		}

		let bytes = serde_json::to_vec_pretty(&*entries)
			.map_err(|e| StoreError::Serialization { message: e.to_string() })?;
		let tmp = self.path.with_extension("tmp");

		write_synced(&tmp, &bytes).map_err(|e| backend("write", &tmp, e))?;
		fs::rename(&tmp, &self.path).map_err(|e| backend("replace", &self.path, e))
	}
}
impl KeyValueStore for FileStore {
	fn get<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Entries> {
		let found = {
			let entries = self.entries.read();

			keys.iter()
				.filter_map(|&key| entries.get(key).map(|value| (key.to_owned(), value.clone())))
				.collect()
		};

		Box::pin(async move { Ok(found) })
	}

	fn set(&self, entries: Entries) -> StoreFuture<'_, ()> {
		let result = self.mutate(|current| {
			current.extend(entries);

			true
		});

		Box::pin(async move { result })
	}

	fn remove<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()> {
		let result =
			self.mutate(|current| keys.iter().fold(false, |hit, key| current.remove(*key).is_some() || hit));

		Box::pin(async move { result })
	}
}

// Contents reach the disk before the caller renames the file into place.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
	let mut file = File::create(path)?;

	file.write_all(bytes)?;
	file.sync_all()
}

fn backend(action: &str, path: &Path, e: std::io::Error) -> StoreError {
	StoreError::Backend { message: format!("Failed to {action} {}: {e}", path.display()) }
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn scratch(label: &str) -> PathBuf {
		env::temp_dir().join(format!(
			"upwatcher_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos()
		))
	}

	#[tokio::test]
	async fn entries_survive_reopen_and_removals_are_written_through() {
		let path = scratch("file_store");
		let store = FileStore::open(&path).expect("Store should open on a fresh path.");
		let mut entries = Entries::new();

		entries.insert("token".into(), Value::from("request-token"));
		entries.insert("token_time".into(), Value::from(1_700_000_000_000_i64));
		store.set(entries).await.expect("Entries should persist.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Store should reopen.");
		let found =
			reopened.get(&["token", "token_time", "verifier"]).await.expect("Read should succeed.");

		assert_eq!(found.get("token"), Some(&Value::from("request-token")));
		assert_eq!(found.len(), 2);

		reopened.remove(&["token"]).await.expect("Removal should persist.");

		let reopened = FileStore::open(&path).expect("Store should reopen.");

		assert!(reopened.get(&["token"]).await.expect("Read should succeed.").is_empty());

		fs::remove_file(&path).expect("Scratch file should be removable.");
	}

	#[tokio::test]
	async fn mutations_leave_no_temporary_file_behind() {
		let path = scratch("file_store_sync");
		let store = FileStore::open(&path).expect("Store should open on a fresh path.");

		store.set_one("access", Value::from("access-token")).await.expect("Write should succeed.");

		assert!(!path.with_extension("tmp").exists());
		assert_eq!(
			serde_json::from_slice::<Entries>(&fs::read(&path).expect("Store file should exist."))
				.expect("Store file should hold JSON."),
			Entries::from([("access".to_owned(), Value::from("access-token"))])
		);

		fs::remove_file(&path).expect("Scratch file should be removable.");
	}

	#[test]
	fn blank_files_open_empty_and_garbage_is_rejected() {
		let path = scratch("file_store_blank");

		fs::write(&path, "  \n").expect("Scratch file should be writable.");

		assert!(FileStore::open(&path).is_ok());

		fs::write(&path, "not json").expect("Scratch file should be writable.");

		assert!(matches!(FileStore::open(&path), Err(StoreError::Serialization { .. })));

		fs::remove_file(&path).expect("Scratch file should be removable.");
	}
}
