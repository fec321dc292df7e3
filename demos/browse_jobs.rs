//! Logs in through the system browser, fetches the first page of jobs for a search term, and
//! folds it into the UI state.
//!
//! Run with `UPWORK_KEY`/`UPWORK_SECRET` set. After authorizing in the browser, paste the
//! `oauth2upwatcher://...` URL the provider redirected to.

// std
use std::{env, io, sync::Arc, thread};
// crates.io
use color_eyre::Result;
// self
use upwatcher::{
	feeds::FeedModel,
	flows::Session,
	link::{AppLifecycle, SystemBrowser},
	provider::{ConsumerCredentials, ProviderDescriptor},
	state::{Action, AppState},
	store::FileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let query = env::args().nth(1).unwrap_or_else(|| "rust".into());
	let store = Arc::new(FileStore::open(env::temp_dir().join("upwatcher_demo.json"))?);
	let lifecycle = AppLifecycle::default();
	let session = Session::new(
		ProviderDescriptor::upwork().build()?,
		ConsumerCredentials::from_env()?,
		store,
		Arc::new(SystemBrowser),
	)
	.with_lifecycle(lifecycle.clone());
	let model = FeedModel::new(Arc::new(session));

	// Stands in for the platform delivering the deep link.
	thread::spawn(move || {
		let mut link = String::new();

		if io::stdin().read_line(&mut link).is_ok() {
			lifecycle.resume_with_url(link.trim());
		}
	});

	let response = model.fetch_page(&query, 0).await?;
	let state = AppState::reduce(&Arc::new(AppState::default()), &Action::FeedsUpdate {
		data: response.jobs,
	});

	println!("{} jobs for `{query}` ({:?}).", state.feeds.len(), state.feeds.view());

	for job in state.feeds.data.iter() {
		println!("- {} [{}] {}", job.id, job.job_type.as_deref().unwrap_or("?"), job.title);
	}

	Ok(())
}
