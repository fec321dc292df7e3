//! Feed model: settings-driven job searches, the persisted job list, and favorites.

pub mod item;
pub mod query;
pub mod settings;

pub use item::*;
pub use query::*;
pub use settings::{SettingField, Settings, SettingsModel};

// self
use crate::{
	_prelude::*,
	flows::{ApiCall, Session},
	http::{HttpTransport, decode_value},
	obs::{self, FlowKind},
	store::StoreError,
};

/// Store key the last fetched job list lives under.
pub const FEEDS_KEY: &str = "feeds";

/// Fetches, caches, and annotates job feeds for one [`Session`].
pub struct FeedModel<T>
where
	T: ?Sized + HttpTransport,
{
	session: Arc<Session<T>>,
	settings: SettingsModel,
}
impl<T> FeedModel<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a model sharing `session`'s store.
	pub fn new(session: Arc<Session<T>>) -> Self {
		let settings = SettingsModel::new(session.store.clone());

		Self { session, settings }
	}

	/// Session used for API calls.
	pub fn session(&self) -> &Arc<Session<T>> {
		&self.session
	}

	/// Settings backing the queries.
	pub fn settings(&self) -> &SettingsModel {
		&self.settings
	}

	/// Builds the query for `query_text` and zero-based `page` from the current settings.
	pub async fn query(&self, query_text: &str, page: u32) -> Result<FeedQuery> {
		let settings = self.settings.get().await?;
		let descriptor = &self.session.descriptor;

		Ok(FeedQuery::from_settings(
			query_text,
			&settings,
			descriptor.days_posted,
			Paging::page(page, descriptor.page_size),
		))
	}

	/// Fetches one page of jobs and replaces the cached list with it.
	///
	/// Requires connectivity and a completed login (which may open the browser). When any step
	/// fails the cached list is left as it was and the error is returned.
	pub async fn fetch_page(&self, query_text: &str, page: u32) -> Result<JobsResponse> {
		obs::observe(FlowKind::FeedFetch, "fetch_page", async {
			let query = self.query(query_text, page).await?;
			let result = self.search(&query).await;
			let response = match result {
				Ok(response) => response,
				Err(e) => {
					tracing::warn!(error = %e, paging = %query.paging, "feed request failed");

					return Err(e);
				},
			};

			self.store_jobs(&response.jobs).await?;

			Ok(response)
		})
		.await
	}

	/// Cached job list; empty when nothing was fetched yet.
	pub async fn cached(&self) -> Result<Vec<FeedItem>> {
		match self.session.store.get_one(FEEDS_KEY).await? {
			Some(Value::Null) | None => Ok(Vec::new()),
			Some(value) => decode_value(value),
		}
	}

	/// Replaces the cached job list.
	pub async fn store_jobs(&self, jobs: &[FeedItem]) -> Result<()> {
		let value = serde_json::to_value(jobs)
			.map_err(|e| StoreError::Serialization { message: e.to_string() })?;

		self.session.store.set_one(FEEDS_KEY, value).await?;

		Ok(())
	}

	/// Sets `favorite` on the cached job `id`; returns whether such a job exists.
	pub async fn toggle_favorite(&self, id: &str, value: bool) -> Result<bool> {
		let mut jobs = self.cached().await?;
		let Some(job) = jobs.iter_mut().find(|job| job.id == id) else {
			tracing::debug!(id, "favorite target is not cached");

			return Ok(false);
		};

		job.favorite = value;
		self.store_jobs(&jobs).await?;

		Ok(true)
	}

	/// Marks the cached job `id` as favorite.
	pub async fn add_to_favorites(&self, id: &str) -> Result<bool> {
		self.toggle_favorite(id, true).await
	}

	/// Clears the favorite mark on the cached job `id`.
	pub async fn remove_from_favorites(&self, id: &str) -> Result<bool> {
		self.toggle_favorite(id, false).await
	}

	/// Fetches the full profile of job `id`.
	pub async fn job_info(&self, id: &str) -> Result<Value> {
		obs::observe(FlowKind::JobInfo, "job_info", async {
			if id.is_empty() {
				return Err(Error::MissingParameter("id"));
			}

			self.session.reachability.check().await?;
			self.session.ensure_access_token().await?;

			let path = self.session.descriptor.job_profile_path(id);

			self.session.signed_request(ApiCall::get(path)).await?.into_json()
		})
		.await
	}

	async fn search(&self, query: &FeedQuery) -> Result<JobsResponse> {
		self.session.reachability.check().await?;
		self.session.ensure_access_token().await?;

		let call = ApiCall::get(self.session.descriptor.paths.jobs_search.as_str())
			.params(query.to_params());
		let body = self.session.signed_request(call).await?.into_json()?;

		decode_value(body)
	}
}
impl<T> Debug for FeedModel<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FeedModel").field("session", &self.session).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::CredentialKey,
		http::{ApiRequest, ResponseBody, TransportFuture},
		link::BrowserLauncher,
		net::ConnectivityFlag,
		oauth::HmacSha1Signer,
		provider::{ConsumerCredentials, ProviderDescriptor},
		store::{KeyValueStore, MemoryStore},
	};

	#[derive(Default)]
	struct ScriptedTransport {
		responses: Mutex<Vec<Result<ResponseBody>>>,
		seen: Mutex<Vec<ApiRequest>>,
	}
	impl ScriptedTransport {
		fn reply(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.seen.lock().push(request);

			let next = self.responses.lock().pop().unwrap_or(Err(Error::Offline));

			Box::pin(async move { next })
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn get(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.reply(request)
		}

		fn post(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.reply(request)
		}
	}

	struct NoBrowser;
	impl BrowserLauncher for NoBrowser {
		fn open_url(&self, _: &Url) -> Result<()> {
			Ok(())
		}
	}

	async fn authorized_model(
		responses: Vec<Result<ResponseBody>>,
	) -> (FeedModel<ScriptedTransport>, Arc<ScriptedTransport>, Arc<MemoryStore>) {
		let store = Arc::new(MemoryStore::default());
		let mut entries = crate::store::Entries::new();

		for key in [
			CredentialKey::Token,
			CredentialKey::TokenSecret,
			CredentialKey::Verifier,
			CredentialKey::Access,
		] {
			entries.insert(key.as_str().into(), Value::from(format!("{key}-value")));
		}

		store.set(entries).await.expect("Seeding credentials should succeed.");

		let transport =
			Arc::new(ScriptedTransport { responses: Mutex::new(responses), ..Default::default() });
		let session = Session::with_transport(
			ProviderDescriptor::upwork().build().expect("Upwork preset should build."),
			Arc::new(HmacSha1Signer::new(ConsumerCredentials::new("key", "secret"))),
			store.clone(),
			Arc::new(NoBrowser),
			transport.clone(),
		);

		(FeedModel::new(Arc::new(session)), transport, store)
	}

	fn jobs_body(ids: &[&str]) -> Result<ResponseBody> {
		let jobs = ids
			.iter()
			.map(|id| serde_json::json!({ "id": id, "title": format!("job {id}") }))
			.collect::<Vec<_>>();

		Ok(ResponseBody::Json(serde_json::json!({ "jobs": jobs })))
	}

	#[tokio::test]
	async fn fetch_page_persists_jobs_and_sends_paging() {
		let (model, transport, _) = authorized_model(vec![jobs_body(&["a", "b"])]).await;
		let response = model.fetch_page("rust", 2).await.expect("Fetch should succeed.");

		assert_eq!(response.jobs.len(), 2);
		assert_eq!(model.cached().await.expect("Cache should load.").len(), 2);

		let seen = transport.seen.lock();

		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].params["paging"], "40;20");
		assert_eq!(seen[0].params["q"], "rust");
		assert_eq!(seen[0].params["oauth_token"], "token-value");
	}

	#[tokio::test]
	async fn failed_fetch_keeps_the_cached_list() {
		let (model, _, _) = authorized_model(vec![
			Err(Error::Http { status: 503, body: String::new() }),
			jobs_body(&["a"]),
		])
		.await;

		model.fetch_page("", 0).await.expect("First fetch should succeed.");

		let error = model.fetch_page("", 1).await.expect_err("Second fetch should fail.");

		assert!(matches!(error, Error::Http { status: 503, .. }));
		assert_eq!(model.cached().await.expect("Cache should load.")[0].id, "a");
	}

	#[tokio::test]
	async fn offline_fetch_never_reaches_the_transport() {
		let (model, transport, _) = authorized_model(vec![jobs_body(&["a"])]).await;
		let session = Arc::new(
			Session::clone(model.session())
				.with_reachability(Arc::new(ConnectivityFlag::new(false))),
		);
		let model = FeedModel::new(session);

		assert!(matches!(model.fetch_page("", 0).await, Err(Error::Offline)));
		assert!(transport.seen.lock().is_empty());
	}

	#[tokio::test]
	async fn favorites_toggle_by_id() {
		let (model, _, _) = authorized_model(vec![]).await;

		model
			.store_jobs(&[FeedItem::new("a", "A"), FeedItem::new("b", "B")])
			.await
			.expect("Seeding jobs should succeed.");

		assert!(model.add_to_favorites("b").await.expect("Toggle should succeed."));
		assert!(!model.add_to_favorites("zz").await.expect("Toggle should succeed."));

		let cached = model.cached().await.expect("Cache should load.");

		assert!(!cached[0].favorite);
		assert!(cached[1].favorite);

		model.remove_from_favorites("b").await.expect("Toggle should succeed.");

		assert!(!model.cached().await.expect("Cache should load.")[1].favorite);
	}

	#[tokio::test]
	async fn job_info_uses_the_profile_path() {
		let (model, transport, _) =
			authorized_model(vec![Ok(ResponseBody::Json(serde_json::json!({ "profile": {} })))])
				.await;
		let info = model.job_info("~01x").await.expect("Job info should load.");

		assert!(info.get("profile").is_some());
		assert!(transport.seen.lock()[0].url.path().ends_with("/jobs/~01x.json"));
		assert!(matches!(model.job_info("").await, Err(Error::MissingParameter("id"))));
	}
}
