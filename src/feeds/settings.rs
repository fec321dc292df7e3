//! Persisted feed filter settings.

// self
use crate::{
	_prelude::*,
	http::decode_value,
	store::{KeyValueStore, StoreError},
};

/// Store key the settings map lives under.
pub const SETTINGS_KEY: &str = "settings";

/// Lower budget bound.
pub const BUDGET_FROM: &str = "budgetFrom";
/// Upper budget bound.
pub const BUDGET_TO: &str = "budgetTo";
/// Project duration filter.
pub const DURATION: &str = "duration";
/// Hourly/fixed filter.
pub const JOB_TYPE: &str = "jobType";
/// Workload filter.
pub const WORKLOAD: &str = "workload";
/// Category filter.
pub const CATEGORY: &str = "category2";
/// Notification interval in minutes.
pub const NOTIFY_INTERVAL: &str = "notifyInterval";
/// Start of the do-not-disturb window.
pub const DND_FROM: &str = "dndFrom";
/// End of the do-not-disturb window.
pub const DND_TO: &str = "dndTo";

/// Select value meaning "no restriction".
pub const ALL: &str = "All";

/// One setting entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingField {
	/// Current value (number or string).
	pub value: Value,
	/// Fields other than `value`, kept as stored.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl SettingField {
	/// Creates a field holding `value`.
	pub fn new(value: impl Into<Value>) -> Self {
		Self { value: value.into(), extra: BTreeMap::new() }
	}

	/// Renders the value the way query parameters expect it.
	pub fn display_value(&self) -> String {
		match &self.value {
			Value::String(text) => text.clone(),
			Value::Null => String::new(),
			other => other.to_string(),
		}
	}
}

/// Map of filter name to [`SettingField`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, SettingField>);
impl Settings {
	/// Looks up a field.
	pub fn field(&self, name: &str) -> Option<&SettingField> {
		self.0.get(name)
	}

	/// Display form of a field's value, falling back to the default for unknown names.
	pub fn text(&self, name: &str) -> String {
		match self.field(name) {
			Some(field) => field.display_value(),
			None => DEFAULT_SETTINGS
				.iter()
				.find(|(key, _)| *key == name)
				.map(|(_, value)| SettingField::new(value.to_json()).display_value())
				.unwrap_or_default(),
		}
	}

	/// Replaces one field's value, creating the field when absent.
	pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		let value = value.into();

		self.0
			.entry(name.into())
			.and_modify(|field| field.value = value.clone())
			.or_insert_with(|| SettingField::new(value));
	}

	/// Fills every missing default field.
	pub fn with_defaults(mut self) -> Self {
		for (name, field) in Self::default().0 {
			self.0.entry(name).or_insert(field);
		}

		self
	}
}
impl Default for Settings {
	fn default() -> Self {
		Self(
			DEFAULT_SETTINGS
				.iter()
				.map(|(name, value)| ((*name).to_owned(), SettingField::new(value.to_json())))
				.collect(),
		)
	}
}

#[derive(Clone, Copy)]
enum DefaultValue {
	Number(u64),
	Text(&'static str),
}
impl DefaultValue {
	fn to_json(self) -> Value {
		match self {
			Self::Number(number) => Value::from(number),
			Self::Text(text) => Value::from(text),
		}
	}
}

const DEFAULT_SETTINGS: [(&str, DefaultValue); 9] = [
	(BUDGET_FROM, DefaultValue::Number(0)),
	(BUDGET_TO, DefaultValue::Number(1_000_000)),
	(DURATION, DefaultValue::Text(ALL)),
	(JOB_TYPE, DefaultValue::Text(ALL)),
	(WORKLOAD, DefaultValue::Text(ALL)),
	(CATEGORY, DefaultValue::Text(ALL)),
	(NOTIFY_INTERVAL, DefaultValue::Number(0)),
	(DND_FROM, DefaultValue::Text("00:00")),
	(DND_TO, DefaultValue::Text("00:00")),
];

/// Reads and writes [`Settings`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SettingsModel {
	store: Arc<dyn KeyValueStore>,
}
impl SettingsModel {
	/// Creates a model over `store`.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// Persisted settings merged over the defaults.
	pub async fn get(&self) -> Result<Settings> {
		match self.store.get_one(SETTINGS_KEY).await? {
			Some(Value::Null) | None => Ok(Settings::default()),
			Some(value) => Ok(decode_value::<Settings>(value)?.with_defaults()),
		}
	}

	/// Replaces the persisted settings.
	pub async fn set(&self, settings: &Settings) -> Result<()> {
		let value = serde_json::to_value(settings)
			.map_err(|e| StoreError::Serialization { message: e.to_string() })?;

		self.store.set_one(SETTINGS_KEY, value).await?;

		Ok(())
	}

	/// Updates one field and persists the result.
	pub async fn change(&self, name: &str, value: impl Into<Value>) -> Result<Settings> {
		let mut settings = self.get().await?;

		settings.set_value(name, value);
		self.set(&settings).await?;

		Ok(settings)
	}
}
impl Debug for SettingsModel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("SettingsModel(..)")
	}
}
