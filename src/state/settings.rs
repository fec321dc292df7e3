//! Settings state.

// self
use crate::{
	_prelude::*,
	feeds::{SettingField, Settings},
	state::Action,
};

/// Settings as shown by the settings screen; every field is shared independently.
#[derive(Clone, Debug, PartialEq)]
pub struct SettingsState {
	/// Field name to field.
	pub fields: Arc<BTreeMap<String, Arc<SettingField>>>,
}
impl SettingsState {
	/// Value of field `name`.
	pub fn value(&self, name: &str) -> Option<&Value> {
		self.fields.get(name).map(|field| &field.value)
	}

	/// Folds `action` into `state`.
	///
	/// `SETTINGS_CHANGE` for a name that is not part of the state leaves it untouched.
	pub fn reduce(state: &Arc<SettingsState>, action: &Action) -> Arc<SettingsState> {
		match action {
			Action::SettingsDefaultSet { data } => Arc::new(Self::from(data.clone())),
			Action::SettingsChange { name, value } => {
				let Some(current) = state.fields.get(name) else {
					tracing::warn!(name, "ignoring change of an unknown setting");

					return state.clone();
				};
				let mut fields = BTreeMap::clone(&state.fields);

				fields.insert(
					name.clone(),
					Arc::new(SettingField { value: value.clone(), ..SettingField::clone(current) }),
				);

				Arc::new(Self { fields: Arc::new(fields) })
			},
			_ => state.clone(),
		}
	}
}
impl Default for SettingsState {
	fn default() -> Self {
		Self::from(Settings::default())
	}
}
impl From<Settings> for SettingsState {
	fn from(settings: Settings) -> Self {
		Self {
			fields: Arc::new(
				settings.0.into_iter().map(|(name, field)| (name, Arc::new(field))).collect(),
			),
		}
	}
}
impl From<&SettingsState> for Settings {
	fn from(state: &SettingsState) -> Self {
		Settings(
			state.fields.iter().map(|(name, field)| (name.clone(), SettingField::clone(field))).collect(),
		)
	}
}
