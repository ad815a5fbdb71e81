//! Declarative profile normalization.
//!
//! Providers return schema-less JSON documents. A [`FieldMap`] states, per provider,
//! which paths carry the identity fields and how the remaining data is flattened into
//! string pairs, so every provider shares a single lookup and missing-field code path.
//! Paths are dotted (`plan.name`) and address nested objects.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedIdentity, ProviderUserId},
	error::MalformedResponseError,
	provider::EndpointKind,
};

const JOIN_SEPARATOR: &str = ", ";

/// Errors raised while normalizing a profile.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProfileError {
	/// A required identity field is absent, null, blank, or not a scalar.
	#[error("Profile is missing the required `{field}` field.")]
	MissingField {
		/// Source path of the missing field.
		field: String,
	},
	/// The document root is not a JSON object.
	#[error("Profile document is not a JSON object.")]
	NotAnObject,
}

/// How a declared extra field is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
	/// Scalar stringified as-is; absent, null, or non-scalar values become an empty string.
	#[default]
	Scalar,
	/// Array of scalars joined with `", "`.
	Joined,
}

/// One declared entry of [`FieldMap::extra_fields`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
	/// Key written into the result's extra data.
	pub key: String,
	/// Dotted source path inside the profile document.
	pub source: String,
	/// Rendering applied to the value.
	#[serde(default)]
	pub shape: FieldShape,
}

/// Per-provider mapping from a raw profile to the canonical identity triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
	/// Path of the stable provider user id.
	pub provider_user_id: String,
	/// Path of the user name.
	pub user_name: String,
	/// Declared extra fields; always present in the output, empty when absent upstream.
	pub extra_fields: Vec<ExtraField>,
	/// Also copy every other top-level scalar (and array of scalars) into the extra data.
	pub collect_remaining: bool,
}
impl FieldMap {
	/// Creates a map with the given identity paths and no extra fields.
	pub fn new(provider_user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
		Self {
			provider_user_id: provider_user_id.into(),
			user_name: user_name.into(),
			extra_fields: Vec::new(),
			collect_remaining: false,
		}
	}

	/// Declares a scalar extra field.
	pub fn field(mut self, key: impl Into<String>, source: impl Into<String>) -> Self {
		self.extra_fields.push(ExtraField {
			key: key.into(),
			source: source.into(),
			shape: FieldShape::Scalar,
		});

		self
	}

	/// Declares a scalar extra field whose key equals its source path.
	pub fn same(self, key: &str) -> Self {
		self.field(key, key)
	}

	/// Declares an array field rendered as a comma-separated string.
	pub fn joined(mut self, key: impl Into<String>, source: impl Into<String>) -> Self {
		self.extra_fields.push(ExtraField {
			key: key.into(),
			source: source.into(),
			shape: FieldShape::Joined,
		});

		self
	}

	/// Copies every remaining top-level scalar into the extra data.
	pub fn collect_remaining(mut self) -> Self {
		self.collect_remaining = true;

		self
	}

	/// Normalizes `profile` according to this map.
	pub fn normalize(&self, profile: &RawProfile) -> Result<AuthenticatedIdentity, ProfileError> {
		normalize(profile, self)
	}
}
impl Default for FieldMap {
	fn default() -> Self {
		Self::new("id", "username")
	}
}

/// Untyped profile document returned by a provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawProfile(Map<String, Value>);
impl RawProfile {
	/// Wraps a JSON value, refusing anything that is not an object.
	pub fn new(value: Value) -> Result<Self, ProfileError> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			_ => Err(ProfileError::NotAnObject),
		}
	}

	/// Parses a profile response body.
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let value: Value = serde_path_to_error::deserialize(&mut de).map_err(|source| {
			MalformedResponseError::Json { endpoint: EndpointKind::Profile, source }
		})?;

		Ok(Self::new(value)?)
	}

	/// Looks up a dotted path.
	pub fn get(&self, path: &str) -> Option<&Value> {
		let mut segments = path.split('.');
		let mut current = self.0.get(segments.next()?)?;

		for segment in segments {
			current = current.as_object()?.get(segment)?;
		}

		Some(current)
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}

/// Maps `profile` into the canonical `(provider_user_id, user_name, extra_data)` triple.
pub fn normalize(
	profile: &RawProfile,
	map: &FieldMap,
) -> Result<AuthenticatedIdentity, ProfileError> {
	let provider_user_id = required(profile, &map.provider_user_id)?;
	let provider_user_id = ProviderUserId::new(provider_user_id)
		.map_err(|_| ProfileError::MissingField { field: map.provider_user_id.clone() })?;
	let user_name = required(profile, &map.user_name)?;
	let mut extra_data = BTreeMap::new();

	if map.collect_remaining {
		for (key, value) in profile.as_map() {
			if key == &map.provider_user_id || key == &map.user_name {
				continue;
			}
			if let Some(rendered) = render_loose(value) {
				extra_data.insert(key.clone(), rendered);
			}
		}
	}

	for field in &map.extra_fields {
		let rendered = match (field.shape, profile.get(&field.source)) {
			(_, None | Some(Value::Null)) => String::new(),
			(FieldShape::Joined, Some(Value::Array(items))) => join(items),
			(_, Some(value)) => scalar(value).unwrap_or_default(),
		};

		extra_data.insert(field.key.clone(), rendered);
	}

	Ok(AuthenticatedIdentity { provider_user_id, user_name, extra_data })
}

fn required(profile: &RawProfile, path: &str) -> Result<String, ProfileError> {
	profile
		.get(path)
		.and_then(scalar)
		.ok_or_else(|| ProfileError::MissingField { field: path.to_owned() })
}

fn scalar(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn render_loose(value: &Value) -> Option<String> {
	match value {
		Value::Null => Some(String::new()),
		Value::Array(items) => Some(join(items)),
		Value::Object(_) => None,
		other => scalar(other),
	}
}

fn join(items: &[Value]) -> String {
	items.iter().filter_map(scalar).collect::<Vec<_>>().join(JOIN_SEPARATOR)
}
