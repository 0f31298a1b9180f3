use anyhow::anyhow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::warn;

mod v1alpha;

pub mod prelude {
    pub use crate::models::v1alpha::prelude::*;
    pub use crate::models::{HelpMetadata, InternalModel, ModelMetadata, ModelRoot};
}

/// Metadata shared by every resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct ModelMetadata {
    /// Name of the resource, unique per `kind`.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Short text shown by `bug-report list`.
    pub description: Option<String>,

    #[serde(skip)]
    #[schemars(skip)]
    pub file_path: Option<String>,
}

impl ModelMetadata {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn file_path(&self) -> String {
        self.file_path.clone().unwrap_or_else(|| "unknown".to_string())
    }

    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "Description not provided".to_string())
    }
}

/// A resource as read from disk, before its `kind` is known.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelRoot<V> {
    pub api_version: String,
    pub kind: String,
    pub metadata: ModelMetadata,
    pub spec: V,
}

impl<V> ModelRoot<V> {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.kind, self.metadata.name)
    }
}

pub trait HelpMetadata {
    fn metadata(&self) -> &ModelMetadata;
    fn full_name(&self) -> String;
    fn name(&self) -> &str {
        &self.metadata().name
    }
    fn file_path(&self) -> String {
        self.metadata().file_path()
    }
    fn description(&self) -> String {
        self.metadata().description()
    }
}

pub trait InternalModel: JsonSchema + Serialize + for<'a> Deserialize<'a> {
    fn int_api_version() -> String;
    fn int_kind() -> String;

    /// Parse `input` when it has this model's `apiVersion` and `kind`. Schema mismatches are
    /// reported but don't stop parsing, serde has the last word.
    fn known_type(input: &ModelRoot<Value>) -> anyhow::Result<Option<Self>> {
        if Self::int_api_version().to_lowercase() != input.api_version.to_lowercase()
            || Self::int_kind().to_lowercase() != input.kind.to_lowercase()
        {
            return Ok(None);
        }

        let value = serde_json::to_value(input)?;
        if let Err(e) = Self::validate_resource(&value) {
            warn!(target: "user", "Resource '{}' didn't match the schema for {}. {}", input.full_name(), Self::int_kind(), e);
        }

        let mut parsed = serde_json::from_value::<Self>(value)?;
        parsed.set_file_path(input.metadata.file_path.clone());
        Ok(Some(parsed))
    }

    fn set_file_path(&mut self, file_path: Option<String>);

    fn validate_resource(input: &serde_json::Value) -> anyhow::Result<()> {
        let schema = serde_json::to_value(schemars::schema_for!(Self))?;
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| anyhow!("Internal schema is invalid. {}", e))?;

        let error_messages: Vec<String> = validator
            .iter_errors(input)
            .map(|e| e.to_string())
            .collect();
        if error_messages.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(error_messages.join("\n")))
        }
    }
}
