//! Presets and form field values.
//!
//! A preset is a server-defined template: which job type it maps to,
//! which provider network runs it, what it costs, and the ordered list
//! of user-fillable fields.  This module also builds the submission
//! payload (`POST /jobs` body) from a preset plus filled values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single user-fillable field of a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetField {
    pub name: String,
    pub label: String,
    /// `string`, `number`, or `boolean`.
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    /// Allowed values, when the field is an enumeration.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<FieldValue>>,
}

/// Server-defined job template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub label: String,
    /// Job category submitted as the `type` of the create request.
    pub job_type: String,
    /// Provider network the job targets.
    pub network_id: String,
    /// Price in credits, when the service advertises one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Advisory completion estimate for progress display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,
    /// Per-preset status poll cadence hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_seconds: Option<f64>,
    /// Per-preset overall deadline hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub fields: Vec<PresetField>,
}

/// A filled form value: string, number, or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Whether the value counts as "empty" and should be omitted from
    /// the submission payload.  Mirrors the form behavior: empty
    /// strings are dropped, `false` and `0` are kept.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateRequest {
    /// Job category, from [`Preset::job_type`].
    #[serde(rename = "type")]
    pub job_type: String,
    pub payload: JobCreatePayload,
}

/// Inner payload of a job creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreatePayload {
    pub network_id: String,
    pub params: BTreeMap<String, FieldValue>,
}

impl Preset {
    /// Initial form values: field defaults where present, `false` for
    /// booleans without a default.  Fields with no usable default are
    /// absent from the map.
    pub fn initial_values(&self) -> BTreeMap<String, FieldValue> {
        let mut values = BTreeMap::new();
        for field in &self.fields {
            if let Some(default) = &field.default {
                values.insert(field.name.clone(), default.clone());
            } else if field.field_type == "boolean" {
                values.insert(field.name.clone(), FieldValue::Bool(false));
            }
        }
        values
    }

    /// Build the creation request from filled values.
    ///
    /// Empty values are dropped; a missing or empty required field is
    /// a [`CoreError::Validation`].  Values for fields the preset does
    /// not declare pass through untouched -- the server owns the schema.
    pub fn build_request(
        &self,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<JobCreateRequest, CoreError> {
        for field in &self.fields {
            if !field.required {
                continue;
            }
            match values.get(&field.name) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Required field '{}' is missing",
                        field.name
                    )));
                }
            }
        }

        let params: BTreeMap<String, FieldValue> = values
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(JobCreateRequest {
            job_type: self.job_type.clone(),
            payload: JobCreatePayload {
                network_id: self.network_id.clone(),
                params,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn image_preset() -> Preset {
        serde_json::from_value(serde_json::json!({
            "id": "img-basic",
            "label": "Image",
            "job_type": "image",
            "network_id": "n1",
            "eta_seconds": 45,
            "fields": [
                {"name": "prompt", "label": "Prompt", "type": "string", "required": true},
                {"name": "quality", "label": "Quality", "type": "string", "required": false,
                 "default": "standard", "enum": ["standard", "hd"]},
                {"name": "translate_input", "label": "Translate", "type": "boolean", "required": false},
            ],
        }))
        .unwrap()
    }

    #[test]
    fn initial_values_use_defaults_and_bool_false() {
        let values = image_preset().initial_values();
        assert_eq!(values.get("quality"), Some(&FieldValue::from("standard")));
        assert_eq!(values.get("translate_input"), Some(&FieldValue::Bool(false)));
        assert!(!values.contains_key("prompt"));
    }

    #[test]
    fn build_request_drops_empty_and_keeps_network_id() {
        let preset = image_preset();
        let mut values = preset.initial_values();
        values.insert("prompt".into(), FieldValue::from("cat"));
        values.insert("quality".into(), FieldValue::from(""));

        let request = preset.build_request(&values).unwrap();
        assert_eq!(request.job_type, "image");
        assert_eq!(request.payload.network_id, "n1");
        assert_eq!(request.payload.params.get("prompt"), Some(&FieldValue::from("cat")));
        assert!(!request.payload.params.contains_key("quality"));
        // false is a value, not an omission
        assert_eq!(
            request.payload.params.get("translate_input"),
            Some(&FieldValue::Bool(false))
        );
    }

    #[test]
    fn build_request_rejects_missing_required() {
        let preset = image_preset();
        let values = preset.initial_values(); // no prompt
        assert_matches!(preset.build_request(&values), Err(CoreError::Validation(_)));
    }

    #[test]
    fn build_request_serializes_to_expected_wire_shape() {
        let preset = image_preset();
        let mut values = BTreeMap::new();
        values.insert("prompt".into(), FieldValue::from("cat"));

        let request = preset.build_request(&values).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["payload"]["network_id"], "n1");
        assert_eq!(json["payload"]["params"]["prompt"], "cat");
    }
}
