use crate::constants;
use crate::error::Error;
use crate::error::Result;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use warp::http::StatusCode;

/// Flat mapping of field names to primitive JSON values,
/// the way documents are kept in the store and in the cache.
pub type Fields = Map<String, Value>;

/// The persisted entity.
///
/// Metadata assigned by the server is kept in named fields,
/// everything the client sent is kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Build an item from a stored document (a document never contains its own id).
    pub fn from_document(id: String, mut document: Fields) -> Result<Item> {
        document.insert("id".to_string(), Value::String(id));
        serde_json::from_value(Value::Object(document)).map_err(|err| Error {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            msg: format!("Stored document is not a valid item, {}", err),
        })
    }

    /// The document to store for this item: all fields and metadata, without the id.
    pub fn to_document(&self) -> Fields {
        let mut document = self.fields.clone();
        if let Some(created_at) = &self.created_at {
            document.insert("created_at".to_string(), timestamp_value(created_at));
        }
        if let Some(updated_at) = &self.updated_at {
            document.insert("updated_at".to_string(), timestamp_value(updated_at));
        }
        document
    }
}

pub fn timestamp_value(timestamp: &DateTime<Utc>) -> Value {
    Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Input payload for create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCreate {
    pub fields: Fields,
}

impl ItemCreate {
    /// Parse and validate a request body.
    pub fn from_json_bytes(body: &[u8]) -> Result<ItemCreate> {
        let deserializer = &mut serde_json::Deserializer::from_slice(body);
        let payload: ItemCreate = serde_path_to_error::deserialize(deserializer)?;
        payload.validate()?;
        Ok(payload)
    }

    /// Field names must be non-empty and not clash with server metadata
    /// or the client's injected fields. Field values must be primitive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.fields {
            if name.is_empty() {
                return Err(Error::validation("Field names cannot be empty".to_string()));
            }
            if constants::RESERVED_FIELDS.contains(&name.as_str()) {
                return Err(Error::validation(format!(
                    "Field '{}' is assigned by the server and cannot be set",
                    name
                )));
            }
            if name.starts_with(constants::RESERVED_FIELD_PREFIX) {
                return Err(Error::validation(format!(
                    "Field names starting with '{}' are reserved",
                    constants::RESERVED_FIELD_PREFIX
                )));
            }
            match value {
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::validation(format!(
                        "Field '{}' must be a string, number, boolean or null",
                        name
                    )))
                }
                _ => (),
            }
        }
        Ok(())
    }
}

impl From<Fields> for ItemCreate {
    fn from(fields: Fields) -> Self {
        ItemCreate { fields }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl Default for DeleteResponse {
    fn default() -> Self {
        DeleteResponse {
            message: constants::ITEM_DELETED.to_string(),
        }
    }
}

/// Body of every non-successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
