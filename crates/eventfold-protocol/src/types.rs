//! The listing contract.
//!
//! A deployment answers listing requests with a [`ListResponse`] and fetches
//! remote deployments' listings in the same shape, so every type here is
//! both produced and consumed. Deserialization is lenient: remote
//! deployments run different versions and are not trusted to be tidy.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// An event id, numeric on most deployments but occasionally a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl Default for WireId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for WireId {
    /// Numeric strings become [`WireId::Number`].
    fn from(id: &str) -> Self {
        match id.parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(id.to_string()),
        }
    }
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Rendered text: `{"rendered": "..."}` or a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireText {
    Rendered { rendered: String },
    Plain(String),
}

impl WireText {
    /// Wraps text in the rendered form.
    pub fn rendered(text: impl Into<String>) -> Self {
        Self::Rendered {
            rendered: text.into(),
        }
    }

    /// Returns the text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rendered { rendered } => rendered,
            Self::Plain(text) => text,
        }
    }
}

impl Default for WireText {
    fn default() -> Self {
        Self::rendered("")
    }
}

/// A category or tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTerm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WireId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Event metadata. All values are strings on the wire; empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireMeta {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_end_date: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_start_time: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_end_time: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub service_body: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location_details: Option<String>,
}

/// One event as listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(default)]
    pub id: WireId,
    #[serde(default)]
    pub title: WireText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<WireText>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub meta: WireMeta,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub categories: Vec<WireTerm>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub tags: Vec<WireTerm>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub recurring: bool,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

/// Pagination block of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

/// A source that contributed to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl SourceInfo {
    /// Creates source metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Outcome of one source's fetch during a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Source id.
    pub id: String,
    /// Whether the fetch succeeded.
    pub healthy: bool,
    /// Error code, e.g. `timeout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Occurrences contributed after filtering.
    pub event_count: usize,
    /// Wall-clock time spent.
    pub elapsed_ms: u64,
}

impl SourceStatus {
    /// A successful fetch.
    pub fn healthy(id: impl Into<String>, event_count: usize, elapsed_ms: u64) -> Self {
        Self {
            id: id.into(),
            healthy: true,
            code: None,
            error: None,
            event_count,
            elapsed_ms,
        }
    }

    /// A failed fetch.
    pub fn failed(
        id: impl Into<String>,
        code: impl Into<String>,
        error: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            healthy: false,
            code: Some(code.into()),
            error: Some(error.into()),
            event_count: 0,
            elapsed_ms,
        }
    }
}

/// Response to a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub events: Vec<WireEvent>,
    #[serde(default)]
    pub sources: Vec<SourceInfo>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ListResponse {
    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Events decoded from a remote body, plus how many entries were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePayload {
    pub events: Vec<WireEvent>,
    pub skipped: usize,
}

impl RemotePayload {
    /// Decodes a remote listing body.
    ///
    /// Accepts the [`ListResponse`] envelope or a bare array of events.
    /// Entries that are not valid events are skipped and counted; a body
    /// that is neither shape is an error.
    pub fn from_slice(body: &[u8]) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut object) => match object.remove("events") {
                Some(Value::Array(entries)) => entries,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => {
                    return Err(ProtocolError::UnexpectedShape(
                        "`events` is not an array".to_string(),
                    ));
                }
            },
            _ => {
                return Err(ProtocolError::UnexpectedShape(
                    "expected an object or an array".to_string(),
                ));
            }
        };

        let mut payload = Self::default();
        for entry in entries {
            match serde_json::from_value::<WireEvent>(entry) {
                Ok(event) => payload.events.push(event),
                Err(_) => payload.skipped += 1,
            }
        }
        Ok(payload)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    })
}

/// Terms may be objects or bare slugs; `false` or `null` mean none.
fn lenient_terms<'de, D>(deserializer: D) -> Result<Vec<WireTerm>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(slug) => Some(WireTerm {
                name: slug.clone(),
                slug,
                ..WireTerm::default()
            }),
            other => serde_json::from_value::<WireTerm>(other).ok(),
        })
        .filter(|term| !term.slug.is_empty())
        .collect())
}
