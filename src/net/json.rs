//! JSON extraction utilities for search envelopes and asset manifests.
//!
//! Paths use dot notation; numeric segments index into arrays, so
//! `"collection.items.0.href"` reaches the first item's href.
//!
//! # Examples
//!
//! ```rust
//! use nasa_media::net::json;
//! use serde_json::json;
//!
//! let data = json!({
//!     "collection": {
//!         "items": [{"href": "https://images-assets.nasa.gov/a/collection.json"}],
//!         "metadata": {"total_hits": 1}
//!     }
//! });
//!
//! let hits: u64 = json::extract_as(&data, "collection.metadata.total_hits").unwrap();
//! let href = json::extract_path(&data, "collection.items.0.href");
//! assert_eq!(hits, 1);
//! assert!(href.is_some());
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts a value from nested JSON using dot notation.
///
/// ```rust
/// use nasa_media::net::json;
/// use serde_json::json;
///
/// let data = json!({"collection": {"links": [{"href": "next-page"}]}});
///
/// let href = json::extract_path(&data, "collection.links.0.href");
/// assert_eq!(href.and_then(|v| v.as_str()), Some("next-page"));
/// assert_eq!(json::extract_path(&data, "collection.items"), None);
/// ```
pub fn extract_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;

    for key in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(key)?,
        };
    }

    Some(current)
}

/// Extracts and deserializes a value from a nested JSON path.
///
/// # Errors
///
/// * [`Error::Parse`](crate::Error::Parse) - If the path doesn't exist
/// * [`Error::Json`](crate::Error::Json) - If deserialization fails
pub fn extract_as<T>(json: &Value, path: &str) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    extract_path(json, path)
        .ok_or_else(|| crate::Error::parse(format!("Path not found: {}", path)))
        .and_then(|v| T::deserialize(v).map_err(Into::into))
}

/// The string entries of a top-level JSON array, in order.
///
/// Non-string entries are skipped; a non-array value yields nothing. This is
/// the shape of an asset manifest.
///
/// ```rust
/// use nasa_media::net::json;
/// use serde_json::json;
///
/// let manifest = json!(["http://a/orig.mp3", 42, "http://a/metadata.json"]);
/// assert_eq!(
///     json::string_entries(&manifest),
///     vec!["http://a/orig.mp3".to_string(), "http://a/metadata.json".to_string()]
/// );
/// ```
pub fn string_entries(json: &Value) -> Vec<String> {
    json.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
