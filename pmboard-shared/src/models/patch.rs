/// Partial-update support
///
/// Update payloads use `Option<T>` for plain fields (absent = keep) and
/// `Option<Option<T>>` for nullable columns, where the outer `None` means the
/// key was absent and `Some(None)` means an explicit `null` (clear the value).
///
/// serde collapses `null` into `None` for a bare `Option<Option<T>>`, so
/// nullable fields opt into [`double_option`]:
///
/// ```
/// use pmboard_shared::models::patch::double_option;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "double_option")]
///     estimated_hours: Option<Option<f64>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.estimated_hours, None);
///
/// let cleared: Patch = serde_json::from_str(r#"{"estimated_hours": null}"#).unwrap();
/// assert_eq!(cleared.estimated_hours, Some(None));
/// ```

use serde::{Deserialize, Deserializer};

/// Deserializes a present key into `Some(value)`, keeping `null` as `Some(None)`
///
/// Must be paired with `#[serde(default)]` so an absent key yields `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
