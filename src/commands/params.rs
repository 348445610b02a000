use serde_json::{Map, Value};

use crate::runtime::ViewerSession;

use super::{OpsError, Result};

pub(crate) fn get_required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| OpsError::InvalidParams(format!("missing string parameter `{key}`")))
}

pub(crate) fn get_optional_u64(params: &Value, key: &str) -> Result<Option<u64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            OpsError::InvalidParams(format!("`{key}` must be a non-negative integer"))
        }),
    }
}

pub(crate) fn get_optional_usize(params: &Value, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// ROI named by `roi_id`, falling back to the selected ROI.
pub(crate) fn target_roi_id(session: &ViewerSession, params: &Value) -> Result<u64> {
    let roi_id = get_optional_u64(params, "roi_id")?
        .or(session.editor().store().selected_roi_id)
        .ok_or_else(|| OpsError::InvalidParams("no ROI given and none selected".to_string()))?;
    if session.editor().store().get(roi_id).is_none() {
        return Err(OpsError::UnknownRoi(roi_id));
    }
    Ok(roi_id)
}

/// Serializes `base`, replaces every field present in `overrides` except
/// `skip`, and deserializes the result.
pub(crate) fn merge_fields<T>(base: &T, overrides: &Value, skip: &[&str]) -> Result<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let invalid = |error: serde_json::Error| OpsError::InvalidParams(error.to_string());
    let mut merged = serde_json::to_value(base).map_err(invalid)?;
    if let (Some(target), Some(source)) = (merged.as_object_mut(), overrides.as_object()) {
        let updates = source
            .iter()
            .filter(|(key, _)| !skip.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Map<_, _>>();
        target.extend(updates);
    }
    serde_json::from_value(merged).map_err(invalid)
}
