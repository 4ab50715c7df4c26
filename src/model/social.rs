//! Decoder for the `social_links` column.
//!
//! Rows carry this field in three shapes: a JSON object, a string holding a
//! JSON object, or a bare URL. Everything is folded into [`SocialLinks`] here
//! so callers never look at the raw value. Unusable input becomes `None`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocialLinks(pub BTreeMap<String, String>);

impl SocialLinks {
    pub fn get(&self, network: &str) -> Option<&str> {
        self.0.get(network).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode any raw column value. Never fails.
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Object(map) => Some(Self::from_object(map)),
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }

    fn from_object(map: &serde_json::Map<String, Value>) -> Self {
        let links = map
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect();
        SocialLinks(links)
    }

    fn from_text(s: &str) -> Option<Self> {
        let t = s.trim();
        if t.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(t) {
            Ok(Value::Object(map)) => Some(Self::from_object(&map)),
            Ok(_) => None,
            Err(_) if t.starts_with("http") => {
                let mut m = BTreeMap::new();
                m.insert("website".to_string(), t.to_string());
                Some(SocialLinks(m))
            }
            Err(_) => None,
        }
    }
}

/// `deserialize_with` hook for `Option<SocialLinks>` fields.
pub fn lenient<'de, D>(de: D) -> Result<Option<SocialLinks>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.as_ref().and_then(SocialLinks::from_value))
}
