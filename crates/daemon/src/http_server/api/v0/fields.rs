//! Serde helpers for wire types.

/// Distinguishes "field absent" (no change) from "field null" (clear)
/// in partial-update request bodies. Wrap the field in a double option
/// with `#[serde(default, with = "double_option")]` plus a
/// `skip_serializing_if = "Option::is_none"`.
pub mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            // skipped by skip_serializing_if; serialize as null if not
            None => serializer.serialize_none(),
        }
    }
}
