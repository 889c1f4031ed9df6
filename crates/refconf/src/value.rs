//! value representation
//!
//! The refconf document model contains the following data types
//! - null
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Parsed documents are converted into this model right after decoding, so the rest of the crate never sees
//! format specific trees. Non-string map keys are rendered as strings and integers that do not fit into `i64`
//! become decimals. That conversion is lossy: a document holding `18446744073709551615` is written back as a
//! float.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Order-preserving mapping, the root of every document
pub type Map = indexmap::IndexMap<String, Value>;

/// All possible value types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// every integer is also a decimal
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Merge `overrides` on top of `defaults`
    ///
    /// Objects are merged key by key, recursively. Any other value (arrays included) in `overrides` replaces the
    /// one in `defaults`.
    pub fn deep_merge(defaults: Map, overrides: Map) -> Map {
        let mut merged = defaults;
        for (key, value) in overrides {
            let value = match (merged.get_mut(&key), value) {
                (Some(Value::Object(base)), Value::Object(top)) => {
                    Value::Object(Value::deep_merge(std::mem::take(base), top))
                }
                (_, value) => value,
            };
            merged.insert(key, value);
        }
        merged
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_yaml::Number> for Value {
    fn from(value: serde_yaml::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }

        value.as_f64().map(Value::Decimal).unwrap_or(Value::Null)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Value {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => b.into(),
            Yaml::Number(n) => n.into(),
            Yaml::String(s) => s.into(),
            Yaml::Sequence(seq) => seq.into(),
            Yaml::Mapping(mapping) => Value::Object(
                mapping
                    .into_iter()
                    .map(|(k, v)| (yaml_key(k), v.into()))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => tagged.value.into(),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => b.into(),
            Json::Number(n) => match n.as_i64() {
                Some(int) => Value::Integer(int),
                None => n.as_f64().map(Value::Decimal).unwrap_or(Value::Null),
            },
            Json::String(s) => s.into(),
            Json::Array(array) => array.into(),
            Json::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect(),
            ),
        }
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(source: &str) -> Value {
        serde_yaml::from_str::<serde_yaml::Value>(source)
            .expect("valid yaml")
            .into()
    }

    #[test]
    fn yaml_scalars() {
        let value = yaml("{a: 1, b: 2.5, c: text, d: true, e: ~}");
        let object = value.as_object().unwrap();

        assert_eq!(object["a"], Value::Integer(1));
        assert_eq!(object["b"], Value::Decimal(2.5));
        assert_eq!(object["c"], Value::from("text"));
        assert_eq!(object["d"], Value::Boolean(true));
        assert!(object["e"].is_null());
    }

    #[test]
    fn yaml_keys_become_strings() {
        let value = yaml("{1: one, true: yes_, ~: nothing}");
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["1", "true", "null"]);
    }

    #[test]
    fn yaml_tags_are_dropped() {
        let value = yaml("!custom {inner: 1}");
        assert_eq!(value.as_object().unwrap()["inner"], Value::Integer(1));
    }

    #[test]
    fn yaml_integers_beyond_i64() {
        let value = yaml("{max: 9223372036854775807, beyond: 18446744073709551615}");
        let object = value.as_object().unwrap();

        assert_eq!(object["max"], Value::Integer(i64::MAX));
        assert_eq!(object["beyond"], Value::Decimal(u64::MAX as f64));
    }

    #[test]
    fn json_numbers() {
        let value: Value = serde_json::json!({"small": 3, "big": u64::MAX, "float": 0.5}).into();
        let object = value.as_object().unwrap();

        assert_eq!(object["small"], Value::Integer(3));
        assert_eq!(object["big"], Value::Decimal(u64::MAX as f64));
        assert_eq!(object["float"].as_f64(), Some(0.5));
    }

    #[test]
    fn serialize_preserves_order() {
        let value = yaml("{zeta: 1, alpha: [x, ~]}");
        let rendered = serde_yaml::to_string(&value).unwrap();
        assert_eq!(rendered, "zeta: 1\nalpha:\n- x\n- null\n");
    }

    #[test]
    fn deep_merge() {
        let defaults = yaml("{a: {x: 1, y: 2}, list: [1, 2], keep: yes_}");
        let overrides = yaml("{a: {y: 3, z: 4}, list: [9]}");

        let merged = Value::deep_merge(
            defaults.as_object().unwrap().clone(),
            overrides.as_object().unwrap().clone(),
        );

        assert_eq!(
            Value::Object(merged),
            yaml("{a: {x: 1, y: 3, z: 4}, list: [9], keep: yes_}")
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::from(vec![1i64]).kind(), "array");
        assert_eq!(Value::Object(Map::new()).kind(), "object");
        assert_eq!(Value::from("s").kind(), "string");
    }
}
