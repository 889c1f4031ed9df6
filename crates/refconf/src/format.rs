//! document codecs
use crate::error::{Error, Result};
use crate::value::{Map, Value};
use std::path::Path;

/// On-disk representation of a document
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    /// File extensions (without the dot) accepted for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yml", "yaml"],
            Format::Json => &["json"],
        }
    }

    /// Glob used by `builder:` references that do not name one
    pub fn default_glob(&self) -> &'static str {
        match self {
            Format::Yaml => "**/*.yml",
            Format::Json => "**/*.json",
        }
    }

    /// Test if `name` ends with one of [Format::extensions]
    pub fn matches_extension(&self, name: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| name.strip_suffix(ext).is_some_and(|rest| rest.ends_with('.')))
    }

    /// Decode any value
    pub fn parse(&self, contents: &[u8]) -> Result<Value, String> {
        match self {
            Format::Yaml => serde_yaml::from_slice::<serde_yaml::Value>(contents)
                .map(Into::into)
                .map_err(|e| e.to_string()),
            Format::Json => serde_json::from_slice::<serde_json::Value>(contents)
                .map(Into::into)
                .map_err(|e| e.to_string()),
        }
    }

    /// Decode a document, its root must be a mapping
    pub fn parse_document(&self, path: &Path, contents: &[u8]) -> Result<Map> {
        let value = self.parse(contents).map_err(|message| Error::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Structural(path.to_path_buf())),
        }
    }

    pub fn serialize(&self, document: &Map) -> Result<String> {
        match self {
            Format::Yaml => {
                serde_yaml::to_string(document).map_err(|e| Error::Serialize(e.to_string()))
            }
            Format::Json => serde_json::to_string_pretty(document)
                .map(|mut json| {
                    json.push('\n');
                    json
                })
                .map_err(|e| Error::Serialize(e.to_string())),
        }
    }

    /// Header for generated files, if the format has comments
    pub fn banner(&self, glob: &str, target: &Path) -> Option<String> {
        match self {
            Format::Yaml => Some(format!(
                "# Don't modify this file, it will be automatically recreated\n\
                 # from '{glob}'\n\
                 # (excluding '{}')\n",
                target.display()
            )),
            Format::Json => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Json => f.write_str("json"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn banner_is_not_data() {
        let banner = Format::Yaml
            .banner("items/*.yml", Path::new("items.yml"))
            .unwrap();
        let contents = format!("{banner}items:\n- a\n- b\n");

        let map = Format::Yaml
            .parse_document(Path::new("items.yml"), contents.as_bytes())
            .unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["items"], Value::from(vec!["a", "b"]));
    }

    #[test]
    fn root_must_be_mapping() {
        for source in ["- item one\n- item two\n", "just a string"] {
            let error = Format::Yaml
                .parse_document(Path::new("bad.yml"), source.as_bytes())
                .unwrap_err();
            assert!(matches!(error, Error::Structural(_)), "{source:?}");
            assert_eq!(
                error.to_string(),
                "Invalid document 'bad.yml': must be a mapping"
            );
        }
    }

    #[test]
    fn parse_errors_name_the_file() {
        let error = Format::Yaml
            .parse_document(Path::new("bad.yml"), b"key: value\nother: [invalid: yaml: here]\n")
            .unwrap_err();
        assert!(error
            .to_string()
            .starts_with("Failed to parse file 'bad.yml': "));
    }

    #[test]
    fn json_documents() {
        let map = Format::Json
            .parse_document(Path::new("a.json"), br#"{"b": [1, 2.5]}"#)
            .unwrap();
        assert_eq!(
            map["b"],
            Value::Array(vec![Value::Integer(1), Value::Decimal(2.5)])
        );

        let rendered = Format::Json.serialize(&map).unwrap();
        assert_eq!(rendered, "{\n  \"b\": [\n    1,\n    2.5\n  ]\n}\n");
        assert!(Format::Json.banner("*.json", Path::new("a.json")).is_none());
    }

    #[test]
    fn extensions() {
        assert!(Format::Yaml.matches_extension("demo.yml"));
        assert!(Format::Yaml.matches_extension("dir/demo.yaml"));
        assert!(!Format::Yaml.matches_extension("demo.ini"));
        assert!(!Format::Yaml.matches_extension("yml"));
        assert!(Format::Json.matches_extension("x.json"));
    }
}
