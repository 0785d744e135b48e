//! Spec Loader
//!
//! Reads an OpenAPI document from disk, replaces every `$ref` with a copy of
//! its target and hands back a typed [`Document`].
//!
//! Supported reference forms:
//!
//! - `#/components/responses/NotFound` (local JSON pointer)
//! - `common.yaml` (whole external file)
//! - `common.yaml#/responses/NotFound` (pointer into an external file)
//!
//! External files resolve relative to the file that refers to them and are
//! read once per load. A reference that points back into one of its own
//! ancestors is left as `{"$ref": ...}`; such cycles only occur inside
//! schemas, which coverage never looks at.

use crate::document::Document;
use crate::result::{ApicovError, ApicovResult};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Serialization format of a spec file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    /// `.json`
    Json,
    /// Everything else; YAML is a superset of JSON
    Yaml,
}

impl SpecFormat {
    /// Pick the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Load, dereference and type a spec file
pub fn load_spec(path: impl AsRef<Path>) -> ApicovResult<Document> {
    let path = path.as_ref();
    let value = load_dereferenced(path)?;
    let document = Document::from_value(&value);
    info!(
        spec = %path.display(),
        title = document.title().unwrap_or_default(),
        paths = document.paths().map_or(0, <[_]>::len),
        responses = document.response_slot_count(),
        "loaded OpenAPI spec"
    );
    Ok(document)
}

/// Load a spec file and resolve its references, without typing it
pub fn load_dereferenced(path: impl AsRef<Path>) -> ApicovResult<Value> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ApicovError::spec_not_found(path));
    }
    let root = canonical(path);
    let mut resolver = RefResolver::default();
    let value = resolver.file(&root)?;
    resolver.resolve(&value, &root)
}

/// Parse spec text in the given format into a JSON tree
pub fn parse_str(text: &str, format: SpecFormat) -> Result<Value, String> {
    match format {
        SpecFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        SpecFormat::Yaml => {
            let yaml: serde_yaml_ng::Value =
                serde_yaml_ng::from_str(text).map_err(|e| e.to_string())?;
            yaml_to_json(yaml)
        }
    }
}

/// Convert a YAML tree into a JSON tree, stringifying scalar mapping keys
fn yaml_to_json(value: serde_yaml_ng::Value) -> Result<Value, String> {
    use serde_yaml_ng::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let _ = object.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml_ng::Value) -> Result<String, String> {
    use serde_yaml_ng::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Split `file#/pointer` into its parts
fn split_ref(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

#[derive(Debug, Default)]
struct RefResolver {
    files: HashMap<PathBuf, Rc<Value>>,
    /// References currently being expanded, outermost first
    active: Vec<(PathBuf, String)>,
}

impl RefResolver {
    /// Parsed contents of a file, read at most once
    fn file(&mut self, path: &Path) -> ApicovResult<Rc<Value>> {
        if let Some(value) = self.files.get(path) {
            return Ok(Rc::clone(value));
        }
        debug!(file = %path.display(), "reading spec file");
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ApicovError::spec_unparseable(path, format!("referenced file not found: {e}"))
            }
            _ => ApicovError::Io(e),
        })?;
        let value = Rc::new(
            parse_str(&text, SpecFormat::from_path(path))
                .map_err(|message| ApicovError::spec_unparseable(path, message))?,
        );
        let _ = self.files.insert(path.to_path_buf(), Rc::clone(&value));
        Ok(value)
    }

    fn resolve(&mut self, value: &Value, file: &Path) -> ApicovResult<Value> {
        match value {
            Value::Object(object) => {
                if let Some(Value::String(reference)) = object.get("$ref") {
                    return self.expand(reference, value, file);
                }
                let mut resolved = Map::with_capacity(object.len());
                for (key, child) in object {
                    let _ = resolved.insert(key.clone(), self.resolve(child, file)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve(item, file))
                    .collect::<ApicovResult<_>>()?,
            )),
            other => Ok(other.clone()),
        }
    }

    fn expand(&mut self, reference: &str, original: &Value, file: &Path) -> ApicovResult<Value> {
        let (target_file, pointer) = split_ref(reference);
        let target_file = if target_file.is_empty() {
            file.to_path_buf()
        } else {
            canonical(
                &file
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(target_file),
            )
        };

        let key = (target_file, pointer.to_string());
        if self.active.contains(&key) {
            debug!(reference, "recursive $ref left in place");
            return Ok(original.clone());
        }

        let document = self.file(&key.0)?;
        let target = document.pointer(pointer).ok_or_else(|| {
            ApicovError::spec_unparseable(file, format!("unresolvable $ref '{reference}'"))
        })?;
        debug!(reference, "expanding $ref");

        let target_file = key.0.clone();
        self.active.push(key);
        let resolved = self.resolve(target, &target_file);
        let _ = self.active.pop();
        resolved
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SpecFormat::from_path(Path::new("a.json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("a.JSON")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("a.yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("a.yml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("spec")), SpecFormat::Yaml);
    }

    #[test]
    fn test_yaml_numeric_keys_become_strings() {
        let value = parse_str(
            "responses:\n  201:\n    description: ok\n  default:\n    description: x\n",
            SpecFormat::Yaml,
        )
        .unwrap();
        let keys: Vec<&String> = value["responses"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["201", "default"]);
    }

    #[test]
    fn test_yaml_keeps_key_order() {
        let value = parse_str("paths:\n  /z: {}\n  /a: {}\n  /m: {}\n", SpecFormat::Yaml).unwrap();
        let keys: Vec<&String> = value["paths"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn test_yaml_scalars() {
        let value = parse_str("a: 1\nb: -2\nc: 1.5\nd: true\ne: ~\ntrue: x\n", SpecFormat::Yaml).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], -2);
        assert_eq!(value["c"], 1.5);
        assert_eq!(value["d"], true);
        assert!(value["e"].is_null());
        assert_eq!(value["true"], "x");
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_str("{ not json", SpecFormat::Json).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_spec("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ApicovError::SpecNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_a_spec() {
        let dir = TempDir::new().unwrap();
        let err = load_spec(dir.path()).unwrap_err();
        assert!(matches!(err, ApicovError::SpecNotFound { .. }));
    }

    #[test]
    fn test_local_refs_are_copied() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "api.yaml",
            r"
paths:
  /a:
    get:
      responses:
        '200':
          $ref: '#/components/responses/Ok'
    post:
      responses:
        '200':
          $ref: '#/components/responses/Ok'
components:
  responses:
    Ok:
      description: fine
",
        );
        let value = load_dereferenced(&path).unwrap();
        assert_eq!(value["paths"]["/a"]["get"]["responses"]["200"]["description"], "fine");
        assert_eq!(value["paths"]["/a"]["post"]["responses"]["200"]["description"], "fine");
        assert!(value["paths"]["/a"]["get"]["responses"]["200"].get("$ref").is_none());
    }

    #[test]
    fn test_escaped_pointer() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "api.json",
            r##"{
  "paths": {
    "/a/{id}": { "get": { "responses": { "200": { "description": "item" } } } },
    "/b": { "$ref": "#/paths/~1a~1{id}" }
  }
}"##,
        );
        let value = load_dereferenced(&path).unwrap();
        assert_eq!(value["paths"]["/b"]["get"]["responses"]["200"]["description"], "item");
    }

    #[test]
    fn test_external_file_ref() {
        let dir = TempDir::new().unwrap();
        let _ = write(
            &dir,
            "common.yaml",
            "responses:\n  NotFound:\n    description: missing\n",
        );
        let path = write(
            &dir,
            "api.yaml",
            "paths:\n  /a:\n    get:\n      responses:\n        '404':\n          $ref: 'common.yaml#/responses/NotFound'\n",
        );
        let value = load_dereferenced(&path).unwrap();
        assert_eq!(value["paths"]["/a"]["get"]["responses"]["404"]["description"], "missing");
    }

    #[test]
    fn test_external_whole_file_ref() {
        let dir = TempDir::new().unwrap();
        let _ = write(&dir, "a.json", r#"{ "get": { "responses": { "200": {} } } }"#);
        let path = write(&dir, "api.yaml", "paths:\n  /a:\n    $ref: a.json\n");
        let document = load_spec(&path).unwrap();
        let a = &document.paths().unwrap()[0];
        assert_eq!(a.operations()[0].method(), "get");
    }

    #[test]
    fn test_recursive_ref_left_in_place() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "api.yaml",
            r"
components:
  schemas:
    Node:
      type: object
      properties:
        child:
          $ref: '#/components/schemas/Node'
paths:
  /a:
    get:
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Node'
",
        );
        let value = load_dereferenced(&path).unwrap();
        let schema = &value["paths"]["/a"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["properties"]["child"]["$ref"],
            "#/components/schemas/Node"
        );
    }

    #[test]
    fn test_unresolvable_ref() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "api.yaml",
            "paths:\n  /a:\n    $ref: '#/nowhere'\n",
        );
        let err = load_dereferenced(&path).unwrap_err();
        assert!(matches!(err, ApicovError::SpecUnparseable { .. }));
        assert!(err.to_string().contains("#/nowhere"));
    }

    #[test]
    fn test_missing_external_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "api.yaml", "paths:\n  /a:\n    $ref: gone.yaml\n");
        let err = load_dereferenced(&path).unwrap_err();
        assert!(matches!(err, ApicovError::SpecUnparseable { .. }));
        assert!(err.to_string().contains("referenced file not found"));
    }

    #[test]
    fn test_unreadable_spec_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.yaml");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let err = load_spec(&path).unwrap_err();
        assert!(matches!(err, ApicovError::Io(_)), "{err}");
    }

    #[test]
    fn test_unparseable_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "api.yaml", "paths: [unclosed\n");
        let err = load_spec(&path).unwrap_err();
        assert!(matches!(err, ApicovError::SpecUnparseable { .. }));
    }
}
