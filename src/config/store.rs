//! Flat JSON key/value store that fills in missing entries with defaults.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::core::types::Result;

/// Backing store for [`super::EditConfig`].
///
/// Every getter falls back to the supplied default when the key is missing or
/// holds a value of the wrong type, and writes that default back so the saved
/// file lists every recognised option.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Read the store at `path`. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path.display());
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// In-memory store that is never read from disk
    pub fn in_memory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Map::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Set a raw value
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get_int(&mut self, key: &str, default: i64) -> i64 {
        let parsed = match self.values.get(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(v) => v,
            None => self.fall_back(key, Value::from(default), default),
        }
    }

    /// Accepts `true`, `"true"` in any case, `"1"` and `1`; other present values are false
    pub fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => self.fall_back(key, Value::Bool(default), default),
        }
    }

    /// Array of ids or a comma separated string; unparsable entries are skipped
    pub fn get_int_set(&mut self, key: &str, default: &[u16]) -> BTreeSet<u16> {
        match self.values.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s.split(',').filter_map(|part| part.trim().parse().ok()).collect(),
            _ => {
                let set: BTreeSet<u16> = default.iter().copied().collect();
                let value = Value::Array(set.iter().map(|id| Value::from(*id)).collect());
                self.fall_back(key, value, set)
            }
        }
    }

    /// Write the store as pretty JSON, creating parent directories
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn fall_back<T>(&mut self, key: &str, stored: Value, default: T) -> T {
        if self.values.contains_key(key) {
            log::warn!("Invalid value for '{}' in {}, using default", key, self.path.display());
        }
        self.values.insert(key.to_string(), stored);
        default
    }
}
