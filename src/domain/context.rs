//! Context store: key/value state shared by the commands of one run
//!
//! Typed accessors come in pairs. The `try_*` form reports a present value of
//! the wrong kind as [`DomainError::TypeMismatch`]; the plain form treats that
//! as a programmer error and panics. Absent keys never fail: they yield the
//! supplied default or the accessor's sentinel (`None`, `false`, `-1`).

use std::any::Any;
use std::collections::HashMap;

use super::error::DomainError;
use super::value::Value;

/// Sentinel returned by [`ContextStore::get_int`] for an absent key.
pub const MISSING_INT: i64 = -1;

/// Read-only description of the application hosting a context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Namespace the command registry was built from.
    pub command_namespace: String,
}

impl HostInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Key/value bag carrying state across one application run.
///
/// Keys are case-sensitive; the last `put` for a key wins.
#[derive(Debug, Default)]
pub struct ContextStore {
    values: HashMap<String, Value>,
    host: HostInfo,
}

impl ContextStore {
    pub fn new(host: HostInfo) -> Self {
        Self {
            values: HashMap::new(),
            host,
        }
    }

    /// Metadata of the hosting application.
    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Store a value, returning the one it replaced.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Store every pair, later pairs overwriting earlier ones.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in pairs {
            self.put(k, v);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Raw lookup, no coercion.
    pub fn get_object(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ---- strings ----

    /// The stored value must literally be a string; no implicit conversion.
    pub fn try_get_string(&self, key: &str) -> Result<Option<&str>, DomainError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(key, other, "String")),
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.try_get_string(key).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn get_string_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_string(key).unwrap_or(default)
    }

    // ---- booleans ----

    /// Coerces via the string form; only `true`/`false` (any ASCII case) parse.
    /// Surrounding whitespace is part of the text and makes it a mismatch.
    pub fn try_get_bool(&self, key: &str) -> Result<Option<bool>, DomainError> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        let parsed = value.as_text().and_then(|text| {
            if text.eq_ignore_ascii_case("true") {
                Some(true)
            } else if text.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        });
        parsed
            .map(Some)
            .ok_or_else(|| mismatch(key, value, "Boolean"))
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_bool_or(key, false)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.try_get_bool(key)
            .unwrap_or_else(|e| panic!("{e}"))
            .unwrap_or(default)
    }

    // ---- integers ----

    /// Coerces via the string form, which must be exactly a decimal `i64`.
    pub fn try_get_int(&self, key: &str) -> Result<Option<i64>, DomainError> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        value
            .as_text()
            .and_then(|text| text.parse::<i64>().ok())
            .map(Some)
            .ok_or_else(|| mismatch(key, value, "Integer"))
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get_int_or(key, MISSING_INT)
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.try_get_int(key)
            .unwrap_or_else(|e| panic!("{e}"))
            .unwrap_or(default)
    }

    // ---- objects ----

    pub fn try_get_object_as<T: Any>(&self, key: &str) -> Result<Option<&T>, DomainError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => value
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| mismatch(key, value, std::any::type_name::<T>())),
        }
    }

    pub fn get_object_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.try_get_object_as::<T>(key)
            .unwrap_or_else(|e| panic!("{e}"))
    }
}

fn mismatch(key: &str, value: &Value, expected: &'static str) -> DomainError {
    DomainError::TypeMismatch {
        key: key.to_string(),
        value: format!("{value}"),
        expected,
    }
}

/// State handed to every command of an application.
///
/// Applications with extra typed state wrap a [`ContextStore`] in their own
/// struct and implement this trait; the rest can use `ContextStore` directly.
pub trait Context: 'static {
    fn store(&self) -> &ContextStore;

    fn store_mut(&mut self) -> &mut ContextStore;

    fn host(&self) -> &HostInfo {
        self.store().host()
    }
}

impl Context for ContextStore {
    fn store(&self) -> &ContextStore {
        self
    }

    fn store_mut(&mut self) -> &mut ContextStore {
        self
    }
}
