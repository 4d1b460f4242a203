//! Cache Key Module
//!
//! Derives stable cache keys from an operation's identity and its arguments.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Prefix shared by every derived key, keeping memoized entries apart from
/// keys written directly through the manager.
pub const KEY_PREFIX: &str = "memo";

/// Expands to the fully-qualified path of a function, for use as a
/// memoization identity.
///
/// ```
/// fn load_report() {}
/// let id = memo_cache::fn_identity!(load_report);
/// assert!(id.ends_with("::load_report"));
/// ```
#[macro_export]
macro_rules! fn_identity {
    ($func:ident) => {
        concat!(module_path!(), "::", stringify!($func))
    };
}

// == Cache Key ==
/// A derived key of the form `memo:<identity>:<sha256 of canonical args>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for calling `identity` with `args`.
    ///
    /// `args` may be anything serializable: a tuple reads as positional
    /// arguments (order matters), a struct or map as named arguments (order
    /// does not). Arguments serde_json cannot represent are rejected with
    /// `UnsupportedArgument` rather than collapsed into a lossy key.
    pub fn derive<A: Serialize + ?Sized>(identity: &str, args: &A) -> Result<Self> {
        let value = serde_json::to_value(args)
            .map_err(|e| CacheError::UnsupportedArgument(format!("{}: {}", identity, e)))?;

        let mut canonical = String::new();
        write_canonical(&value, &mut canonical);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hex::encode(hasher.finalize());

        Ok(Self(format!("{}:{}:{}", KEY_PREFIX, identity, digest)))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Writes `value` as JSON with object keys in sorted order, independent of
/// how serde_json's map happens to be ordered.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// == Call Args ==
/// Positional and keyword arguments of a single call.
///
/// Positional arguments keep their order; keyword arguments are keyed by
/// name, so the order they are added in does not affect the derived key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallArgs {
    args: Vec<Value>,
    kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.args.push(argument_value(value)?);
        Ok(self)
    }

    /// Sets a keyword argument, replacing any earlier value for `name`.
    pub fn kwarg<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Result<Self> {
        let name = name.into();
        let value = argument_value(value)?;
        self.kwargs.insert(name, value);
        Ok(self)
    }

    /// Positional arguments in call order.
    pub fn positional(&self) -> &[Value] {
        &self.args
    }

    /// Keyword argument by name.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }
}

fn argument_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CacheError::UnsupportedArgument(e.to_string()))
}
