//! # Configuration Module (`config`)
//!
//! Configurable types declare their hyperparameters as named [`Property`]
//! values. Each type owns one [`OptionSet`]: its own declarations merged with
//! the sets of the types it explicitly inherits from, the most derived
//! declaration winning. The set is built once per type and cached in a
//! `static OnceLock` (see [`registered`]).
//!
//! An instance is created from keyword configuration. Every name is checked
//! against the set before any value is looked at, so a single unknown name
//! fails the whole construction.
//!
//! ```
//! use std::sync::OnceLock;
//! use neuropt_core::config::{registered, Config, Configurable, OptionSet, Property, PropertyKind};
//! use neuropt_core::NeuroptError;
//!
//! struct Decay {
//!     rate: f64,
//! }
//!
//! impl Configurable for Decay {
//!     fn options() -> Result<&'static OptionSet, NeuroptError> {
//!         static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
//!         registered(&OPTIONS, || {
//!             OptionSet::builder("Decay")
//!                 .declare("rate", Property::proper_fraction().default(0.5))
//!                 .build()
//!         })
//!     }
//!
//!     fn from_config(config: Config) -> Result<Self, NeuroptError> {
//!         Ok(Decay { rate: config.get_float("rate")? })
//!     }
//! }
//!
//! assert_eq!(Decay::configure([("rate", 0.25)]).unwrap().rate, 0.25);
//! assert!(Decay::configure([("rate", 2.0)]).is_err());
//! assert!(Decay::configure([("speed", 0.1)]).is_err());
//! ```
//!
//! Every configurable type must say where its options come from:
//!
//! ```compile_fail
//! use neuropt_core::config::{Config, Configurable};
//! use neuropt_core::NeuroptError;
//!
//! struct Incomplete;
//!
//! impl Configurable for Incomplete {
//!     fn from_config(_config: Config) -> Result<Self, NeuroptError> {
//!         Ok(Incomplete)
//!     }
//! }
//! ```

pub mod property;

pub use property::{OptionValue, Property, PropertyKind};

use crate::error::NeuroptError;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// The flattened, immutable set of options of one configurable type.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    owner: String,
    options: BTreeMap<String, Property>,
}

/// Collects parents and declarations for an [`OptionSet`].
#[derive(Debug, Clone)]
pub struct OptionSetBuilder {
    owner: String,
    inherited: BTreeMap<String, Property>,
    declared: BTreeMap<String, Property>,
}

impl OptionSetBuilder {
    /// Merges every option of `parent`. Later parents override earlier ones.
    pub fn inherit(mut self, parent: &OptionSet) -> Self {
        for (name, property) in &parent.options {
            self.inherited.insert(name.clone(), property.clone());
        }
        self
    }

    /// Declares an option of the type itself. Overrides any inherited one.
    pub fn declare(mut self, name: impl Into<String>, property: Property) -> Self {
        self.declared.insert(name.into(), property);
        self
    }

    /// Builds the set, checking every default against its own declaration.
    pub fn build(self) -> Result<OptionSet, NeuroptError> {
        let mut options = self.inherited;
        options.extend(self.declared);
        for (name, property) in &options {
            if let Some(default) = property.get_default() {
                property.validate(name, default.clone())?;
            }
        }
        log::debug!(
            "Option set for {} built with {} options: {:?}",
            self.owner,
            options.len(),
            options.keys().collect::<Vec<_>>()
        );
        Ok(OptionSet {
            owner: self.owner,
            options,
        })
    }
}

impl OptionSet {
    pub fn builder(owner: impl Into<String>) -> OptionSetBuilder {
        OptionSetBuilder {
            owner: owner.into(),
            inherited: BTreeMap::new(),
            declared: BTreeMap::new(),
        }
    }

    /// Name of the type owning the set.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Option names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.options.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Validates keyword configuration against the set.
    ///
    /// Unknown names are rejected before any value is validated. Options that
    /// are not supplied take their default; a required option without a value
    /// is an error.
    ///
    /// # Errors
    /// `InvalidOption`, `InvalidOptionValue`, `BoundViolation` or
    /// `MissingOption`.
    pub fn configure<I, K, V>(&self, kwargs: I) -> Result<Config, NeuroptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        let kwargs: Vec<(String, OptionValue)> = kwargs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

        if let Some((unknown, _)) = kwargs.iter().find(|(name, _)| !self.contains(name)) {
            return Err(NeuroptError::InvalidOption {
                option: unknown.clone(),
                owner: self.owner.clone(),
                available: self.options.keys().cloned().collect(),
            });
        }

        let mut values = BTreeMap::new();
        for (name, value) in kwargs {
            let property = self.options.get(&name).ok_or_else(|| {
                NeuroptError::InternalError(format!("option '{}' vanished during configuration", name))
            })?;
            let value = property.validate(&name, value)?;
            values.insert(name, value);
        }

        for (name, property) in &self.options {
            if values.contains_key(name) {
                continue;
            }
            match property.get_default() {
                Some(default) => {
                    values.insert(name.clone(), default.clone());
                }
                None if property.is_required() => {
                    return Err(NeuroptError::MissingOption {
                        option: name.clone(),
                        owner: self.owner.clone(),
                    });
                }
                None => {}
            }
        }

        Ok(Config {
            owner: self.owner.clone(),
            values,
        })
    }
}

/// Validated option values of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    owner: String,
    values: BTreeMap<String, OptionValue>,
}

impl Config {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }

    fn typed<T>(&self, name: &str, expected: &str, f: impl Fn(&OptionValue) -> Option<T>) -> Result<T, NeuroptError> {
        let value = self.values.get(name).ok_or_else(|| NeuroptError::MissingOption {
            option: name.to_string(),
            owner: self.owner.clone(),
        })?;
        f(value).ok_or_else(|| NeuroptError::InvalidOptionValue {
            option: name.to_string(),
            reason: format!("`{}` is not {}", value, expected),
        })
    }

    pub fn get_float(&self, name: &str) -> Result<f64, NeuroptError> {
        self.typed(name, "a float", OptionValue::as_f64)
    }

    pub fn get_int(&self, name: &str) -> Result<i64, NeuroptError> {
        self.typed(name, "an int", OptionValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, NeuroptError> {
        self.typed(name, "a bool", OptionValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Result<&str, NeuroptError> {
        let value = self.values.get(name).ok_or_else(|| NeuroptError::MissingOption {
            option: name.to_string(),
            owner: self.owner.clone(),
        })?;
        value.as_str().ok_or_else(|| NeuroptError::InvalidOptionValue {
            option: name.to_string(),
            reason: format!("`{}` is not a string", value),
        })
    }
}

/// A type whose instances are built from validated keyword configuration.
pub trait Configurable: Sized {
    /// The type's effective option set, built once and shared by every
    /// instance.
    fn options() -> Result<&'static OptionSet, NeuroptError>;

    /// Builds an instance from an already validated configuration.
    fn from_config(config: Config) -> Result<Self, NeuroptError>;

    /// Validates `kwargs` against [`Configurable::options`] and builds an
    /// instance.
    fn configure<I, K, V>(kwargs: I) -> Result<Self, NeuroptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        let config = Self::options()?.configure(kwargs)?;
        Self::from_config(config)
    }
}

/// Returns the option set cached in `cell`, building it with `init` on first
/// use. A failed build is cached too and reported on every call.
pub fn registered<F>(
    cell: &'static OnceLock<Result<OptionSet, NeuroptError>>,
    init: F,
) -> Result<&'static OptionSet, NeuroptError>
where
    F: FnOnce() -> Result<OptionSet, NeuroptError>,
{
    cell.get_or_init(init).as_ref().map_err(Clone::clone)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
