use crate::error::NeuroptError;
use std::fmt;

/// Kind of value a [`Property`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Accepts any value unchanged.
    Any,
    /// Accepts floats and integers, integers are widened.
    Float,
    Int,
    Bool,
    Str,
    /// One of a fixed list of strings.
    Choice,
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Parses a value from its textual form.
    ///
    /// `true`/`false` become booleans, then integers and floats are tried;
    /// anything else is kept as a string.
    pub fn parse(text: &str) -> OptionValue {
        let text = text.trim();
        match text {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = text.parse::<i64>() {
            return OptionValue::Int(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return OptionValue::Float(f);
        }
        OptionValue::Str(text.to_string())
    }

    /// Splits a `name=value` assignment.
    ///
    /// # Errors
    /// Returns `InvalidOptionValue` if there is no `=` or the name is empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, OptionValue), NeuroptError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| NeuroptError::InvalidOptionValue {
                option: assignment.to_string(),
                reason: "expected `name=value`".to_string(),
            })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(NeuroptError::InvalidOptionValue {
                option: assignment.to_string(),
                reason: "option name is empty".to_string(),
            });
        }
        Ok((name.to_string(), OptionValue::parse(value)))
    }

    /// Numeric value, integers widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Float(_) => "float",
            OptionValue::Int(_) => "int",
            OptionValue::Bool(_) => "bool",
            OptionValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

/// Declaration of one named option: its kind, default and constraints.
///
/// ```
/// use neuropt_core::config::{Property, PropertyKind};
///
/// let step = Property::bounded(PropertyKind::Float).minval(0.0).default(0.1);
/// assert_eq!(step.get_minval(), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    kind: PropertyKind,
    default: Option<OptionValue>,
    required: bool,
    minval: Option<f64>,
    maxval: Option<f64>,
    choices: Vec<String>,
}

impl Property {
    pub fn new(kind: PropertyKind) -> Self {
        Property {
            kind,
            default: None,
            required: false,
            minval: None,
            maxval: None,
            choices: Vec::new(),
        }
    }

    /// A numeric property meant to carry `minval` and/or `maxval` bounds.
    pub fn bounded(kind: PropertyKind) -> Self {
        Self::new(kind)
    }

    /// A float in `[0, 1]`.
    pub fn proper_fraction() -> Self {
        Self::bounded(PropertyKind::Float).minval(0.0).maxval(1.0)
    }

    /// A string restricted to `choices`.
    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Property {
            choices: choices.into_iter().map(Into::into).collect(),
            ..Self::new(PropertyKind::Choice)
        }
    }

    pub fn default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Inclusive lower bound.
    pub fn minval(mut self, minval: f64) -> Self {
        self.minval = Some(minval);
        self
    }

    /// Inclusive upper bound.
    pub fn maxval(mut self, maxval: f64) -> Self {
        self.maxval = Some(maxval);
        self
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn get_default(&self) -> Option<&OptionValue> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_minval(&self) -> Option<f64> {
        self.minval
    }

    pub fn get_maxval(&self) -> Option<f64> {
        self.maxval
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Checks `value` against this declaration and returns it normalized
    /// (integers given to a float property become floats).
    ///
    /// # Errors
    /// * `InvalidOptionValue` if the value has the wrong kind or is not one
    ///   of the choices.
    /// * `BoundViolation` if a numeric value falls outside the bounds.
    pub fn validate(&self, option: &str, value: OptionValue) -> Result<OptionValue, NeuroptError> {
        let mismatch = |value: &OptionValue, expected: &str| NeuroptError::InvalidOptionValue {
            option: option.to_string(),
            reason: format!("expected {}, got {} `{}`", expected, value.type_name(), value),
        };

        let value = match (self.kind, value) {
            (PropertyKind::Any, v) => v,
            (PropertyKind::Float, OptionValue::Int(i)) => OptionValue::Float(i as f64),
            (PropertyKind::Float, v @ OptionValue::Float(_)) => v,
            (PropertyKind::Int, v @ OptionValue::Int(_)) => v,
            (PropertyKind::Bool, v @ OptionValue::Bool(_)) => v,
            (PropertyKind::Str, v @ OptionValue::Str(_)) => v,
            (PropertyKind::Choice, OptionValue::Str(s)) => {
                if !self.choices.contains(&s) {
                    return Err(NeuroptError::InvalidOptionValue {
                        option: option.to_string(),
                        reason: format!("`{}` is not one of {:?}", s, self.choices),
                    });
                }
                OptionValue::Str(s)
            }
            (PropertyKind::Float, v) => return Err(mismatch(&v, "float")),
            (PropertyKind::Int, v) => return Err(mismatch(&v, "int")),
            (PropertyKind::Bool, v) => return Err(mismatch(&v, "bool")),
            (PropertyKind::Str, v) => return Err(mismatch(&v, "string")),
            (PropertyKind::Choice, v) => return Err(mismatch(&v, "string")),
        };

        if let Some(x) = value.as_f64() {
            if !x.is_finite() && (self.minval.is_some() || self.maxval.is_some()) {
                return Err(NeuroptError::InvalidOptionValue {
                    option: option.to_string(),
                    reason: format!("bounded options must be finite, got {}", x),
                });
            }
            if let Some(min) = self.minval {
                if x < min {
                    return Err(NeuroptError::BoundViolation {
                        option: option.to_string(),
                        value: x,
                        bound: format!(">= {}", min),
                    });
                }
            }
            if let Some(max) = self.maxval {
                if x > max {
                    return Err(NeuroptError::BoundViolation {
                        option: option.to_string(),
                        value: x,
                        bound: format!("<= {}", max),
                    });
                }
            }
        }
        Ok(value)
    }
}
