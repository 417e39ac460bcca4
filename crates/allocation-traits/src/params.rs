//! Parameter values and the resolved parameter set handed to strategies.
//!
//! Callers supply loosely typed [`ParamValue`]s. The allocator coerces them to
//! the declared [`ParamType`] and hands the strategy a fully resolved
//! [`Params`] set, from which it reads values with typed accessors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;

/// Raw parameter values as supplied by a caller, keyed by name.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// The declared type of a strategy parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean flag.
    Bool,
    /// Free-form string.
    Str,
}

impl ParamType {
    /// Coerce a value to this type.
    ///
    /// Returns `None` when the value cannot be represented. [`ParamValue::None`]
    /// never coerces; callers decide whether an absent value is acceptable.
    ///
    /// # Example
    ///
    /// ```
    /// use allocation_traits::{ParamType, ParamValue};
    ///
    /// assert_eq!(ParamType::Int.coerce(&ParamValue::Str("42".into())), Some(ParamValue::Int(42)));
    /// assert_eq!(ParamType::Float.coerce(&ParamValue::Int(2)), Some(ParamValue::Float(2.0)));
    /// assert_eq!(ParamType::Int.coerce(&ParamValue::Float(1.5)), None);
    /// ```
    #[must_use]
    pub fn coerce(self, value: &ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (_, ParamValue::None) => None,

            (Self::Int, ParamValue::Int(i)) => Some(ParamValue::Int(*i)),
            (Self::Int, ParamValue::Float(f)) => float_to_int(*f).map(ParamValue::Int),
            (Self::Int, ParamValue::Bool(b)) => Some(ParamValue::Int(i64::from(*b))),
            (Self::Int, ParamValue::Str(s)) => s.trim().parse().ok().map(ParamValue::Int),

            (Self::Float, ParamValue::Float(f)) => Some(ParamValue::Float(*f)),
            (Self::Float, ParamValue::Int(i)) => Some(ParamValue::Float(*i as f64)),
            (Self::Float, ParamValue::Str(s)) => s.trim().parse().ok().map(ParamValue::Float),
            (Self::Float, ParamValue::Bool(_)) => None,

            (Self::Bool, ParamValue::Bool(b)) => Some(ParamValue::Bool(*b)),
            (Self::Bool, ParamValue::Int(0)) => Some(ParamValue::Bool(false)),
            (Self::Bool, ParamValue::Int(1)) => Some(ParamValue::Bool(true)),
            (Self::Bool, ParamValue::Str(s)) => parse_bool(s).map(ParamValue::Bool),
            (Self::Bool, ParamValue::Int(_) | ParamValue::Float(_)) => None,

            (Self::Str, ParamValue::Str(s)) => Some(ParamValue::Str(s.clone())),
            (Self::Str, ParamValue::Int(i)) => Some(ParamValue::Str(i.to_string())),
            (Self::Str, ParamValue::Float(f)) => Some(ParamValue::Str(f.to_string())),
            (Self::Str, ParamValue::Bool(b)) => Some(ParamValue::Str(b.to_string())),
        }
    }

    /// Lowercase name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// A single parameter value.
///
/// Deserializes from untyped JSON scalars; `null` maps to [`ParamValue::None`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    Str(String),
    /// Explicitly absent ("no value") marker.
    None,
}

impl ParamValue {
    /// Whether this is the explicit absent marker.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The natural type of this value, or `None` for the absent marker.
    #[must_use]
    pub const fn param_type(&self) -> Option<ParamType> {
        match self {
            Self::Int(_) => Some(ParamType::Int),
            Self::Float(_) => Some(ParamType::Float),
            Self::Bool(_) => Some(ParamType::Bool),
            Self::Str(_) => Some(ParamType::Str),
            Self::None => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::None => f.write_str("None"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

/// Build a [`ParamMap`] from `name => value` pairs.
///
/// ```
/// use allocation_traits::{params, ParamValue};
///
/// let map = params! { "seed" => 42, "label" => "fast", "cap" => None::<f64> };
/// assert_eq!(map["seed"], ParamValue::Int(42));
/// assert!(map["cap"].is_none());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParamMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ParamMap::new();
        $(
            map.insert(::std::string::String::from($name), $crate::ParamValue::from($value));
        )+
        map
    }};
}

/// The fully resolved parameter set a strategy is constructed from.
///
/// Every declared parameter is present: supplied values have been coerced to
/// their declared type and omitted ones replaced by their default. Optional
/// parameters without a default hold [`ParamValue::None`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: ParamMap,
}

impl Params {
    /// Create a resolved set from already-validated values.
    #[must_use]
    pub const fn new(values: ParamMap) -> Self {
        Self { values }
    }

    /// Raw access to a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Whether a parameter is present (it may still hold `None`).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume and return the underlying map.
    #[must_use]
    pub fn into_inner(self) -> ParamMap {
        self.values
    }

    fn require(&self, name: &str) -> Result<&ParamValue, StrategyError> {
        self.values
            .get(name)
            .ok_or_else(|| StrategyError::msg(format!("parameter '{name}' was not declared")))
    }

    /// Read an integer parameter.
    pub fn int(&self, name: &str) -> Result<i64, StrategyError> {
        match self.require(name)? {
            ParamValue::Int(i) => Ok(*i),
            other => Err(mismatch(name, ParamType::Int, other)),
        }
    }

    /// Read a non-negative integer parameter as `usize`.
    pub fn usize(&self, name: &str) -> Result<usize, StrategyError> {
        let value = self.int(name)?;
        usize::try_from(value).map_err(|_| negative(name, value))
    }

    /// Read a float parameter. Integers are widened.
    pub fn float(&self, name: &str) -> Result<f64, StrategyError> {
        match self.require(name)? {
            ParamValue::Float(f) => Ok(*f),
            ParamValue::Int(i) => Ok(*i as f64),
            other => Err(mismatch(name, ParamType::Float, other)),
        }
    }

    /// Read a boolean parameter.
    pub fn bool(&self, name: &str) -> Result<bool, StrategyError> {
        match self.require(name)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(mismatch(name, ParamType::Bool, other)),
        }
    }

    /// Read a string parameter.
    pub fn str(&self, name: &str) -> Result<&str, StrategyError> {
        match self.require(name)? {
            ParamValue::Str(s) => Ok(s),
            other => Err(mismatch(name, ParamType::Str, other)),
        }
    }

    /// Read an optional integer parameter. Undeclared and `None` both yield `None`.
    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, StrategyError> {
        match self.values.get(name) {
            None | Some(ParamValue::None) => Ok(None),
            Some(_) => self.int(name).map(Some),
        }
    }

    /// Read an optional non-negative integer as `u64`, the usual shape of a seed.
    pub fn optional_u64(&self, name: &str) -> Result<Option<u64>, StrategyError> {
        self.optional_int(name)?
            .map(|value| u64::try_from(value).map_err(|_| negative(name, value)))
            .transpose()
    }

    /// Read an optional float parameter. Undeclared and `None` both yield `None`.
    pub fn optional_float(&self, name: &str) -> Result<Option<f64>, StrategyError> {
        match self.values.get(name) {
            None | Some(ParamValue::None) => Ok(None),
            Some(_) => self.float(name).map(Some),
        }
    }
}

fn negative(name: &str, value: i64) -> StrategyError {
    StrategyError::msg(format!("parameter '{name}' must be non-negative, got {value}"))
}

fn mismatch(name: &str, expected: ParamType, value: &ParamValue) -> StrategyError {
    StrategyError::msg(format!("parameter '{name}' is not {expected}: {value}"))
}

impl From<ParamMap> for Params {
    fn from(values: ParamMap) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_int_coercion() {
        assert_eq!(ParamType::Int.coerce(&ParamValue::Int(5)), Some(ParamValue::Int(5)));
        assert_eq!(ParamType::Int.coerce(&ParamValue::Float(3.0)), Some(ParamValue::Int(3)));
        assert_eq!(ParamType::Int.coerce(&ParamValue::Float(3.5)), None);
        assert_eq!(ParamType::Int.coerce(&ParamValue::Float(f64::NAN)), None);
        assert_eq!(ParamType::Int.coerce(&ParamValue::Bool(true)), Some(ParamValue::Int(1)));
        assert_eq!(ParamType::Int.coerce(&" 12 ".into()), Some(ParamValue::Int(12)));
        assert_eq!(ParamType::Int.coerce(&"twelve".into()), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(ParamType::Float.coerce(&ParamValue::Int(2)), Some(ParamValue::Float(2.0)));
        assert_eq!(ParamType::Float.coerce(&"0.25".into()), Some(ParamValue::Float(0.25)));
        assert_eq!(ParamType::Float.coerce(&ParamValue::Bool(true)), None);
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(ParamType::Bool.coerce(&"Yes".into()), Some(ParamValue::Bool(true)));
        assert_eq!(ParamType::Bool.coerce(&ParamValue::Int(0)), Some(ParamValue::Bool(false)));
        assert_eq!(ParamType::Bool.coerce(&ParamValue::Int(2)), None);
        assert_eq!(ParamType::Bool.coerce(&"maybe".into()), None);
    }

    #[test]
    fn test_str_coercion() {
        assert_eq!(ParamType::Str.coerce(&ParamValue::Int(7)), Some("7".into()));
        assert_eq!(ParamType::Str.coerce(&ParamValue::Bool(false)), Some("false".into()));
    }

    #[test]
    fn test_none_never_coerces() {
        for ty in [ParamType::Int, ParamType::Float, ParamType::Bool, ParamType::Str] {
            assert_eq!(ty.coerce(&ParamValue::None), None);
        }
    }

    #[test]
    fn test_from_option() {
        assert_eq!(ParamValue::from(Some(42)), ParamValue::Int(42));
        assert_eq!(ParamValue::from(None::<i64>), ParamValue::None);
    }

    #[test]
    fn test_params_macro() {
        let map = params! { "a" => 1, "b" => 2.5, "c" => "x" };
        assert_eq!(map.len(), 3);
        assert_eq!(map["b"], ParamValue::Float(2.5));

        let empty = params! {};
        assert!(empty.is_empty());
    }

    #[test]
    fn test_params_accessors() {
        let params = Params::new(params! {
            "window" => 20,
            "risk" => 0.5,
            "long_only" => true,
            "label" => "core",
            "seed" => None::<i64>,
        });

        assert_eq!(params.usize("window").unwrap(), 20);
        assert_relative_eq!(params.float("risk").unwrap(), 0.5);
        assert_relative_eq!(params.float("window").unwrap(), 20.0);
        assert!(params.bool("long_only").unwrap());
        assert_eq!(params.str("label").unwrap(), "core");
        assert_eq!(params.optional_u64("seed").unwrap(), None);
        assert_eq!(params.optional_int("not_declared").unwrap(), None);

        assert!(params.int("label").is_err());
        assert!(params.int("missing").is_err());
    }

    #[test]
    fn test_negative_usize_rejected() {
        let params = Params::new(params! { "n" => -1, "seed" => -5 });
        assert!(params.usize("n").is_err());
        assert!(params.optional_u64("seed").is_err());
    }

    #[test]
    fn test_param_value_json() {
        let map: ParamMap =
            serde_json::from_str(r#"{"a": 1, "b": 1.5, "c": true, "d": "x", "e": null}"#).unwrap();
        assert_eq!(map["a"], ParamValue::Int(1));
        assert_eq!(map["b"], ParamValue::Float(1.5));
        assert_eq!(map["c"], ParamValue::Bool(true));
        assert_eq!(map["d"], ParamValue::Str("x".into()));
        assert_eq!(map["e"], ParamValue::None);
    }
}
