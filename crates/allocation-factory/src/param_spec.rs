//! Declarative description of a strategy's constructor parameters.

use std::collections::BTreeMap;
use std::fmt;

use allocation_traits::{AllocationError, ParamMap, ParamType, ParamValue, Params, Result};
use serde::{Deserialize, Serialize};

/// Default behaviour of a parameter when the caller omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDefault {
    /// The caller must supply a value.
    Required,
    /// Use this value when omitted.
    OptionalWithDefault(ParamValue),
    /// Omitted means absent: the strategy receives [`ParamValue::None`].
    OptionalAbsent,
}

/// Declaration of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    /// Expected type.
    pub ty: ParamType,
    /// Default behaviour.
    pub default: ParamDefault,
    /// Optional help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamInfo {
    /// Create a declaration without help text.
    #[must_use]
    pub const fn new(ty: ParamType, default: ParamDefault) -> Self {
        Self {
            ty,
            default,
            description: None,
        }
    }

    /// Whether the caller must supply this parameter.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.default, ParamDefault::Required)
    }
}

impl fmt::Display for ParamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            ParamDefault::Required => write!(f, "{} (required)", self.ty)?,
            ParamDefault::OptionalWithDefault(v) => write!(f, "{} = {v}", self.ty)?,
            ParamDefault::OptionalAbsent => write!(f, "{} = None (optional)", self.ty)?,
        }
        if let Some(description) = &self.description {
            write!(f, " - {description}")?;
        }
        Ok(())
    }
}

/// Mapping from parameter name to its declaration.
///
/// Built with the chained constructors or collected from
/// `(name, (type, default))` pairs.
///
/// # Example
///
/// ```
/// use allocation_factory::{ParamDefault, ParamSpec};
/// use allocation_traits::ParamType;
///
/// let spec = ParamSpec::new()
///     .with_default("min_observations", ParamType::Int, 1)
///     .optional("seed", ParamType::Int);
///
/// let same: ParamSpec = [
///     ("min_observations", (ParamType::Int, ParamDefault::OptionalWithDefault(1.into()))),
///     ("seed", (ParamType::Int, ParamDefault::OptionalAbsent)),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(spec, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    entries: BTreeMap<String, ParamInfo>,
}

impl ParamSpec {
    /// Create an empty set of parameter declarations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter with an explicit default behaviour.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: ParamType, default: ParamDefault) -> Self {
        self.entries.insert(name.into(), ParamInfo::new(ty, default));
        self
    }

    /// Declare a required parameter.
    #[must_use]
    pub fn required(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.param(name, ty, ParamDefault::Required)
    }

    /// Declare a parameter with a default value.
    #[must_use]
    pub fn with_default(
        self,
        name: impl Into<String>,
        ty: ParamType,
        default: impl Into<ParamValue>,
    ) -> Self {
        self.param(name, ty, ParamDefault::OptionalWithDefault(default.into()))
    }

    /// Declare an optional parameter that is absent unless supplied.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.param(name, ty, ParamDefault::OptionalAbsent)
    }

    /// Attach help text to an already declared parameter. Unknown names are ignored.
    #[must_use]
    pub fn describe(mut self, name: &str, description: impl Into<String>) -> Self {
        if let Some(info) = self.entries.get_mut(name) {
            info.description = Some(description.into());
        }
        self
    }

    /// Look up a declaration.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamInfo> {
        self.entries.get(name)
    }

    /// Whether a parameter is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check every default against its declared type and store the coerced
    /// form, so a default of `1` for a float parameter becomes `1.0`.
    ///
    /// # Errors
    ///
    /// [`AllocationError::InvalidDefault`] for the first default that does not
    /// coerce (an explicit `None` default must be declared as
    /// [`ParamDefault::OptionalAbsent`]).
    pub fn normalized(mut self) -> Result<Self> {
        for (name, info) in &mut self.entries {
            if let ParamDefault::OptionalWithDefault(value) = &info.default {
                let coerced = info.ty.coerce(value).ok_or_else(|| AllocationError::InvalidDefault {
                    name: name.clone(),
                    reason: format!("{value} is not a valid {}", info.ty),
                })?;
                info.default = ParamDefault::OptionalWithDefault(coerced);
            }
        }
        Ok(self)
    }

    /// Resolve caller-supplied values into a complete parameter set.
    ///
    /// Unknown names are rejected before anything else is looked at. Then
    /// every declared parameter is filled: supplied values are coerced,
    /// omitted ones take their default. An explicit [`ParamValue::None`] is
    /// passed through unchanged whatever the declaration; a strategy that
    /// cannot use it rejects it through its [`Params`] accessors.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::UnknownParameter`] for a name not declared here
    /// - [`AllocationError::MissingParameter`] for an omitted required parameter
    /// - [`AllocationError::TypeCoercion`] for a value that does not fit its type
    pub fn resolve(&self, allocator: &str, supplied: &ParamMap) -> Result<Params> {
        if let Some(name) = supplied.keys().find(|name| !self.entries.contains_key(*name)) {
            return Err(AllocationError::UnknownParameter {
                allocator: allocator.to_string(),
                name: name.clone(),
            });
        }

        let mut values = ParamMap::new();
        for (name, info) in &self.entries {
            let value = match (supplied.get(name), &info.default) {
                // An explicit `None` is never coerced; the strategy decides.
                (Some(ParamValue::None), _) => ParamValue::None,
                (Some(value), _) => {
                    info.ty
                        .coerce(value)
                        .ok_or_else(|| AllocationError::TypeCoercion {
                            name: name.clone(),
                            expected: info.ty,
                            value: value.clone(),
                        })?
                }
                (None, ParamDefault::Required) => {
                    return Err(AllocationError::MissingParameter {
                        allocator: allocator.to_string(),
                        name: name.clone(),
                    });
                }
                (None, ParamDefault::OptionalWithDefault(default)) => default.clone(),
                (None, ParamDefault::OptionalAbsent) => ParamValue::None,
            };
            values.insert(name.clone(), value);
        }

        Ok(Params::new(values))
    }
}

impl<K: Into<String>> FromIterator<(K, (ParamType, ParamDefault))> for ParamSpec {
    fn from_iter<I: IntoIterator<Item = (K, (ParamType, ParamDefault))>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(name, (ty, default))| (name.into(), ParamInfo::new(ty, default)))
            .collect();
        Self { entries }
    }
}
