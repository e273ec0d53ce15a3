//! Named configuration values, read once at solver initialisation.

use indexmap::IndexMap;

use crate::error::ConfigError;

/// A single configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Array of flags, for example one per domain face.
    BoolArray(Vec<bool>),
    /// Array of integers.
    IntArray(Vec<i64>),
    /// Array of floats.
    FloatArray(Vec<f64>),
}

impl ParamValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
            ParamValue::BoolArray(_) => "bool array",
            ParamValue::IntArray(_) => "int array",
            ParamValue::FloatArray(_) => "float array",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(f64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<Vec<bool>> for ParamValue {
    fn from(v: Vec<bool>) -> Self {
        ParamValue::BoolArray(v)
    }
}

impl<const N: usize> From<[bool; N]> for ParamValue {
    fn from(v: [bool; N]) -> Self {
        ParamValue::BoolArray(v.to_vec())
    }
}

impl From<Vec<i64>> for ParamValue {
    fn from(v: Vec<i64>) -> Self {
        ParamValue::IntArray(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::FloatArray(v)
    }
}

/// Conversion from a [`ParamValue`] into a concrete Rust type.
pub trait FromParam: Sized {
    /// Convert `value`, reporting failures against parameter `name`.
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError>;
}

fn mismatch(name: &str, wanted: &str, value: &ParamValue) -> ConfigError {
    ConfigError::invalid(
        name,
        format!("expected {wanted}, found {}", value.type_name()),
    )
}

impl FromParam for bool {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(mismatch(name, "bool", other)),
        }
    }
}

impl FromParam for i64 {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::Int(i) => Ok(*i),
            other => Err(mismatch(name, "int", other)),
        }
    }
}

impl FromParam for u32 {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        let i = i64::from_param(name, value)?;
        u32::try_from(i)
            .map_err(|_| ConfigError::invalid(name, format!("{i} is not a valid count")))
    }
}

impl FromParam for usize {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        let i = i64::from_param(name, value)?;
        usize::try_from(i)
            .map_err(|_| ConfigError::invalid(name, format!("{i} is not a valid count")))
    }
}

impl FromParam for f64 {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::Float(x) => Ok(*x),
            ParamValue::Int(i) => Ok(*i as f64),
            other => Err(mismatch(name, "float", other)),
        }
    }
}

impl FromParam for f32 {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        f64::from_param(name, value).map(|x| x as f32)
    }
}

impl FromParam for String {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::Str(s) => Ok(s.clone()),
            other => Err(mismatch(name, "string", other)),
        }
    }
}

impl FromParam for Vec<bool> {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::BoolArray(v) => Ok(v.clone()),
            other => Err(mismatch(name, "bool array", other)),
        }
    }
}

impl FromParam for Vec<i64> {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::IntArray(v) => Ok(v.clone()),
            other => Err(mismatch(name, "int array", other)),
        }
    }
}

impl FromParam for Vec<f64> {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self, ConfigError> {
        match value {
            ParamValue::FloatArray(v) => Ok(v.clone()),
            ParamValue::IntArray(v) => Ok(v.iter().map(|&i| i as f64).collect()),
            other => Err(mismatch(name, "float array", other)),
        }
    }
}

/// An ordered set of named configuration values.
///
/// Insertion order is preserved so that a dump of the configuration reads
/// the way it was written.
///
/// ```
/// use yee_core::Params;
///
/// let params = Params::new()
///     .with("pml_length", 8)
///     .with("use_implicit", false);
/// assert_eq!(params.get_or("pml_length", 16u32).unwrap(), 8);
/// assert_eq!(params.get_or("implicit_iterations", 5u32).unwrap(), 5);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: IndexMap<String, ParamValue>,
}

impl Params {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.values.insert(name.into(), value.into())
    }

    /// Raw access to a value.
    pub fn raw(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Whether a value of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Typed lookup. Absent is `Ok(None)`; present with the wrong type is
    /// [`ConfigError::InvalidParameter`].
    pub fn get<T: FromParam>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        self.values
            .get(name)
            .map(|v| T::from_param(name, v))
            .transpose()
    }

    /// Typed lookup with a default for absent values.
    pub fn get_or<T: FromParam>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    /// Typed lookup of a value that must be present.
    pub fn require<T: FromParam>(&self, name: &str) -> Result<T, ConfigError> {
        self.get(name)?.ok_or_else(|| ConfigError::MissingParameter {
            name: name.to_string(),
        })
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type_names_the_parameter() {
        let params = Params::new().with("pml_length", "sixteen");
        let err = params.get_or("pml_length", 16u32).unwrap_err();
        match err {
            ConfigError::InvalidParameter { name, reason } => {
                assert_eq!(name, "pml_length");
                assert!(reason.contains("string"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_count_is_rejected() {
        let params = Params::new().with("implicit_iterations", -2);
        assert!(params.get::<u32>("implicit_iterations").is_err());
    }

    #[test]
    fn int_promotes_to_float() {
        let params = Params::new().with("implicit_beta", 1);
        assert_eq!(params.get_or("implicit_beta", 0.5f64).unwrap(), 1.0);
    }

    #[test]
    fn require_reports_missing() {
        let params = Params::new();
        assert_eq!(
            params.require::<bool>("use_implicit"),
            Err(ConfigError::MissingParameter {
                name: "use_implicit".into()
            })
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let params = Params::new()
            .with("b", true)
            .with("a", 1)
            .with("damping_boundary", [true, false]);
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["b", "a", "damping_boundary"]);
        assert_eq!(
            params.get::<Vec<bool>>("damping_boundary").unwrap(),
            Some(vec![true, false])
        );
    }
}
