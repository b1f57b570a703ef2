//! Declared node inputs and outputs.

use serde::Serialize;

use crate::error::{Error, Result};

use super::value::{Scalar, Value, ValueType};

/// One declared input socket or widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Choices offered by the editor. Nodes decide themselves how to treat
    /// a value outside this list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
    /// When false the declared range is advisory and the node corrects
    /// out-of-range values itself.
    #[serde(skip)]
    pub enforce_range: bool,
}

impl InputSpec {
    fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            required: true,
            default: None,
            min: None,
            max: None,
            step: None,
            choices: Vec::new(),
            tooltip: None,
            enforce_range: true,
        }
    }

    #[must_use]
    pub fn int(name: &'static str) -> Self {
        Self::new(name, ValueType::Int)
    }

    #[must_use]
    pub fn float(name: &'static str) -> Self {
        Self::new(name, ValueType::Float)
    }

    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self::new(name, ValueType::String)
    }

    #[must_use]
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    #[must_use]
    pub fn image(name: &'static str) -> Self {
        Self::new(name, ValueType::Image)
    }

    #[must_use]
    pub fn latent(name: &'static str) -> Self {
        Self::new(name, ValueType::Latent)
    }

    /// A string input picked from a list.
    #[must_use]
    pub fn combo<I, S>(name: &'static str, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            ..Self::new(name, ValueType::String)
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Scalar>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn range(mut self, min: impl Into<Scalar>, max: impl Into<Scalar>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: &'static str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    /// Keep the declared range for display only.
    #[must_use]
    pub fn advisory_range(mut self) -> Self {
        self.enforce_range = false;
        self
    }

    /// Coerce and check a supplied value against this spec.
    ///
    /// Integers are accepted for float inputs.
    ///
    /// # Errors
    ///
    /// Returns an error on a type mismatch, or on a value outside an
    /// enforced range.
    #[allow(clippy::cast_precision_loss)]
    pub fn accept(&self, value: Value) -> Result<Value> {
        let value = match (self.value_type, value) {
            (ValueType::Float, Value::Int(v)) => Value::Float(v as f64),
            (_, value) => value,
        };

        if value.value_type() != self.value_type {
            return Err(Error::InputType {
                name: self.name.to_string(),
                expected: self.value_type.into(),
                actual: value.value_type().into(),
            });
        }

        if self.enforce_range {
            self.check_range(&value)?;
        }

        Ok(value)
    }

    fn check_range(&self, value: &Value) -> Result<()> {
        let below = |bound: &Scalar| match (value, bound) {
            (Value::Int(v), Scalar::Int(b)) => v < b,
            (Value::Float(v), b) => b.as_f64().is_some_and(|b| *v < b || v.is_nan()),
            _ => false,
        };
        let above = |bound: &Scalar| match (value, bound) {
            (Value::Int(v), Scalar::Int(b)) => v > b,
            (Value::Float(v), b) => b.as_f64().is_some_and(|b| *v > b || v.is_nan()),
            _ => false,
        };

        if self.min.as_ref().is_some_and(below) || self.max.as_ref().is_some_and(above) {
            return Err(Error::invalid(
                self.name,
                format!(
                    "{} is outside [{}, {}]",
                    value.to_json(),
                    bound_text(self.min.as_ref()),
                    bound_text(self.max.as_ref())
                ),
            ));
        }

        Ok(())
    }
}

fn bound_text(bound: Option<&Scalar>) -> String {
    bound
        .and_then(|b| serde_json::to_string(b).ok())
        .unwrap_or_else(|| "-".to_string())
}

/// One declared output socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl OutputSpec {
    #[must_use]
    pub const fn new(name: &'static str, value_type: ValueType) -> Self {
        Self { name, value_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_coerces_int_to_float() {
        let spec = InputSpec::float("cfg").range(0.0, 100.0);
        assert_eq!(spec.accept(Value::Int(7)).unwrap(), Value::Float(7.0));
    }

    #[test]
    fn test_accept_rejects_wrong_type() {
        let spec = InputSpec::int("steps");
        assert!(matches!(
            spec.accept(Value::from("twenty")),
            Err(Error::InputType { expected: "INT", actual: "STRING", .. })
        ));
    }

    #[test]
    fn test_enforced_range() {
        let spec = InputSpec::int("width").range(64, 8192);
        assert!(spec.accept(Value::Int(64)).is_ok());
        assert!(matches!(
            spec.accept(Value::Int(63)),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(spec.accept(Value::Int(8193)).is_err());

        let spec = InputSpec::float("scale_factor").range(1.0, 8.0);
        assert!(spec.accept(Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_advisory_range() {
        let spec = InputSpec::int("seed").range(0, u64::MAX).advisory_range();
        assert_eq!(spec.accept(Value::Int(-1)).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_schema_serialization() {
        let spec = InputSpec::combo("scheduler", ["normal", "karras"]).default("normal");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "STRING");
        assert_eq!(json["default"], "normal");
        assert_eq!(json["choices"][1], "karras");
        assert!(json.get("min").is_none());
        assert!(json.get("enforce_range").is_none());
    }
}
