//! Values flowing along graph edges.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::image::{ImageTensor, LatentTensor};

/// The host's socket types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ValueType {
    Int,
    Float,
    String,
    Boolean,
    Image,
    Latent,
}

/// A value passed into or out of a node.
///
/// Integers are 128-bit so that unsigned 64-bit seeds and out-of-range
/// values both survive the trip into a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
    String(String),
    Boolean(bool),
    Image(ImageTensor),
    Latent(LatentTensor),
}

impl Value {
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Image(_) => ValueType::Image,
            Self::Latent(_) => ValueType::Latent,
        }
    }

    /// JSON rendering for display. Tensors are summarized by their shape.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Int(v) => i64::try_from(*v)
                .map(serde_json::Value::from)
                .or_else(|_| u64::try_from(*v).map(serde_json::Value::from))
                .unwrap_or_else(|_| serde_json::Value::String(v.to_string())),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::String(v) => serde_json::Value::from(v.as_str()),
            Self::Boolean(v) => serde_json::Value::from(*v),
            Self::Image(t) | Self::Latent(t) => serde_json::json!({
                "type": self.value_type(),
                "shape": t.shape(),
            }),
        }
    }
}

/// A constant usable as an input default or bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i128),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Scalar {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(_) | Self::Boolean(_) => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Int(v) => Self::Int(v),
            Scalar::Float(v) => Self::Float(v),
            Scalar::String(v) => Self::String(v),
            Scalar::Boolean(v) => Self::Boolean(v),
        }
    }
}

macro_rules! impl_int_scalar {
    ($($t:ty),*) => {$(
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Self::Int(i128::from(v))
            }
        }

        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Int(i128::from(v))
            }
        }
    )*};
}

impl_int_scalar!(i32, i64, u32, u64, i128);

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_type_names() {
        assert_eq!(ValueType::Latent.to_string(), "LATENT");
        assert_eq!(
            serde_json::to_value(ValueType::Boolean).unwrap(),
            serde_json::json!("BOOLEAN")
        );
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::from(u64::MAX).to_json(), serde_json::json!(u64::MAX));
        assert_eq!(Value::Int(-3).to_json(), serde_json::json!(-3));
        assert_eq!(
            Value::Int(i128::MAX).to_json(),
            serde_json::json!(i128::MAX.to_string())
        );

        let image = Value::Image(Array4::zeros((2, 4, 6, 3)));
        assert_eq!(image.to_json()["shape"], serde_json::json!([2, 4, 6, 3]));
        assert_eq!(image.to_json()["type"], serde_json::json!("IMAGE"));
    }
}
