//! XYZ parameter grids.
//!
//! An axis pairs a parameter name with the values to sweep. The grid walks
//! the cartesian product of its axes with X varying fastest; queueing one run
//! per combination is left to the host.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Upper bound on the values a single axis may expand to.
pub const MAX_AXIS_VALUES: usize = 10_000;

/// `start-end` with an optional `(+step)` suffix.
static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(-?\d+(?:\.\d+)?)\s*-\s*(-?\d+(?:\.\d+)?)\s*(?:\(\s*([+-]?\d+(?:\.\d+)?)\s*\))?\s*$",
    )
    .expect("valid range pattern")
});

/// One value on an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// A parameter and its swept values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub parameter: String,
    pub values: Vec<AxisValue>,
}

impl Axis {
    /// Parse the comma-separated value list used by the grid widget.
    ///
    /// Entries are integers, floats, inclusive ranges such as `1-4` or
    /// `0.5-1.5 (+0.25)`, or free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a range step is zero or points
    /// away from the end, or the axis expands past [`MAX_AXIS_VALUES`].
    pub fn parse(parameter: &str, spec: &str) -> Result<Self> {
        let mut values = Vec::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if let Some(caps) = RANGE.captures(entry) {
                let step = caps.get(3).map(|m| m.as_str());
                expand_range(parameter, &caps[1], &caps[2], step, &mut values)?;
            } else if let Ok(v) = entry.parse::<i64>() {
                values.push(AxisValue::Int(v));
            } else if let Ok(v) = entry.parse::<f64>() {
                values.push(AxisValue::Float(v));
            } else {
                values.push(AxisValue::Text(entry.to_string()));
            }

            if values.len() > MAX_AXIS_VALUES {
                return Err(axis_error(
                    parameter,
                    format!("more than {MAX_AXIS_VALUES} values"),
                ));
            }
        }

        if values.is_empty() {
            return Err(axis_error(parameter, "no values"));
        }

        Ok(Self {
            parameter: parameter.to_string(),
            values,
        })
    }
}

fn axis_error(parameter: &str, reason: impl Into<String>) -> Error {
    Error::GridAxis {
        axis: parameter.to_string(),
        reason: reason.into(),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn expand_range(
    parameter: &str,
    start: &str,
    end: &str,
    step: Option<&str>,
    values: &mut Vec<AxisValue>,
) -> Result<()> {
    let too_many = || axis_error(parameter, format!("more than {MAX_AXIS_VALUES} values"));

    if let (Ok(start), Ok(end)) = (start.parse::<i64>(), end.parse::<i64>()) {
        let int_step = match step {
            None if end < start => Some(-1),
            None => Some(1),
            Some(step) => step.trim_start_matches('+').parse::<i64>().ok(),
        };

        if let Some(step) = int_step {
            let span = i128::from(end) - i128::from(start);
            check_direction(parameter, span.signum() as i8, step.signum() as i8)?;

            let count = if step == 0 { 1 } else { span / i128::from(step) + 1 };
            let count = usize::try_from(count)
                .ok()
                .filter(|&n| n <= MAX_AXIS_VALUES)
                .ok_or_else(too_many)?;

            // Every stepped value lies between start and end, but the
            // intermediate product can exceed i64
            for i in 0..count as i128 {
                let value = i128::from(start) + i128::from(step) * i;
                let value = i64::try_from(value)
                    .map_err(|_| axis_error(parameter, format!("{value} does not fit in i64")))?;
                values.push(AxisValue::Int(value));
            }
            return Ok(());
        }
    }

    let parse = |s: &str| {
        s.trim_start_matches('+')
            .parse::<f64>()
            .map_err(|_| axis_error(parameter, format!("bad number {s:?}")))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    let step = match step {
        Some(step) => parse(step)?,
        None if end < start => -1.0,
        None => 1.0,
    };

    let span = end - start;
    check_direction(parameter, sign(span), sign(step))?;

    // Index-based stepping avoids accumulating rounding error
    let steps = if step == 0.0 {
        0.0
    } else {
        (span / step + 1e-9).floor()
    };
    if steps >= MAX_AXIS_VALUES as f64 {
        return Err(too_many());
    }

    let count = steps as usize + 1;
    values.extend((0..count).map(|i| AxisValue::Float(round_step(start + step * i as f64))));
    Ok(())
}

/// Reject zero steps and steps that point away from the range end.
fn check_direction(parameter: &str, span: i8, step: i8) -> Result<()> {
    if step == 0 && span != 0 {
        return Err(axis_error(parameter, "range step must not be zero"));
    }
    if span != 0 && span != step {
        return Err(axis_error(parameter, "range step points away from the end"));
    }
    Ok(())
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

fn round_step(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// The cartesian product of up to three axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grid {
    pub axes: Vec<Axis>,
}

impl Grid {
    #[must_use]
    pub fn new(axes: Vec<Axis>) -> Self {
        Self { axes }
    }

    /// Number of combinations. A grid without axes has one empty combination.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.values.len()).product()
    }

    /// True only when some axis has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The combination at `index`, with the first axis varying fastest.
    #[must_use]
    pub fn combination(&self, index: usize) -> Option<Vec<(&str, &AxisValue)>> {
        if index >= self.len() {
            return None;
        }

        let mut rest = index;
        Some(
            self.axes
                .iter()
                .map(|axis| {
                    let n = axis.values.len();
                    let value = &axis.values[rest % n];
                    rest /= n;
                    (axis.parameter.as_str(), value)
                })
                .collect(),
        )
    }

    /// Every combination in run order.
    pub fn combinations(&self) -> impl Iterator<Item = Vec<(&str, &AxisValue)>> + '_ {
        (0..self.len()).filter_map(move |index| self.combination(index))
    }
}
