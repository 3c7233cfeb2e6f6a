//! Length values and the undefined sentinel.
//!
//! Sizes that are not known are carried as [`UNDEFINED`] (a NaN). Code must
//! test for it with [`is_undefined`] instead of relying on NaN propagation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for an unknown size.
pub const UNDEFINED: f32 = f32::NAN;

/// Absolute tolerance used by every size comparison.
pub const EPSILON: f32 = 0.0001;

/// Check whether a size is the undefined sentinel.
#[inline]
#[must_use]
pub fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

/// Compare two sizes within [`EPSILON`].
///
/// Undefined only equals undefined.
#[must_use]
pub fn floats_equal(a: f32, b: f32) -> bool {
    if is_undefined(a) {
        return is_undefined(b);
    }
    (a - b).abs() < EPSILON
}

/// `max` that prefers the defined operand.
#[must_use]
pub fn max_defined(a: f32, b: f32) -> f32 {
    match (is_undefined(a), is_undefined(b)) {
        (false, false) => a.max(b),
        (true, _) => b,
        (false, true) => a,
    }
}

/// Unit tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    /// No value set
    #[default]
    Undefined,
    /// Absolute points
    Point,
    /// Percentage of the parent size
    Percent,
    /// Resolved by the algorithm
    Auto,
}

impl Unit {
    /// Lowercase name of the unit.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Point => "point",
            Self::Percent => "percent",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A style length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Value {
    /// Not set
    #[default]
    Undefined,
    /// Absolute length in points
    Point(f32),
    /// Percentage of the parent's size on the relevant axis
    Percent(f32),
    /// Left to the layout algorithm
    Auto,
}

impl Value {
    /// Zero points.
    pub const ZERO: Self = Self::Point(0.0);

    /// Unit tag.
    #[must_use]
    pub const fn unit(self) -> Unit {
        match self {
            Self::Undefined => Unit::Undefined,
            Self::Point(_) => Unit::Point,
            Self::Percent(_) => Unit::Percent,
            Self::Auto => Unit::Auto,
        }
    }

    /// Numeric payload, or [`UNDEFINED`] for `undefined` and `auto`.
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Point(v) | Self::Percent(v) => v,
            Self::Undefined | Self::Auto => UNDEFINED,
        }
    }

    /// Check for the `undefined` tag.
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Check for the `auto` tag.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against the parent size on the same axis.
    #[must_use]
    pub fn resolve(self, parent_size: f32) -> f32 {
        match self {
            Self::Point(v) => v,
            Self::Percent(v) => v * parent_size / 100.0,
            Self::Undefined | Self::Auto => UNDEFINED,
        }
    }

    /// Like [`Value::resolve`], but `auto` resolves to zero.
    #[must_use]
    pub fn resolve_margin(self, parent_size: f32) -> f32 {
        if self.is_auto() {
            0.0
        } else {
            self.resolve(parent_size)
        }
    }

    /// Unit-aware comparison within [`EPSILON`].
    ///
    /// Two `undefined` values are equal. `auto` carries a NaN payload and so
    /// never compares equal, not even to another `auto`.
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        if self.unit() != other.unit() {
            return false;
        }
        if self.is_undefined() {
            return true;
        }
        (self.value() - other.value()).abs() < EPSILON
    }

    /// Replace a NaN payload with `fallback`.
    #[must_use]
    pub fn or_if_nan(self, fallback: Self) -> Self {
        match self {
            Self::Point(v) | Self::Percent(v) if v.is_nan() => fallback,
            other => other,
        }
    }
}

impl From<f32> for Value {
    fn from(points: f32) -> Self {
        Self::Point(points)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Auto => f.write_str("auto"),
            Self::Point(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_value_resolve_point() {
        assert_eq!(Value::Point(42.0).resolve(1000.0), 42.0);
    }

    #[test]
    fn test_value_resolve_percent() {
        assert_eq!(Value::Percent(25.0).resolve(200.0), 50.0);
    }

    #[test]
    fn test_value_resolve_percent_of_undefined_parent() {
        assert!(is_undefined(Value::Percent(25.0).resolve(UNDEFINED)));
    }

    #[test]
    fn test_value_resolve_auto_and_undefined() {
        assert!(is_undefined(Value::Auto.resolve(100.0)));
        assert!(is_undefined(Value::Undefined.resolve(100.0)));
    }

    #[test]
    fn test_value_resolve_margin_auto_is_zero() {
        assert_eq!(Value::Auto.resolve_margin(100.0), 0.0);
        assert!(is_undefined(Value::Undefined.resolve_margin(100.0)));
        assert_eq!(Value::Percent(10.0).resolve_margin(50.0), 5.0);
    }

    #[test]
    fn test_value_approx_eq_requires_same_unit() {
        assert!(!Value::Point(10.0).approx_eq(Value::Percent(10.0)));
        assert!(Value::Point(10.0).approx_eq(Value::Point(10.00005)));
        assert!(!Value::Point(10.0).approx_eq(Value::Point(10.001)));
    }

    #[test]
    fn test_value_approx_eq_undefined_and_auto() {
        assert!(Value::Undefined.approx_eq(Value::Undefined));
        assert!(!Value::Auto.approx_eq(Value::Auto));
    }

    #[test]
    fn test_value_or_if_nan() {
        assert_eq!(Value::Point(f32::NAN).or_if_nan(Value::Auto), Value::Auto);
        assert_eq!(Value::Point(3.0).or_if_nan(Value::Auto), Value::Point(3.0));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Point(10.0).to_string(), "10px");
        assert_eq!(Value::Percent(50.0).to_string(), "50%");
        assert_eq!(Value::Auto.to_string(), "auto");
    }

    #[test]
    fn test_value_serde_kebab_case() {
        let json = serde_json::to_string(&Value::Percent(50.0)).unwrap();
        assert_eq!(json, r#"{"percent":50.0}"#);
        let back: Value = serde_json::from_str(r#""auto""#).unwrap();
        assert_eq!(back, Value::Auto);
    }

    #[test]
    fn test_floats_equal_undefined() {
        assert!(floats_equal(UNDEFINED, UNDEFINED));
        assert!(!floats_equal(UNDEFINED, 0.0));
        assert!(!floats_equal(0.0, UNDEFINED));
        assert!(floats_equal(1.0, 1.00001));
    }

    #[test]
    fn test_max_defined() {
        assert_eq!(max_defined(UNDEFINED, 3.0), 3.0);
        assert_eq!(max_defined(4.0, UNDEFINED), 4.0);
        assert_eq!(max_defined(4.0, 3.0), 4.0);
        assert!(is_undefined(max_defined(UNDEFINED, UNDEFINED)));
    }

    proptest! {
        #[test]
        fn prop_percent_round_trip(percent in -500.0f32..500.0, parent in 0.01f32..10_000.0) {
            let resolved = Value::Percent(percent).resolve(parent);
            let recovered = resolved / parent * 100.0;
            prop_assert!((recovered - percent).abs() <= percent.abs().max(1.0) * 1e-4);
        }

        #[test]
        fn prop_point_resolve_ignores_parent(points in -1e6f32..1e6, parent in -1e6f32..1e6) {
            prop_assert_eq!(Value::Point(points).resolve(parent), points);
        }
    }
}
