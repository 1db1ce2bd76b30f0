//! Parameter dictionary for the vision pipeline's entry points.
//!
//! Callers pass a loosely-typed dictionary (unknown keys ignored, a missing
//! required key is a `General` error naming it); internally the pipeline
//! wants a validated, typed struct. `ParamDict` is the former, `PphtParams`
//! the latter, with `PphtParams::from_dict` doing the validation step —
//! mirroring the teacher's `*Options::validate()` convention.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// A single recognized-or-not parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
}

impl ParamValue {
    fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Float(v) => *v,
            ParamValue::Int(v) => *v as f64,
        }
    }

    fn as_i64(&self) -> i64 {
        match self {
            ParamValue::Float(v) => *v as i64,
            ParamValue::Int(v) => *v,
        }
    }
}

/// Loose string-keyed dictionary accepted at the pipeline's entry points.
#[derive(Debug, Clone, Default)]
pub struct ParamDict {
    values: HashMap<String, ParamValue>,
}

impl ParamDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }
}

/// Validated parameters driving the PPHT analyzer, segment linker, and
/// region extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PphtParams {
    /// Larger = stricter significance threshold.
    pub sensitivity: f64,
    /// Pixels of tolerated gap along a candidate line segment.
    pub max_gap: u32,
    /// Pixels within which polyline endpoints are joined/closed.
    pub close_gap: u32,
}

impl Default for PphtParams {
    /// `sensitivity` tuned so `sensitivity * ln(10) ≈ 16`, `max_gap = 3`,
    /// `close_gap = 5`, the documented default tuning.
    fn default() -> Self {
        Self {
            sensitivity: 16.0 / std::f64::consts::LN_10,
            max_gap: 3,
            close_gap: 5,
        }
    }
}

impl PphtParams {
    /// Validate a loose dictionary into a typed parameter set. Every key is
    /// optional here: a caller that wants a "missing required key"
    /// error should request the specific key itself via
    /// [`ParamDict::get`] before calling into an entry point, since which
    /// keys are required varies per entry point, not per parameter.
    pub fn from_dict(dict: &ParamDict) -> Result<Self> {
        let defaults = Self::default();
        let sensitivity = dict
            .get("sensitivity")
            .map(ParamValue::as_f64)
            .unwrap_or(defaults.sensitivity);
        let max_gap = dict
            .get("maxGap")
            .map(ParamValue::as_i64)
            .unwrap_or(defaults.max_gap as i64);
        let close_gap = dict
            .get("closeGap")
            .map(ParamValue::as_i64)
            .unwrap_or(defaults.close_gap as i64);

        if max_gap < 0 {
            return Err(Error::general(0, "maxGap must be non-negative"));
        }
        if close_gap < 0 {
            return Err(Error::general(0, "closeGap must be non-negative"));
        }

        Ok(Self {
            sensitivity,
            max_gap: max_gap as u32,
            close_gap: close_gap as u32,
        })
    }

    /// The significance threshold `sensitivity * (-ln 10)` used by the PPHT
    /// analyzer's Poisson test.
    pub fn significance_threshold(&self) -> f64 {
        self.sensitivity * (-std::f64::consts::LN_10)
    }
}

/// Require a key to be present in `dict`: a "missing required key"
/// behavior, `General` error, code 0, naming the key.
pub fn require_key<'a>(dict: &'a ParamDict, key: &str) -> Result<&'a ParamValue> {
    dict.get(key).ok_or_else(|| Error::missing_param(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tuning() {
        let p = PphtParams::default();
        assert!((p.sensitivity * std::f64::consts::LN_10 - 16.0).abs() < 1e-9);
        assert_eq!(p.max_gap, 3);
        assert_eq!(p.close_gap, 5);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dict = ParamDict::new().with("bogus", ParamValue::Int(99));
        let params = PphtParams::from_dict(&dict).unwrap();
        assert_eq!(params, PphtParams::default());
    }

    #[test]
    fn negative_max_gap_is_rejected() {
        let dict = ParamDict::new().with("maxGap", ParamValue::Int(-1));
        assert!(PphtParams::from_dict(&dict).is_err());
    }

    #[test]
    fn missing_required_key_names_it() {
        let dict = ParamDict::new();
        let err = require_key(&dict, "sensitivity").unwrap_err();
        assert!(err.message.contains("sensitivity"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let dict = ParamDict::new()
            .with("sensitivity", ParamValue::Float(1.6))
            .with("maxGap", ParamValue::Int(3))
            .with("closeGap", ParamValue::Int(5));
        let params = PphtParams::from_dict(&dict).unwrap();
        assert_eq!(params.sensitivity, 1.6);
        assert_eq!(params.max_gap, 3);
        assert_eq!(params.close_gap, 5);
    }
}
