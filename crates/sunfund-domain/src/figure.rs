//! Figure module - numeric fields that may be reported as unknown

use crate::vocabulary::NOT_AVAILABLE;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A numeric amount or size taken from an article
///
/// Serialized as a JSON number, or as the string `"n/a"` when the field
/// applies to the record but the article does not state it. Any other
/// string is rejected: numbers must arrive as numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Figure {
    /// Stated value
    Value(f64),
    /// Applies but not stated in the article
    NotAvailable,
}

impl Figure {
    /// Get the stated value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Figure::Value(v) => Some(*v),
            Figure::NotAvailable => None,
        }
    }

    /// Whether this is the `"n/a"` marker
    pub fn is_not_available(&self) -> bool {
        matches!(self, Figure::NotAvailable)
    }

    fn checked(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err(format!("figure {} is not finite", value));
        }
        if value < 0.0 {
            return Err(format!("figure {} is negative", value));
        }
        Ok(Figure::Value(value))
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Value(v) => write!(f, "{}", v),
            Figure::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Figure::Value(v) => serializer.serialize_f64(*v),
            Figure::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

struct FigureVisitor;

impl<'de> Visitor<'de> for FigureVisitor {
    type Value = Figure;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or \"n/a\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Figure, E> {
        Figure::checked(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Figure, E> {
        Figure::checked(v as f64).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Figure, E> {
        Figure::checked(v as f64).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Figure, E> {
        if v.trim().eq_ignore_ascii_case(NOT_AVAILABLE) {
            Ok(Figure::NotAvailable)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Figure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FigureVisitor)
    }
}
