//! Conversion between document values and typed field values.
//!
//! Documents carry untyped TOML values; the declared field type decides
//! how they decode. A shape that disagrees with its declared type is an
//! error at this boundary, never a panic later.

use crate::{FieldDef, FieldType};
use diorama_core::{FieldValue, Vec3};
use std::fmt;

/// Why a value was rejected for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The value's shape does not match the declared type.
    Mismatch { expected: String, actual: String },
    /// The value is not a member of the enum's declared value set.
    InvalidEnum { value: String, allowed: Vec<String> },
    /// A numeric value lies outside the field's declared bounds.
    OutOfRange { value: f64, min: f64, max: f64 },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Mismatch { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
            ValueError::InvalidEnum { value, allowed } => {
                write!(f, "'{}' is not one of {:?}", value, allowed)
            }
            ValueError::OutOfRange { value, min, max } => {
                write!(f, "{} is outside [{}, {}]", value, min, max)
            }
        }
    }
}

impl std::error::Error for ValueError {}

fn mismatch(expected: &FieldType, actual: &toml::Value) -> ValueError {
    ValueError::Mismatch {
        expected: expected.type_name().to_string(),
        actual: toml_type_name(actual).to_string(),
    }
}

fn toml_type_name(value: &toml::Value) -> &'static str {
    match value {
        toml::Value::String(_) => "string",
        toml::Value::Integer(_) => "integer",
        toml::Value::Float(_) => "float",
        toml::Value::Boolean(_) => "bool",
        toml::Value::Datetime(_) => "datetime",
        toml::Value::Array(_) => "array",
        toml::Value::Table(_) => "table",
    }
}

impl FieldType {
    /// Decode a raw TOML value into a typed field value.
    ///
    /// Integers are accepted where floats are declared (the common way
    /// authors write `position = [5, 0, 0]`). Vec3 accepts a 3-element
    /// numeric array.
    pub fn decode(&self, raw: &toml::Value) -> Result<FieldValue, ValueError> {
        match (self, raw) {
            (FieldType::Bool, toml::Value::Boolean(b)) => Ok(FieldValue::Bool(*b)),
            (FieldType::I32, toml::Value::Integer(i)) => {
                let n = i32::try_from(*i).map_err(|_| ValueError::Mismatch {
                    expected: "i32".to_string(),
                    actual: format!("integer {} out of i32 range", i),
                })?;
                Ok(FieldValue::Int(n))
            }
            (FieldType::F32, toml::Value::Float(f)) => Ok(FieldValue::Float(*f as f32)),
            (FieldType::F32, toml::Value::Integer(i)) => Ok(FieldValue::Float(*i as f32)),
            (FieldType::String, toml::Value::String(s)) => Ok(FieldValue::String(s.clone())),
            (FieldType::Vec3, toml::Value::Array(items)) => {
                if items.len() != 3 {
                    return Err(ValueError::Mismatch {
                        expected: "vec3".to_string(),
                        actual: format!("array of {} elements", items.len()),
                    });
                }
                let mut xyz = [0.0f32; 3];
                for (slot, item) in xyz.iter_mut().zip(items) {
                    *slot = match item {
                        toml::Value::Float(f) => *f as f32,
                        toml::Value::Integer(i) => *i as f32,
                        other => return Err(mismatch(self, other)),
                    };
                }
                Ok(FieldValue::Vec3(Vec3::from_array(xyz)))
            }
            (FieldType::Enum { values }, toml::Value::String(s)) => {
                if values.contains(s) {
                    Ok(FieldValue::Enum(s.clone()))
                } else {
                    Err(ValueError::InvalidEnum {
                        value: s.clone(),
                        allowed: values.clone(),
                    })
                }
            }
            (FieldType::EntityRef, toml::Value::String(s)) => {
                Ok(FieldValue::EntityRef(s.clone()))
            }
            (FieldType::Array { element }, toml::Value::Array(items)) => {
                let decoded = items
                    .iter()
                    .map(|item| element.decode(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldValue::Array(decoded))
            }
            _ => Err(mismatch(self, raw)),
        }
    }
}

impl FieldDef {
    /// Validate a typed value against this field and normalize it for
    /// storage. The accepted coercions mirror [`FieldType::decode`]:
    /// Int where Float is declared, String where Enum or EntityRef is
    /// declared. Enum membership and numeric bounds are checked here,
    /// so this is the single gate every mutation passes through.
    pub fn coerce(&self, value: FieldValue) -> Result<FieldValue, ValueError> {
        let value = match (&self.field_type, value) {
            (FieldType::F32, FieldValue::Int(i)) => FieldValue::Float(i as f32),
            (FieldType::Enum { values }, FieldValue::String(s) | FieldValue::Enum(s)) => {
                if !values.contains(&s) {
                    return Err(ValueError::InvalidEnum {
                        value: s,
                        allowed: values.clone(),
                    });
                }
                FieldValue::Enum(s)
            }
            (FieldType::EntityRef, FieldValue::String(s) | FieldValue::EntityRef(s)) => {
                FieldValue::EntityRef(s)
            }
            (_, value) => value,
        };

        if !self.field_type.matches(&value) {
            return Err(ValueError::Mismatch {
                expected: self.field_type.type_name().to_string(),
                actual: value.type_name().to_string(),
            });
        }

        if let Some(n) = value.as_f64() {
            let min = self.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.max.unwrap_or(f64::INFINITY);
            if n < min || n > max {
                return Err(ValueError::OutOfRange { value: n, min, max });
            }
        }

        Ok(value)
    }

    /// Decode a raw TOML value and validate it against this field.
    pub fn decode(&self, raw: &toml::Value) -> Result<FieldValue, ValueError> {
        let value = self.field_type.decode(raw)?;
        self.coerce(value)
    }
}

/// Encode a typed field value back into its TOML document shape.
pub fn encode_value(value: &FieldValue) -> toml::Value {
    match value {
        FieldValue::Bool(b) => toml::Value::Boolean(*b),
        FieldValue::Int(i) => toml::Value::Integer(*i as i64),
        FieldValue::Float(f) => toml::Value::Float(widen_f32(*f)),
        FieldValue::String(s) | FieldValue::Enum(s) | FieldValue::EntityRef(s) => {
            toml::Value::String(s.clone())
        }
        FieldValue::Vec3(v) => toml::Value::Array(vec![
            toml::Value::Float(widen_f32(v.x)),
            toml::Value::Float(widen_f32(v.y)),
            toml::Value::Float(widen_f32(v.z)),
        ]),
        FieldValue::Array(items) => {
            toml::Value::Array(items.iter().map(encode_value).collect())
        }
    }
}

/// Widen an f32 through its shortest decimal form, so an authored `0.1`
/// round-trips as `0.1` (written back verbatim, equal to the f64 a query
/// literal parses to) rather than its 17-digit f64 expansion.
pub fn widen_f32(f: f32) -> f64 {
    f.to_string().parse().unwrap_or(f as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> toml::Value {
        let table: toml::Value = toml::from_str(&format!("v = {}", s)).unwrap();
        table.get("v").unwrap().clone()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(
            FieldType::Bool.decode(&raw("true")),
            Ok(FieldValue::Bool(true))
        );
        assert_eq!(FieldType::I32.decode(&raw("5")), Ok(FieldValue::Int(5)));
        assert_eq!(
            FieldType::F32.decode(&raw("2.5")),
            Ok(FieldValue::Float(2.5))
        );
        // Integers are accepted where floats are declared.
        assert_eq!(FieldType::F32.decode(&raw("5")), Ok(FieldValue::Float(5.0)));
        assert_eq!(
            FieldType::String.decode(&raw("\"hi\"")),
            Ok(FieldValue::String("hi".into()))
        );
    }

    #[test]
    fn test_decode_vec3_from_array() {
        let v = FieldType::Vec3.decode(&raw("[1, 2.5, -3]")).unwrap();
        assert_eq!(v.as_vec3().unwrap(), Vec3::new(1.0, 2.5, -3.0));

        assert!(FieldType::Vec3.decode(&raw("[1, 2]")).is_err());
        assert!(FieldType::Vec3.decode(&raw("[1, 2, \"z\"]")).is_err());
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let err = FieldType::Bool.decode(&raw("\"true\"")).unwrap_err();
        assert_eq!(
            err,
            ValueError::Mismatch {
                expected: "bool".into(),
                actual: "string".into()
            }
        );
    }

    #[test]
    fn test_decode_enum_membership() {
        let ty = FieldType::Enum {
            values: vec!["hinged".into(), "sliding".into()],
        };
        assert_eq!(
            ty.decode(&raw("\"hinged\"")),
            Ok(FieldValue::Enum("hinged".into()))
        );
        assert!(matches!(
            ty.decode(&raw("\"revolving\"")),
            Err(ValueError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_decode_array_elementwise() {
        let ty = FieldType::Array {
            element: Box::new(FieldType::String),
        };
        let v = ty.decode(&raw("[\"a\", \"b\"]")).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
        assert!(ty.decode(&raw("[\"a\", 1]")).is_err());
    }

    #[test]
    fn test_coerce_range_check() {
        let def = FieldDef::new(FieldType::F32).with_range(0.0, 180.0);
        assert_eq!(def.coerce(FieldValue::Float(90.0)), Ok(FieldValue::Float(90.0)));
        assert!(matches!(
            def.coerce(FieldValue::Float(200.0)),
            Err(ValueError::OutOfRange { .. })
        ));
        // Int widens to the declared float type before the bounds check.
        assert_eq!(def.coerce(FieldValue::Int(45)), Ok(FieldValue::Float(45.0)));
    }

    #[test]
    fn test_coerce_string_to_ref() {
        let def = FieldDef::new(FieldType::EntityRef);
        assert_eq!(
            def.coerce(FieldValue::String("door1".into())),
            Ok(FieldValue::EntityRef("door1".into()))
        );
    }

    #[test]
    fn test_encode_roundtrip_shapes() {
        assert_eq!(
            encode_value(&FieldValue::Vec3(Vec3::new(1.0, 2.0, 3.0))),
            toml::Value::Array(vec![
                toml::Value::Float(1.0),
                toml::Value::Float(2.0),
                toml::Value::Float(3.0),
            ])
        );
        assert_eq!(
            encode_value(&FieldValue::Enum("hinged".into())),
            toml::Value::String("hinged".into())
        );
    }
}
