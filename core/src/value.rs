//! Field value types.
//!
//! Values are the atomic data stored in entity component fields. The set
//! of kinds is closed: every value carries one of the eight shapes a
//! schema can declare (bool, i32, f32, string, vec3, enum, entity_ref,
//! array). Whether a given value is legal for a given field is decided by
//! the schema registry, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3-component float vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [f32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Get a named component (`x`, `y`, or `z`), for dotted query paths.
    pub fn component(&self, name: &str) -> Option<f32> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }
}

/// A value stored in a component field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit float.
    Float(f32),
    /// UTF-8 string.
    String(String),
    /// 3-component float vector.
    Vec3(Vec3),
    /// Enumerated string, validated against a schema-declared value set.
    Enum(String),
    /// Reference to another entity by name, resolved lazily.
    EntityRef(String),
    /// Ordered sequence of values.
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns true if this is a boolean value.
    pub fn is_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(_))
    }

    /// Returns true if this is an integer value.
    pub fn is_int(&self) -> bool {
        matches!(self, FieldValue::Int(_))
    }

    /// Returns true if this is a float value.
    pub fn is_float(&self) -> bool {
        matches!(self, FieldValue::Float(_))
    }

    /// Returns true if this value is numeric (Int or Float).
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, FieldValue::String(_))
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a Float value.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Widen to f64 if this value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f as f64),
            _ => None,
        }
    }

    /// Get as string slice for the string-shaped kinds
    /// (String, Enum, EntityRef).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) | FieldValue::Enum(s) | FieldValue::EntityRef(s) => Some(s),
            _ => None,
        }
    }

    /// Get as Vec3 if this is a Vec3 value.
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            FieldValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as element slice if this is an Array value.
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the kind name of this value, matching schema type names.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "i32",
            FieldValue::Float(_) => "f32",
            FieldValue::String(_) => "string",
            FieldValue::Vec3(_) => "vec3",
            FieldValue::Enum(_) => "enum",
            FieldValue::EntityRef(_) => "entity_ref",
            FieldValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::String(s) => write!(f, "\"{}\"", s),
            FieldValue::Vec3(v) => write!(f, "[{}, {}, {}]", v.x, v.y, v.z),
            FieldValue::Enum(s) => write!(f, "{}", s),
            FieldValue::EntityRef(s) => write!(f, "->{}", s),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<Vec3> for FieldValue {
    fn from(v: Vec3) -> Self {
        FieldValue::Vec3(v)
    }
}

/// Ordered field-name → value mapping for one component.
pub type Fields = indexmap::IndexMap<String, FieldValue>;

/// Ordered component-name → fields mapping for one entity.
pub type ComponentData = indexmap::IndexMap<String, Fields>;

/// Helper macro to create field maps.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = $crate::Fields::new();
            $(
                map.insert($key.to_string(), $crate::FieldValue::from($value));
            )+
            map
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_checks() {
        assert!(FieldValue::Bool(true).is_bool());
        assert!(FieldValue::Int(42).is_int());
        assert!(FieldValue::Float(3.5).is_float());
        assert!(FieldValue::String("hello".into()).is_string());
        assert!(FieldValue::Int(1).is_numeric());
        assert!(FieldValue::Float(1.0).is_numeric());
        assert!(!FieldValue::Bool(true).is_numeric());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Int(42).as_int(), Some(42));
        assert_eq!(FieldValue::Float(3.5).as_float(), Some(3.5));
        assert_eq!(FieldValue::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(FieldValue::Enum("hinged".into()).as_str(), Some("hinged"));
        assert_eq!(FieldValue::EntityRef("door1".into()).as_str(), Some("door1"));
        assert_eq!(FieldValue::Int(5).as_f64(), Some(5.0));
        assert_eq!(FieldValue::Float(5.0).as_f64(), Some(5.0));
        assert_eq!(FieldValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_vec3_component() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.component("x"), Some(1.0));
        assert_eq!(v.component("y"), Some(2.0));
        assert_eq!(v.component("z"), Some(3.0));
        assert_eq!(v.component("w"), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldValue::Bool(true).type_name(), "bool");
        assert_eq!(FieldValue::Vec3(Vec3::ZERO).type_name(), "vec3");
        assert_eq!(FieldValue::EntityRef("a".into()).type_name(), "entity_ref");
        assert_eq!(FieldValue::Array(vec![]).type_name(), "array");
    }

    #[test]
    fn test_fields_macro() {
        let empty: Fields = fields!();
        assert!(empty.is_empty());

        let fields = fields! {
            "locked" => true,
            "open_angle" => 90.0f32,
            "style" => "hinged",
        };
        assert_eq!(fields.get("locked"), Some(&FieldValue::Bool(true)));
        assert_eq!(fields.get("open_angle"), Some(&FieldValue::Float(90.0)));
        assert_eq!(
            fields.get("style"),
            Some(&FieldValue::String("hinged".into()))
        );
        // Declaration order is preserved.
        let keys: Vec<&str> = fields.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["locked", "open_angle", "style"]);
    }
}
