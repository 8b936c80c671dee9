// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR value type system.
//!
//! Provides the in-memory representation of decoded XDR values. Full decodes
//! produce a value carrying every member of the type; sparse decodes produce
//! the same variants restricted to the retained members.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered struct members as (field name, value).
pub type StructFields = Vec<(String, XdrValue)>;

/// Value decoded from (or to be encoded as) XDR.
///
/// Struct members keep their declaration order, since the wire order is
/// positional and the JSON projection preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XdrValue {
    // 4-byte boolean
    Bool(bool),

    // 32-bit integers
    Int(i32),
    UInt(u32),

    // 64-bit integers (hyper)
    Hyper(i64),
    UHyper(u64),

    // Fixed or variable opaque data
    Opaque(Vec<u8>),

    // Bounded UTF-8 string
    String(String),

    // Enum member
    Enum {
        /// Member identifier
        name: String,
        /// Wire value
        value: i32,
    },

    // Struct members in declaration order
    Struct(StructFields),

    // Tagged union; payload is None for void arms and sparse placeholders
    Union {
        /// Case label (enum member name, TRUE/FALSE, or V{n})
        case: String,
        /// Discriminant as read from the wire
        discriminant: i64,
        /// Arm payload
        payload: Option<Box<XdrValue>>,
    },

    // Fixed or variable array
    Array(Vec<XdrValue>),

    // Optional (XDR pointer)
    Optional(Option<Box<XdrValue>>),
}

impl XdrValue {
    // ========================================================================
    // Type Checking Predicates
    // ========================================================================

    /// Check if this value is an integer of any width.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            XdrValue::Int(_) | XdrValue::UInt(_) | XdrValue::Hyper(_) | XdrValue::UHyper(_)
        )
    }

    /// Check if this value holds nested values.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            XdrValue::Struct(_) | XdrValue::Array(_) | XdrValue::Union { .. }
        )
    }

    /// Check if this is an absent optional.
    pub fn is_none(&self) -> bool {
        matches!(self, XdrValue::Optional(None))
    }

    // ========================================================================
    // Value Extraction
    // ========================================================================

    /// Get as i64, if this is an integer or enum that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            XdrValue::Int(v) => Some(i64::from(*v)),
            XdrValue::UInt(v) => Some(i64::from(*v)),
            XdrValue::Hyper(v) => Some(*v),
            XdrValue::UHyper(v) => i64::try_from(*v).ok(),
            XdrValue::Enum { value, .. } => Some(i64::from(*value)),
            _ => None,
        }
    }

    /// Get as u64, if this is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            XdrValue::Int(v) => u64::try_from(*v).ok(),
            XdrValue::UInt(v) => Some(u64::from(*v)),
            XdrValue::Hyper(v) => u64::try_from(*v).ok(),
            XdrValue::UHyper(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            XdrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string slice (strings and enum member names).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            XdrValue::String(s) => Some(s),
            XdrValue::Enum { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Get as opaque bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            XdrValue::Opaque(b) => Some(b),
            _ => None,
        }
    }

    /// Get struct members.
    pub fn as_struct(&self) -> Option<&StructFields> {
        match self {
            XdrValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get array elements.
    pub fn as_array(&self) -> Option<&[XdrValue]> {
        match self {
            XdrValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get a struct member by name.
    pub fn field(&self, name: &str) -> Option<&XdrValue> {
        self.as_struct()?
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Get the selected case label of a union.
    pub fn union_case(&self) -> Option<&str> {
        match self {
            XdrValue::Union { case, .. } => Some(case),
            _ => None,
        }
    }

    /// Get the payload of a union arm.
    pub fn union_payload(&self) -> Option<&XdrValue> {
        match self {
            XdrValue::Union { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }

    /// Follow a dotted path of struct fields and union cases.
    ///
    /// Present optionals are looked through. A union segment only matches
    /// the currently selected case; anything else yields `None`.
    pub fn select(&self, path: &str) -> Option<&XdrValue> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.unwrap_optional()?;
            current = match current {
                XdrValue::Struct(_) => current.field(segment)?,
                XdrValue::Union { case, payload, .. } if case == segment => payload.as_deref()?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn unwrap_optional(&self) -> Option<&XdrValue> {
        match self {
            XdrValue::Optional(inner) => inner.as_deref(),
            other => Some(other),
        }
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Get the type name of this value (for error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            XdrValue::Bool(_) => "bool",
            XdrValue::Int(_) => "int",
            XdrValue::UInt(_) => "unsigned int",
            XdrValue::Hyper(_) => "hyper",
            XdrValue::UHyper(_) => "unsigned hyper",
            XdrValue::Opaque(_) => "opaque",
            XdrValue::String(_) => "string",
            XdrValue::Enum { .. } => "enum",
            XdrValue::Struct(_) => "struct",
            XdrValue::Union { .. } => "union",
            XdrValue::Array(_) => "array",
            XdrValue::Optional(_) => "optional",
        }
    }
}

impl fmt::Display for XdrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdrValue::Bool(v) => write!(f, "{v}"),
            XdrValue::Int(v) => write!(f, "{v}"),
            XdrValue::UInt(v) => write!(f, "{v}"),
            XdrValue::Hyper(v) => write!(f, "{v}"),
            XdrValue::UHyper(v) => write!(f, "{v}"),
            XdrValue::Opaque(v) => write!(f, "<{} bytes>", v.len()),
            XdrValue::String(v) => write!(f, "\"{v}\""),
            XdrValue::Enum { name, .. } => write!(f, "{name}"),
            XdrValue::Struct(v) => write!(f, "{{{} fields}}", v.len()),
            XdrValue::Union { case, payload, .. } => match payload {
                Some(inner) => write!(f, "{case}({inner})"),
                None => write!(f, "{case}"),
            },
            XdrValue::Array(v) => write!(f, "[{} elements]", v.len()),
            XdrValue::Optional(None) => write!(f, "none"),
            XdrValue::Optional(Some(inner)) => write!(f, "some({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XdrValue {
        XdrValue::Struct(vec![
            ("seq".to_string(), XdrValue::UInt(9)),
            (
                "body".to_string(),
                XdrValue::Union {
                    case: "PAYMENT".to_string(),
                    discriminant: 1,
                    payload: Some(Box::new(XdrValue::Struct(vec![(
                        "amount".to_string(),
                        XdrValue::Hyper(-5),
                    )]))),
                },
            ),
            (
                "memo".to_string(),
                XdrValue::Optional(Some(Box::new(XdrValue::Struct(vec![(
                    "text".to_string(),
                    XdrValue::String("hi".to_string()),
                )])))),
            ),
        ])
    }

    #[test]
    fn test_type_checking() {
        assert!(XdrValue::Int(1).is_integer());
        assert!(XdrValue::UHyper(1).is_integer());
        assert!(!XdrValue::Bool(true).is_integer());
        assert!(XdrValue::Array(vec![]).is_container());
        assert!(XdrValue::Optional(None).is_none());
    }

    #[test]
    fn test_as_i64_and_u64() {
        assert_eq!(XdrValue::Int(-3).as_i64(), Some(-3));
        assert_eq!(XdrValue::UHyper(u64::MAX).as_i64(), None);
        assert_eq!(XdrValue::Int(-3).as_u64(), None);
        assert_eq!(XdrValue::UInt(7).as_u64(), Some(7));
        let e = XdrValue::Enum {
            name: "A".to_string(),
            value: 2,
        };
        assert_eq!(e.as_i64(), Some(2));
        assert_eq!(e.as_str(), Some("A"));
    }

    #[test]
    fn test_field_lookup() {
        let v = sample();
        assert_eq!(v.field("seq"), Some(&XdrValue::UInt(9)));
        assert!(v.field("missing").is_none());
    }

    #[test]
    fn test_select_through_union_and_optional() {
        let v = sample();
        assert_eq!(v.select("body.PAYMENT.amount"), Some(&XdrValue::Hyper(-5)));
        assert_eq!(
            v.select("memo.text"),
            Some(&XdrValue::String("hi".to_string()))
        );
        assert!(v.select("body.OTHER.amount").is_none());
    }

    #[test]
    fn test_union_accessors() {
        let v = sample();
        let body = v.field("body").unwrap();
        assert_eq!(body.union_case(), Some("PAYMENT"));
        assert!(body.union_payload().is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(XdrValue::Opaque(vec![1, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(XdrValue::Optional(None).to_string(), "none");
        let u = XdrValue::Union {
            case: "VOID".to_string(),
            discriminant: 0,
            payload: None,
        };
        assert_eq!(u.to_string(), "VOID");
    }

    #[test]
    fn test_serialization() {
        let v = sample();
        let json = serde_json::to_string(&v).unwrap();
        let back: XdrValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
