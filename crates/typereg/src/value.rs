// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value representation for member access and invocation.

use crate::error::{Error, Result};
use std::any::Any;
use std::sync::Arc;

/// A dynamic value exchanged with erased accessors, invokers and
/// constructors.
///
/// Primitives and strings are carried inline; everything else travels
/// as [`Value::Opaque`], an `Arc`-shared host value downcast on demand.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    /// Arbitrary host value, shared by reference.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wrap an arbitrary host value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    /// Borrow the opaque payload as `T`, if this is an opaque of `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take the opaque payload as `Arc<T>`, if this is an opaque of `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Opaque(v) => Arc::clone(v).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Short label for diagnostics and mismatch errors.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            // Opaque payloads compare by identity, not contents.
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Bool(v) => write!(f, "Bool({})", v),
            Self::U8(v) => write!(f, "U8({})", v),
            Self::U16(v) => write!(f, "U16({})", v),
            Self::U32(v) => write!(f, "U32({})", v),
            Self::U64(v) => write!(f, "U64({})", v),
            Self::I8(v) => write!(f, "I8({})", v),
            Self::I16(v) => write!(f, "I16({})", v),
            Self::I32(v) => write!(f, "I32({})", v),
            Self::I64(v) => write!(f, "I64({})", v),
            Self::F32(v) => write!(f, "F32({})", v),
            Self::F64(v) => write!(f, "F64({})", v),
            Self::Char(v) => write!(f, "Char({:?})", v),
            Self::String(v) => write!(f, "String({:?})", v),
            Self::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

/// Trait for converting from a dynamic [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Trait for converting into a dynamic [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(*v),
                    other => Err(Error::TypeMismatch {
                        expected: $name.to_string(),
                        got: other.type_label().to_string(),
                    }),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(u8, U8, "u8");
impl_from_value!(u16, U16, "u16");
impl_from_value!(u32, U32, "u32");
impl_from_value!(u64, U64, "u64");
impl_from_value!(i8, I8, "i8");
impl_from_value!(i16, I16, "i16");
impl_from_value!(i32, I32, "i32");
impl_from_value!(i64, I64, "i64");
impl_from_value!(f32, F32, "f32");
impl_from_value!(f64, F64, "f64");
impl_from_value!(char, Char, "char");

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(Error::TypeMismatch {
                expected: "string".to_string(),
                got: other.type_label().to_string(),
            }),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

macro_rules! impl_into_value {
    ($ty:ty, $variant:ident) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_into_value!(bool, Bool);
impl_into_value!(u8, U8);
impl_into_value!(u16, U16);
impl_into_value!(u32, U32);
impl_into_value!(u64, U64);
impl_into_value!(i8, I8);
impl_into_value!(i16, I16);
impl_into_value!(i32, I32);
impl_into_value!(i64, I64);
impl_into_value!(f32, F32);
impl_into_value!(f64, F64);
impl_into_value!(char, Char);

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trip() {
        let v = 42i32.into_value();
        assert_eq!(i32::from_value(&v).expect("i32"), 42);
        assert_eq!(v.as_i32(), Some(42));
        assert_eq!(v.as_i64(), None);

        let v = "hello".into_value();
        assert_eq!(String::from_value(&v).expect("string"), "hello");
    }

    #[test]
    fn test_mismatch_reports_labels() {
        let err = i32::from_value(&Value::F64(1.0)).expect_err("mismatch");
        match err {
            Error::TypeMismatch { expected, got } => {
                assert_eq!(expected, "i32");
                assert_eq!(got, "f64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_opaque_downcast() {
        #[derive(Debug, PartialEq)]
        struct Payload(u64);

        let v = Value::opaque(Payload(7));
        assert_eq!(v.type_label(), "opaque");
        assert_eq!(v.downcast_ref::<Payload>(), Some(&Payload(7)));
        assert!(v.downcast_ref::<String>().is_none());

        let arc = v.downcast_arc::<Payload>().expect("arc downcast");
        assert_eq!(arc.0, 7);
    }
}
