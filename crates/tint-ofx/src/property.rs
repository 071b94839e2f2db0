//! Typed, indexed property sets. Everything that crosses the host boundary
//! travels in one.
//!
//! Every key is declared once with a value type and a fixed dimension. After
//! that, values are only read and written through the typed accessors, which
//! check the key, the type and the index on every call. A key that was
//! declared but never written reads back as its default; a key that was never
//! declared is an error.
#![allow(unsafe_code)]

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::OfxError;

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Int,
    Double,
    String,
    Pointer,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Pointer => write!(f, "pointer"),
        }
    }
}

/// Opaque pointer stored in a property. The store never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPointer(*mut c_void);

// SAFETY: the store only copies the address around; whoever reads it back
// and dereferences it owns the aliasing and lifetime rules.
unsafe impl Send for RawPointer {}
// SAFETY: as above, shared access never touches the pointee.
unsafe impl Sync for RawPointer {}

impl RawPointer {
    pub const fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn new<T>(ptr: *mut T) -> Self {
        Self(ptr.cast())
    }

    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for RawPointer {
    fn default() -> Self {
        Self::null()
    }
}

impl Serialize for RawPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0 as usize as u64)
    }
}

/// The values held by one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(Vec<i32>),
    Double(Vec<f64>),
    String(Vec<String>),
    Pointer(Vec<RawPointer>),
}

impl PropertyValue {
    /// `dimension` copies of the type's zero value.
    pub fn zeroed(ty: PropertyType, dimension: usize) -> Self {
        match ty {
            PropertyType::Int => Self::Int(vec![0; dimension]),
            PropertyType::Double => Self::Double(vec![0.0; dimension]),
            PropertyType::String => Self::String(vec![String::new(); dimension]),
            PropertyType::Pointer => Self::Pointer(vec![RawPointer::null(); dimension]),
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Int(_) => PropertyType::Int,
            Self::Double(_) => PropertyType::Double,
            Self::String(_) => PropertyType::String,
            Self::Pointer(_) => PropertyType::Pointer,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::String(v) => v.len(),
            Self::Pointer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad with zero values up to `dimension`.
    fn pad_to(&mut self, dimension: usize) {
        match self {
            Self::Int(v) => v.resize(dimension, 0),
            Self::Double(v) => v.resize(dimension, 0.0),
            Self::String(v) => v.resize(dimension, String::new()),
            Self::Pointer(v) => v.resize(dimension, RawPointer::null()),
        }
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(vec![v])
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Int(vec![i32::from(v)])
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(vec![v])
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(vec![v.to_owned()])
    }
}

impl From<RawPointer> for PropertyValue {
    fn from(v: RawPointer) -> Self {
        Self::Pointer(vec![v])
    }
}

impl<const N: usize> From<[i32; N]> for PropertyValue {
    fn from(v: [i32; N]) -> Self {
        Self::Int(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for PropertyValue {
    fn from(v: [f64; N]) -> Self {
        Self::Double(v.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for PropertyValue {
    fn from(v: [&str; N]) -> Self {
        Self::String(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// Rust types that can be read from and written to a property.
pub trait PropertyElement: Clone {
    const TYPE: PropertyType;

    fn slice(value: &PropertyValue) -> Option<&[Self]>;
    fn slice_mut(value: &mut PropertyValue) -> Option<&mut [Self]>;
}

macro_rules! property_element {
    ($ty:ty, $variant:ident) => {
        impl PropertyElement for $ty {
            const TYPE: PropertyType = PropertyType::$variant;

            fn slice(value: &PropertyValue) -> Option<&[Self]> {
                match value {
                    PropertyValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(value: &mut PropertyValue) -> Option<&mut [Self]> {
                match value {
                    PropertyValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

property_element!(i32, Int);
property_element!(f64, Double);
property_element!(String, String);
property_element!(RawPointer, Pointer);

#[derive(Debug, Clone, PartialEq)]
struct Property {
    dimension: usize,
    default: PropertyValue,
    current: PropertyValue,
}

/// Ordered key → value store describing one host or plugin object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    entries: BTreeMap<String, Property>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from known-good declarations: each entry's dimension is the
    /// length of its default. Later duplicates of a key are ignored.
    pub fn from_schema<I>(schema: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, PropertyValue)>,
    {
        let mut set = Self::new();
        for (key, default) in schema {
            debug_assert!(!default.is_empty(), "schema entry {key:?} has no values");
            debug_assert!(!set.contains(key), "schema declares {key:?} twice");
            set.entries.entry(key.to_owned()).or_insert_with(|| Property {
                dimension: default.len(),
                current: default.clone(),
                default,
            });
        }
        set
    }

    /// Declare `key` with a value type, a fixed dimension and an optional default.
    ///
    /// A default shorter than `dimension` is padded with zero values.
    pub fn define(
        &mut self,
        key: &str,
        ty: PropertyType,
        dimension: usize,
        default: Option<PropertyValue>,
    ) -> Result<(), OfxError> {
        if dimension == 0 {
            return Err(OfxError::InvalidArgument(format!(
                "property {key:?} needs a dimension of at least 1"
            )));
        }
        if self.contains(key) {
            return Err(OfxError::InvalidArgument(format!(
                "property {key:?} is already defined"
            )));
        }

        let mut default = default.unwrap_or_else(|| PropertyValue::zeroed(ty, dimension));
        if default.property_type() != ty {
            return Err(OfxError::TypeMismatch {
                key: key.to_owned(),
                expected: ty,
                found: default.property_type(),
            });
        }
        if default.len() > dimension {
            return Err(OfxError::OutOfRange {
                key: key.to_owned(),
                index: default.len() - 1,
                dimension,
            });
        }
        default.pad_to(dimension);

        self.entries.insert(
            key.to_owned(),
            Property {
                dimension,
                current: default.clone(),
                default,
            },
        );
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Declared keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn dimension(&self, key: &str) -> Result<usize, OfxError> {
        Ok(self.entry(key)?.dimension)
    }

    pub fn property_type(&self, key: &str) -> Result<PropertyType, OfxError> {
        Ok(self.entry(key)?.current.property_type())
    }

    /// Restore the registered default (zero values if none was given).
    pub fn reset(&mut self, key: &str) -> Result<(), OfxError> {
        let entry = self.entry_mut(key)?;
        entry.current = entry.default.clone();
        Ok(())
    }

    pub fn get<T: PropertyElement>(&self, key: &str, index: usize) -> Result<T, OfxError> {
        let values = self.values::<T>(key)?;
        values.get(index).cloned().ok_or_else(|| OfxError::OutOfRange {
            key: key.to_owned(),
            index,
            dimension: values.len(),
        })
    }

    /// Read the first `count` values.
    pub fn get_n<T: PropertyElement>(&self, key: &str, count: usize) -> Result<Vec<T>, OfxError> {
        let values = self.values::<T>(key)?;
        if count > values.len() {
            return Err(OfxError::OutOfRange {
                key: key.to_owned(),
                index: count - 1,
                dimension: values.len(),
            });
        }
        Ok(values[..count].to_vec())
    }

    /// Read the first `N` values as a fixed-size array.
    pub fn get_array<T: PropertyElement, const N: usize>(&self, key: &str) -> Result<[T; N], OfxError> {
        let values = self.get_n::<T>(key, N)?;
        <[T; N]>::try_from(values).map_err(|v| OfxError::OutOfRange {
            key: key.to_owned(),
            index: N.saturating_sub(1),
            dimension: v.len(),
        })
    }

    /// Borrow every value of `key`, the full declared dimension.
    pub fn values<T: PropertyElement>(&self, key: &str) -> Result<&[T], OfxError> {
        let current = &self.entry(key)?.current;
        T::slice(current).ok_or_else(|| OfxError::TypeMismatch {
            key: key.to_owned(),
            expected: T::TYPE,
            found: current.property_type(),
        })
    }

    pub fn get_str(&self, key: &str, index: usize) -> Result<&str, OfxError> {
        let values = self.values::<String>(key)?;
        values
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| OfxError::OutOfRange {
                key: key.to_owned(),
                index,
                dimension: values.len(),
            })
    }

    /// Non-empty strings of a list property, in slot order.
    pub fn string_list(&self, key: &str) -> Result<Vec<&str>, OfxError> {
        Ok(self
            .values::<String>(key)?
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// Int property read as a flag (non-zero is true).
    pub fn get_bool(&self, key: &str, index: usize) -> Result<bool, OfxError> {
        Ok(self.get::<i32>(key, index)? != 0)
    }

    pub fn set<T: PropertyElement>(
        &mut self,
        key: &str,
        index: usize,
        value: T,
    ) -> Result<(), OfxError> {
        let slots = self.slots_mut::<T>(key)?;
        let dimension = slots.len();
        let slot = slots.get_mut(index).ok_or_else(|| OfxError::OutOfRange {
            key: key.to_owned(),
            index,
            dimension,
        })?;
        *slot = value;
        Ok(())
    }

    /// Write `values` into slots `0..values.len()`, leaving the rest untouched.
    pub fn set_n<T: PropertyElement>(&mut self, key: &str, values: &[T]) -> Result<(), OfxError> {
        let slots = self.slots_mut::<T>(key)?;
        if values.len() > slots.len() {
            return Err(OfxError::OutOfRange {
                key: key.to_owned(),
                index: values.len() - 1,
                dimension: slots.len(),
            });
        }
        slots[..values.len()].clone_from_slice(values);
        Ok(())
    }

    pub fn set_str(&mut self, key: &str, index: usize, value: &str) -> Result<(), OfxError> {
        self.set(key, index, value.to_owned())
    }

    pub fn set_bool(&mut self, key: &str, index: usize, value: bool) -> Result<(), OfxError> {
        self.set(key, index, i32::from(value))
    }

    fn entry(&self, key: &str) -> Result<&Property, OfxError> {
        self.entries.get(key).ok_or_else(|| OfxError::not_found(key))
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut Property, OfxError> {
        self.entries.get_mut(key).ok_or_else(|| OfxError::not_found(key))
    }

    fn slots_mut<T: PropertyElement>(&mut self, key: &str) -> Result<&mut [T], OfxError> {
        let current = &mut self.entry_mut(key)?.current;
        let found = current.property_type();
        T::slice_mut(current).ok_or_else(|| OfxError::TypeMismatch {
            key: key.to_owned(),
            expected: T::TYPE,
            found,
        })
    }
}

impl Serialize for PropertySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, &entry.current)?;
        }
        map.end()
    }
}
