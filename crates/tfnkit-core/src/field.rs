//! Typed, immutable field values
//!
//! A [`Field`] is what the engine extracts from traffic (a header, a query
//! argument, a body) or what a transform derives from one. Fields never change
//! after construction: a transform either hands back its input or builds a new
//! field in the arena it was given. Every field remembers the arena generation
//! it was built in, and optionally the comma-separated list of transforms that
//! produced it.

use std::sync::Arc;

use crate::arena::{Arena, ArenaId};
use crate::error::{Error, Result};

/// Shared handle to an immutable field
pub type FieldRef = Arc<Field>;

/// Field type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// UTF-8 string
    NulStr,
    /// Raw byte string
    ByteStr,
    /// Signed integer
    Num,
    /// Unsigned integer
    Unum,
    /// Floating point number
    Float,
    /// List of fields
    List,
}

impl FieldType {
    /// Whether values of this type can be fed through a transform chain
    pub fn is_string_like(self) -> bool {
        matches!(self, Self::NulStr | Self::ByteStr)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NulStr => "string",
            Self::ByteStr => "bytes",
            Self::Num => "num",
            Self::Unum => "unum",
            Self::Float => "float",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// Field payload
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 string
    NulStr(Arc<str>),
    /// Raw byte string
    ByteStr(Arc<[u8]>),
    /// Signed integer
    Num(i64),
    /// Unsigned integer
    Unum(u64),
    /// Floating point number
    Float(f64),
    /// List of fields
    List(Arc<[FieldRef]>),
}

impl FieldValue {
    /// Type tag of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::NulStr(_) => FieldType::NulStr,
            Self::ByteStr(_) => FieldType::ByteStr,
            Self::Num(_) => FieldType::Num,
            Self::Unum(_) => FieldType::Unum,
            Self::Float(_) => FieldType::Float,
            Self::List(_) => FieldType::List,
        }
    }

    /// Size charged to an arena for this payload
    fn payload_size(&self) -> usize {
        match self {
            Self::NulStr(s) => s.len(),
            Self::ByteStr(b) => b.len(),
            Self::List(items) => std::mem::size_of_val::<[FieldRef]>(items),
            Self::Num(_) | Self::Unum(_) | Self::Float(_) => 0,
        }
    }
}

/// A named, typed, immutable value
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: Arc<str>,
    value: FieldValue,
    tfn: Option<Arc<str>>,
    origin: ArenaId,
}

impl Field {
    /// Build a field from an already arena-allocated value.
    ///
    /// Only the field header and name are charged to `arena`.
    pub fn create(arena: &Arena, name: &str, value: FieldValue) -> Result<FieldRef> {
        let name = arena.strdup(name)?;
        Self::assemble(arena, name, value, None)
    }

    /// Build a string field, duplicating `value` into `arena`.
    pub fn nulstr(arena: &Arena, name: &str, value: &str) -> Result<FieldRef> {
        let value = FieldValue::NulStr(arena.strdup(value)?);
        Self::create(arena, name, value)
    }

    /// Build a byte-string field, duplicating `value` into `arena`.
    pub fn bytestr(arena: &Arena, name: &str, value: &[u8]) -> Result<FieldRef> {
        let value = FieldValue::ByteStr(arena.memdup(value)?);
        Self::create(arena, name, value)
    }

    /// Build a signed integer field.
    pub fn num(arena: &Arena, name: &str, value: i64) -> Result<FieldRef> {
        Self::create(arena, name, FieldValue::Num(value))
    }

    /// Build an unsigned integer field.
    pub fn unum(arena: &Arena, name: &str, value: u64) -> Result<FieldRef> {
        Self::create(arena, name, FieldValue::Unum(value))
    }

    /// Build a floating point field.
    pub fn float(arena: &Arena, name: &str, value: f64) -> Result<FieldRef> {
        Self::create(arena, name, FieldValue::Float(value))
    }

    /// Build a list field holding `items`.
    pub fn list(arena: &Arena, name: &str, items: Vec<FieldRef>) -> Result<FieldRef> {
        let value = FieldValue::List(Arc::from(items));
        arena.charge(value.payload_size())?;
        Self::create(arena, name, value)
    }

    /// Copy this field under a new name.
    ///
    /// The value is shared with the source; the copy belongs to `arena` and
    /// carries no transform tag.
    pub fn copy(&self, arena: &Arena, new_name: &str) -> Result<FieldRef> {
        let name = arena.strdup(new_name)?;
        Self::assemble(arena, name, self.value.clone(), None)
    }

    /// Copy this field under a new name, tagged with the transforms that
    /// produced it.
    pub fn copy_tagged(&self, arena: &Arena, new_name: &str, tfn: &str) -> Result<FieldRef> {
        let name = arena.strdup(new_name)?;
        let tfn = arena.strdup(tfn)?;
        Self::assemble(arena, name, self.value.clone(), Some(tfn))
    }

    /// Derive a field with the same name and tag but a new value.
    ///
    /// This is how transforms build their output.
    pub fn with_value(&self, arena: &Arena, value: FieldValue) -> Result<FieldRef> {
        Self::assemble(arena, self.name.clone(), value, self.tfn.clone())
    }

    /// Derive a string field with the same name and tag.
    pub fn with_str(&self, arena: &Arena, value: &str) -> Result<FieldRef> {
        self.with_value(arena, FieldValue::NulStr(arena.strdup(value)?))
    }

    /// Derive a byte-string field with the same name and tag.
    pub fn with_bytes(&self, arena: &Arena, value: &[u8]) -> Result<FieldRef> {
        self.with_value(arena, FieldValue::ByteStr(arena.memdup(value)?))
    }

    fn assemble(
        arena: &Arena,
        name: Arc<str>,
        value: FieldValue,
        tfn: Option<Arc<str>>,
    ) -> Result<FieldRef> {
        arena.charge(std::mem::size_of::<Field>())?;
        Ok(Arc::new(Self {
            name,
            value,
            tfn,
            origin: arena.id(),
        }))
    }

    /// Field name (may be empty)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field payload
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Field type tag
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }

    /// Transforms applied to produce this field, if any
    pub fn tfn(&self) -> Option<&str> {
        self.tfn.as_deref()
    }

    /// Arena generation this field was built in
    pub fn origin(&self) -> ArenaId {
        self.origin
    }

    /// String payload, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            FieldValue::NulStr(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a string or byte-string field
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            FieldValue::NulStr(s) => Some(s.as_bytes()),
            FieldValue::ByteStr(b) => Some(b),
            _ => None,
        }
    }

    /// List items, if this is a list field
    pub fn as_list(&self) -> Option<&[FieldRef]> {
        match &self.value {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Fail with a type mismatch unless this field is string-like.
    pub fn require_string_like(&self) -> Result<()> {
        if self.field_type().is_string_like() {
            Ok(())
        } else {
            Err(Error::type_mismatch("string or bytes", self.field_type()))
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NulStr(s) => f.write_str(s),
            Self::ByteStr(b) => f.write_str(&String::from_utf8_lossy(b)),
            Self::Num(n) => write!(f, "{n}"),
            Self::Unum(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.value())?;
                }
                f.write_str("]")
            }
        }
    }
}
