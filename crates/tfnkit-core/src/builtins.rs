//! Standard transforms
//!
//! A small set of normalizations that detection rules commonly ask for. All of
//! them accept strings and byte strings; byte strings are treated as ASCII so
//! arbitrary bytes pass through untouched. Each transform returns its input
//! handle when the value would not change.
//!
//! | Name | Effect |
//! |------|--------|
//! | `lowercase` | Lower-case letters |
//! | `uppercase` | Upper-case letters |
//! | `trim` | Strip leading and trailing whitespace |
//! | `trimLeft` | Strip leading whitespace |
//! | `trimRight` | Strip trailing whitespace |
//! | `compressWhitespace` | Collapse whitespace runs into one space |
//! | `removeWhitespace` | Drop all whitespace |
//! | `urlDecode` | Decode `%XX` escapes and `+` as space |
//! | `length` | Byte length of a string, or item count of a list |

use percent_encoding::percent_decode;

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::field::{FieldRef, FieldValue};
use crate::registry::TransformRegistry;

type BuiltinFn = fn(&Arena, &FieldRef) -> Result<FieldRef>;

/// `(name, handles_whole_list, function)` for every standard transform
const BUILTINS: &[(&str, bool, BuiltinFn)] = &[
    ("lowercase", false, lowercase),
    ("uppercase", false, uppercase),
    ("trim", false, trim),
    ("trimLeft", false, trim_left),
    ("trimRight", false, trim_right),
    ("compressWhitespace", false, compress_whitespace),
    ("removeWhitespace", false, remove_whitespace),
    ("urlDecode", false, url_decode),
    ("length", true, length),
];

/// Names of all standard transforms
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _, _)| *name)
}

/// Register the standard transform called `name`.
pub fn register(registry: &mut TransformRegistry, name: &str) -> Result<()> {
    let (name, whole_list, f) = BUILTINS
        .iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| Error::not_found(name))?;
    registry.register_fn(name, *whole_list, *f)
}

/// Register every standard transform.
pub fn register_all(registry: &mut TransformRegistry) -> Result<()> {
    for name in names() {
        register(registry, name)?;
    }
    Ok(())
}

/// Apply a text rewrite to a string or byte-string field.
///
/// `on_str` handles UTF-8 strings, `on_bytes` byte strings. Either returns
/// `None` when the value is already in the desired form.
fn rewrite(
    arena: &Arena,
    input: &FieldRef,
    on_str: impl Fn(&str) -> Option<String>,
    on_bytes: impl Fn(&[u8]) -> Option<Vec<u8>>,
) -> Result<FieldRef> {
    match input.value() {
        FieldValue::NulStr(s) => match on_str(&**s) {
            Some(out) => input.with_str(arena, &out),
            None => Ok(input.clone()),
        },
        FieldValue::ByteStr(b) => match on_bytes(&**b) {
            Some(out) => input.with_bytes(arena, &out),
            None => Ok(input.clone()),
        },
        other => Err(Error::type_mismatch("string or bytes", other.field_type())),
    }
}

fn lowercase(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out = s.to_lowercase();
            (out != s).then_some(out)
        },
        |b| b.iter().any(u8::is_ascii_uppercase).then(|| b.to_ascii_lowercase()),
    )
}

fn uppercase(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out = s.to_uppercase();
            (out != s).then_some(out)
        },
        |b| b.iter().any(u8::is_ascii_lowercase).then(|| b.to_ascii_uppercase()),
    )
}

fn trim(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out = s.trim();
            (out.len() != s.len()).then(|| out.to_string())
        },
        |b| {
            let out = b.trim_ascii();
            (out.len() != b.len()).then(|| out.to_vec())
        },
    )
}

fn trim_left(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out = s.trim_start();
            (out.len() != s.len()).then(|| out.to_string())
        },
        |b| {
            let out = b.trim_ascii_start();
            (out.len() != b.len()).then(|| out.to_vec())
        },
    )
}

fn trim_right(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out = s.trim_end();
            (out.len() != s.len()).then(|| out.to_string())
        },
        |b| {
            let out = b.trim_ascii_end();
            (out.len() != b.len()).then(|| out.to_vec())
        },
    )
}

fn compress_whitespace(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let mut out = String::with_capacity(s.len());
            let mut in_run = false;
            for c in s.chars() {
                if c.is_whitespace() {
                    if !in_run {
                        out.push(' ');
                    }
                    in_run = true;
                } else {
                    out.push(c);
                    in_run = false;
                }
            }
            (out != s).then_some(out)
        },
        |b| {
            let mut out = Vec::with_capacity(b.len());
            let mut in_run = false;
            for &byte in b {
                if byte.is_ascii_whitespace() {
                    if !in_run {
                        out.push(b' ');
                    }
                    in_run = true;
                } else {
                    out.push(byte);
                    in_run = false;
                }
            }
            (out != b).then_some(out)
        },
    )
}

fn remove_whitespace(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    rewrite(
        arena,
        input,
        |s| {
            let out: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            (out.len() != s.len()).then_some(out)
        },
        |b| {
            let out: Vec<u8> = b.iter().copied().filter(|c| !c.is_ascii_whitespace()).collect();
            (out.len() != b.len()).then_some(out)
        },
    )
}

/// Malformed escapes are kept as written. A string whose decoded bytes are
/// not UTF-8 becomes a byte string.
fn url_decode(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    let raw: &[u8] = match input.value() {
        FieldValue::NulStr(s) => s.as_bytes(),
        FieldValue::ByteStr(b) => &b[..],
        other => return Err(Error::type_mismatch("string or bytes", other.field_type())),
    };
    if !raw.iter().any(|b| matches!(*b, b'%' | b'+')) {
        return Ok(input.clone());
    }

    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    let decoded: Vec<u8> = percent_decode(&spaced).collect();

    match (input.value(), std::str::from_utf8(&decoded)) {
        (FieldValue::NulStr(_), Ok(s)) => input.with_str(arena, s),
        _ => input.with_bytes(arena, &decoded),
    }
}

fn length(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
    let len = match input.value() {
        FieldValue::NulStr(s) => s.len(),
        FieldValue::ByteStr(b) => b.len(),
        FieldValue::List(items) => items.len(),
        other => {
            return Err(Error::type_mismatch(
                "string, bytes or list",
                other.field_type(),
            ));
        }
    };
    input.with_value(arena, FieldValue::Unum(len as u64))
}
