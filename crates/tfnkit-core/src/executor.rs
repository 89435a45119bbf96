//! Single-step transform application

use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::field::{FieldRef, FieldType};
use crate::registry::TransformDescriptor;

/// Apply one transform to `input`.
///
/// List values are passed through whole only to transforms that declare
/// [`TransformDescriptor::handles_whole_list`]; any other transform receiving a
/// list is rejected with [`Error::TypeMismatch`] without being invoked.
/// Element-by-element dispatch is not supported.
///
/// Failures reported by the transform itself are returned unchanged.
pub fn apply_transform(
    descriptor: &TransformDescriptor,
    arena: &Arena,
    input: &FieldRef,
) -> Result<FieldRef> {
    if input.field_type() == FieldType::List && !descriptor.handles_whole_list() {
        return Err(Error::type_mismatch(
            format!("non-list input for '{}'", descriptor.name()),
            FieldType::List,
        ));
    }

    tracing::trace!(transform = descriptor.name(), field = input.name(), "applying transform");
    descriptor.transform().execute(arena, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldValue};
    use crate::registry::TransformRegistry;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn count_items(arena: &Arena, input: &FieldRef) -> Result<FieldRef> {
        match input.value() {
            FieldValue::List(items) => input.with_value(arena, FieldValue::Unum(items.len() as u64)),
            other => Err(Error::type_mismatch("list", other.field_type())),
        }
    }

    #[test]
    fn test_apply_passes_arena_and_input() {
        let mut registry = TransformRegistry::new();
        registry
            .register_fn("reverse", false, |arena: &Arena, input: &FieldRef| {
                let s: String = input.as_str().unwrap_or_default().chars().rev().collect();
                input.with_str(arena, &s)
            })
            .unwrap();

        let arena = Arena::new();
        let input = Field::nulstr(&arena, "x", "abc").unwrap();
        let out = apply_transform(&registry.lookup("reverse").unwrap(), &arena, &input).unwrap();
        assert_eq!(out.as_str(), Some("cba"));
        assert!(arena.owns(&out));
    }

    #[test]
    fn test_failure_is_surfaced_verbatim() {
        let mut registry = TransformRegistry::new();
        registry
            .register_fn("broken", false, |_: &Arena, _: &FieldRef| {
                Err(Error::Unexpected {
                    transform: "broken".to_string(),
                    message: "boom".to_string(),
                })
            })
            .unwrap();

        let arena = Arena::new();
        let input = Field::nulstr(&arena, "x", "abc").unwrap();
        let err = apply_transform(&registry.lookup("broken").unwrap(), &arena, &input).unwrap_err();
        assert_eq!(err.to_string(), "transform 'broken' failed: boom");
    }

    #[test]
    fn test_list_rejected_without_invoking_transform() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = TransformRegistry::new();
        registry
            .register_fn("noop", false, move |_: &Arena, input: &FieldRef| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(input.clone())
            })
            .unwrap();

        let arena = Arena::new();
        let item = Field::nulstr(&arena, "a", "1").unwrap();
        let list = Field::list(&arena, "l", vec![item]).unwrap();
        let err = apply_transform(&registry.lookup("noop").unwrap(), &arena, &list).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_list_passed_whole_when_declared() {
        let mut registry = TransformRegistry::new();
        registry.register_fn("count", true, count_items).unwrap();

        let arena = Arena::new();
        let items = vec![
            Field::nulstr(&arena, "a", "1").unwrap(),
            Field::nulstr(&arena, "b", "2").unwrap(),
        ];
        let list = Field::list(&arena, "l", items).unwrap();
        let out = apply_transform(&registry.lookup("count").unwrap(), &arena, &list).unwrap();
        assert_eq!(out.value(), &FieldValue::Unum(2));
    }
}
