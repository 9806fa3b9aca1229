use crate::{
    converter::{Converter, ConverterResolver},
    providers::{ConverterProvider, create_collection_converter},
    ty::{CollectionKind, RuntimeType},
};

/// Converts any collection into an immutable singly-linked list.
///
/// Accepts a pair when the target is a [`CollectionKind::PersistentList`]
/// collection, the source is any collection, and the root resolver can
/// convert the source element type into the target element type. The
/// converter copies the elements in order through a
/// [`ListBuilder`](crate::ListBuilder) and freezes the result.
///
/// # Examples
///
/// ```
/// use changetype::{PersistentList, Registry};
///
/// let registry = Registry::builder()
///     .converter(|n: i32| n.to_string())
///     .build();
///
/// let list: PersistentList<String> = registry.convert(vec![1, 2, 3]).unwrap();
/// assert_eq!(list.iter().map(String::as_str).collect::<Vec<_>>(), ["1", "2", "3"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistentListProvider;

impl ConverterProvider for PersistentListProvider {
    fn try_create(
        &self,
        source: RuntimeType,
        target: RuntimeType,
        root: &dyn ConverterResolver,
    ) -> Option<Converter> {
        create_collection_converter(source, target, root, &[CollectionKind::PersistentList])
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec,
        vec::Vec,
    };
    use core::cell::Cell;

    use super::*;
    use crate::{PersistentList, Value, error::ConversionError};

    fn int_to_string(source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        (source.is::<i32>() && target.is::<String>())
            .then(|| Converter::from_fn(|n: i32| n.to_string()))
    }

    fn list_of_strings(list: &PersistentList<String>) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }

    fn create(source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        PersistentListProvider.try_create(source, target, &int_to_string)
    }

    #[test]
    fn test_declines_non_list_target_without_resolving() {
        let calls = Cell::new(0);
        let counting = |_: RuntimeType, _: RuntimeType| -> Option<Converter> {
            calls.set(calls.get() + 1);
            None
        };

        for target in [
            RuntimeType::of::<Vec<String>>(),
            RuntimeType::of::<String>(),
            RuntimeType::of::<i32>(),
        ] {
            assert!(
                PersistentListProvider
                    .try_create(RuntimeType::of::<Vec<i32>>(), target, &counting)
                    .is_none()
            );
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_declines_scalar_source() {
        assert!(
            create(
                RuntimeType::of::<i32>(),
                RuntimeType::of::<PersistentList<String>>()
            )
            .is_none()
        );
    }

    #[test]
    fn test_declines_when_elements_unresolvable() {
        assert!(
            create(
                RuntimeType::of::<Vec<bool>>(),
                RuntimeType::of::<PersistentList<String>>()
            )
            .is_none()
        );
    }

    #[test]
    fn test_converts_in_order() {
        let converter = create(
            RuntimeType::of::<Vec<i32>>(),
            RuntimeType::of::<PersistentList<String>>(),
        )
        .unwrap();

        let output = converter
            .convert(Some(Value::new(vec![1_i32, 2, 3])))
            .unwrap()
            .unwrap()
            .downcast::<PersistentList<String>>()
            .unwrap();
        assert_eq!(list_of_strings(&output), ["1", "2", "3"]);
    }

    #[test]
    fn test_empty_input_gives_empty_list() {
        let converter = create(
            RuntimeType::of::<Vec<i32>>(),
            RuntimeType::of::<PersistentList<String>>(),
        )
        .unwrap();

        let output = converter
            .convert(Some(Value::new(Vec::<i32>::new())))
            .unwrap()
            .unwrap()
            .downcast::<PersistentList<String>>()
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_absent_input_gives_absent_output() {
        let converter = create(
            RuntimeType::of::<Vec<i32>>(),
            RuntimeType::of::<PersistentList<String>>(),
        )
        .unwrap();
        assert!(converter.convert(None).unwrap().is_none());
    }

    #[test]
    fn test_wrong_input_type_is_reported() {
        let converter = create(
            RuntimeType::of::<Vec<i32>>(),
            RuntimeType::of::<PersistentList<String>>(),
        )
        .unwrap();

        let report = converter
            .convert(Some(Value::new(vec![1_u8])))
            .unwrap_err();
        assert!(matches!(
            report.current_context(),
            ConversionError::TypeMismatch { found, .. } if found.contains("u8")
        ));
    }

    #[test]
    fn test_element_converter_producing_wrong_type_is_reported() {
        let lying = |_: RuntimeType, _: RuntimeType| Some(Converter::from_fn(|n: i32| n));
        let converter = PersistentListProvider
            .try_create(
                RuntimeType::of::<Vec<i32>>(),
                RuntimeType::of::<PersistentList<String>>(),
                &lying,
            )
            .unwrap();

        let report = converter
            .convert(Some(Value::new(vec![7_i32])))
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &ConversionError::TypeMismatch {
                expected: "alloc::string::String",
                found: "i32",
            }
        );
    }
}
