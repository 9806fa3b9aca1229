use crate::{
    converter::{Converter, ConverterResolver},
    providers::{ConverterProvider, create_collection_converter},
    ty::{CollectionKind, RuntimeType},
};

/// Converts any collection into a `Vec`, `VecDeque` or `Box<[T]>`.
///
/// Element types are resolved through the root resolver, so nested
/// collections such as `Vec<PersistentList<u8>>` to `Vec<Vec<u8>>` work as
/// long as every level can be converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceProvider;

const TARGET_KINDS: &[CollectionKind] = &[
    CollectionKind::Vec,
    CollectionKind::VecDeque,
    CollectionKind::BoxedSlice,
];

impl ConverterProvider for SequenceProvider {
    fn try_create(
        &self,
        source: RuntimeType,
        target: RuntimeType,
        root: &dyn ConverterResolver,
    ) -> Option<Converter> {
        create_collection_converter(source, target, root, TARGET_KINDS)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{boxed::Box, collections::VecDeque, vec, vec::Vec};

    use super::*;
    use crate::{PersistentList, Value};

    fn widen(source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        (source.is::<u8>() && target.is::<u32>()).then(|| Converter::from_fn(|n: u8| u32::from(n)))
    }

    #[test]
    fn test_declines_persistent_list_target() {
        assert!(
            SequenceProvider
                .try_create(
                    RuntimeType::of::<Vec<u8>>(),
                    RuntimeType::of::<PersistentList<u32>>(),
                    &widen,
                )
                .is_none()
        );
    }

    #[test]
    fn test_list_to_deque() {
        let converter = SequenceProvider
            .try_create(
                RuntimeType::of::<PersistentList<u8>>(),
                RuntimeType::of::<VecDeque<u32>>(),
                &widen,
            )
            .unwrap();

        let input: PersistentList<u8> = [3, 1, 2].into_iter().collect();
        let output = converter
            .convert(Some(Value::new(input)))
            .unwrap()
            .unwrap()
            .downcast::<VecDeque<u32>>()
            .unwrap();
        assert_eq!(output, [3, 1, 2]);
    }

    #[test]
    fn test_vec_to_boxed_slice() {
        let converter = SequenceProvider
            .try_create(
                RuntimeType::of::<Vec<u8>>(),
                RuntimeType::of::<Box<[u32]>>(),
                &widen,
            )
            .unwrap();

        let output = converter
            .convert(Some(Value::new(vec![255_u8, 0])))
            .unwrap()
            .unwrap()
            .downcast::<Box<[u32]>>()
            .unwrap();
        assert_eq!(&*output, &[255, 0]);
    }
}
