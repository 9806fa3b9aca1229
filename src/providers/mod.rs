//! Converter providers.
//!
//! A provider looks at a pair of runtime types and either produces a
//! [`Converter`] or declines. The [`Registry`](crate::Registry) asks its
//! providers in registration order and uses the first converter offered.
//!
//! # Built-in providers
//!
//! - [`PersistentListProvider`]: any collection into a
//!   [`PersistentList`](crate::PersistentList) (or any other
//!   [`CollectionKind::PersistentList`] sequence).
//! - [`SequenceProvider`]: any collection into a `Vec`, `VecDeque` or
//!   `Box<[T]>`.
//!
//! Both convert element by element, asking the root resolver for the element
//! converter. Declining is not an error; it just means "try someone else".
//!
//! # Writing a provider
//!
//! ```
//! use changetype::{Converter, ConverterProvider, ConverterResolver, Registry, RuntimeType};
//!
//! /// Converts booleans into their `Debug` representation.
//! struct Describe;
//!
//! impl ConverterProvider for Describe {
//!     fn try_create(
//!         &self,
//!         source: RuntimeType,
//!         target: RuntimeType,
//!         _root: &dyn ConverterResolver,
//!     ) -> Option<Converter> {
//!         (source.is::<bool>() && target.is::<String>())
//!             .then(|| Converter::from_fn(|b: bool| format!("{b:?}")))
//!     }
//! }
//!
//! let registry = Registry::builder().provider(Describe).build();
//! let text: String = registry.convert(true).unwrap();
//! assert_eq!(text, "true");
//! ```

mod persistent_list;
mod sequence;

pub use self::{persistent_list::PersistentListProvider, sequence::SequenceProvider};

use crate::{
    converter::{Converter, ConverterResolver},
    ty::{CollectionKind, CollectionType, RuntimeType},
};

/// Produces converters for the type pairs it recognizes.
pub trait ConverterProvider: 'static + Send + Sync {
    /// Returns a converter from `source` to `target`, or `None` to decline.
    ///
    /// `root` resolves converters for nested types, such as collection
    /// elements.
    fn try_create(
        &self,
        source: RuntimeType,
        target: RuntimeType,
        root: &dyn ConverterResolver,
    ) -> Option<Converter>;
}

/// Builds an element-wise collection converter if `target` is a collection
/// of one of `kinds` and the element types are convertible through `root`.
///
/// The target kind is checked before `root` is consulted.
fn create_collection_converter(
    source: RuntimeType,
    target: RuntimeType,
    root: &dyn ConverterResolver,
    kinds: &[CollectionKind],
) -> Option<Converter> {
    let target_collection = target
        .collection()
        .filter(|collection| kinds.contains(&collection.kind()))?;
    let source_collection = source.collection()?;

    let Some(element_converter) = root.resolve(
        source_collection.element(),
        target_collection.element(),
    ) else {
        tracing::trace!(
            source = %source,
            target = %target,
            "element types are not convertible"
        );
        return None;
    };

    Some(collection_converter(
        source,
        target,
        source_collection,
        target_collection,
        element_converter,
    ))
}

fn collection_converter(
    source: RuntimeType,
    target: RuntimeType,
    source_collection: CollectionType,
    target_collection: CollectionType,
    element_converter: Converter,
) -> Converter {
    Converter::new(source, target, move |input| {
        let Some(input) = input else {
            return Ok(None);
        };
        let elements = source_collection
            .drain(input)
            .map_err(|value| rootcause::Report::new_sendsync(value.mismatch(source)))?;
        let mut converted = elements.map(|element| element_converter.convert(Some(element)));
        target_collection.collect(&mut converted).map(Some)
    })
}
