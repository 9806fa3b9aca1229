//! Runtime type descriptors.
//!
//! A [`RuntimeType`] is a `Copy` handle to a `&'static` vtable that is built
//! at compile time for every Rust type implementing [`Reflect`]. The vtable
//! answers the questions the conversion machinery asks at runtime: what is the
//! [`TypeId`], what is the type called, and is it a collection, and if so,
//! of what.
//!
//! Collections additionally carry a [`CollectionType`], whose vtable holds
//! monomorphized functions to take a value of the collection apart into
//! erased elements and to assemble a new collection from converted elements.
//! Together these form a dispatch table keyed by runtime type, so converting
//! a `Vec<i32>` into a `PersistentList<String>` never needs to look anything
//! up by name.
//!
//! # Implementing `Reflect` for your own types
//!
//! ```
//! use changetype::{Reflect, RuntimeType, Shape};
//!
//! struct UserId(u64);
//!
//! impl Reflect for UserId {}
//!
//! assert!(matches!(RuntimeType::of::<UserId>().shape(), Shape::Scalar));
//! assert_eq!(RuntimeType::of::<Vec<UserId>>().element_type(), Some(RuntimeType::of::<UserId>()));
//! ```

use alloc::{boxed::Box, collections::VecDeque, string::String, vec::Vec};
use core::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

use changetype_internals::{ListBuilder, PersistentList};
use rootcause::Report;

use crate::{
    error::{ConversionError, ConversionResult, ElementIndex},
    value::Value,
};

/// Types whose values can flow through a [`Registry`](crate::Registry).
///
/// The default [`shape`](Reflect::shape) is [`Shape::Scalar`]. Collection
/// types override it with [`Shape::Collection`], usually via
/// [`CollectionType::of`].
pub trait Reflect: Any + Send + Sync {
    /// Describes the structure of `Self`.
    fn shape() -> Shape {
        Shape::Scalar
    }

    /// The value of `Self` that stands for an absent value, if there is one.
    ///
    /// Only nullable types such as `Option<T>` have one. Collecting an
    /// absent element into a collection of any other element type fails with
    /// [`ConversionError::UnexpectedNull`].
    fn absent() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// The structure of a runtime type, as far as conversion cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Anything that is not a collection.
    Scalar,
    /// An ordered collection of elements of a single type.
    Collection(CollectionType),
}

/// The family a collection type belongs to.
///
/// Providers select the collections they build by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CollectionKind {
    /// [`Vec<T>`]
    Vec,
    /// [`VecDeque<T>`]
    VecDeque,
    /// `Box<[T]>`
    BoxedSlice,
    /// An immutable singly-linked list such as [`PersistentList<T>`].
    PersistentList,
    /// Any other collection. No built-in provider targets these.
    Other,
}

/// Describes a Rust type at runtime.
///
/// Two descriptors are equal exactly when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct RuntimeType {
    vtable: &'static TypeVtable,
}

struct TypeVtable {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    shape: fn() -> Shape,
}

impl TypeVtable {
    const fn new<T: Reflect>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                shape: T::shape,
            }
        }
    }
}

impl RuntimeType {
    /// Returns the descriptor of `T`.
    #[must_use]
    pub const fn of<T: Reflect>() -> Self {
        Self {
            vtable: TypeVtable::new::<T>(),
        }
    }

    /// The [`TypeId`] of the described type.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        (self.vtable.type_id)()
    }

    /// The name of the described type, as given by [`core::any::type_name`].
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        (self.vtable.type_name)()
    }

    /// The shape of the described type.
    #[must_use]
    pub fn shape(&self) -> Shape {
        (self.vtable.shape)()
    }

    /// Returns `true` if this describes `T`.
    #[must_use]
    pub fn is<T: Reflect>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// The collection descriptor, if the described type is a collection.
    #[must_use]
    pub fn collection(&self) -> Option<CollectionType> {
        match self.shape() {
            Shape::Collection(collection) => Some(collection),
            Shape::Scalar => None,
        }
    }

    /// Extracts the element type of a container-shaped type.
    ///
    /// Returns `None` for scalars.
    #[must_use]
    pub fn element_type(&self) -> Option<RuntimeType> {
        self.collection().map(|collection| collection.element())
    }
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for RuntimeType {}

impl Hash for RuntimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id().hash(state);
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A boxed iterator over the erased elements of a collection value.
pub type Elements = Box<dyn Iterator<Item = Value>>;

/// A collection that can be taken apart into elements and rebuilt from them.
///
/// This is the capability every collection converter relies on. A type that
/// implements it and reports [`Shape::Collection`] from [`Reflect::shape`]
/// can be both the source and the target of collection conversions.
///
/// # Examples
///
/// ```
/// use changetype::{CollectionKind, CollectionType, Reflect, Registry, Sequence, Shape};
///
/// struct Stack(Vec<u8>);
///
/// impl Reflect for Stack {
///     fn shape() -> Shape {
///         Shape::Collection(CollectionType::of::<Self>())
///     }
/// }
///
/// impl Sequence for Stack {
///     type Element = u8;
///     const KIND: CollectionKind = CollectionKind::Other;
///
///     fn into_elements(self) -> impl Iterator<Item = u8> + 'static {
///         self.0.into_iter().rev()
///     }
///
///     fn from_elements<I: Iterator<Item = u8>>(elements: I) -> Self {
///         let mut items: Vec<u8> = elements.collect();
///         items.reverse();
///         Stack(items)
///     }
/// }
///
/// let registry = Registry::new();
/// let top_first: Vec<u8> = registry.convert(Stack(vec![1, 2, 3])).unwrap();
/// assert_eq!(top_first, [3, 2, 1]);
/// ```
pub trait Sequence: Reflect + Sized {
    /// The element type.
    type Element: Reflect;

    /// The family this collection belongs to.
    const KIND: CollectionKind;

    /// Takes the collection apart, yielding its elements in order.
    fn into_elements(self) -> impl Iterator<Item = Self::Element> + 'static;

    /// Builds the collection from elements given in order.
    fn from_elements<I: Iterator<Item = Self::Element>>(elements: I) -> Self;
}

/// Runtime view of a [`Sequence`] implementation.
#[derive(Clone, Copy)]
pub struct CollectionType {
    vtable: &'static CollectionVtable,
}

struct CollectionVtable {
    kind: CollectionKind,
    element: fn() -> RuntimeType,
    drain: fn(Value) -> Result<Elements, Value>,
    collect: fn(&mut dyn Iterator<Item = ConversionResult<Option<Value>>>) -> ConversionResult<Value>,
}

impl CollectionType {
    /// Returns the collection descriptor of `S`.
    #[must_use]
    pub const fn of<S: Sequence>() -> Self {
        Self {
            vtable: const {
                &CollectionVtable {
                    kind: S::KIND,
                    element: RuntimeType::of::<S::Element>,
                    drain: drain::<S>,
                    collect: collect::<S>,
                }
            },
        }
    }

    /// The family of the collection.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> CollectionKind {
        self.vtable.kind
    }

    /// The element type.
    #[inline]
    #[must_use]
    pub fn element(&self) -> RuntimeType {
        (self.vtable.element)()
    }

    /// Takes a collection value apart into erased elements.
    ///
    /// Hands the value back unchanged if it is not of this collection type.
    pub fn drain(&self, value: Value) -> Result<Elements, Value> {
        (self.vtable.drain)(value)
    }

    /// Assembles a collection value from converted elements.
    ///
    /// Stops at the first failed element. Every element must be present and
    /// of the element type; failures carry an [`ElementIndex`] attachment.
    pub fn collect(
        &self,
        items: &mut dyn Iterator<Item = ConversionResult<Option<Value>>>,
    ) -> ConversionResult<Value> {
        (self.vtable.collect)(items)
    }
}

impl PartialEq for CollectionType {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.element() == other.element()
    }
}

impl Eq for CollectionType {}

impl fmt::Debug for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionType")
            .field("kind", &self.kind())
            .field("element", &self.element())
            .finish()
    }
}

fn drain<S: Sequence>(value: Value) -> Result<Elements, Value> {
    let sequence = value.downcast::<S>()?;
    Ok(Box::new(sequence.into_elements().map(Value::new::<S::Element>)))
}

fn collect<S: Sequence>(
    items: &mut dyn Iterator<Item = ConversionResult<Option<Value>>>,
) -> ConversionResult<Value> {
    let mut failure = None;
    let elements = items.enumerate().map_while(|(index, item)| {
        match item.and_then(take_element::<S::Element>) {
            Ok(element) => Some(element),
            Err(report) => {
                failure = Some(report.attach(ElementIndex(index)));
                None
            }
        }
    });
    let sequence = S::from_elements(elements);

    match failure {
        Some(report) => Err(report),
        None => Ok(Value::new(sequence)),
    }
}

fn take_element<T: Reflect>(value: Option<Value>) -> ConversionResult<T> {
    match value {
        Some(value) => value.expect_type::<T>(),
        None => present_or_null(T::absent()),
    }
}

/// Unwraps `T::absent()`, reporting [`ConversionError::UnexpectedNull`] for
/// types that cannot be absent.
pub(crate) fn present_or_null<T: Reflect>(absent: Option<T>) -> ConversionResult<T> {
    absent.ok_or_else(|| {
        Report::new_sendsync(ConversionError::UnexpectedNull {
            target: core::any::type_name::<T>(),
        })
    })
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(impl Reflect for $ty {})*
    };
}

impl_scalar!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: Reflect> Reflect for Option<T> {
    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Collection(CollectionType::of::<Self>())
    }
}

impl<T: Reflect> Sequence for Vec<T> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::Vec;

    fn into_elements(self) -> impl Iterator<Item = T> + 'static {
        self.into_iter()
    }

    fn from_elements<I: Iterator<Item = T>>(elements: I) -> Self {
        elements.collect()
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Collection(CollectionType::of::<Self>())
    }
}

impl<T: Reflect> Sequence for VecDeque<T> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::VecDeque;

    fn into_elements(self) -> impl Iterator<Item = T> + 'static {
        self.into_iter()
    }

    fn from_elements<I: Iterator<Item = T>>(elements: I) -> Self {
        elements.collect()
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn shape() -> Shape {
        Shape::Collection(CollectionType::of::<Self>())
    }
}

impl<T: Reflect> Sequence for Box<[T]> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::BoxedSlice;

    fn into_elements(self) -> impl Iterator<Item = T> + 'static {
        self.into_vec().into_iter()
    }

    fn from_elements<I: Iterator<Item = T>>(elements: I) -> Self {
        elements.collect()
    }
}

// Draining a list whose nodes are shared with another list clones the
// elements of the shared nodes.
impl<T: Reflect + Clone> Reflect for PersistentList<T> {
    fn shape() -> Shape {
        Shape::Collection(CollectionType::of::<Self>())
    }
}

impl<T: Reflect + Clone> Sequence for PersistentList<T> {
    type Element = T;
    const KIND: CollectionKind = CollectionKind::PersistentList;

    fn into_elements(self) -> impl Iterator<Item = T> + 'static {
        self.into_iter()
    }

    fn from_elements<I: Iterator<Item = T>>(elements: I) -> Self {
        let mut builder = ListBuilder::with_capacity(elements.size_hint().0);
        builder.extend(elements);
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_runtime_type_identity() {
        assert_eq!(RuntimeType::of::<u8>(), RuntimeType::of::<u8>());
        assert_ne!(RuntimeType::of::<u8>(), RuntimeType::of::<i8>());
        assert!(RuntimeType::of::<String>().is::<String>());
        assert_eq!(RuntimeType::of::<bool>().name(), "bool");
    }

    #[test]
    fn test_element_type_extraction() {
        assert_eq!(RuntimeType::of::<i32>().element_type(), None);
        assert_eq!(
            RuntimeType::of::<Vec<i32>>().element_type(),
            Some(RuntimeType::of::<i32>())
        );
        assert_eq!(
            RuntimeType::of::<PersistentList<Vec<u8>>>().element_type(),
            Some(RuntimeType::of::<Vec<u8>>())
        );
    }

    #[test]
    fn test_collection_kinds() {
        let kind = |ty: RuntimeType| ty.collection().map(|c| c.kind());
        assert_eq!(kind(RuntimeType::of::<Vec<u8>>()), Some(CollectionKind::Vec));
        assert_eq!(
            kind(RuntimeType::of::<VecDeque<u8>>()),
            Some(CollectionKind::VecDeque)
        );
        assert_eq!(
            kind(RuntimeType::of::<Box<[u8]>>()),
            Some(CollectionKind::BoxedSlice)
        );
        assert_eq!(
            kind(RuntimeType::of::<PersistentList<u8>>()),
            Some(CollectionKind::PersistentList)
        );
        assert_eq!(kind(RuntimeType::of::<String>()), None);
    }

    #[test]
    fn test_drain_rejects_other_types() {
        let collection = RuntimeType::of::<Vec<u8>>().collection().unwrap();
        let rejected = collection.drain(Value::new(5_u8)).err().unwrap();
        assert!(rejected.is::<u8>());

        let elements: Vec<u8> = collection
            .drain(Value::new(vec![1_u8, 2]))
            .ok()
            .unwrap()
            .map(|value| value.downcast::<u8>().ok().unwrap())
            .collect();
        assert_eq!(elements, [1, 2]);
    }

    #[test]
    fn test_collect_reports_bad_element() {
        let collection = RuntimeType::of::<PersistentList<u8>>()
            .collection()
            .unwrap();
        let items: Vec<ConversionResult<Option<Value>>> =
            vec![Ok(Some(Value::new(1_u8))), Ok(Some(Value::new("two")))];
        let mut items = items.into_iter();

        let report = collection.collect(&mut items).err().unwrap();
        assert_eq!(
            report.current_context(),
            &ConversionError::TypeMismatch {
                expected: "u8",
                found: "&str",
            }
        );
    }

    #[test]
    fn test_collect_rejects_absent_element() {
        let collection = RuntimeType::of::<Vec<String>>().collection().unwrap();
        let items: Vec<ConversionResult<Option<Value>>> = vec![Ok(None)];
        let mut items = items.into_iter();

        let report = collection.collect(&mut items).err().unwrap();
        assert!(matches!(
            report.current_context(),
            ConversionError::UnexpectedNull { .. }
        ));
    }

    #[test]
    fn test_collect_keeps_absent_nullable_element() {
        let collection = RuntimeType::of::<PersistentList<Option<String>>>()
            .collection()
            .unwrap();
        let items: Vec<ConversionResult<Option<Value>>> = vec![
            Ok(Some(Value::new(Some(String::from("a"))))),
            Ok(None),
            Ok(Some(Value::new(None::<String>))),
        ];
        let mut items = items.into_iter();

        let list = collection
            .collect(&mut items)
            .unwrap()
            .downcast::<PersistentList<Option<String>>>()
            .unwrap();
        assert_eq!(
            list.iter().cloned().collect::<Vec<_>>(),
            [Some(String::from("a")), None, None]
        );
    }
}
