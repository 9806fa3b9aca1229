#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![forbid(unsafe_code)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A runtime type-conversion registry.
//!
//! ## Overview
//!
//! `changetype` converts values whose types are only known at runtime. You
//! describe the conversions you know about (`i32` to `String`, say), and the
//! [`Registry`] derives the rest: a `Vec<i32>` becomes a
//! [`PersistentList<String>`], a `PersistentList<Vec<i32>>` becomes a
//! `Vec<Box<[String]>>`, and so on, recursing through element types as deep
//! as they go.
//!
//! ```
//! use changetype::{PersistentList, Registry};
//!
//! let registry = Registry::builder()
//!     .converter(|n: i32| n.to_string())
//!     .build();
//!
//! let list: PersistentList<String> = registry.convert(vec![1, 2, 3]).unwrap();
//! assert_eq!(list.iter().map(String::as_str).collect::<Vec<_>>(), ["1", "2", "3"]);
//! ```
//!
//! ## Core Concepts
//!
//! - A [`RuntimeType`] names a type and knows its [`Shape`]: a scalar, or a
//!   collection with a [`CollectionKind`] and an element type.
//! - A [`Value`] is a type-erased, owned value tagged with its runtime type.
//!   "No value" is `None`, and every converter maps `None` to `None`.
//! - A [`Converter`] turns values of one runtime type into another.
//! - A [`ConverterProvider`] is a factory that may produce a converter for a
//!   pair of types, asking the root [`ConverterResolver`] for anything nested.
//! - The [`Registry`] is that root resolver. It caches every answer.
//!
//! Collection types opt in by implementing [`Sequence`]. `Vec`, `VecDeque`,
//! `Box<[T]>` and [`PersistentList`] are supported out of the box.
//!
//! ## Errors
//!
//! Fallible operations return a [`ConversionResult`], a
//! [`rootcause::Report`] over [`ConversionError`]. Failures while converting
//! a collection carry an [`ElementIndex`] attachment naming the element.
//!
//! ## Logging
//!
//! Resolution is instrumented with [`tracing`]: `debug` events when a
//! provider creates a converter or every provider declines, `trace` events
//! for cache hits and element types that cannot be converted.
//!
//! ## Global registry
//!
//! A registry can be installed process-wide with [`Registry::install`] and
//! retrieved with [`Registry::global`].
//!
//! ## Features
//!
//! - `std`: use `std::sync::RwLock` instead of a spin lock for the
//!   resolution cache and the global registry.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod converter;
mod error;
pub mod prelude;
pub mod providers;
mod registry;
mod ty;
mod value;

pub use changetype_internals::{ListBuilder, PersistentList};

pub use self::{
    converter::{Converter, ConverterResolver},
    error::{ConversionError, ConversionResult, ElementIndex},
    providers::{ConverterProvider, PersistentListProvider, SequenceProvider},
    registry::{GlobalRegistry, Registry, RegistryAlreadyInstalledError, RegistryBuilder},
    ty::{CollectionKind, CollectionType, Elements, Reflect, RuntimeType, Sequence, Shape},
    value::Value,
};

/// Iterators over a [`PersistentList`].
pub mod list {
    pub use changetype_internals::{IntoIter, Iter};
}
