#![no_std]
#![forbid(
    missing_docs,
    unsafe_code,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_docs_in_private_items,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
//! Internal implementation crate for [`changetype`].
//!
//! # Overview
//!
//! This crate contains the persistent data structures that the [`changetype`]
//! conversion registry produces when it converts collections:
//!
//! - [`PersistentList`]: an immutable singly-linked list with structural
//!   sharing. Nodes live behind [`Arc`], so cloning a list or taking its tail
//!   never copies elements.
//! - [`ListBuilder`]: a growable buffer that is finalized into a
//!   [`PersistentList`] in a single step, preserving insertion order.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`changetype`] crate,
//! which re-exports both types.
//!
//! [`changetype`]: https://docs.rs/changetype/latest/changetype/
//! [`Arc`]: triomphe::Arc

extern crate alloc;

mod builder;
mod list;

pub use builder::ListBuilder;
pub use list::{IntoIter, Iter, PersistentList};
