//! Commonly used items for convenient importing.
//!
//! ```
//! use changetype::prelude::*;
//!
//! let registry = Registry::new();
//! let list: PersistentList<u8> = registry.convert(vec![1_u8, 2]).unwrap();
//! assert_eq!(list.head(), Some(&1));
//! ```

pub use crate::{
    ConversionError, ConversionResult, Converter, ConverterProvider, ConverterResolver,
    PersistentList, Reflect, Registry, RuntimeType, Sequence, Value,
};
