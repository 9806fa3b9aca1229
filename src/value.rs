//! Type-erased runtime values.

use alloc::boxed::Box;
use core::{any::Any, fmt};

use rootcause::Report;

use crate::{
    error::{ConversionError, ConversionResult},
    ty::{Reflect, RuntimeType},
};

/// An owned value whose concrete type is only known at runtime.
///
/// A [`Value`] remembers the [`RuntimeType`] it was created from, so a
/// converter can check its input and describe mismatches without knowing the
/// concrete type statically. An absent value is written as
/// `Option::<Value>::None`.
///
/// # Examples
///
/// ```
/// use changetype::{RuntimeType, Value};
///
/// let value = Value::new(7_u16);
/// assert_eq!(value.runtime_type(), RuntimeType::of::<u16>());
/// assert_eq!(value.downcast_ref::<u16>(), Some(&7));
/// assert!(value.downcast::<i64>().is_err());
/// ```
pub struct Value {
    ty: RuntimeType,
    inner: Box<dyn Any + Send + Sync>,
}

impl Value {
    /// Wraps a value.
    pub fn new<T: Reflect>(value: T) -> Self {
        Self {
            ty: RuntimeType::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// The runtime type of the wrapped value.
    #[inline]
    #[must_use]
    pub fn runtime_type(&self) -> RuntimeType {
        self.ty
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Reflect>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Returns a reference to the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Unwraps the value if it is a `T`, otherwise hands it back unchanged.
    pub fn downcast<T: Reflect>(self) -> Result<T, Self> {
        let Self { ty, inner } = self;
        match inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self { ty, inner }),
        }
    }

    /// Like [`downcast`](Self::downcast), but reports a
    /// [`ConversionError::TypeMismatch`] on failure.
    pub fn expect_type<T: Reflect>(self) -> ConversionResult<T> {
        self.downcast::<T>()
            .map_err(|value| Report::new_sendsync(value.mismatch(RuntimeType::of::<T>())))
    }

    /// The error describing that this value is not of type `expected`.
    pub(crate) fn mismatch(&self, expected: RuntimeType) -> ConversionError {
        ConversionError::TypeMismatch {
            expected: expected.name(),
            found: self.ty.name(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.ty).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String, vec};

    use super::*;

    #[test]
    fn test_value_send_sync() {
        static_assertions::assert_impl_all!(Value: Send, Sync);
    }

    #[test]
    fn test_failed_downcast_keeps_value() {
        let value = Value::new(String::from("kept"));
        let value = value.downcast::<u8>().unwrap_err();
        assert!(value.is::<String>());
        assert_eq!(value.downcast::<String>().unwrap(), "kept");
    }

    #[test]
    fn test_expect_type_reports_both_names() {
        let report = Value::new(vec![1_u8]).expect_type::<bool>().unwrap_err();
        assert_eq!(
            report.current_context(),
            &ConversionError::TypeMismatch {
                expected: "bool",
                found: "alloc::vec::Vec<u8>",
            }
        );
    }

    #[test]
    fn test_debug_names_type() {
        assert_eq!(format!("{:?}", Value::new(1_i8)), "Value(i8)");
    }
}
