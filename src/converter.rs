//! Converters and the resolver interface providers recurse through.

use core::{fmt, marker::PhantomData};

use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{
    error::ConversionResult,
    ty::{Reflect, RuntimeType},
    value::Value,
};

/// A function from one runtime type to another.
///
/// A [`Converter`] is cheap to clone and can be shared between threads.
/// Every converter passes an absent input through as an absent output, so
/// callers only need to handle present values specially when they want to.
///
/// # Examples
///
/// ```
/// use changetype::{Converter, Value};
///
/// let to_string = Converter::from_fn(|n: i32| n.to_string());
///
/// let output = to_string.convert(Some(Value::new(12_i32))).unwrap().unwrap();
/// assert_eq!(output.downcast::<String>().unwrap(), "12");
///
/// assert!(to_string.convert(None).unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct Converter {
    source: RuntimeType,
    target: RuntimeType,
    inner: Arc<dyn UntypedConverter>,
}

pub(crate) trait UntypedConverter: 'static + Send + Sync {
    fn convert(&self, input: Option<Value>) -> ConversionResult<Option<Value>>;
}

struct FnConverter<F> {
    function: F,
}

impl<F> UntypedConverter for FnConverter<F>
where
    F: Fn(Option<Value>) -> ConversionResult<Option<Value>> + Send + Sync + 'static,
{
    fn convert(&self, input: Option<Value>) -> ConversionResult<Option<Value>> {
        (self.function)(input)
    }
}

struct TypedConverter<A, B, F> {
    function: F,
    _types: PhantomData<fn(A) -> B>,
}

impl<A, B, F> UntypedConverter for TypedConverter<A, B, F>
where
    A: Reflect,
    B: Reflect,
    F: Fn(A) -> ConversionResult<B> + Send + Sync + 'static,
{
    fn convert(&self, input: Option<Value>) -> ConversionResult<Option<Value>> {
        let Some(input) = input else {
            return Ok(None);
        };
        let input = input.expect_type::<A>()?;
        (self.function)(input).map(|output| Some(Value::new(output)))
    }
}

struct Identity;

impl UntypedConverter for Identity {
    fn convert(&self, input: Option<Value>) -> ConversionResult<Option<Value>> {
        Ok(input)
    }
}

impl Converter {
    fn from_untyped<C: UntypedConverter>(source: RuntimeType, target: RuntimeType, inner: C) -> Self {
        let inner: Arc<C> = Arc::new(inner);
        let inner = inner.unsize(unsize::Coercion!(to dyn UntypedConverter));
        Self {
            source,
            target,
            inner,
        }
    }

    /// Creates a converter from a function over erased values.
    ///
    /// The function receives absent inputs as well; it is expected to pass
    /// them through.
    pub fn new<F>(source: RuntimeType, target: RuntimeType, function: F) -> Self
    where
        F: Fn(Option<Value>) -> ConversionResult<Option<Value>> + Send + Sync + 'static,
    {
        Self::from_untyped(source, target, FnConverter { function })
    }

    /// Creates a converter that returns its input unchanged.
    #[must_use]
    pub fn identity(ty: RuntimeType) -> Self {
        Self::from_untyped(ty, ty, Identity)
    }

    /// Creates a converter from an infallible typed function.
    pub fn from_fn<A, B, F>(function: F) -> Self
    where
        A: Reflect,
        B: Reflect,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Self::try_from_fn(move |input: A| Ok(function(input)))
    }

    /// Creates a converter from a fallible typed function.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetype::{ConversionError, Converter, Value};
    /// use rootcause::Report;
    ///
    /// let parse = Converter::try_from_fn(|text: String| {
    ///     text.parse::<u8>()
    ///         .map_err(|_| Report::new_sendsync(ConversionError::invalid_value(text)))
    /// });
    ///
    /// assert!(parse.convert(Some(Value::new("300".to_string()))).is_err());
    /// ```
    pub fn try_from_fn<A, B, F>(function: F) -> Self
    where
        A: Reflect,
        B: Reflect,
        F: Fn(A) -> ConversionResult<B> + Send + Sync + 'static,
    {
        Self::from_untyped(
            RuntimeType::of::<A>(),
            RuntimeType::of::<B>(),
            TypedConverter {
                function,
                _types: PhantomData,
            },
        )
    }

    /// The type this converter accepts.
    #[inline]
    #[must_use]
    pub fn source(&self) -> RuntimeType {
        self.source
    }

    /// The type this converter produces.
    #[inline]
    #[must_use]
    pub fn target(&self) -> RuntimeType {
        self.target
    }

    /// Applies the converter.
    ///
    /// An absent input yields an absent output.
    pub fn convert(&self, input: Option<Value>) -> ConversionResult<Option<Value>> {
        self.inner.convert(input)
    }

    /// Returns `true` if both converters share the same underlying function.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Finds converters between runtime types.
///
/// Providers receive a resolver as their root so they can recurse into
/// element types. The [`Registry`](crate::Registry) is the usual
/// implementation; any `Fn(RuntimeType, RuntimeType) -> Option<Converter>`
/// closure works too.
pub trait ConverterResolver {
    /// Returns a converter from `source` to `target`, or `None` if there is
    /// none.
    fn resolve(&self, source: RuntimeType, target: RuntimeType) -> Option<Converter>;
}

impl<F> ConverterResolver for F
where
    F: Fn(RuntimeType, RuntimeType) -> Option<Converter>,
{
    fn resolve(&self, source: RuntimeType, target: RuntimeType) -> Option<Converter> {
        self(source, target)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;
    use crate::error::ConversionError;

    #[test]
    fn test_converter_send_sync() {
        static_assertions::assert_impl_all!(Converter: Send, Sync, Clone);
    }

    #[test]
    fn test_typed_converter_rejects_wrong_input() {
        let converter = Converter::from_fn(|n: u32| n + 1);
        let report = converter
            .convert(Some(Value::new(String::from("nope"))))
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &ConversionError::TypeMismatch {
                expected: "u32",
                found: "alloc::string::String",
            }
        );
    }

    #[test]
    fn test_typed_converter_passes_absent_through() {
        let converter = Converter::from_fn(|n: u32| n.to_string());
        assert!(converter.convert(None).unwrap().is_none());
        assert_eq!(converter.source(), RuntimeType::of::<u32>());
        assert_eq!(converter.target(), RuntimeType::of::<String>());
    }

    #[test]
    fn test_identity() {
        let converter = Converter::identity(RuntimeType::of::<u8>());
        let output = converter.convert(Some(Value::new(3_u8))).unwrap().unwrap();
        assert_eq!(output.downcast_ref::<u8>(), Some(&3));
    }

    #[test]
    fn test_clones_share_function() {
        let converter = Converter::from_fn(|n: u8| n);
        assert!(Converter::ptr_eq(&converter, &converter.clone()));
        assert!(!Converter::ptr_eq(&converter, &Converter::from_fn(|n: u8| n)));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |source: RuntimeType, target: RuntimeType| {
            (source == target).then(|| Converter::identity(source))
        };
        assert!(resolver.resolve(RuntimeType::of::<u8>(), RuntimeType::of::<u8>()).is_some());
        assert!(resolver.resolve(RuntimeType::of::<u8>(), RuntimeType::of::<i8>()).is_none());
    }
}
