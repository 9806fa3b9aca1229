#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// Read/write lock over registry state: `std::sync::RwLock` with the `std`
/// feature, `spin::RwLock` otherwise.
pub(crate) struct RegistryLock<T>(impl_::RwLock<T>);

pub(crate) struct RegistryLockReadGuard<'a, T>(impl_::RwLockReadGuard<'a, T>);

pub(crate) struct RegistryLockWriteGuard<'a, T>(impl_::RwLockWriteGuard<'a, T>);

impl<T> RegistryLock<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    #[inline]
    pub(crate) fn read(&self) -> RegistryLockReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // Writers never leave the map half-updated, so a poisoned lock is
        // still safe to read.
        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(impl_::PoisonError::into_inner);

        RegistryLockReadGuard(guard)
    }

    #[inline]
    pub(crate) fn write(&self) -> RegistryLockWriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().unwrap_or_else(impl_::PoisonError::into_inner);

        RegistryLockWriteGuard(guard)
    }
}

impl<T> core::ops::Deref for RegistryLockReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::Deref for RegistryLockWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for RegistryLockWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
