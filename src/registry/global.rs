use triomphe::Arc;

use super::{Registry, lock::RegistryLock};

static GLOBAL: RegistryLock<Option<GlobalRegistry>> = RegistryLock::new(None);

/// Shared handle to a registry installed with [`Registry::install`] or
/// [`Registry::replace_global`].
///
/// Dereferences to the [`Registry`]. Cloning the handle is cheap, and a
/// handle keeps its registry alive after it has been replaced.
#[derive(Clone)]
pub struct GlobalRegistry(Arc<Registry>);

impl GlobalRegistry {
    /// Returns `true` if both handles point to the same registry.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl core::ops::Deref for GlobalRegistry {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        &self.0
    }
}

impl core::fmt::Debug for GlobalRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.0, f)
    }
}

/// Error returned by [`Registry::install`] when a global registry is already
/// installed. Carries back the registry that was not installed.
pub struct RegistryAlreadyInstalledError(pub Registry);

impl core::fmt::Debug for RegistryAlreadyInstalledError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistryAlreadyInstalledError").finish()
    }
}

impl core::fmt::Display for RegistryAlreadyInstalledError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "a converter registry is already installed globally")
    }
}

impl core::error::Error for RegistryAlreadyInstalledError {}

impl Registry {
    /// Installs `self` as the process-wide registry.
    ///
    /// Fails if a registry is already installed. See also
    /// [`replace_global`](Self::replace_global).
    ///
    /// # Examples
    ///
    /// ```
    /// use changetype::Registry;
    ///
    /// Registry::new().install().unwrap();
    /// assert!(Registry::new().install().is_err());
    ///
    /// let list: changetype::PersistentList<u8> =
    ///     Registry::global().unwrap().convert(vec![1_u8]).unwrap();
    /// assert_eq!(list.len(), 1);
    /// ```
    pub fn install(self) -> Result<(), RegistryAlreadyInstalledError> {
        let mut global = GLOBAL.write();
        if global.is_some() {
            return Err(RegistryAlreadyInstalledError(self));
        }
        *global = Some(GlobalRegistry(Arc::new(self)));
        tracing::debug!("installed global converter registry");
        Ok(())
    }

    /// Installs `self` as the process-wide registry, returning the one it
    /// replaces.
    ///
    /// Holders of the previous registry keep using it until they drop it.
    pub fn replace_global(self) -> Option<GlobalRegistry> {
        let previous = GLOBAL.write().replace(GlobalRegistry(Arc::new(self)));
        tracing::debug!(replaced = previous.is_some(), "replaced global converter registry");
        previous
    }

    /// The process-wide registry, if one has been installed.
    #[must_use]
    pub fn global() -> Option<GlobalRegistry> {
        GLOBAL.read().clone()
    }
}
