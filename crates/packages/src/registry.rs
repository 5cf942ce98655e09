//! Managers keyed by package family

use devboot_types::PackageFamily;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::manager::PackageManager;

/// Lookup of the manager responsible for each package family
#[derive(Clone, Default)]
pub struct PackageManagers {
    managers: BTreeMap<PackageFamily, Arc<dyn PackageManager>>,
}

impl std::fmt::Debug for PackageManagers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.managers.keys()).finish()
    }
}

impl PackageManagers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager, replacing any previous one for the family
    #[must_use]
    pub fn with(mut self, family: PackageFamily, manager: Arc<dyn PackageManager>) -> Self {
        self.managers.insert(family, manager);
        self
    }

    #[must_use]
    pub fn get(&self, family: PackageFamily) -> Option<Arc<dyn PackageManager>> {
        self.managers.get(&family).cloned()
    }

    pub fn families(&self) -> impl Iterator<Item = PackageFamily> + '_ {
        self.managers.keys().copied()
    }
}
