//! Provider registry mapping actors to action providers.
//!
//! Lookup falls back from the actor binding to the default provider.

use std::collections::HashMap;
use std::sync::Arc;

use duel_core::ActorId;

use super::{ActionProvider, Result, RuntimeError};

#[derive(Default)]
pub struct ProviderRegistry {
    /// Sparse: only actors with a dedicated provider.
    bindings: HashMap<ActorId, Arc<dyn ActionProvider>>,
    default: Option<Arc<dyn ActionProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `actor` to its own provider, replacing any previous binding.
    pub fn bind(&mut self, actor: impl Into<ActorId>, provider: impl ActionProvider + 'static) {
        self.bindings.insert(actor.into(), Arc::new(provider));
    }

    pub fn unbind(&mut self, actor: &ActorId) {
        self.bindings.remove(actor);
    }

    pub fn set_default(&mut self, provider: impl ActionProvider + 'static) {
        self.default = Some(Arc::new(provider));
    }

    /// Resolve the provider for `actor`.
    ///
    /// Returns a clone of the `Arc` so callers can await on it without
    /// borrowing the registry.
    pub fn get(&self, actor: &ActorId) -> Result<Arc<dyn ActionProvider>> {
        self.bindings
            .get(actor)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| RuntimeError::ProviderNotSet {
                actor: actor.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BasicAttackProvider;

    #[test]
    fn lookup_falls_back_to_default() {
        let mut registry = ProviderRegistry::new();
        let alice = ActorId::new("alice");
        assert!(matches!(
            registry.get(&alice),
            Err(RuntimeError::ProviderNotSet { .. })
        ));

        registry.set_default(BasicAttackProvider);
        assert!(registry.get(&alice).is_ok());

        registry.bind("bob", BasicAttackProvider);
        registry.unbind(&ActorId::new("bob"));
        assert!(registry.get(&ActorId::new("bob")).is_ok());
    }
}
