use std::sync::Arc;

use super::api::Resolver;

/// Ordered resolver set. The first resolver whose `supports` accepts an id
/// handles it.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register resolvers in order. A resolver whose name is already
    /// registered replaces the earlier one in place.
    pub fn register(&mut self, resolvers: impl IntoIterator<Item = Arc<dyn Resolver>>) {
        for resolver in resolvers {
            match self
                .resolvers
                .iter()
                .position(|existing| existing.name() == resolver.name())
            {
                Some(index) => self.resolvers[index] = resolver,
                None => self.resolvers.push(resolver),
            }
        }
    }

    pub fn match_resolver(&self, id: &str) -> Option<Arc<dyn Resolver>> {
        self.resolvers.iter().find(|r| r.supports(id)).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
