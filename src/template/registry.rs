use std::collections::{hash_map::Entry, HashMap};

use super::Pattern;

static ANY: Pattern = Pattern::Any;

/// Token name to [`Pattern`] bindings for one scope.
///
/// The first registration for a token wins; later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: HashMap<String, Pattern>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the token already had a pattern.
    pub fn set(&mut self, token: impl Into<String>, pattern: Pattern) -> bool {
        match self.patterns.entry(token.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(pattern);
                true
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<&Pattern> {
        self.patterns.get(token)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Resolution over a template's local registry with global defaults behind it.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    local: &'a PatternRegistry,
    global: &'a PatternRegistry,
}

impl<'a> Scope<'a> {
    pub fn new(local: &'a PatternRegistry, global: &'a PatternRegistry) -> Self {
        Self { local, global }
    }

    /// Local binding, then global, then [`Pattern::Any`].
    pub fn resolve(&self, token: &str) -> &'a Pattern {
        self.local
            .get(token)
            .or_else(|| self.global.get(token))
            .unwrap_or(&ANY)
    }
}
