//! Name resolution scopes (§4.3 pass 1 & 2, §3 invariant 8).
//!
//! There is one scope for the top-level schema and one additional scope for
//! each union branch's nested definition. Lookup starts at the innermost
//! enclosing scope and walks outward, so a branch's own name shadows a
//! top-level definition with the same name only for resolution that starts
//! inside that branch.

use std::collections::HashMap;

use crate::ir::DefId;

#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, DefId>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut stack = Self::default();
        stack.push_scope();
        stack
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Binds `name` in the innermost scope. Returns the previously bound
    /// `DefId` in that same scope, if any — callers use this to detect
    /// `DuplicateDefinition` without a separate lookup.
    pub fn bind(&mut self, name: &str, id: DefId) -> Option<DefId> {
        let scope = self.scopes.last_mut().expect("ScopeStack always has at least one scope");
        scope.insert(name.to_string(), id)
    }

    /// Looks up `name` starting at the innermost scope and walking outward.
    pub fn lookup(&self, name: &str) -> Option<DefId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.get(name) {
                return Some(id);
            }
        }
        None
    }

    /// Looks up `name` only within the innermost scope, for duplicate checks
    /// that must not see shadowed outer names.
    pub fn lookup_local(&self, name: &str) -> Option<DefId> {
        self.scopes.last().and_then(|s| s.get(name)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_binding_in_current_scope() {
        let mut stack = ScopeStack::new();
        stack.bind("Point", DefId(0));
        assert_eq!(stack.lookup("Point"), Some(DefId(0)));
    }

    #[test]
    fn inner_scope_shadows_outer_for_lookup() {
        let mut stack = ScopeStack::new();
        stack.bind("A", DefId(0));
        stack.push_scope();
        stack.bind("A", DefId(1));
        assert_eq!(stack.lookup("A"), Some(DefId(1)));
        stack.pop_scope();
        assert_eq!(stack.lookup("A"), Some(DefId(0)));
    }

    #[test]
    fn outer_scope_still_visible_from_inner_when_not_shadowed() {
        let mut stack = ScopeStack::new();
        stack.bind("Outer", DefId(0));
        stack.push_scope();
        assert_eq!(stack.lookup("Outer"), Some(DefId(0)));
    }

    #[test]
    fn bind_returns_previous_binding_for_duplicate_detection() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.bind("A", DefId(0)), None);
        assert_eq!(stack.bind("A", DefId(1)), Some(DefId(0)));
    }

    #[test]
    fn lookup_local_ignores_outer_scopes() {
        let mut stack = ScopeStack::new();
        stack.bind("A", DefId(0));
        stack.push_scope();
        assert_eq!(stack.lookup_local("A"), None);
    }
}
