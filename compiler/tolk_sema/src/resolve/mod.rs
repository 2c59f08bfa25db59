//! Name resolution.
//!
//! An identifier is resolved by offering candidate declarations to a
//! [`Collector`] in search order until it accepts one:
//!
//! 1. a declaration's own name resolves to that declaration;
//! 2. `obj.field` searches the members of `obj`'s type ([`qualified`]);
//! 3. anything else walks enclosing scopes, then the file, its imports and
//!    the stubs ([`scope`]).
//!
//! Results are memoized per node in [`crate::cache::Caches::resolve`].

mod qualified;
mod scope;

use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use crate::db::Db;
use crate::decl::{trim_backticks, Decl};
use crate::state::ResolveState;

pub(crate) use scope::search_files;

/// Resolve `node` to its declaration.
pub fn resolve(db: &dyn Db, node: &SyntaxNode) -> Option<Decl> {
    db.caches()
        .resolve
        .get_or_compute(node.key(), || resolve_uncached(db, node))
}

#[tracing::instrument(level = "trace", skip_all, fields(name = node.text(), span = %node.span()))]
fn resolve_uncached(db: &dyn Db, node: &SyntaxNode) -> Option<Decl> {
    let mut collector = Collector::new(node, false);
    Reference::new(db, node).process(&mut collector);
    collector.found.into_iter().next()
}

/// Every declaration `node` names. Only struct literal shorthand
/// (`Point { x }`) has more than one.
pub fn multi_resolve(db: &dyn Db, node: &SyntaxNode) -> Vec<Decl> {
    if !is_shorthand_field(node) {
        return resolve(db, node).into_iter().collect();
    }
    let mut collector = Collector::new(node, true);
    Reference::new(db, node).process(&mut collector);
    let mut found: Vec<Decl> = Vec::with_capacity(collector.found.len());
    for decl in collector.found {
        if !found.iter().any(|seen| seen.is_same_declaration(&decl)) {
            found.push(decl);
        }
    }
    found
}

/// `x` in `Point { x }`.
fn is_shorthand_field(node: &SyntaxNode) -> bool {
    node.field_name() == Some(FieldName::Name)
        && node.parent().is_some_and(|parent| {
            parent.is(NodeKind::InstanceArgument) && parent.child_by_field(FieldName::Value).is_none()
        })
}

/// Search name for sized builtin types: `int32` is declared once as
/// `intN`.
pub(crate) fn bit_type_name(name: &str) -> Option<&'static str> {
    const FAMILIES: [(&str, &str); 6] = [
        ("varuint", "varuintN"),
        ("varint", "varintN"),
        ("uint", "uintN"),
        ("int", "intN"),
        ("bits", "bitsN"),
        ("bytes", "bytesN"),
    ];
    FAMILIES.iter().find_map(|&(prefix, generic)| {
        let digits = name.strip_prefix(prefix)?;
        (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(generic)
    })
}

/// Accepts candidates named like the element being resolved.
pub(crate) struct Collector<'a> {
    element: &'a SyntaxNode,
    name: &'a str,
    /// Keep going after a match.
    multi: bool,
    found: Vec<Decl>,
}

impl<'a> Collector<'a> {
    fn new(element: &'a SyntaxNode, multi: bool) -> Self {
        Collector {
            element,
            name: trim_backticks(element.text()),
            multi,
            found: Vec::new(),
        }
    }

    /// Offer one candidate; `false` stops the search.
    pub(crate) fn execute(&mut self, decl: &Decl, state: &ResolveState) -> bool {
        let name = state.search_name().unwrap_or(self.name);
        if decl.node() == self.element || decl.name() == name {
            self.found.push(decl.clone());
            return self.multi;
        }
        true
    }

    pub(crate) fn execute_all(&mut self, decls: &[Decl], state: &ResolveState) -> bool {
        decls.iter().all(|decl| self.execute(decl, state))
    }
}

/// One resolution walk for one element.
pub(crate) struct Reference<'a> {
    db: &'a dyn Db,
    element: &'a SyntaxNode,
    /// The element names a type. Match arm patterns are resolved both as
    /// types and as values.
    for_types: bool,
}

impl<'a> Reference<'a> {
    pub(crate) fn new(db: &'a dyn Db, element: &'a SyntaxNode) -> Self {
        let for_types = element.is(NodeKind::TypeIdentifier)
            && !element.parent().is_some_and(|parent| parent.is(NodeKind::MatchArm));
        Reference {
            db,
            element,
            for_types,
        }
    }

    pub(crate) fn process(&self, collector: &mut Collector<'_>) -> bool {
        if self.element.span().is_empty() {
            return true;
        }
        let state = ResolveState::new();

        if let Some(decl) = Decl::declared_by_name(self.element) {
            return collector.execute(&decl, &state);
        }

        match self.qualifier() {
            Some(qualifier) => self.process_qualified(&qualifier, collector, &state),
            None => self.process_unqualified(collector, state),
        }
    }

    /// `obj` when the element is `field` in `obj.field`.
    fn qualifier(&self) -> Option<SyntaxNode> {
        if self.element.field_name() != Some(FieldName::Field) {
            return None;
        }
        let parent = self.element.parent()?;
        if !parent.is(NodeKind::DotAccess) {
            return None;
        }
        parent.child_by_field(FieldName::Obj)
    }
}

#[cfg(test)]
mod tests {
    use super::bit_type_name;
    use pretty_assertions::assert_eq;

    #[test]
    fn sized_type_names_search_their_family() {
        assert_eq!(bit_type_name("int32"), Some("intN"));
        assert_eq!(bit_type_name("uint8"), Some("uintN"));
        assert_eq!(bit_type_name("varuint16"), Some("varuintN"));
        assert_eq!(bit_type_name("varint32"), Some("varintN"));
        assert_eq!(bit_type_name("bits256"), Some("bitsN"));
        assert_eq!(bit_type_name("bytes4"), Some("bytesN"));
        assert_eq!(bit_type_name("int"), None);
        assert_eq!(bit_type_name("integer"), None);
        assert_eq!(bit_type_name("intN"), None);
    }
}
