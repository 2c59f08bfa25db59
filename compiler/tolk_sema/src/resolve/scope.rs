//! Unqualified lookup: enclosing scopes, then files.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tolk_ir::{FieldName, FileId, NodeKind, SyntaxNode};

use super::{bit_type_name, Collector, Reference};
use crate::decl::Decl;
use crate::index::{FileIndex, IndexKey};
use crate::state::ResolveState;

impl Reference<'_> {
    pub(super) fn process_unqualified(
        &self,
        collector: &mut Collector<'_>,
        mut state: ResolveState,
    ) -> bool {
        let name = self.element.text();
        if name.is_empty() || name == "_" {
            return true;
        }

        if let Some(search_name) = bit_type_name(name) {
            state = state.with_value(ResolveState::SEARCH_NAME, search_name);
        }

        let parent = self.element.parent();
        let is_qualifier = parent.as_ref().is_some_and(|p| p.is(NodeKind::DotAccess));
        state = state.with_value(
            ResolveState::DOT_QUALIFIER,
            if is_qualifier { "true" } else { "false" },
        );

        if parent.as_ref().is_some_and(|p| p.is(NodeKind::InstanceArgument))
            && !self.process_instance_argument(collector, &state)
        {
            return false;
        }

        let in_receiver = self.element.ancestor_of_kind(NodeKind::MethodReceiver).is_some();
        if !in_receiver && !self.process_block(collector, &state) {
            return false;
        }

        if !self.process_all_entities(collector, &state) {
            return false;
        }

        // `T` in `fun Wrapper<T>.get(self)` declares itself.
        if in_receiver && self.element.is(NodeKind::TypeIdentifier) {
            let parameter = Decl::implicit_type_parameter(self.element.clone());
            return collector.execute(&parameter, &state);
        }
        true
    }

    /// Walk from the element up to the file root, offering every binding
    /// visible at the element.
    fn process_block(&self, collector: &mut Collector<'_>, state: &ResolveState) -> bool {
        let mut came_from: Option<SyntaxNode> = None;
        let mut current = Some(self.element.clone());

        while let Some(node) = current {
            if !self.process_scope(&node, came_from.as_ref(), collector, state) {
                return false;
            }
            current = node.parent();
            came_from = Some(node);
        }
        true
    }

    /// Bindings `scope` introduces for a node inside its child `came_from`.
    fn process_scope(
        &self,
        scope: &SyntaxNode,
        came_from: Option<&SyntaxNode>,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        let values = !self.for_types;
        match scope.kind() {
            NodeKind::BlockStatement if values => {
                return self.process_statements(scope, came_from, collector, state);
            }
            NodeKind::CatchClause if values => {
                let variables: Vec<Decl> = [FieldName::CatchVar1, FieldName::CatchVar2]
                    .into_iter()
                    .filter_map(|field| scope.child_by_field(field))
                    .filter_map(Decl::from_node)
                    .collect();
                return collector.execute_all(&variables, state);
            }
            NodeKind::MatchExpression if values => {
                let from_subject = came_from.is_some_and(|c| c.field_name() == Some(FieldName::Expr));
                if from_subject {
                    return true;
                }
                let binding = scope
                    .child_by_field(FieldName::Expr)
                    .filter(|subject| subject.is(NodeKind::LocalVarsDeclaration))
                    .and_then(|subject| subject.child_by_field(FieldName::Lhs));
                if let Some(lhs) = binding {
                    return self.process_variables(&lhs, collector, state);
                }
            }
            NodeKind::DoWhileStatement if values => {
                // The condition sees everything declared in the body.
                let from_condition =
                    came_from.is_some_and(|c| c.field_name() == Some(FieldName::Condition));
                if from_condition {
                    if let Some(body) = scope.child_by_field(FieldName::Body) {
                        return self.process_statements(&body, None, collector, state);
                    }
                }
            }
            kind if kind.is_function_like() => {
                return self.process_function(scope, collector, state);
            }
            NodeKind::StructDeclaration | NodeKind::TypeAliasDeclaration => {
                return self.process_type_parameters(scope, collector, state);
            }
            _ => {}
        }
        true
    }

    /// Statements of `block` before `stop` (all of them without `stop`).
    fn process_statements(
        &self,
        block: &SyntaxNode,
        stop: Option<&SyntaxNode>,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        for statement in block.children() {
            if stop == Some(&statement) {
                break;
            }
            if !statement.is(NodeKind::LocalVarsDeclaration) {
                continue;
            }
            if let Some(lhs) = statement.child_by_field(FieldName::Lhs) {
                if !self.process_variables(&lhs, collector, state) {
                    return false;
                }
            }
        }
        true
    }

    /// Names bound by a `val` pattern, nested patterns included. A `redef`
    /// binds nothing new.
    fn process_variables(
        &self,
        pattern: &SyntaxNode,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        match pattern.kind() {
            NodeKind::VarDeclaration => {
                if pattern.child_by_field(FieldName::Redef).is_some() {
                    return true;
                }
                match Decl::from_node(pattern.clone()) {
                    Some(decl) => collector.execute(&decl, state),
                    None => true,
                }
            }
            NodeKind::TupleVarsDeclaration | NodeKind::TensorVarsDeclaration => pattern
                .children()
                .all(|variable| self.process_variables(&variable, collector, state)),
            _ => true,
        }
    }

    fn process_function(
        &self,
        function: &SyntaxNode,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        // In type positions only `self` refers to a parameter.
        if !self.for_types || self.element.text() == "self" {
            let parameters: Vec<Decl> = function
                .child_by_field(FieldName::Parameters)
                .map(|list| {
                    list.children_of_kind(NodeKind::ParameterDeclaration)
                        .filter_map(Decl::from_node)
                        .collect()
                })
                .unwrap_or_default();
            if !collector.execute_all(&parameters, state) {
                return false;
            }
        }

        if !self.process_type_parameters(function, collector, state) {
            return false;
        }

        let Some(method) = Decl::from_node(function.clone()).and_then(|decl| decl.as_function())
        else {
            return true;
        };
        let implicit: Vec<Decl> = method
            .receiver_type_parameters(self.db)
            .into_iter()
            .map(Decl::implicit_type_parameter)
            .collect();
        collector.execute_all(&implicit, state)
    }

    /// Entries of the `<T, U>` list of `owner`.
    fn process_type_parameters(
        &self,
        owner: &SyntaxNode,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        let Some(list) = owner.child_by_field(FieldName::TypeParameters) else {
            return true;
        };
        let parameters: Vec<Decl> = list
            .children_of_kind(NodeKind::TypeParameter)
            .filter_map(Decl::from_node)
            .collect();
        collector.execute_all(&parameters, state)
    }

    /// `Point { x: 1 }`: the field `x` of the literal's struct.
    fn process_instance_argument(&self, collector: &mut Collector<'_>, state: &ResolveState) -> bool {
        if self.element.field_name() != Some(FieldName::Name) {
            return true;
        }
        let Some(literal) = self
            .element
            .ancestor_of_kind(NodeKind::ObjectLiteral)
        else {
            return true;
        };
        let Some(ty) = self.db.infer_type(&literal) else {
            return true;
        };
        let fields = ty
            .base_type()
            .anchor()
            .and_then(Decl::as_struct)
            .map(|decl| decl.fields())
            .unwrap_or_default();
        collector.execute_all(&fields, state)
    }

    /// Top-level declarations: this file, its imports, then the stubs.
    fn process_all_entities(&self, collector: &mut Collector<'_>, state: &ResolveState) -> bool {
        let file = self.element.file();
        for id in search_files(self.db, file) {
            let Some(index) = self.db.file_index(id) else {
                continue;
            };
            if !self.process_index(index, collector, state) {
                return false;
            }
        }
        true
    }

    fn process_index(
        &self,
        index: &FileIndex,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        let mut keys: Vec<IndexKey> = Vec::with_capacity(7);
        if !self.for_types {
            // `address.fromSlice(s)`: `address` may be a type or a
            // function; as a qualifier it is the type.
            if !state.is_dot_qualifier() {
                keys.extend([IndexKey::Funcs, IndexKey::GetMethods]);
            }
            keys.extend([IndexKey::GlobalVariables, IndexKey::Constants]);
        }
        keys.extend([IndexKey::Structs, IndexKey::Enums, IndexKey::TypeAliases]);

        keys.into_iter()
            .all(|key| index.process(key, |decl| collector.execute(decl, state)))
    }
}

/// Files searched for top-level names from `file`: the file itself, its
/// direct imports in order, the rest of the import graph breadth-first,
/// then the stubs.
pub(crate) fn search_files(db: &dyn crate::db::Db, file: FileId) -> Vec<FileId> {
    let mut order = vec![file];
    let mut seen: FxHashSet<FileId> = FxHashSet::default();
    seen.insert(file);

    let mut queue: VecDeque<FileId> = db.imported_files(file).into();
    while let Some(next) = queue.pop_front() {
        if !seen.insert(next) {
            continue;
        }
        order.push(next);
        queue.extend(db.imported_files(next));
    }

    for stub in db.stub_files() {
        if seen.insert(stub) {
            order.push(stub);
        }
    }
    order
}
