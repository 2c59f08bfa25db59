//! Member lookup for `obj.field`.

use rustc_hash::FxHashSet;
use tolk_ir::{FieldName, FileId, NodeKind, SyntaxNode};

use super::scope::search_files;
use super::{Collector, Reference};
use crate::decl::{Decl, DeclKind};
use crate::index::IndexKey;
use crate::state::ResolveState;
use crate::ty::{Nominal, Ty};

impl Reference<'_> {
    pub(super) fn process_qualified(
        &self,
        qualifier: &SyntaxNode,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        // `Point.create()`, `Color.Red`: the qualifier names a type.
        let named = if matches!(
            qualifier.kind(),
            NodeKind::Identifier | NodeKind::TypeIdentifier
        ) {
            self.db.resolve(qualifier)
        } else {
            None
        };
        if let Some(decl) = &named {
            if matches!(decl.kind(), DeclKind::Struct | DeclKind::TypeAlias)
                && !self.process_static_methods(decl.name(), collector, state)
            {
                return false;
            }
        }

        let Some(qualifier_ty) = self.db.infer_type(qualifier).map(|ty| ty.unwrap_option()) else {
            return true;
        };

        // `Wrapper<int>.create()`
        if qualifier.is(NodeKind::GenericInstantiation) {
            let base = qualifier_ty.unwrap_instantiation();
            return self.process_static_methods(&base.name(), collector, state);
        }

        if let (Some(decl), Ty::Enum(nominal)) = (&named, qualifier_ty.unwrap_alias()) {
            let members = nominal
                .anchor
                .as_ref()
                .and_then(Decl::as_enum)
                .map(|decl| decl.members())
                .unwrap_or_default();
            if !collector.execute_all(&members, state) {
                return false;
            }
            if !self.process_static_methods(decl.name(), collector, state) {
                return false;
            }
        }

        self.process_type(&qualifier_ty, collector, state)
    }

    /// Fields and instance methods of `ty`, then those of what it aliases
    /// or instantiates.
    fn process_type(&self, ty: &Ty, collector: &mut Collector<'_>, state: &ResolveState) -> bool {
        match ty {
            Ty::Struct { .. } => {
                let fields = ty
                    .anchor()
                    .and_then(Decl::as_struct)
                    .map(|decl| decl.fields())
                    .unwrap_or_default();
                collector.execute_all(&fields, state) && self.process_type_methods(ty, collector, state)
            }
            Ty::Alias { inner, .. } => {
                self.process_type_methods(ty, collector, state)
                    && self.process_type(inner, collector, state)
            }
            Ty::Instantiation { .. } => {
                if !self.process_type_methods(ty, collector, state) {
                    return false;
                }
                let inner = ty.unwrap_instantiation();
                if inner.name() == "Cell" {
                    // `Cell<T>` is a `cell` as far as methods go.
                    let cell = Ty::Builtin(Nominal::new("cell", None));
                    if !self.process_type(&cell, collector, state) {
                        return false;
                    }
                    if !self.process_type(&Ty::nullable(cell), collector, state) {
                        return false;
                    }
                }
                self.process_type(&inner, collector, state)
            }
            _ => self.process_type_methods(ty, collector, state),
        }
    }

    /// Instance methods whose receiver accepts `ty`.
    fn process_type_methods(&self, ty: &Ty, collector: &mut Collector<'_>, state: &ResolveState) -> bool {
        let methods = self.methods(|decl| decl.kind() == DeclKind::InstanceMethod);
        for method in methods {
            let receiver = method.as_function().and_then(|f| f.receiver_type());
            if let Some(receiver) = receiver {
                if self.receiver_matches(ty, &receiver) && !collector.execute(&method, state) {
                    return false;
                }
            }
        }
        true
    }

    /// Static methods declared on `type_name`, on `Type<...>`, or on a
    /// receiver type parameter.
    fn process_static_methods(
        &self,
        type_name: &str,
        collector: &mut Collector<'_>,
        state: &ResolveState,
    ) -> bool {
        let methods = self.methods(|decl| decl.kind() == DeclKind::StaticMethod);
        for method in methods {
            let Some(receiver) = method.as_function().and_then(|f| f.receiver_type()) else {
                continue;
            };
            let matches = match receiver.kind() {
                NodeKind::TypeIdentifier => {
                    receiver.text() == type_name || self.is_receiver_type_parameter(&receiver)
                }
                NodeKind::InstantiatedType => receiver
                    .child_by_field(FieldName::Name)
                    .is_some_and(|name| name.text() == type_name),
                _ => false,
            };
            if matches && !collector.execute(&method, state) {
                return false;
            }
        }
        true
    }

    fn receiver_matches(&self, expected: &Ty, receiver: &SyntaxNode) -> bool {
        match receiver.kind() {
            NodeKind::TypeIdentifier => {
                // `fun T.toCell(self)` accepts anything.
                self.is_receiver_type_parameter(receiver) || expected.name() == receiver.text()
            }
            NodeKind::InstantiatedType => {
                let Some(Ty::Instantiation { inner: declared, .. }) = self.db.infer_type(receiver)
                else {
                    return false;
                };
                match expected {
                    Ty::Instantiation { inner, .. } => inner.name() == declared.name(),
                    _ => false,
                }
            }
            NodeKind::NullableType => {
                let (Ty::Union(union), Some(inner)) =
                    (expected, receiver.child_by_field(FieldName::Inner))
                else {
                    return false;
                };
                union
                    .as_nullable()
                    .is_some_and(|expected| self.receiver_matches(expected, &inner))
            }
            _ => false,
        }
    }

    fn is_receiver_type_parameter(&self, receiver: &SyntaxNode) -> bool {
        self.db
            .resolve(receiver)
            .is_some_and(|decl| decl.kind() == DeclKind::TypeParameter)
    }

    /// Methods visible from the element's file: its search files first,
    /// then every other file of the session.
    fn methods(&self, filter: impl Fn(&Decl) -> bool) -> Vec<Decl> {
        let mut files = search_files(self.db, self.element.file());
        let mut seen: FxHashSet<FileId> = files.iter().copied().collect();
        files.extend(self.db.file_ids().into_iter().filter(|id| seen.insert(*id)));

        files
            .into_iter()
            .filter_map(|id| self.db.file_index(id))
            .flat_map(|index| index.elements(IndexKey::Methods).iter())
            .filter(|decl| filter(decl))
            .cloned()
            .collect()
    }
}
