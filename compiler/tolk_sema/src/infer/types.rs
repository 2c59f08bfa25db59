//! Type expressions: `int32`, `Point?`, `Wrapper<int>`, `(int, slice) -> bool`.

use std::sync::Arc;

use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use super::{decl_type, Inferer};
use crate::decl::{Decl, DeclKind};
use crate::ty::{Substitution, Ty};

impl Inferer<'_> {
    pub(super) fn type_identifier(self, node: &SyntaxNode) -> Option<Ty> {
        let name = node.text();
        if name == "self" {
            let function = node
                .ancestors()
                .find(|ancestor| ancestor.kind().is_function_like())
                .and_then(Decl::from_node)?
                .as_function()?;
            return self.infer(&function.receiver_type()?);
        }
        if let Some(primitive) = Ty::from_name(name) {
            return Some(primitive);
        }
        let decl = self.db.resolve(node)?;
        decl_type(self.db, &decl)
    }

    /// Every variant must have a type.
    pub(super) fn union_type(self, node: &SyntaxNode) -> Option<Ty> {
        let variants = node
            .children()
            .map(|variant| self.infer(&variant))
            .collect::<Option<Vec<Ty>>>()?;
        Some(Ty::union(variants))
    }

    pub(super) fn instantiated_type(self, node: &SyntaxNode) -> Option<Ty> {
        let name = node.child_by_field(FieldName::Name)?;
        let base = self.infer(&name)?;
        let args = node
            .child_by_field(FieldName::Arguments)
            .map(|list| self.elements(&list))
            .unwrap_or_default();
        Some(match self.db.resolve(&name) {
            Some(decl) => self.instantiate(&decl, &base, args),
            None => Ty::instantiation(base.unwrap_instantiation(), args),
        })
    }

    /// `(int, slice) -> bool`. The parameter list is written as a tensor
    /// and spread into separate parameters.
    pub(super) fn callable_type(self, node: &SyntaxNode) -> Option<Ty> {
        let params = node.child_by_field(FieldName::ParamTypes)?;
        let ret = self.field(node, FieldName::ReturnType)?;
        let params = match self.infer(&params)? {
            Ty::Tensor(elements) if params.is(NodeKind::TensorType) => elements.to_vec(),
            single => vec![single],
        };
        Some(Ty::function(params, ret))
    }

    /// `base` applied to `args`. The body of a generic struct or alias is
    /// substituted right away, so `Wrapper<int>` has an `int` field.
    pub(super) fn instantiate(self, decl: &Decl, base: &Ty, args: Vec<Ty>) -> Ty {
        let mut inner = base.unwrap_instantiation();
        if matches!(decl.kind(), DeclKind::Struct | DeclKind::TypeAlias) {
            let mut substitution = Substitution::new();
            let names = decl.type_parameter_names();
            let defaults = match base {
                Ty::Instantiation { args: params, .. } => Arc::clone(params),
                _ => Arc::from(Vec::new()),
            };
            for (position, name) in names.into_iter().enumerate() {
                let arg = match args.get(position) {
                    Some(arg) => arg.clone(),
                    // `Wrapper<>` with `struct Wrapper<T = int>`
                    None => match defaults.get(position) {
                        Some(Ty::TypeParam {
                            default: Some(default),
                            ..
                        }) => (**default).clone(),
                        _ => continue,
                    },
                };
                substitution.insert(name, arg);
            }
            inner = inner.substitute(&substitution);
        }
        Ty::instantiation(inner, args)
    }
}
