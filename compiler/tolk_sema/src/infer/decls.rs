//! Types of declarations.

use std::sync::Arc;

use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use crate::db::Db;
use crate::decl::{BodyKind, Decl, DeclKind, FunctionDecl, ParameterDecl};
use crate::ty::{join_types, Nominal, Ty};

/// Type a declaration gives to the names that refer to it.
///
/// Generic structs and aliases come wrapped in an instantiation over their
/// own type parameters, as `Wrapper<T>`.
#[tracing::instrument(level = "trace", skip_all, fields(kind = %decl.kind(), name = decl.name()))]
pub fn decl_type(db: &dyn Db, decl: &Decl) -> Option<Ty> {
    let infer = |node: &SyntaxNode| db.infer_type(node);
    let nominal = || Nominal::new(decl.name(), Some(decl.clone()));

    match decl.kind() {
        DeclKind::Struct => {
            let view = decl.as_struct()?;
            let fields: Arc<[Ty]> = view
                .fields()
                .iter()
                .map(|field| {
                    field
                        .as_field()
                        .and_then(|field| field.type_node())
                        .and_then(|ty| infer(&ty))
                        .unwrap_or(Ty::Unknown)
                })
                .collect();
            let ty = Ty::Struct {
                nominal: nominal(),
                fields,
            };
            Some(generic(db, ty, &view.type_parameters()))
        }
        DeclKind::TypeAlias => {
            let view = decl.as_type_alias()?;
            if view.is_builtin() {
                return Some(Ty::from_name(decl.name()).unwrap_or_else(|| Ty::Builtin(nominal())));
            }
            let inner = infer(&view.underlying_type()?)?;
            let ty = Ty::Alias {
                nominal: nominal(),
                inner: Arc::new(inner),
            };
            Some(generic(db, ty, &view.type_parameters()))
        }
        DeclKind::Enum => Some(Ty::Enum(nominal())),
        DeclKind::EnumMember => {
            let owner = decl.as_enum_member()?.owner()?;
            Some(Ty::Enum(Nominal::new(owner.name(), Some(owner.clone()))))
        }
        DeclKind::Constant => {
            let view = decl.as_constant()?;
            match view.type_node() {
                Some(ty) => infer(&ty),
                None => infer(&view.value()?),
            }
        }
        DeclKind::GlobalVariable => infer(&decl.as_global()?.type_node()?),
        DeclKind::Field => infer(&decl.as_field()?.type_node()?),
        DeclKind::Parameter => parameter_type(db, &decl.as_parameter()?),
        DeclKind::TypeParameter => {
            let default = decl
                .as_type_parameter()?
                .default_type()
                .and_then(|ty| infer(&ty))
                .map(Arc::new);
            Some(Ty::TypeParam {
                nominal: nominal(),
                default,
            })
        }
        DeclKind::LocalVariable => {
            let var = decl.as_local_var()?;
            if let Some(hint) = var.type_hint() {
                return infer(&hint);
            }
            let mut ty = infer(&var.assigned_value()?)?;
            // `val (a, [b, c]) = ...`: follow the pattern into the value.
            let mut pattern = var.declaration()?.child_by_field(FieldName::Lhs)?;
            for index in var.destructuring_path() {
                let elements = ty.elements()?;
                if elements.len() != pattern.children().count() {
                    return None;
                }
                ty = elements.get(index)?.clone();
                let nested = pattern.children().nth(index)?;
                pattern = nested;
            }
            Some(ty)
        }
        DeclKind::CatchVariable => {
            if decl.as_catch_var()?.is_first() {
                Some(Ty::Int)
            } else {
                Some(Ty::Unknown)
            }
        }
        DeclKind::Function
        | DeclKind::GetMethod
        | DeclKind::InstanceMethod
        | DeclKind::StaticMethod => function_type(db, &decl.as_function()?),
    }
}

/// Wrap `ty` in an instantiation over its own type parameters.
fn generic(db: &dyn Db, ty: Ty, params: &[SyntaxNode]) -> Ty {
    if params.is_empty() {
        return ty;
    }
    let args: Vec<Ty> = params
        .iter()
        .map(|param| db.infer_type(param).unwrap_or(Ty::Unknown))
        .collect();
    Ty::instantiation(ty, args)
}

/// Written type, or the receiver type for an untyped `self`.
fn parameter_type(db: &dyn Db, param: &ParameterDecl) -> Option<Ty> {
    if let Some(ty) = param.type_node() {
        return db.infer_type(&ty);
    }
    if !param.is_self() {
        return None;
    }
    let receiver = param.owner()?.as_function()?.receiver_type()?;
    db.infer_type(&receiver)
}

fn function_type(db: &dyn Db, function: &FunctionDecl) -> Option<Ty> {
    let params: Vec<Ty> = function
        .parameters(false)
        .iter()
        .map(|param| parameter_type(db, param).unwrap_or(Ty::Unknown))
        .collect();

    let ret = match (function.return_type(), function.body_kind()) {
        (Some(ty), _) => db.infer_type(&ty).unwrap_or(Ty::Unknown),
        (None, BodyKind::Common) => match function.body() {
            Some(body) => returned_type(db, &body),
            None => Ty::Void,
        },
        (None, BodyKind::Asm | BodyKind::Builtin | BodyKind::Missing) => Ty::Void,
    };
    Some(Ty::function(params, ret))
}

/// Join of the values returned from `body`; `void` when nothing is
/// returned.
fn returned_type(db: &dyn Db, body: &SyntaxNode) -> Ty {
    let mut values = Vec::new();
    walk(body, |node| {
        if node.kind().is_function_like() {
            return Walk::SkipChildren;
        }
        if node.is(NodeKind::ReturnStatement) {
            if let Some(value) = node.child_by_field(FieldName::Body) {
                values.push(value);
            }
            return Walk::SkipChildren;
        }
        Walk::Continue
    });
    if values.is_empty() {
        return Ty::Void;
    }

    values
        .iter()
        .filter_map(|value| db.infer_type(value))
        .reduce(|joined, ty| join_types(&joined, &ty))
        .unwrap_or(Ty::Unknown)
}
