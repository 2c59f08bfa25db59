//! Expression rules.

use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use super::{decl_type, Inferer};
use crate::decl::{Decl, FunctionDecl};
use crate::ty::{join_types, Substitution, Ty};

impl Inferer<'_> {
    pub(super) fn ternary(self, node: &SyntaxNode) -> Option<Ty> {
        let when_true = self.field(node, FieldName::Consequence);
        let when_false = self.field(node, FieldName::Alternative);
        match (when_true, when_false) {
            (None, known) | (known, None) => known,
            (Some(Ty::Null), Some(other)) | (Some(other), Some(Ty::Null)) => {
                Some(Ty::nullable(other))
            }
            (Some(ty), Some(_)) => Some(ty),
        }
    }

    pub(super) fn binary(self, node: &SyntaxNode) -> Option<Ty> {
        let operator = node.child_by_field(FieldName::OperatorName)?;
        match operator.text() {
            "&&" | "||" | "==" | "!=" | "<" | ">" | "<=" | ">=" => Some(Ty::Bool),
            "+" | "-" | "*" | "/" | "%" | "<<" | ">>" | "&" | "|" | "^" => Some(Ty::Int),
            "??" => {
                let left = self.field(node, FieldName::Left)?;
                let right = self.field(node, FieldName::Right)?;
                Some(join_types(&left.unwrap_option(), &right))
            }
            _ => self.field(node, FieldName::Left),
        }
    }

    pub(super) fn unary(self, node: &SyntaxNode) -> Option<Ty> {
        let operator = node.child_by_field(FieldName::OperatorName)?;
        match operator.text() {
            "!" => Some(Ty::Bool),
            "-" | "+" | "~" => Some(Ty::Int),
            _ => self.field(node, FieldName::Argument),
        }
    }

    /// `obj.field`, `obj.method`, `tensor.0`.
    pub(super) fn dot_access(self, node: &SyntaxNode) -> Option<Ty> {
        let field = node.child_by_field(FieldName::Field)?;
        if field.is(NodeKind::NumericIndex) {
            let index: usize = field.text().parse().ok()?;
            let object = self.field(node, FieldName::Obj)?;
            return object.elements()?.get(index).cloned();
        }

        let member = self.db.resolve(&field)?;
        let ty = decl_type(self.db, &member)?;
        match self.field(node, FieldName::Obj) {
            Some(object) => Some(ty.substitute(&instantiation_substitution(&object))),
            None => Some(ty),
        }
    }

    pub(super) fn function_call(self, node: &SyntaxNode) -> Option<Ty> {
        let callee = node.child_by_field(FieldName::Callee)?;
        let (name, explicit) = callee_parts(&callee)?;
        let target = self.db.resolve(&name)?;

        let Some(function) = target.as_function() else {
            // A variable, parameter or field holding a function.
            return match decl_type(self.db, &target)?.unwrap_alias() {
                Ty::Function { ret, .. } => Some((*ret).clone()),
                _ => None,
            };
        };

        let ret = self.function_return(&target, &function)?;
        if !ret.has_generics() {
            return Some(ret);
        }

        let object = receiver_object(&callee);
        if matches!(ret, Ty::TypeParam { .. }) && matches!(target.name(), "fromCell" | "fromSlice") {
            // `Point.fromCell(c)` is a `Point`.
            return self.infer(&object?);
        }

        let mut substitution = match explicit {
            Some(list) => {
                let params: Vec<Ty> = self.type_parameter_types(&function);
                let args = self.elements(&list);
                Substitution::from_params(&params, &args)
            }
            None => Substitution::new(),
        };

        if let (Some(receiver), Some(object)) = (function.receiver_type(), &object) {
            if let (Some(receiver), Some(object)) = (self.infer(&receiver), self.infer(object)) {
                substitution.deduce(&receiver, &object);
            }
        }

        let skip_self = object
            .as_ref()
            .is_some_and(|object| !self.names_type(object));
        let arguments: Vec<SyntaxNode> = node
            .child_by_field(FieldName::Arguments)
            .map(|list| list.children_of_kind(NodeKind::CallArgument).collect())
            .unwrap_or_default();
        for (param, argument) in function.parameters(skip_self).iter().zip(&arguments) {
            let param = param.type_node().and_then(|ty| self.infer(&ty));
            if let (Some(param), Some(argument)) = (param, self.infer(argument)) {
                substitution.deduce(&param, &argument);
            }
        }

        let ret = ret.substitute(&substitution);
        (!ret.has_generics()).then_some(ret)
    }

    /// `f<int>` or `Wrapper<int>` in expression position.
    pub(super) fn generic_instantiation(self, node: &SyntaxNode) -> Option<Ty> {
        let expr = node.child_by_field(FieldName::Expr)?;
        let (name, _) = callee_parts(&expr)?;
        let target = self.db.resolve(&name)?;
        let args = node
            .child_by_field(FieldName::Arguments)
            .map(|list| self.elements(&list))
            .unwrap_or_default();

        match target.as_function() {
            Some(function) => {
                let ty = self.infer(&expr)?;
                let params = self.type_parameter_types(&function);
                Some(ty.substitute(&Substitution::from_params(&params, &args)))
            }
            None => {
                let base = decl_type(self.db, &target)?;
                Some(self.instantiate(&target, &base, args))
            }
        }
    }

    /// Struct literal: its written type, else what the surrounding
    /// construct expects.
    pub(super) fn object_literal(self, node: &SyntaxNode) -> Option<Ty> {
        if let Some(ty) = node.child_by_field(FieldName::Type) {
            return self.infer(&ty);
        }

        let parent = node.parent()?;
        match parent.kind() {
            // `val p: Point = { ... }`
            NodeKind::LocalVarsDeclaration => {
                let hint = parent
                    .child_by_field(FieldName::Lhs)
                    .filter(|lhs| lhs.is(NodeKind::VarDeclaration))?
                    .child_by_field(FieldName::Type)?;
                self.infer(&hint)
            }
            // `draw({ ... })`
            NodeKind::CallArgument => self.expected_argument(&parent),
            // `Line { start: { ... } }`
            NodeKind::InstanceArgument => {
                let field = self.field(&parent, FieldName::Name)?.unwrap_alias();
                match &field {
                    Ty::Union(union) => union
                        .variants()
                        .iter()
                        .find(|variant| matches!(variant.base_type(), Ty::Struct { .. }))
                        .cloned(),
                    _ => Some(field),
                }
            }
            // `return { ... }`
            NodeKind::ReturnStatement => {
                let function = parent
                    .ancestors()
                    .find(|ancestor| ancestor.kind().is_function_like())
                    .and_then(Decl::from_node)?
                    .as_function()?;
                self.infer(&function.return_type()?)
            }
            _ => None,
        }
    }

    pub(super) fn match_expression(self, node: &SyntaxNode) -> Option<Ty> {
        node.children_by_field(FieldName::Arms)
            .filter_map(|arm| arm.child_by_field(FieldName::Body))
            .filter(|body| !body.is(NodeKind::BlockStatement))
            .filter_map(|body| self.infer(&body))
            .reduce(|joined, ty| join_types(&joined, &ty))
    }

    /// Declared parameter type for one call argument.
    fn expected_argument(self, argument: &SyntaxNode) -> Option<Ty> {
        let list = argument.parent()?;
        let call = list.parent().filter(|call| call.is(NodeKind::FunctionCall))?;
        let position = list
            .children_of_kind(NodeKind::CallArgument)
            .position(|child| child == *argument)?;

        let callee = call.child_by_field(FieldName::Callee)?;
        let (name, _) = callee_parts(&callee)?;
        let function = self.db.resolve(&name)?.as_function()?;
        let skip_self = receiver_object(&callee).is_some_and(|object| !self.names_type(&object));

        let param = function.parameters(skip_self).into_iter().nth(position)?;
        Some(self.infer(&param.type_node()?)?.unwrap_alias())
    }

    /// Return type of `function`, inferred from its body when not written.
    fn function_return(self, target: &Decl, function: &FunctionDecl) -> Option<Ty> {
        if let Some(ret) = function.return_type() {
            return self.infer(&ret);
        }
        match decl_type(self.db, target)? {
            Ty::Function { ret, .. } => Some((*ret).clone()),
            _ => None,
        }
    }

    fn type_parameter_types(self, function: &FunctionDecl) -> Vec<Ty> {
        function
            .type_parameters()
            .iter()
            .map(|param| self.infer(param).unwrap_or(Ty::Unknown))
            .collect()
    }

    /// `node` spells a type name, as `Point` in `Point.create()`.
    fn names_type(self, node: &SyntaxNode) -> bool {
        match node.kind() {
            NodeKind::Identifier | NodeKind::TypeIdentifier => self
                .db
                .resolve(node)
                .is_some_and(|decl| decl.kind().is_type()),
            NodeKind::GenericInstantiation => true,
            _ => false,
        }
    }
}

/// Name node and explicit type argument list of a callee: `f`, `obj.f`,
/// `f<int>`, `obj.f<int>`.
fn callee_parts(callee: &SyntaxNode) -> Option<(SyntaxNode, Option<SyntaxNode>)> {
    match callee.kind() {
        NodeKind::Identifier => Some((callee.clone(), None)),
        NodeKind::DotAccess => Some((callee.child_by_field(FieldName::Field)?, None)),
        NodeKind::GenericInstantiation => {
            let (name, _) = callee_parts(&callee.child_by_field(FieldName::Expr)?)?;
            Some((name, callee.child_by_field(FieldName::Arguments)))
        }
        _ => None,
    }
}

/// `obj` in `obj.f(...)` or `obj.f<int>(...)`.
fn receiver_object(callee: &SyntaxNode) -> Option<SyntaxNode> {
    match callee.kind() {
        NodeKind::DotAccess => callee.child_by_field(FieldName::Obj),
        NodeKind::GenericInstantiation => receiver_object(&callee.child_by_field(FieldName::Expr)?),
        _ => None,
    }
}

/// Bindings of the type parameters of `ty`'s generic declaration to its
/// arguments: `T -> int` for `Wrapper<int>`. Empty for anything else.
fn instantiation_substitution(ty: &Ty) -> Substitution {
    let mut substitution = Substitution::new();
    let ty = ty.unwrap_option();
    let Ty::Instantiation { inner, args } = &ty else {
        return substitution;
    };
    let Some(anchor) = inner.anchor() else {
        return substitution;
    };
    for (name, arg) in anchor.type_parameter_names().into_iter().zip(args.iter()) {
        substitution.insert(name, arg.clone());
    }
    substitution
}
