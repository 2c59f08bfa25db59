//! Kind-specific views over declaration nodes.

use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use super::Decl;
use crate::db::Resolver;

/// How a function body is given.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Common,
    Asm,
    Builtin,
    Missing,
}

macro_rules! view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            node: SyntaxNode,
        }

        impl $name {
            pub(super) fn new(node: SyntaxNode) -> Self {
                $name { node }
            }

            pub fn node(&self) -> &SyntaxNode {
                &self.node
            }
        }
    };
}

view!(
    /// Function, get-method, instance or static method.
    FunctionDecl
);
view!(StructDecl);
view!(FieldDecl);
view!(TypeAliasDecl);
view!(EnumDecl);
view!(EnumMemberDecl);
view!(ConstantDecl);
view!(GlobalVarDecl);
view!(ParameterDecl);
view!(
    /// Either a `<T>` list entry or an implicit receiver type parameter.
    TypeParameterDecl
);
view!(
    /// One name bound by `val`/`var`, possibly inside a destructuring
    /// pattern.
    LocalVarDecl
);
view!(CatchVarDecl);

fn type_parameter_nodes(owner: &SyntaxNode) -> Vec<SyntaxNode> {
    owner
        .child_by_field(FieldName::TypeParameters)
        .map(|list| list.children_of_kind(NodeKind::TypeParameter).collect())
        .unwrap_or_default()
}

impl FunctionDecl {
    /// Parameter declarations in order, optionally without a leading
    /// `self`.
    pub fn parameters(&self, skip_self: bool) -> Vec<ParameterDecl> {
        let Some(list) = self.node.child_by_field(FieldName::Parameters) else {
            return Vec::new();
        };
        list.children_of_kind(NodeKind::ParameterDeclaration)
            .map(ParameterDecl::new)
            .filter(|param| !(skip_self && param.is_self()))
            .collect()
    }

    pub fn return_type(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::ReturnType)
    }

    pub fn type_parameters(&self) -> Vec<SyntaxNode> {
        type_parameter_nodes(&self.node)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Body)
    }

    pub fn body_kind(&self) -> BodyKind {
        match self.body().map(|body| body.kind()) {
            Some(NodeKind::BlockStatement) => BodyKind::Common,
            Some(NodeKind::AsmBody) => BodyKind::Asm,
            Some(NodeKind::BuiltinSpecifier) => BodyKind::Builtin,
            _ => BodyKind::Missing,
        }
    }

    /// Type written before the dot in `fun Type.name()`.
    pub fn receiver_type(&self) -> Option<SyntaxNode> {
        self.node
            .child_by_field(FieldName::Receiver)?
            .child_by_field(FieldName::ReceiverType)
    }

    /// Type identifiers in the receiver that name type parameters, as `T`
    /// in `fun Wrapper<T>.get(self): T`.
    pub fn receiver_type_parameters<R: Resolver + ?Sized>(&self, resolver: &R) -> Vec<SyntaxNode> {
        let Some(receiver) = self.receiver_type() else {
            return Vec::new();
        };
        let mut found = Vec::new();
        walk(&receiver, |node| {
            if node.is(NodeKind::TypeIdentifier)
                && resolver
                    .resolve(node)
                    .is_some_and(|decl| decl.as_type_parameter().is_some())
            {
                found.push(node.clone());
            }
            Walk::Continue
        });
        found
    }

    pub fn is_method(&self) -> bool {
        self.node.is(NodeKind::MethodDeclaration)
    }

    pub fn is_get_method(&self) -> bool {
        self.node.is(NodeKind::GetMethodDeclaration)
    }

    pub fn has_self(&self) -> bool {
        self.parameters(false)
            .first()
            .is_some_and(ParameterDecl::is_self)
    }

    pub fn is_instance_method(&self) -> bool {
        self.is_method() && self.has_self()
    }

    pub fn is_static_method(&self) -> bool {
        self.is_method() && !self.has_self()
    }
}

impl StructDecl {
    pub fn fields(&self) -> Vec<Decl> {
        self.node
            .child_by_field(FieldName::Body)
            .map(|body| {
                body.children_of_kind(NodeKind::StructFieldDeclaration)
                    .filter_map(Decl::from_node)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn type_parameters(&self) -> Vec<SyntaxNode> {
        type_parameter_nodes(&self.node)
    }

    /// Number literal in `struct (0x7362d09c) Name`.
    pub fn pack_prefix(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::PackPrefix)
    }
}

impl FieldDecl {
    pub fn type_node(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Type)
    }

    pub fn default_value(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Default)
    }

    pub fn owner(&self) -> Option<Decl> {
        self.node
            .ancestor_of_kind(NodeKind::StructDeclaration)
            .and_then(Decl::from_node)
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.node
            .children_by_field(FieldName::Modifiers)
            .any(|node| node.text() == modifier)
    }

    pub fn is_readonly(&self) -> bool {
        self.has_modifier("readonly")
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier("private")
    }
}

impl TypeAliasDecl {
    /// The aliased type, or the `builtin` marker.
    pub fn underlying_type(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::UnderlyingType)
    }

    pub fn type_parameters(&self) -> Vec<SyntaxNode> {
        type_parameter_nodes(&self.node)
    }

    pub fn is_builtin(&self) -> bool {
        self.underlying_type()
            .is_some_and(|node| node.is(NodeKind::BuiltinSpecifier))
    }
}

impl EnumDecl {
    pub fn members(&self) -> Vec<Decl> {
        self.node
            .child_by_field(FieldName::Body)
            .map(|body| {
                body.children_of_kind(NodeKind::EnumMemberDeclaration)
                    .filter_map(Decl::from_node)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn backed_type(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::BackedType)
    }
}

impl EnumMemberDecl {
    pub fn owner(&self) -> Option<Decl> {
        self.node
            .ancestor_of_kind(NodeKind::EnumDeclaration)
            .and_then(Decl::from_node)
    }

    pub fn value(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Value)
    }
}

impl ConstantDecl {
    pub fn type_node(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Type)
    }

    pub fn value(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Value)
    }
}

impl GlobalVarDecl {
    pub fn type_node(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Type)
    }
}

impl ParameterDecl {
    pub fn name(&self) -> &str {
        self.node
            .tree()
            .child_slots(self.node.id())
            .iter()
            .find(|child| child.field == Some(FieldName::Name))
            .map_or("", |child| self.node.tree().text(child.node))
    }

    pub fn type_node(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Type)
    }

    pub fn default_value(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Default)
    }

    pub fn is_mutate(&self) -> bool {
        self.node.child_by_field(FieldName::Mutate).is_some()
    }

    pub fn is_self(&self) -> bool {
        self.name() == "self"
    }

    /// The function, method or get-method declaring this parameter.
    pub fn owner(&self) -> Option<Decl> {
        self.node
            .ancestors()
            .find(|node| node.kind().is_function_like())
            .and_then(Decl::from_node)
    }
}

impl TypeParameterDecl {
    pub fn is_implicit(&self) -> bool {
        self.node.is(NodeKind::TypeIdentifier)
    }

    pub fn default_type(&self) -> Option<SyntaxNode> {
        if self.is_implicit() {
            return None;
        }
        self.node.child_by_field(FieldName::Default)
    }

    /// Declaration owning the `<T>` list, or the method whose receiver
    /// introduced an implicit parameter.
    pub fn owner(&self) -> Option<Decl> {
        if self.is_implicit() {
            return self
                .node
                .ancestor_of_kind(NodeKind::MethodDeclaration)
                .and_then(Decl::from_node);
        }
        self.node
            .ancestor_of_kind(NodeKind::TypeParameterList)?
            .parent()
            .and_then(Decl::from_node)
    }
}

impl LocalVarDecl {
    pub fn type_hint(&self) -> Option<SyntaxNode> {
        self.node.child_by_field(FieldName::Type)
    }

    pub fn is_redef(&self) -> bool {
        self.node.child_by_field(FieldName::Redef).is_some()
    }

    /// The enclosing `val ... = ...`.
    pub fn declaration(&self) -> Option<SyntaxNode> {
        self.node.ancestor_of_kind(NodeKind::LocalVarsDeclaration)
    }

    pub fn assigned_value(&self) -> Option<SyntaxNode> {
        self.declaration()?.child_by_field(FieldName::AssignedVal)
    }

    /// Positions of this variable inside nested tuple/tensor patterns,
    /// outermost first. Empty for a plain `val x`.
    pub fn destructuring_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self.node.clone();
        while let Some(parent) = current.parent() {
            if !matches!(
                parent.kind(),
                NodeKind::TupleVarsDeclaration | NodeKind::TensorVarsDeclaration
            ) {
                break;
            }
            let Some(index) = parent.children().position(|child| child == current) else {
                break;
            };
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }
}

impl CatchVarDecl {
    /// `code` in `catch (code, arg)`.
    pub fn is_first(&self) -> bool {
        self.node.field_name() == Some(FieldName::CatchVar1)
    }
}
