//! Declaration handles.
//!
//! A [`Decl`] is a syntax node plus the kind of declaration it is. Handles
//! are cheap to clone (one `Arc` bump) and are what resolution returns and
//! what the resolution cache stores. Kind-specific structure is read
//! through the typed views in [`views`].

mod views;

use std::fmt;

use tolk_ir::{FieldName, FileId, NodeId, NodeKind, SyntaxNode};

pub use views::{
    BodyKind, CatchVarDecl, ConstantDecl, EnumDecl, EnumMemberDecl, FieldDecl, FunctionDecl,
    GlobalVarDecl, LocalVarDecl, ParameterDecl, StructDecl, TypeAliasDecl, TypeParameterDecl,
};

/// What a declaration declares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    GetMethod,
    InstanceMethod,
    StaticMethod,
    Struct,
    Field,
    TypeAlias,
    Enum,
    EnumMember,
    Constant,
    GlobalVariable,
    Parameter,
    TypeParameter,
    LocalVariable,
    CatchVariable,
}

impl DeclKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::GetMethod => "get method",
            DeclKind::InstanceMethod => "instance method",
            DeclKind::StaticMethod => "static method",
            DeclKind::Struct => "struct",
            DeclKind::Field => "field",
            DeclKind::TypeAlias => "type alias",
            DeclKind::Enum => "enum",
            DeclKind::EnumMember => "enum member",
            DeclKind::Constant => "constant",
            DeclKind::GlobalVariable => "global variable",
            DeclKind::Parameter => "parameter",
            DeclKind::TypeParameter => "type parameter",
            DeclKind::LocalVariable => "local variable",
            DeclKind::CatchVariable => "catch variable",
        }
    }

    /// Function, get-method or either kind of method.
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            DeclKind::Function
                | DeclKind::GetMethod
                | DeclKind::InstanceMethod
                | DeclKind::StaticMethod
        )
    }

    /// Declares a type: struct, alias, enum or type parameter.
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            DeclKind::Struct | DeclKind::TypeAlias | DeclKind::Enum | DeclKind::TypeParameter
        )
    }

    /// Visible only inside a function body or signature.
    pub const fn is_local(self) -> bool {
        matches!(
            self,
            DeclKind::Parameter
                | DeclKind::TypeParameter
                | DeclKind::LocalVariable
                | DeclKind::CatchVariable
        )
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle over a declaring syntax node.
///
/// `node` is the declaration node itself (`struct_declaration`,
/// `var_declaration`, `type_parameter`, ...), except for catch variables and
/// implicit receiver type parameters, which are anchored at their
/// identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Decl {
    kind: DeclKind,
    node: SyntaxNode,
}

impl Decl {
    /// Classify a declaration node. `None` for anything that declares
    /// nothing.
    pub fn from_node(node: SyntaxNode) -> Option<Decl> {
        let kind = match node.kind() {
            NodeKind::FunctionDeclaration => DeclKind::Function,
            NodeKind::GetMethodDeclaration => DeclKind::GetMethod,
            NodeKind::MethodDeclaration => {
                if first_parameter_is_self(&node) {
                    DeclKind::InstanceMethod
                } else {
                    DeclKind::StaticMethod
                }
            }
            NodeKind::StructDeclaration => DeclKind::Struct,
            NodeKind::StructFieldDeclaration => DeclKind::Field,
            NodeKind::TypeAliasDeclaration => DeclKind::TypeAlias,
            NodeKind::EnumDeclaration => DeclKind::Enum,
            NodeKind::EnumMemberDeclaration => DeclKind::EnumMember,
            NodeKind::ConstantDeclaration => DeclKind::Constant,
            NodeKind::GlobalVarDeclaration => DeclKind::GlobalVariable,
            NodeKind::ParameterDeclaration => DeclKind::Parameter,
            NodeKind::TypeParameter => DeclKind::TypeParameter,
            NodeKind::VarDeclaration => DeclKind::LocalVariable,
            NodeKind::Identifier if is_catch_variable(&node) => DeclKind::CatchVariable,
            _ => return None,
        };
        Some(Decl { kind, node })
    }

    /// Type parameter introduced by an unresolved name in a method
    /// receiver, as `T` in `fun T.copy(self): T`.
    pub(crate) fn implicit_type_parameter(node: SyntaxNode) -> Decl {
        Decl {
            kind: DeclKind::TypeParameter,
            node,
        }
    }

    /// The declaration whose name `node` spells, if `node` is a name
    /// position rather than a use.
    ///
    /// A `redef` variable re-assigns an existing one and declares nothing.
    pub fn declared_by_name(node: &SyntaxNode) -> Option<Decl> {
        if node.is(NodeKind::Identifier) && is_catch_variable(node) {
            return Decl::from_node(node.clone());
        }
        if node.field_name() != Some(FieldName::Name) {
            return None;
        }
        let parent = node.parent()?;
        if parent.is(NodeKind::VarDeclaration) && parent.child_by_field(FieldName::Redef).is_some()
        {
            return None;
        }
        Decl::from_node(parent)
    }

    #[inline]
    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    #[inline]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.node.file()
    }

    /// Whether this is a type parameter anchored at a receiver type
    /// identifier rather than a `<T>` list entry.
    pub fn is_implicit_type_parameter(&self) -> bool {
        self.kind == DeclKind::TypeParameter && self.node.is(NodeKind::TypeIdentifier)
    }

    fn name_anchor_id(&self) -> Option<NodeId> {
        if self.kind == DeclKind::CatchVariable || self.is_implicit_type_parameter() {
            return Some(self.node.id());
        }
        self.node
            .tree()
            .child_slots(self.node.id())
            .iter()
            .find(|child| child.field == Some(FieldName::Name))
            .map(|child| child.node)
    }

    /// Node spelling the declared name.
    pub fn name_anchor(&self) -> Option<SyntaxNode> {
        self.name_anchor_id().map(|id| self.node.tree().node(id))
    }

    /// Declared name without surrounding backticks.
    pub fn name(&self) -> &str {
        let text = self
            .name_anchor_id()
            .map_or("", |id| self.node.tree().text(id));
        trim_backticks(text)
    }

    /// Same file, node kind, start offset and name. Survives re-resolution
    /// through different paths, unlike node identity alone.
    pub fn is_same_declaration(&self, other: &Decl) -> bool {
        self.file() == other.file()
            && self.node.kind() == other.node.kind()
            && self.node.span().start == other.node.span().start
            && self.name() == other.name()
    }

    /// Names in the `<T, U>` list of a struct or type alias.
    pub fn type_parameter_names(&self) -> Vec<String> {
        let params = if let Some(decl) = self.as_struct() {
            decl.type_parameters()
        } else if let Some(decl) = self.as_type_alias() {
            decl.type_parameters()
        } else {
            Vec::new()
        };
        params
            .into_iter()
            .filter_map(Decl::from_node)
            .map(|param| param.name().to_owned())
            .collect()
    }

    pub fn as_function(&self) -> Option<FunctionDecl> {
        self.kind
            .is_function_like()
            .then(|| FunctionDecl::new(self.node.clone()))
    }

    pub fn as_struct(&self) -> Option<StructDecl> {
        (self.kind == DeclKind::Struct).then(|| StructDecl::new(self.node.clone()))
    }

    pub fn as_field(&self) -> Option<FieldDecl> {
        (self.kind == DeclKind::Field).then(|| FieldDecl::new(self.node.clone()))
    }

    pub fn as_type_alias(&self) -> Option<TypeAliasDecl> {
        (self.kind == DeclKind::TypeAlias).then(|| TypeAliasDecl::new(self.node.clone()))
    }

    pub fn as_enum(&self) -> Option<EnumDecl> {
        (self.kind == DeclKind::Enum).then(|| EnumDecl::new(self.node.clone()))
    }

    pub fn as_enum_member(&self) -> Option<EnumMemberDecl> {
        (self.kind == DeclKind::EnumMember).then(|| EnumMemberDecl::new(self.node.clone()))
    }

    pub fn as_constant(&self) -> Option<ConstantDecl> {
        (self.kind == DeclKind::Constant).then(|| ConstantDecl::new(self.node.clone()))
    }

    pub fn as_global(&self) -> Option<GlobalVarDecl> {
        (self.kind == DeclKind::GlobalVariable).then(|| GlobalVarDecl::new(self.node.clone()))
    }

    pub fn as_parameter(&self) -> Option<ParameterDecl> {
        (self.kind == DeclKind::Parameter).then(|| ParameterDecl::new(self.node.clone()))
    }

    pub fn as_type_parameter(&self) -> Option<TypeParameterDecl> {
        (self.kind == DeclKind::TypeParameter).then(|| TypeParameterDecl::new(self.node.clone()))
    }

    pub fn as_local_var(&self) -> Option<LocalVarDecl> {
        (self.kind == DeclKind::LocalVariable).then(|| LocalVarDecl::new(self.node.clone()))
    }

    pub fn as_catch_var(&self) -> Option<CatchVarDecl> {
        (self.kind == DeclKind::CatchVariable).then(|| CatchVarDecl::new(self.node.clone()))
    }
}

impl fmt::Debug for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` @{:?}", self.kind, self.name(), self.node)
    }
}

pub(crate) fn trim_backticks(name: &str) -> &str {
    name.strip_prefix('`')
        .and_then(|inner| inner.strip_suffix('`'))
        .unwrap_or(name)
}

fn is_catch_variable(node: &SyntaxNode) -> bool {
    matches!(
        node.field_name(),
        Some(FieldName::CatchVar1 | FieldName::CatchVar2)
    )
}

fn first_parameter_is_self(function: &SyntaxNode) -> bool {
    function
        .child_by_field(FieldName::Parameters)
        .and_then(|list| list.children().next())
        .and_then(|param| param.child_by_field(FieldName::Name))
        .is_some_and(|name| name.text() == "self")
}

#[cfg(test)]
mod tests;
