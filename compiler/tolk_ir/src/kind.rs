//! Node kinds and named child slots.
//!
//! The set of kinds is closed and decided when the tree is built, so every
//! consumer can match exhaustively instead of comparing kind strings.

use std::fmt;

/// Kind of a syntax tree node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    SourceFile,
    ImportDirective,
    AnnotationList,
    Annotation,

    // Top-level declarations
    FunctionDeclaration,
    MethodDeclaration,
    GetMethodDeclaration,
    MethodReceiver,
    ParameterList,
    ParameterDeclaration,
    TypeParameterList,
    TypeParameter,
    AsmBody,
    BuiltinSpecifier,
    GlobalVarDeclaration,
    ConstantDeclaration,
    TypeAliasDeclaration,
    StructDeclaration,
    StructBody,
    StructFieldDeclaration,
    FieldModifier,
    EnumDeclaration,
    EnumBody,
    EnumMemberDeclaration,

    // Statements
    BlockStatement,
    LocalVarsDeclaration,
    VarDeclaration,
    TupleVarsDeclaration,
    TensorVarsDeclaration,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    RepeatStatement,
    TryCatchStatement,
    CatchClause,
    ThrowStatement,
    AssertStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,

    // Expressions
    Assignment,
    SetAssignment,
    TernaryOperator,
    BinaryOperator,
    UnaryOperator,
    Operator,
    CastAsOperator,
    IsTypeOperator,
    NotNullOperator,
    LazyExpression,
    DotAccess,
    FunctionCall,
    ArgumentList,
    CallArgument,
    GenericInstantiation,
    InstantiationTypeList,
    ParenthesizedExpression,
    TensorExpression,
    TypedTuple,
    ObjectLiteral,
    ObjectLiteralBody,
    InstanceArgument,
    MatchExpression,
    MatchArm,
    MatchElse,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    Underscore,
    Identifier,
    NumericIndex,
    Mutate,
    Redef,

    // Types
    TypeIdentifier,
    NullableType,
    UnionType,
    TensorType,
    TupleType,
    ParenthesizedType,
    InstantiatedType,
    FunCallableType,

    /// Source range the parser could not make sense of.
    Error,
}

impl NodeKind {
    /// Snake-case name, as used in tree dumps.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::SourceFile => "source_file",
            NodeKind::ImportDirective => "import_directive",
            NodeKind::AnnotationList => "annotation_list",
            NodeKind::Annotation => "annotation",
            NodeKind::FunctionDeclaration => "function_declaration",
            NodeKind::MethodDeclaration => "method_declaration",
            NodeKind::GetMethodDeclaration => "get_method_declaration",
            NodeKind::MethodReceiver => "method_receiver",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::ParameterDeclaration => "parameter_declaration",
            NodeKind::TypeParameterList => "type_parameter_list",
            NodeKind::TypeParameter => "type_parameter",
            NodeKind::AsmBody => "asm_body",
            NodeKind::BuiltinSpecifier => "builtin_specifier",
            NodeKind::GlobalVarDeclaration => "global_var_declaration",
            NodeKind::ConstantDeclaration => "constant_declaration",
            NodeKind::TypeAliasDeclaration => "type_alias_declaration",
            NodeKind::StructDeclaration => "struct_declaration",
            NodeKind::StructBody => "struct_body",
            NodeKind::StructFieldDeclaration => "struct_field_declaration",
            NodeKind::FieldModifier => "field_modifier",
            NodeKind::EnumDeclaration => "enum_declaration",
            NodeKind::EnumBody => "enum_body",
            NodeKind::EnumMemberDeclaration => "enum_member_declaration",
            NodeKind::BlockStatement => "block_statement",
            NodeKind::LocalVarsDeclaration => "local_vars_declaration",
            NodeKind::VarDeclaration => "var_declaration",
            NodeKind::TupleVarsDeclaration => "tuple_vars_declaration",
            NodeKind::TensorVarsDeclaration => "tensor_vars_declaration",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::ReturnStatement => "return_statement",
            NodeKind::IfStatement => "if_statement",
            NodeKind::WhileStatement => "while_statement",
            NodeKind::DoWhileStatement => "do_while_statement",
            NodeKind::RepeatStatement => "repeat_statement",
            NodeKind::TryCatchStatement => "try_catch_statement",
            NodeKind::CatchClause => "catch_clause",
            NodeKind::ThrowStatement => "throw_statement",
            NodeKind::AssertStatement => "assert_statement",
            NodeKind::BreakStatement => "break_statement",
            NodeKind::ContinueStatement => "continue_statement",
            NodeKind::EmptyStatement => "empty_statement",
            NodeKind::Assignment => "assignment",
            NodeKind::SetAssignment => "set_assignment",
            NodeKind::TernaryOperator => "ternary_operator",
            NodeKind::BinaryOperator => "binary_operator",
            NodeKind::UnaryOperator => "unary_operator",
            NodeKind::Operator => "operator",
            NodeKind::CastAsOperator => "cast_as_operator",
            NodeKind::IsTypeOperator => "is_type_operator",
            NodeKind::NotNullOperator => "not_null_operator",
            NodeKind::LazyExpression => "lazy_expression",
            NodeKind::DotAccess => "dot_access",
            NodeKind::FunctionCall => "function_call",
            NodeKind::ArgumentList => "argument_list",
            NodeKind::CallArgument => "call_argument",
            NodeKind::GenericInstantiation => "generic_instantiation",
            NodeKind::InstantiationTypeList => "instantiation_type_list",
            NodeKind::ParenthesizedExpression => "parenthesized_expression",
            NodeKind::TensorExpression => "tensor_expression",
            NodeKind::TypedTuple => "typed_tuple",
            NodeKind::ObjectLiteral => "object_literal",
            NodeKind::ObjectLiteralBody => "object_literal_body",
            NodeKind::InstanceArgument => "instance_argument",
            NodeKind::MatchExpression => "match_expression",
            NodeKind::MatchArm => "match_arm",
            NodeKind::MatchElse => "match_else",
            NodeKind::NumberLiteral => "number_literal",
            NodeKind::StringLiteral => "string_literal",
            NodeKind::BooleanLiteral => "boolean_literal",
            NodeKind::NullLiteral => "null_literal",
            NodeKind::Underscore => "underscore",
            NodeKind::Identifier => "identifier",
            NodeKind::NumericIndex => "numeric_index",
            NodeKind::Mutate => "mutate",
            NodeKind::Redef => "redef",
            NodeKind::TypeIdentifier => "type_identifier",
            NodeKind::NullableType => "nullable_type",
            NodeKind::UnionType => "union_type",
            NodeKind::TensorType => "tensor_type",
            NodeKind::TupleType => "tuple_type",
            NodeKind::ParenthesizedType => "parenthesized_type",
            NodeKind::InstantiatedType => "instantiated_type",
            NodeKind::FunCallableType => "fun_callable_type",
            NodeKind::Error => "ERROR",
        }
    }

    /// Function, method or get-method declaration.
    pub const fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::MethodDeclaration
                | NodeKind::GetMethodDeclaration
        )
    }

    /// Node that spells a type rather than computing a value.
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            NodeKind::TypeIdentifier
                | NodeKind::NullableType
                | NodeKind::UnionType
                | NodeKind::TensorType
                | NodeKind::TupleType
                | NodeKind::ParenthesizedType
                | NodeKind::InstantiatedType
                | NodeKind::FunCallableType
        )
    }

    /// Node that carries a name a reference can point at.
    pub const fn is_reference_like(self) -> bool {
        matches!(self, NodeKind::Identifier | NodeKind::TypeIdentifier)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label of a named child slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Annotations,
    Arguments,
    Receiver,
    ReceiverType,
    TypeParameters,
    Parameters,
    ReturnType,
    Body,
    Type,
    Default,
    Value,
    Modifiers,
    UnderlyingType,
    PackPrefix,
    BackedType,
    Path,
    Lhs,
    AssignedVal,
    Redef,
    Left,
    Right,
    OperatorName,
    Argument,
    Condition,
    Consequence,
    Alternative,
    Count,
    TryBody,
    CatchClause,
    CatchVar1,
    CatchVar2,
    CatchBody,
    Expr,
    CastedTo,
    RhsType,
    Inner,
    Obj,
    Field,
    Callee,
    Mutate,
    ParamTypes,
    Pattern,
    Arms,
    ExcNo,
}

impl FieldName {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Annotations => "annotations",
            FieldName::Arguments => "arguments",
            FieldName::Receiver => "receiver",
            FieldName::ReceiverType => "receiver_type",
            FieldName::TypeParameters => "type_parameters",
            FieldName::Parameters => "parameters",
            FieldName::ReturnType => "return_type",
            FieldName::Body => "body",
            FieldName::Type => "type",
            FieldName::Default => "default",
            FieldName::Value => "value",
            FieldName::Modifiers => "modifiers",
            FieldName::UnderlyingType => "underlying_type",
            FieldName::PackPrefix => "pack_prefix",
            FieldName::BackedType => "backed_type",
            FieldName::Path => "path",
            FieldName::Lhs => "lhs",
            FieldName::AssignedVal => "assigned_val",
            FieldName::Redef => "redef",
            FieldName::Left => "left",
            FieldName::Right => "right",
            FieldName::OperatorName => "operator_name",
            FieldName::Argument => "argument",
            FieldName::Condition => "condition",
            FieldName::Consequence => "consequence",
            FieldName::Alternative => "alternative",
            FieldName::Count => "count",
            FieldName::TryBody => "try_body",
            FieldName::CatchClause => "catch",
            FieldName::CatchVar1 => "catch_var1",
            FieldName::CatchVar2 => "catch_var2",
            FieldName::CatchBody => "catch_body",
            FieldName::Expr => "expr",
            FieldName::CastedTo => "casted_to",
            FieldName::RhsType => "rhs_type",
            FieldName::Inner => "inner",
            FieldName::Obj => "obj",
            FieldName::Field => "field",
            FieldName::Callee => "callee",
            FieldName::Mutate => "mutate",
            FieldName::ParamTypes => "param_types",
            FieldName::Pattern => "pattern",
            FieldName::Arms => "arms",
            FieldName::ExcNo => "excNo",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
