//! Type inference.
//!
//! [`infer_type`] computes the type of any node: expressions, type
//! expressions and declarations. Children are typed through
//! [`crate::db::TypeOracle::infer_type`], so every intermediate result
//! lands in the session's type cache and a query that reaches itself again
//! (`val x = x`, `type A = A`) sees `None` instead of looping.
//!
//! Absence propagates: an expression whose parts have no type has no type
//! either. `Ty::Unknown` is only used inside composite types, where one
//! unknown element must not hide the others.

mod decls;
mod expr;
mod types;


use tolk_ir::{ensure_sufficient_stack, FieldName, NodeKind, SyntaxNode};

use crate::db::Db;
use crate::decl::Decl;
use crate::index::IndexKey;
use crate::resolve::search_files;
use crate::ty::{Nominal, Ty};

pub use decls::decl_type;

/// Type of `node`, memoized per node.
pub fn infer_type(db: &dyn Db, node: &SyntaxNode) -> Option<Ty> {
    db.caches().types.get_or_compute(node.key(), || {
        ensure_sufficient_stack(|| infer_uncached(db, node))
    })
}

#[tracing::instrument(level = "trace", skip_all, fields(kind = node.kind().as_str(), span = %node.span()))]
fn infer_uncached(db: &dyn Db, node: &SyntaxNode) -> Option<Ty> {
    let inferer = Inferer { db };
    match node.kind() {
        NodeKind::Assignment | NodeKind::SetAssignment => inferer.field(node, FieldName::Right),
        NodeKind::TernaryOperator => inferer.ternary(node),
        NodeKind::BinaryOperator => inferer.binary(node),
        NodeKind::UnaryOperator => inferer.unary(node),
        NodeKind::LazyExpression => inferer.field(node, FieldName::Argument),
        NodeKind::ParenthesizedExpression => inferer.field(node, FieldName::Inner),
        NodeKind::CastAsOperator => inferer.field(node, FieldName::CastedTo),
        NodeKind::IsTypeOperator => Some(Ty::Bool),
        NodeKind::NotNullOperator => inferer
            .field(node, FieldName::Inner)
            .map(|ty| ty.unwrap_option()),
        NodeKind::DotAccess => inferer.dot_access(node),
        NodeKind::FunctionCall => inferer.function_call(node),
        NodeKind::GenericInstantiation => inferer.generic_instantiation(node),
        NodeKind::ObjectLiteral => inferer.object_literal(node),
        NodeKind::TensorExpression => Some(Ty::tensor(inferer.elements(node))),
        NodeKind::TypedTuple => Some(Ty::tuple(inferer.elements(node))),
        NodeKind::MatchExpression => inferer.match_expression(node),
        NodeKind::CallArgument => inferer.field(node, FieldName::Expr),
        NodeKind::InstanceArgument => match node.child_by_field(FieldName::Value) {
            Some(value) => db.infer_type(&value),
            // `Point { x }`
            None => inferer.field(node, FieldName::Name),
        },

        NodeKind::NumberLiteral => Some(Ty::Int),
        NodeKind::StringLiteral => Some(inferer.builtin(node, "slice")),
        NodeKind::BooleanLiteral => Some(Ty::Bool),
        NodeKind::NullLiteral => Some(Ty::Null),
        NodeKind::Underscore => None,
        NodeKind::Identifier => {
            let decl = db.resolve(node)?;
            decl_type(db, &decl)
        }

        NodeKind::TypeIdentifier => inferer.type_identifier(node),
        NodeKind::NullableType => inferer.field(node, FieldName::Inner).map(Ty::nullable),
        NodeKind::UnionType => inferer.union_type(node),
        NodeKind::TensorType => Some(Ty::tensor(inferer.elements(node))),
        NodeKind::TupleType => Some(Ty::tuple(inferer.elements(node))),
        NodeKind::ParenthesizedType => inferer.field(node, FieldName::Inner),
        NodeKind::InstantiatedType => inferer.instantiated_type(node),
        NodeKind::FunCallableType => inferer.callable_type(node),

        NodeKind::FunctionDeclaration
        | NodeKind::MethodDeclaration
        | NodeKind::GetMethodDeclaration
        | NodeKind::ParameterDeclaration
        | NodeKind::TypeParameter
        | NodeKind::GlobalVarDeclaration
        | NodeKind::ConstantDeclaration
        | NodeKind::TypeAliasDeclaration
        | NodeKind::StructDeclaration
        | NodeKind::StructFieldDeclaration
        | NodeKind::EnumDeclaration
        | NodeKind::EnumMemberDeclaration
        | NodeKind::VarDeclaration => {
            let decl = Decl::from_node(node.clone())?;
            decl_type(db, &decl)
        }

        NodeKind::SourceFile
        | NodeKind::ImportDirective
        | NodeKind::AnnotationList
        | NodeKind::Annotation
        | NodeKind::MethodReceiver
        | NodeKind::ParameterList
        | NodeKind::TypeParameterList
        | NodeKind::AsmBody
        | NodeKind::BuiltinSpecifier
        | NodeKind::StructBody
        | NodeKind::FieldModifier
        | NodeKind::EnumBody
        | NodeKind::BlockStatement
        | NodeKind::LocalVarsDeclaration
        | NodeKind::TupleVarsDeclaration
        | NodeKind::TensorVarsDeclaration
        | NodeKind::ExpressionStatement
        | NodeKind::ReturnStatement
        | NodeKind::IfStatement
        | NodeKind::WhileStatement
        | NodeKind::DoWhileStatement
        | NodeKind::RepeatStatement
        | NodeKind::TryCatchStatement
        | NodeKind::CatchClause
        | NodeKind::ThrowStatement
        | NodeKind::AssertStatement
        | NodeKind::BreakStatement
        | NodeKind::ContinueStatement
        | NodeKind::EmptyStatement
        | NodeKind::Operator
        | NodeKind::ArgumentList
        | NodeKind::InstantiationTypeList
        | NodeKind::ObjectLiteralBody
        | NodeKind::MatchArm
        | NodeKind::MatchElse
        | NodeKind::NumericIndex
        | NodeKind::Mutate
        | NodeKind::Redef
        | NodeKind::Error => None,
    }
}

/// Rule implementations share the database handle.
#[derive(Copy, Clone)]
struct Inferer<'a> {
    db: &'a dyn Db,
}

impl Inferer<'_> {
    fn infer(self, node: &SyntaxNode) -> Option<Ty> {
        self.db.infer_type(node)
    }

    /// Type of the child stored under `field`.
    fn field(self, node: &SyntaxNode, field: FieldName) -> Option<Ty> {
        self.infer(&node.child_by_field(field)?)
    }

    /// Types of all children, `Unknown` where a child has none.
    fn elements(self, node: &SyntaxNode) -> Vec<Ty> {
        node.children()
            .map(|child| self.infer(&child).unwrap_or(Ty::Unknown))
            .collect()
    }

    /// Builtin type declared as `type <name> = builtin` where `node` can
    /// see it. Without stubs the type has no anchor.
    fn builtin(self, node: &SyntaxNode, name: &str) -> Ty {
        search_files(self.db, node.file())
            .into_iter()
            .filter_map(|file| self.db.file_index(file))
            .find_map(|index| index.by_name(IndexKey::TypeAliases, name).next().cloned())
            .and_then(|decl| decl_type(self.db, &decl))
            .unwrap_or_else(|| Ty::Builtin(Nominal::new(name, None)))
    }
}
