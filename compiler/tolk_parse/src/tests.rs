#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FieldName, SyntaxNode};

fn parse_ok(source: &str) -> ParseOutput {
    let output = parse(FileId::new(0), source);
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    output
}

fn nodes_of_kind(output: &ParseOutput, kind: NodeKind) -> Vec<SyntaxNode> {
    let mut found = Vec::new();
    walk(&output.tree.root(), |node| {
        if node.is(kind) {
            found.push(node.clone());
        }
        Walk::Continue
    });
    found
}

fn first(output: &ParseOutput, kind: NodeKind) -> SyntaxNode {
    nodes_of_kind(output, kind)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no {kind} in tree:\n{}", output.tree.dump()))
}

fn field_text(node: &SyntaxNode, field: FieldName) -> String {
    node.child_by_field(field).unwrap().text().to_owned()
}

#[test]
fn binary_precedence_dump() {
    let output = parse_ok("const A = 1 + 2 * 3;");
    let expected = "\
source_file 0..20
  constant_declaration 0..20
    name: identifier 6..7 \"A\"
    value: binary_operator 10..19
      left: number_literal 10..11 \"1\"
      operator_name: operator 12..13 \"+\"
      right: binary_operator 14..19
        left: number_literal 14..15 \"2\"
        operator_name: operator 16..17 \"*\"
        right: number_literal 18..19 \"3\"
";
    assert_eq!(output.tree.dump(), expected);
}

#[test]
fn function_with_generics_and_return_type() {
    let output = parse_ok("fun id<T>(x: T): T { return x; }");
    let function = first(&output, NodeKind::FunctionDeclaration);
    assert_eq!(field_text(&function, FieldName::Name), "id");
    assert_eq!(field_text(&function, FieldName::ReturnType), "T");
    let type_params = function.child_by_field(FieldName::TypeParameters).unwrap();
    assert_eq!(type_params.children().count(), 1);
    let param = first(&output, NodeKind::ParameterDeclaration);
    assert_eq!(field_text(&param, FieldName::Name), "x");
    assert_eq!(field_text(&param, FieldName::Type), "T");
    let ret = first(&output, NodeKind::ReturnStatement);
    assert_eq!(field_text(&ret, FieldName::Body), "x");
}

#[test]
fn method_receivers() {
    let output = parse_ok(
        "fun int.double(self) { return self * 2; }\n\
         fun Wrapper<T>.unwrap(self): T { return self.value; }\n\
         fun T.fromCell(c: cell): T builtin;",
    );
    let methods = nodes_of_kind(&output, NodeKind::MethodDeclaration);
    assert_eq!(methods.len(), 3);
    let receivers: Vec<String> = methods
        .iter()
        .map(|method| {
            let receiver = method.child_by_field(FieldName::Receiver).unwrap();
            field_text(&receiver, FieldName::ReceiverType)
        })
        .collect();
    assert_eq!(receivers, vec!["int", "Wrapper<T>", "T"]);
    assert_eq!(
        methods[2].child_by_field(FieldName::Body).unwrap().kind(),
        NodeKind::BuiltinSpecifier
    );
}

#[test]
fn plain_function_is_not_a_method() {
    let output = parse_ok("fun main() {}");
    assert_eq!(nodes_of_kind(&output, NodeKind::MethodDeclaration).len(), 0);
    assert_eq!(nodes_of_kind(&output, NodeKind::FunctionDeclaration).len(), 1);
}

#[test]
fn get_method_and_asm_body() {
    let output = parse_ok("get fun seqno(): int { return 0; }\nfun add(a: int, b: int): int asm \"ADD\";");
    let get = first(&output, NodeKind::GetMethodDeclaration);
    assert_eq!(field_text(&get, FieldName::Name), "seqno");
    let asm = first(&output, NodeKind::AsmBody);
    assert_eq!(asm.children().count(), 1);
}

#[test]
fn struct_with_prefix_and_defaults() {
    let output = parse_ok("struct (0x7362d09c) Transfer<T = int> { readonly amount: coins = 0, payload: T }");
    let decl = first(&output, NodeKind::StructDeclaration);
    assert_eq!(field_text(&decl, FieldName::PackPrefix), "0x7362d09c");
    assert_eq!(field_text(&decl, FieldName::Name), "Transfer");
    let fields = nodes_of_kind(&output, NodeKind::StructFieldDeclaration);
    assert_eq!(fields.len(), 2);
    assert_eq!(field_text(&fields[0], FieldName::Modifiers), "readonly");
    assert_eq!(field_text(&fields[0], FieldName::Default), "0");
    assert_eq!(field_text(&fields[1], FieldName::Type), "T");
    let type_param = first(&output, NodeKind::TypeParameter);
    assert_eq!(field_text(&type_param, FieldName::Default), "int");
}

#[test]
fn enum_alias_const_global_import() {
    let output = parse_ok(
        "import \"@stdlib/tvm-dicts\";\n\
         enum Color: int8 { Red, Green = 2 }\n\
         type MaybeInt = int?;\n\
         type slice = builtin;\n\
         const LIMIT: int = 10;\n\
         global counter: int;",
    );
    let import = first(&output, NodeKind::ImportDirective);
    assert_eq!(field_text(&import, FieldName::Path), "\"@stdlib/tvm-dicts\"");
    assert_eq!(nodes_of_kind(&output, NodeKind::EnumMemberDeclaration).len(), 2);
    let aliases = nodes_of_kind(&output, NodeKind::TypeAliasDeclaration);
    assert_eq!(
        aliases[0].child_by_field(FieldName::UnderlyingType).unwrap().kind(),
        NodeKind::NullableType
    );
    assert_eq!(
        aliases[1].child_by_field(FieldName::UnderlyingType).unwrap().kind(),
        NodeKind::BuiltinSpecifier
    );
    assert_eq!(field_text(&first(&output, NodeKind::ConstantDeclaration), FieldName::Value), "10");
    assert_eq!(field_text(&first(&output, NodeKind::GlobalVarDeclaration), FieldName::Type), "int");
}

#[test]
fn shift_right_and_nested_generics() {
    let output = parse_ok("fun f(m: map<int, Cell<int>>) { val x = a >> 2; x >>= 1; val y = a >= b; }");
    let instantiated = nodes_of_kind(&output, NodeKind::InstantiatedType);
    assert_eq!(instantiated.len(), 2);
    let operators: Vec<String> = nodes_of_kind(&output, NodeKind::Operator)
        .iter()
        .map(|op| op.text().to_owned())
        .collect();
    assert_eq!(operators, vec![">>", ">>=", ">="]);
    let set = first(&output, NodeKind::SetAssignment);
    assert_eq!(field_text(&set, FieldName::Left), "x");
}

#[test]
fn generic_call_versus_comparison() {
    let output = parse_ok("fun f() { g<int>(1); val b = a < c; }");
    let inst = first(&output, NodeKind::GenericInstantiation);
    assert_eq!(field_text(&inst, FieldName::Expr), "g");
    let cmp = first(&output, NodeKind::BinaryOperator);
    assert_eq!(field_text(&cmp, FieldName::OperatorName), "<");
}

#[test]
fn object_literals() {
    let output = parse_ok("fun f() { val p = Point { x: 1, y }; val q: Point = { x: 1, y: 2 }; val w = Box<int> { v: 1 }; }");
    let literals = nodes_of_kind(&output, NodeKind::ObjectLiteral);
    assert_eq!(literals.len(), 3);
    assert_eq!(field_text(&literals[0], FieldName::Type), "Point");
    assert!(literals[1].child_by_field(FieldName::Type).is_none());
    assert_eq!(field_text(&literals[2], FieldName::Type), "Box<int>");
    let shorthand = &nodes_of_kind(&output, NodeKind::InstanceArgument)[1];
    assert!(shorthand.child_by_field(FieldName::Value).is_none());
}

#[test]
fn postfix_chain() {
    let output = parse_ok("fun f() { a.b.0!.c(mutate x, 2); }");
    let call = first(&output, NodeKind::FunctionCall);
    assert_eq!(field_text(&call, FieldName::Callee), "a.b.0!.c");
    assert_eq!(nodes_of_kind(&output, NodeKind::NumericIndex).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::NotNullOperator).len(), 1);
    let args = nodes_of_kind(&output, NodeKind::CallArgument);
    assert_eq!(args.len(), 2);
    assert!(args[0].child_by_field(FieldName::Mutate).is_some());
}

#[test]
fn casts_and_type_tests() {
    let output = parse_ok("fun f() { val a = x as int?; val b = x is Point; val c = x !is null; }");
    let cast = first(&output, NodeKind::CastAsOperator);
    assert_eq!(field_text(&cast, FieldName::CastedTo), "int?");
    let tests = nodes_of_kind(&output, NodeKind::IsTypeOperator);
    assert_eq!(tests.len(), 2);
    assert_eq!(field_text(&tests[1], FieldName::OperatorName), "!is");
}

#[test]
fn match_expression() {
    let output = parse_ok("fun f(v: int | slice) { match (val x = v) { int => 1, slice => { return; } else => 0 } }");
    let expr = first(&output, NodeKind::MatchExpression);
    assert_eq!(
        expr.child_by_field(FieldName::Expr).unwrap().kind(),
        NodeKind::LocalVarsDeclaration
    );
    let arms: Vec<NodeKind> = expr
        .children_by_field(FieldName::Arms)
        .map(|arm| arm.child_by_field(FieldName::Pattern).unwrap().kind())
        .collect();
    assert_eq!(
        arms,
        vec![NodeKind::TypeIdentifier, NodeKind::TypeIdentifier, NodeKind::MatchElse]
    );
}

#[test]
fn destructuring_and_redef() {
    let output = parse_ok("fun f() { var [a, (b, _)] = t; val c: int redef = 1; }");
    assert_eq!(nodes_of_kind(&output, NodeKind::TupleVarsDeclaration).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::TensorVarsDeclaration).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::VarDeclaration).len(), 4);
    assert_eq!(nodes_of_kind(&output, NodeKind::Redef).len(), 1);
}

#[test]
fn statements() {
    let output = parse_ok(
        "fun f() {\n\
           if (a) { } else if (b) { } else { }\n\
           while (a) { break; }\n\
           do { continue; } while (a);\n\
           repeat (3) { }\n\
           try { throw 5; } catch (code, arg) { }\n\
           assert (a, 10);\n\
           assert (a) throw 11;\n\
           x = cond ? 1 : 2;\n\
         }",
    );
    assert_eq!(nodes_of_kind(&output, NodeKind::IfStatement).len(), 2);
    let clause = first(&output, NodeKind::CatchClause);
    assert_eq!(field_text(&clause, FieldName::CatchVar1), "code");
    assert_eq!(field_text(&clause, FieldName::CatchVar2), "arg");
    assert_eq!(nodes_of_kind(&output, NodeKind::AssertStatement).len(), 2);
    assert_eq!(nodes_of_kind(&output, NodeKind::TernaryOperator).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::DoWhileStatement).len(), 1);
}

#[test]
fn tensors_and_tuples() {
    let output = parse_ok("fun f(): (int, [int, slice]) { return (1, [2, s]); }");
    assert_eq!(nodes_of_kind(&output, NodeKind::TensorType).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::TupleType).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::TensorExpression).len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::TypedTuple).len(), 1);
}

#[test]
fn callable_type() {
    let output = parse_ok("global handler: (int, slice) -> bool;");
    let callable = first(&output, NodeKind::FunCallableType);
    assert_eq!(field_text(&callable, FieldName::ParamTypes), "(int, slice)");
    assert_eq!(field_text(&callable, FieldName::ReturnType), "bool");
}

#[test]
fn broken_statement_recovers_to_next_statement() {
    let output = parse(FileId::new(0), "fun f() { val = ; val ok = 1; }");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(nodes_of_kind(&output, NodeKind::Error).len(), 1);
    let decls = nodes_of_kind(&output, NodeKind::VarDeclaration);
    assert_eq!(decls.len(), 1);
    assert_eq!(field_text(&decls[0], FieldName::Name), "ok");
}

#[test]
fn broken_item_recovers_to_next_item() {
    let output = parse(FileId::new(0), "struct { }\nfun good() {}");
    assert!(output.has_errors());
    let function = first(&output, NodeKind::FunctionDeclaration);
    assert_eq!(field_text(&function, FieldName::Name), "good");
}

#[test]
fn stray_closing_brace_does_not_hang() {
    let output = parse(FileId::new(0), "} fun a() {}");
    assert!(output.has_errors());
    assert_eq!(nodes_of_kind(&output, NodeKind::FunctionDeclaration).len(), 1);
}

#[test]
fn unknown_character_is_reported() {
    let output = parse(FileId::new(0), "fun f() { val a = #; }");
    assert!(matches!(output.errors[0], ParseError::UnknownToken { .. }));
}

#[test]
fn annotations() {
    let output = parse_ok("@inline @deprecated(\"use g\") fun f() {}");
    let list = first(&output, NodeKind::AnnotationList);
    assert_eq!(list.children().count(), 2);
    let function = first(&output, NodeKind::FunctionDeclaration);
    assert_eq!(function.span().start, 0);
}
