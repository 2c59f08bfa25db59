#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FileId, NodeKind, SyntaxNode, SyntaxTree};

use super::{BodyKind, Decl, DeclKind};
use pretty_assertions::assert_eq;

fn tree(source: &str) -> Arc<SyntaxTree> {
    let output = tolk_parse::parse(FileId::new(0), source);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    output.tree
}

fn decls(tree: &Arc<SyntaxTree>) -> Vec<Decl> {
    let mut found = Vec::new();
    walk(&tree.root(), |node| {
        if let Some(decl) = Decl::from_node(node.clone()) {
            found.push(decl);
        }
        Walk::Continue
    });
    found
}

fn find(tree: &Arc<SyntaxTree>, kind: DeclKind, name: &str) -> Decl {
    decls(tree)
        .into_iter()
        .find(|decl| decl.kind() == kind && decl.name() == name)
        .unwrap_or_else(|| panic!("no {kind} `{name}`"))
}

fn first_of_kind(tree: &Arc<SyntaxTree>, kind: NodeKind, text: &str) -> SyntaxNode {
    let mut found = None;
    walk(&tree.root(), |node| {
        if node.kind() == kind && node.text() == text {
            found = Some(node.clone());
            return Walk::Stop;
        }
        Walk::Continue
    });
    found.unwrap_or_else(|| panic!("no {kind} `{text}`"))
}

#[test]
fn classifies_every_declaration_kind() {
    let tree = tree(
        "
        const LIMIT = 10;
        global counter: int;
        type Id = int;
        enum Color { Red, Green = 2 }
        struct Point { x: int, y: int }
        fun add(a: int, b: int) { return a + b; }
        get fun seqno(): int { return 0; }
        fun Point.origin(): Point { return Point { x: 0, y: 0 }; }
        fun Point.len(self): int {
            val (dx, dy) = (self.x, self.y);
            try { } catch (code, arg) { }
            return dx + dy;
        }
        fun id<T>(v: T): T { return v; }
        ",
    );
    let kinds: Vec<(DeclKind, String)> = decls(&tree)
        .iter()
        .map(|decl| (decl.kind(), decl.name().to_owned()))
        .collect();
    let expected = [
        (DeclKind::Constant, "LIMIT"),
        (DeclKind::GlobalVariable, "counter"),
        (DeclKind::TypeAlias, "Id"),
        (DeclKind::Enum, "Color"),
        (DeclKind::EnumMember, "Red"),
        (DeclKind::EnumMember, "Green"),
        (DeclKind::Struct, "Point"),
        (DeclKind::Field, "x"),
        (DeclKind::Field, "y"),
        (DeclKind::Function, "add"),
        (DeclKind::Parameter, "a"),
        (DeclKind::Parameter, "b"),
        (DeclKind::GetMethod, "seqno"),
        (DeclKind::StaticMethod, "origin"),
        (DeclKind::InstanceMethod, "len"),
        (DeclKind::Parameter, "self"),
        (DeclKind::LocalVariable, "dx"),
        (DeclKind::LocalVariable, "dy"),
        (DeclKind::CatchVariable, "code"),
        (DeclKind::CatchVariable, "arg"),
        (DeclKind::Function, "id"),
        (DeclKind::TypeParameter, "T"),
        (DeclKind::Parameter, "v"),
    ];
    let expected: Vec<(DeclKind, String)> = expected
        .iter()
        .map(|(kind, name)| (*kind, (*name).to_owned()))
        .collect();
    assert_eq!(kinds, expected);
}

#[test]
fn backticked_names_are_trimmed() {
    let tree = tree("fun `weird name`() { }");
    let decl = find(&tree, DeclKind::Function, "weird name");
    assert_eq!(decl.name_anchor().map(|n| n.text().to_owned()).as_deref(), Some("`weird name`"));
}

#[test]
fn declaration_names_versus_uses() {
    let tree = tree("fun f(a: int) { val b = a; var c redef = b; }");
    let a_use = {
        let mut uses = Vec::new();
        walk(&tree.root(), |node| {
            if node.is(NodeKind::Identifier) && node.text() == "a" {
                uses.push(node.clone());
            }
            Walk::Continue
        });
        uses
    };
    assert_eq!(a_use.len(), 2);
    assert_eq!(
        Decl::declared_by_name(&a_use[0]).map(|decl| decl.kind()),
        Some(DeclKind::Parameter)
    );
    assert_eq!(Decl::declared_by_name(&a_use[1]), None);

    let c = first_of_kind(&tree, NodeKind::Identifier, "c");
    assert_eq!(Decl::declared_by_name(&c), None);
}

#[test]
fn function_views() {
    let tree = tree(
        "
        fun Point.shift(mutate self, dx: int = 1): void asm \"ADD\";
        fun beginCell(): builder builtin;
        fun Wrapper<T>.get<U>(self, u: U): T { return self.value; }
        ",
    );
    let shift = find(&tree, DeclKind::InstanceMethod, "shift")
        .as_function()
        .unwrap();
    assert!(shift.is_instance_method());
    assert_eq!(shift.body_kind(), BodyKind::Asm);
    let params = shift.parameters(false);
    assert_eq!(params.len(), 2);
    assert!(params[0].is_self());
    assert!(params[0].is_mutate());
    assert_eq!(params[1].default_value().map(|n| n.text().to_owned()).as_deref(), Some("1"));
    assert_eq!(shift.parameters(true).len(), 1);
    assert_eq!(
        shift.receiver_type().map(|n| n.text().to_owned()).as_deref(),
        Some("Point")
    );

    let begin = find(&tree, DeclKind::Function, "beginCell").as_function().unwrap();
    assert_eq!(begin.body_kind(), BodyKind::Builtin);
    assert!(!begin.is_method());

    let get = find(&tree, DeclKind::InstanceMethod, "get").as_function().unwrap();
    assert_eq!(get.type_parameters().len(), 1);
    assert_eq!(
        get.receiver_type().map(|n| n.text().to_owned()).as_deref(),
        Some("Wrapper<T>")
    );
    assert_eq!(get.body_kind(), BodyKind::Common);
}

#[test]
fn struct_enum_alias_views() {
    let tree = tree(
        "
        struct (0x01) Msg<T = int> { readonly private body: T = 0, tag: int8 }
        enum Mode: int8 { A = 1, B }
        type Raw = builtin;
        type Pair<A, B> = (A, B);
        ",
    );
    let msg = find(&tree, DeclKind::Struct, "Msg").as_struct().unwrap();
    assert_eq!(msg.pack_prefix().map(|n| n.text().to_owned()).as_deref(), Some("0x01"));
    assert_eq!(msg.type_parameters().len(), 1);
    let fields = msg.fields();
    assert_eq!(fields.len(), 2);
    let body = fields[0].as_field().unwrap();
    assert!(body.is_readonly());
    assert!(body.is_private());
    assert_eq!(body.owner().map(|decl| decl.name().to_owned()).as_deref(), Some("Msg"));
    assert!(!fields[1].as_field().unwrap().is_readonly());

    let t = find(&tree, DeclKind::TypeParameter, "T").as_type_parameter().unwrap();
    assert_eq!(t.default_type().map(|n| n.text().to_owned()).as_deref(), Some("int"));
    assert_eq!(t.owner().map(|decl| decl.kind()), Some(DeclKind::Struct));

    let mode = find(&tree, DeclKind::Enum, "Mode").as_enum().unwrap();
    assert_eq!(mode.backed_type().map(|n| n.text().to_owned()).as_deref(), Some("int8"));
    let members = mode.members();
    assert_eq!(members.len(), 2);
    let a = members[0].as_enum_member().unwrap();
    assert_eq!(a.value().map(|n| n.text().to_owned()).as_deref(), Some("1"));
    assert_eq!(a.owner().map(|decl| decl.name().to_owned()).as_deref(), Some("Mode"));

    assert!(find(&tree, DeclKind::TypeAlias, "Raw").as_type_alias().unwrap().is_builtin());
    let pair = find(&tree, DeclKind::TypeAlias, "Pair").as_type_alias().unwrap();
    assert!(!pair.is_builtin());
    assert_eq!(pair.type_parameters().len(), 2);
}

#[test]
fn local_variable_views() {
    let tree = tree("fun f() { val [a, (b, c: int)] = g(); var d redef = 1; }");
    let c = find(&tree, DeclKind::LocalVariable, "c").as_local_var().unwrap();
    assert_eq!(c.destructuring_path(), vec![1, 1]);
    assert_eq!(c.type_hint().map(|n| n.text().to_owned()).as_deref(), Some("int"));
    assert_eq!(c.assigned_value().map(|n| n.text().to_owned()).as_deref(), Some("g()"));

    let a = find(&tree, DeclKind::LocalVariable, "a").as_local_var().unwrap();
    assert_eq!(a.destructuring_path(), vec![0]);
    assert!(!a.is_redef());

    let d = find(&tree, DeclKind::LocalVariable, "d").as_local_var().unwrap();
    assert!(d.is_redef());
    assert_eq!(d.destructuring_path(), Vec::<usize>::new());
}

#[test]
fn catch_variable_views() {
    let tree = tree("fun f() { try { } catch (code, arg) { } }");
    assert!(find(&tree, DeclKind::CatchVariable, "code").as_catch_var().unwrap().is_first());
    assert!(!find(&tree, DeclKind::CatchVariable, "arg").as_catch_var().unwrap().is_first());
}

#[test]
fn same_declaration_ignores_handle_identity() {
    let tree = tree("struct A { } struct B { }");
    let a = find(&tree, DeclKind::Struct, "A");
    let again = Decl::from_node(a.node().clone()).unwrap();
    let b = find(&tree, DeclKind::Struct, "B");
    assert!(a.is_same_declaration(&again));
    assert!(!a.is_same_declaration(&b));
}
