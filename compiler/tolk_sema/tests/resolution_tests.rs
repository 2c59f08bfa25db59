//! Name resolution through a whole session.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod common;

use common::{add_checked, nodes_in, workspace};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tolk_ir::NodeKind;
use tolk_sema::{DeclKind, Session};

#[test]
fn inner_local_shadows_constant() {
    let ws = workspace(
        "
        const x = 10;
        fun main() {
            val before = x;
            {
                val x = true;
                val a = x;
                val b = x;
            }
            val after = x;
        }
        ",
    );
    for name in ["a", "b"] {
        let decl = ws.session.resolve(&ws.value_of(name)).unwrap();
        assert_eq!(decl.kind(), DeclKind::LocalVariable, "`x` in `{name}`");
        assert_eq!(ws.type_of(&ws.value_of(name)), "bool");
    }
    for name in ["before", "after"] {
        let decl = ws.session.resolve(&ws.value_of(name)).unwrap();
        assert_eq!(decl.kind(), DeclKind::Constant, "`x` in `{name}`");
        assert_eq!(ws.type_of(&ws.value_of(name)), "int");
    }
}

#[test]
fn locals_are_not_visible_before_their_declaration() {
    let ws = workspace(
        "
        fun main() {
            val early = late;
            val late = 1;
        }
        ",
    );
    assert_eq!(ws.session.resolve(&ws.value_of("early")), None);
    assert_eq!(ws.type_of(&ws.value_of("early")), "<none>");
}

#[test]
fn declaration_names_resolve_to_themselves() {
    let ws = workspace("fun main(count: int) { val total = count; }");
    let name = ws.nodes(NodeKind::Identifier, "total").remove(0);
    let decl = ws.session.resolve(&name).unwrap();
    assert_eq!(decl.kind(), DeclKind::LocalVariable);
    assert_eq!(decl.name_anchor(), Some(name));

    let param = ws.session.resolve(&ws.value_of("total")).unwrap();
    assert_eq!(param.kind(), DeclKind::Parameter);
}

#[test]
fn qualified_members() {
    let ws = workspace(
        "
        enum Color { Red, Green }
        struct Point { x: int, y: int }
        fun Point.create(): Point { return { x: 0, y: 0 }; }
        fun Point.norm(self): int { return self.x * self.x; }
        fun main() {
            val p = Point.create();
            val n = p.norm();
            val y = p.y;
            val c = Color.Green;
        }
        ",
    );
    let member = |text: &str| {
        let access = ws.node(NodeKind::DotAccess, text);
        let field = access.child_by_field(tolk_ir::FieldName::Field).unwrap();
        ws.session.resolve(&field).unwrap()
    };
    let create = member("Point.create");
    assert_eq!((create.kind(), create.name()), (DeclKind::StaticMethod, "create"));
    let norm = member("p.norm");
    assert_eq!((norm.kind(), norm.name()), (DeclKind::InstanceMethod, "norm"));
    let y = member("p.y");
    assert_eq!((y.kind(), y.name()), (DeclKind::Field, "y"));
    let green = member("Color.Green");
    assert_eq!((green.kind(), green.name()), (DeclKind::EnumMember, "Green"));
}

#[test]
fn unknown_members_do_not_resolve() {
    let ws = workspace(
        "
        struct Point { x: int }
        fun main(p: Point) { val z = p.z; }
        ",
    );
    assert_eq!(ws.session.resolve(&ws.value_of("z")), None);
    assert_eq!(ws.type_of(&ws.value_of("z")), "<none>");
}

#[test]
fn shorthand_field_names_both_field_and_local() {
    let ws = workspace(
        "
        struct Point { x: int }
        fun main() {
            val x = 1;
            val p = Point { x };
        }
        ",
    );
    let shorthand = ws.uses("x").pop().unwrap();
    let kinds: Vec<DeclKind> = ws
        .session
        .multi_resolve(&shorthand)
        .iter()
        .map(|decl| decl.kind())
        .collect();
    assert_eq!(kinds, vec![DeclKind::Field, DeclKind::LocalVariable]);
    assert_eq!(ws.session.resolve(&shorthand).unwrap().kind(), DeclKind::Field);
}

#[test]
fn receiver_type_parameters_are_implicit() {
    let ws = workspace(
        "
        struct Wrapper<T> { value: T }
        fun Wrapper<T>.unwrap(self): T { return self.value; }
        ",
    );
    let uses = ws.nodes(NodeKind::TypeIdentifier, "T");
    // Struct field, receiver, return type.
    assert_eq!(uses.len(), 3);
    let receiver_t = ws.session.resolve(&uses[1]).unwrap();
    assert_eq!(receiver_t.kind(), DeclKind::TypeParameter);
    assert!(receiver_t.is_implicit_type_parameter());
    let return_t = ws.session.resolve(&uses[2]).unwrap();
    assert!(return_t.is_same_declaration(&receiver_t));
    let field_t = ws.session.resolve(&uses[0]).unwrap();
    assert!(!field_t.is_implicit_type_parameter());
}

#[test]
fn sized_integer_types_resolve_to_their_family() {
    let ws = workspace("global counter: uint32;");
    let ty = ws.node(NodeKind::TypeIdentifier, "uint32");
    let decl = ws.session.resolve(&ty).unwrap();
    assert_eq!((decl.kind(), decl.name()), (DeclKind::TypeAlias, "uintN"));
    assert_eq!(ws.type_of(&ty), "uint32");
}

#[test]
fn imported_declarations_resolve_across_files() {
    let mut session = Session::default();
    add_checked(
        &mut session,
        "/project/lib/math.tolk",
        "
        const SCALE = 1000;
        fun scale(x: int): int { return x * SCALE; }
        ",
    );
    let main = add_checked(
        &mut session,
        "/project/main.tolk",
        r#"
        import "lib/math";
        fun main() { return scale(SCALE); }
        "#,
    );
    let scale = &nodes_in(&session, main, NodeKind::Identifier, "scale")[0];
    let decl = session.resolve(scale).unwrap();
    assert_eq!(decl.kind(), DeclKind::Function);
    assert_eq!(session.file(decl.file()).unwrap().path(), "/project/lib/math.tolk");

    let constant = &nodes_in(&session, main, NodeKind::Identifier, "SCALE")[0];
    assert_eq!(session.resolve(constant).unwrap().kind(), DeclKind::Constant);
}

#[test]
fn replacing_a_file_changes_answers() {
    let mut session = Session::default();
    let file = add_checked(&mut session, "/project/main.tolk", "const A = 1; const B = A;");
    let use_of_a = nodes_in(&session, file, NodeKind::Identifier, "A").pop().unwrap();
    assert_eq!(session.infer_type(&use_of_a).unwrap().to_string(), "int");

    add_checked(&mut session, "/project/main.tolk", "const A = true; const B = A;");
    let use_of_a = nodes_in(&session, file, NodeKind::Identifier, "A").pop().unwrap();
    assert_eq!(session.infer_type(&use_of_a).unwrap().to_string(), "bool");
}

proptest! {
    #[test]
    fn any_inner_local_shadows_a_constant(name in "v_[a-z0-9_]{0,8}") {
        let ws = workspace(&format!(
            "const {name} = 1;\nfun main() {{ {{ val {name} = true; val probe = {name}; }} }}"
        ));
        let decl = ws.session.resolve(&ws.value_of("probe")).unwrap();
        prop_assert_eq!(decl.kind(), DeclKind::LocalVariable);
        prop_assert_eq!(ws.type_of(&ws.value_of("probe")), "bool");
    }
}

#[test]
fn do_while_condition_sees_the_body() {
    let ws = workspace(
        "
        fun main() {
            do {
                var n = 1;
            } while (n < 3);
        }
        ",
    );
    let condition_use = ws.uses("n").remove(0);
    let decl = ws.session.resolve(&condition_use).unwrap();
    assert_eq!(decl.kind(), DeclKind::LocalVariable);
    assert_eq!(decl.name(), "n");
    assert_eq!(ws.type_of(&condition_use), "int");
}

#[test]
fn catch_body_sees_the_catch_variables() {
    let ws = workspace(
        "
        fun main() {
            try { } catch (code, arg) {
                val c = code;
                val a = arg;
            }
        }
        ",
    );
    for name in ["c", "a"] {
        let decl = ws.session.resolve(&ws.value_of(name)).unwrap();
        assert_eq!(decl.kind(), DeclKind::CatchVariable, "value of `{name}`");
    }
    assert_eq!(ws.type_of(&ws.value_of("c")), "int");
    assert_eq!(ws.type_of(&ws.value_of("a")), "unknown");
}
