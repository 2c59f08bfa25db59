//! Find-references.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod common;

use std::time::Duration;

use common::{add_checked, nodes_in, workspace, Workspace};
use pretty_assertions::assert_eq;
use tolk_ir::{NodeKind, SyntaxNode};
use tolk_sema::index::IndexKey;
use tolk_sema::{
    CancellationToken, Decl, DeclKind, FindReferencesOptions, SearchError, Session, SessionConfig,
};

const SHADOWING: &str = "
    const x = 10;
    fun main() {
        val y = x;
        {
            val x = 1;
            val z = x + x;
        }
        return x;
    }
";

/// Each reference with the text of its parent node.
fn lines(nodes: &[SyntaxNode]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| format!("{} in `{}`", node.text(), node.parent().unwrap().text()))
        .collect()
}

fn local(ws: &Workspace, name: &str) -> Decl {
    ws.nodes(NodeKind::Identifier, name)
        .iter()
        .filter_map(Decl::declared_by_name)
        .find(|decl| decl.kind() == DeclKind::LocalVariable)
        .unwrap()
}

#[test]
fn constant_references_skip_the_shadowed_block() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let found = ws
        .session
        .find_references(&constant, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(lines(&found), vec!["x in `val y = x`", "x in `return x;`"]);
}

#[test]
fn definition_comes_first_when_requested() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let options = FindReferencesOptions::default().with_definition(true);
    let found = ws.session.find_references(&constant, &options).unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(Some(found[0].clone()), constant.name_anchor());
}

#[test]
fn local_references_stay_in_their_block() {
    let ws = workspace(SHADOWING);
    let inner = local(&ws, "x");
    let found = ws
        .session
        .find_references(&inner, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(lines(&found), vec!["x in `x + x`", "x in `x + x`"]);
}

#[test]
fn limit_stops_the_search() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let options = FindReferencesOptions::default().with_limit(1);
    let found = ws.session.find_references(&constant, &options).unwrap();
    assert_eq!(lines(&found), vec!["x in `val y = x`"]);
}

#[test]
fn cancelled_search_reports_cancellation() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let token = CancellationToken::new();
    token.cancel();
    let options = FindReferencesOptions::default().with_cancellation(token);
    assert_eq!(
        ws.session.find_references(&constant, &options),
        Err(SearchError::Cancelled)
    );
}

#[test]
fn expired_deadline_times_out() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let options = FindReferencesOptions::default().with_timeout(Duration::ZERO);
    assert_eq!(
        ws.session.find_references(&constant, &options),
        Err(SearchError::TimedOut(Duration::ZERO))
    );
}

#[test]
fn unrepresentable_deadline_never_expires() {
    let ws = workspace(SHADOWING);
    let constant = ws.top_level(IndexKey::Constants, "x");
    let unbounded = FindReferencesOptions::default().with_timeout(Duration::MAX);
    let plain = FindReferencesOptions::default();
    assert_eq!(
        lines(&ws.session.find_references(&constant, &unbounded).unwrap()),
        lines(&ws.session.find_references(&constant, &plain).unwrap())
    );
}

#[test]
fn configured_timeout_applies_without_an_override() {
    let mut session =
        Session::new(SessionConfig::default().with_reference_timeout(Duration::ZERO));
    let file = add_checked(&mut session, "/project/main.tolk", SHADOWING);
    let constant = session
        .file(file)
        .unwrap()
        .index()
        .by_name(IndexKey::Constants, "x")
        .next()
        .cloned()
        .unwrap();
    let result = session.find_references(&constant, &FindReferencesOptions::default());
    assert_eq!(result, Err(SearchError::TimedOut(Duration::ZERO)));
}

#[test]
fn self_references_can_be_excluded() {
    let ws = workspace(
        "
        struct Counter { value: int }
        fun Counter.get(self): int { return self.value; }
        ",
    );
    let receiver = Decl::declared_by_name(&ws.nodes(NodeKind::Identifier, "self")[0]).unwrap();
    assert_eq!(receiver.kind(), DeclKind::Parameter);

    let found = ws
        .session
        .find_references(&receiver, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(lines(&found), vec!["self in `self.value`"]);

    let options = FindReferencesOptions::default().with_self(false);
    assert!(ws.session.find_references(&receiver, &options).unwrap().is_empty());
}

#[test]
fn shorthand_fields_count_for_field_and_local() {
    let ws = workspace(
        "
        struct Point { x: int }
        fun main() {
            val x = 1;
            val p = Point { x };
            val q = p.x;
        }
        ",
    );
    let field = ws
        .top_level(IndexKey::Structs, "Point")
        .as_struct()
        .unwrap()
        .fields()
        .remove(0);
    let found = ws
        .session
        .find_references(&field, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(lines(&found), vec!["x in `x`", "x in `p.x`"]);

    let variable = local(&ws, "x");
    let found = ws
        .session
        .find_references(&variable, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(lines(&found), vec!["x in `x`"]);
}

#[test]
fn top_level_references_span_files() {
    let mut session = Session::default();
    let lib = add_checked(&mut session, "/project/lib.tolk", "fun helper(): int { return 1; }");
    let main = add_checked(
        &mut session,
        "/project/main.tolk",
        r#"
        import "lib";
        fun main() { return helper() + helper(); }
        "#,
    );
    let helper = session
        .file(lib)
        .unwrap()
        .index()
        .by_name(IndexKey::Funcs, "helper")
        .next()
        .cloned()
        .unwrap();

    let found = session
        .find_references(&helper, &FindReferencesOptions::default())
        .unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|node| node.file() == main));

    let options = FindReferencesOptions::default().same_file_only(true);
    assert!(session.find_references(&helper, &options).unwrap().is_empty());
    assert_eq!(nodes_in(&session, main, NodeKind::Identifier, "helper").len(), 2);
}
