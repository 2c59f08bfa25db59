#![allow(clippy::unwrap_used, clippy::expect_used)]

use tolk_ir::{FileId, NodeKind};

use super::Session;
use crate::config::SessionConfig;
use crate::db::Db;
use crate::error::SessionError;
use crate::stubs::STUBS_PATH;
use pretty_assertions::assert_eq;

#[test]
fn stubs_are_loaded_first() {
    let session = Session::default();
    let stubs = session.file_by_path(STUBS_PATH).unwrap();
    assert_eq!(session.stub_files(), vec![stubs]);
    assert!(session.file(stubs).unwrap().errors().is_empty());
    assert!(!session.file(stubs).unwrap().index().is_empty());
}

#[test]
fn stubs_can_be_disabled() {
    let session = Session::new(SessionConfig::default().with_stubs(false));
    assert!(session.stub_files().is_empty());
    assert!(session.file_ids().is_empty());
}

#[test]
fn file_ids_survive_replacement() {
    let mut session = Session::default();
    let first = session.add_file("/project/main.tolk", "fun main() {}");
    let again = session.on_file_replaced("/project/./main.tolk", "fun main() { return 1; }");
    assert_eq!(first, again);
    let other = session.add_file("/project/util.tolk", "");
    assert_ne!(first, other);
    assert_eq!(session.file(first).unwrap().path(), "/project/main.tolk");
    assert_eq!(session.file_by_path("/project/lib/../main.tolk"), Some(first));
}

#[test]
fn replacing_a_file_drops_cached_results() {
    let mut session = Session::default();
    let file = session.add_file("/project/main.tolk", "const A = 1;");
    let constant = session.file(file).unwrap().index().elements(crate::index::IndexKey::Constants)[0]
        .node()
        .clone();
    assert!(session.infer_type(&constant).is_some());
    assert!(!session.caches().types.is_empty());

    session.on_file_replaced("/project/main.tolk", "const A = true;");
    assert!(session.caches().types.is_empty());
}

#[test]
fn unknown_files_are_errors() {
    let mut session = Session::default();
    assert_eq!(
        session.remove_file("/nowhere.tolk"),
        Err(SessionError::UnknownPath("/nowhere.tolk".to_owned()))
    );
    let missing = FileId::new(999);
    assert!(matches!(session.file(missing), Err(SessionError::UnknownFile(id)) if id == missing));
    assert!(session.node_at(missing, 0).is_err());
}

#[test]
fn removed_files_disappear() {
    let mut session = Session::default();
    let file = session.add_file("/project/main.tolk", "fun main() {}");
    session.remove_file("/project/main.tolk").unwrap();
    assert!(session.file(file).is_err());
    assert_eq!(session.file_by_path("/project/main.tolk"), None);
    assert!(!session.file_ids().contains(&file));
}

#[test]
fn imports_resolve_relative_and_stdlib_paths() {
    let mut session = Session::new(SessionConfig::default().with_stdlib_root("/opt/stdlib"));
    let main = session.add_file(
        "/project/src/main.tolk",
        r#"
        import "../lib/util";
        import "@stdlib/tvm-dicts";
        import "@other/thing";
        "#,
    );
    assert_eq!(
        session.file(main).unwrap().imports(),
        ["/project/lib/util.tolk", "/opt/stdlib/tvm-dicts.tolk"]
    );

    // Only loaded files count as imported.
    assert!(session.imported_files(main).is_empty());
    let util = session.add_file("/project/lib/util.tolk", "");
    assert_eq!(session.imported_files(main), vec![util]);
}

#[test]
fn stdlib_common_joins_the_stub_files() {
    let mut session = Session::new(SessionConfig::default().with_stdlib_root("/opt/stdlib"));
    let stubs = session.file_by_path(STUBS_PATH).unwrap();
    let common = session.add_file("/opt/stdlib/common.tolk", "fun now(): int builtin;");
    assert_eq!(session.stub_files(), vec![stubs, common]);
}

#[test]
fn declarations_are_visible_through_imports() {
    let mut session = Session::default();
    session.add_file("/project/util.tolk", "fun helper(): int { return 1; }");
    let source = r#"
        import "util";
        fun main() { val v = helper(); }
        "#;
    let main = session.add_file("/project/main.tolk", source);
    let offset = u32::try_from(source.find("helper").unwrap()).unwrap();
    let call = session.node_at(main, offset).unwrap().unwrap();
    assert_eq!(call.kind(), NodeKind::Identifier);

    let decl = session.resolve(&call).unwrap();
    assert_eq!(decl.name(), "helper");
    assert_eq!(session.file(decl.file()).unwrap().path(), "/project/util.tolk");
    assert_eq!(session.infer_type(&call).unwrap().to_string(), "() -> int");
}
