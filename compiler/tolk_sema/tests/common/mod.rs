//! Shared fixtures for the integration tests.

#![allow(dead_code, reason = "each test binary uses a subset")]

use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FieldName, FileId, NodeKind, SyntaxNode};
use tolk_sema::index::IndexKey;
use tolk_sema::{Decl, Session};

/// A session with one user file.
pub struct Workspace {
    pub session: Session,
    pub file: FileId,
}

pub fn workspace(source: &str) -> Workspace {
    let mut session = Session::default();
    let file = add_checked(&mut session, "/project/main.tolk", source);
    Workspace { session, file }
}

/// Add a file that must parse cleanly.
pub fn add_checked(session: &mut Session, path: &str, source: &str) -> FileId {
    let file = session.add_file(path, source);
    let errors = session.file(file).expect("file just added").errors();
    assert!(errors.is_empty(), "{path}: {errors:?}");
    file
}

/// Every node of `kind` spelled `text` in `file`, in source order.
pub fn nodes_in(session: &Session, file: FileId, kind: NodeKind, text: &str) -> Vec<SyntaxNode> {
    let root = session.file(file).expect("known file").tree().root();
    let mut found = Vec::new();
    walk(&root, |node| {
        if node.kind() == kind && node.text() == text {
            found.push(node.clone());
        }
        Walk::Continue
    });
    found
}

impl Workspace {
    pub fn nodes(&self, kind: NodeKind, text: &str) -> Vec<SyntaxNode> {
        nodes_in(&self.session, self.file, kind, text)
    }

    pub fn node(&self, kind: NodeKind, text: &str) -> SyntaxNode {
        self.nodes(kind, text)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no {kind} `{text}`"))
    }

    /// Identifier uses spelled `name`, skipping declaration names.
    pub fn uses(&self, name: &str) -> Vec<SyntaxNode> {
        self.nodes(NodeKind::Identifier, name)
            .into_iter()
            .filter(|node| Decl::declared_by_name(node).is_none())
            .collect()
    }

    /// The `val`/`var` declaration named `name`.
    pub fn var(&self, name: &str) -> SyntaxNode {
        self.nodes(NodeKind::Identifier, name)
            .into_iter()
            .filter(|ident| ident.field_name() == Some(FieldName::Name))
            .find_map(|ident| ident.parent().filter(|parent| parent.is(NodeKind::VarDeclaration)))
            .unwrap_or_else(|| panic!("no variable `{name}`"))
    }

    /// The value assigned in `val <name> = <value>`.
    pub fn value_of(&self, name: &str) -> SyntaxNode {
        self.var(name)
            .parent()
            .and_then(|declaration| declaration.child_by_field(FieldName::AssignedVal))
            .unwrap_or_else(|| panic!("`{name}` has no value"))
    }

    /// Top-level declaration of this file.
    pub fn top_level(&self, key: IndexKey, name: &str) -> Decl {
        self.session
            .file(self.file)
            .expect("known file")
            .index()
            .by_name(key, name)
            .next()
            .cloned()
            .unwrap_or_else(|| panic!("no {key:?} `{name}`"))
    }

    pub fn type_of(&self, node: &SyntaxNode) -> String {
        self.session
            .infer_type(node)
            .map_or_else(|| "<none>".to_owned(), |ty| ty.to_string())
    }
}
