//! Find-references.
//!
//! Every declaration has a use scope: the block of a local variable, the
//! function of a parameter, the whole session for top-level declarations.
//! The search walks the scope, resolves only identifiers spelled like the
//! declaration and keeps those that resolve back to it.

use std::time::{Duration, Instant};

use tolk_ir::visitor::{walk, Walk};
use tolk_ir::{FieldName, NodeKind, SyntaxNode};

use crate::db::Db;
use crate::decl::{trim_backticks, Decl, DeclKind};
use crate::error::{CancellationToken, SearchError};

/// Knobs for [`find_references`].
#[derive(Clone, Debug)]
pub struct FindReferencesOptions {
    /// Put the declaration's name node first in the result.
    pub include_definition: bool,
    /// Consider `self` identifiers. Renaming turns this off.
    pub include_self: bool,
    /// Search only the file of the declaration.
    pub same_file_only: bool,
    /// Stop after this many results.
    pub limit: Option<usize>,
    /// Overrides [`crate::SessionConfig::reference_timeout`].
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl Default for FindReferencesOptions {
    fn default() -> Self {
        FindReferencesOptions {
            include_definition: false,
            include_self: true,
            same_file_only: false,
            limit: None,
            timeout: None,
            cancellation: None,
        }
    }
}

impl FindReferencesOptions {
    #[must_use]
    pub fn with_definition(mut self, include: bool) -> Self {
        self.include_definition = include;
        self
    }

    #[must_use]
    pub fn with_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }

    #[must_use]
    pub fn same_file_only(mut self, same_file_only: bool) -> Self {
        self.same_file_only = same_file_only;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Uses of `target`, in scope order.
#[tracing::instrument(level = "trace", skip_all, fields(kind = %target.kind(), name = target.name()))]
pub fn find_references(
    db: &dyn Db,
    target: &Decl,
    options: &FindReferencesOptions,
) -> Result<Vec<SyntaxNode>, SearchError> {
    let mut search = Search {
        db,
        target,
        options,
        deadline: options
            .timeout
            .or(db.config().reference_timeout)
            // A deadline past what `Instant` can represent is no deadline.
            .and_then(|timeout| Some((Instant::now().checked_add(timeout)?, timeout))),
        found: Vec::new(),
    };

    if options.include_definition {
        if let Some(anchor) = target.name_anchor() {
            search.found.push(anchor);
        }
    }

    let scopes: Vec<SyntaxNode> = match use_scope(target) {
        Some(scope) => vec![scope],
        None if options.same_file_only => db
            .tree(target.file())
            .map(|tree| vec![tree.root()])
            .unwrap_or_default(),
        None => db
            .file_ids()
            .into_iter()
            .filter_map(|file| db.tree(file).map(|tree| tree.root()))
            .collect(),
    };

    for scope in &scopes {
        search.poll()?;
        if search.is_full() || search.scan(scope) {
            break;
        }
    }
    tracing::debug!(found = search.found.len(), "references");
    Ok(search.found)
}

struct Search<'a> {
    db: &'a dyn Db,
    target: &'a Decl,
    options: &'a FindReferencesOptions,
    deadline: Option<(Instant, Duration)>,
    found: Vec<SyntaxNode>,
}

impl Search<'_> {
    fn poll(&self) -> Result<(), SearchError> {
        if self
            .options
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(SearchError::Cancelled);
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(SearchError::TimedOut(timeout));
            }
        }
        Ok(())
    }

    fn is_full(&self) -> bool {
        self.options.limit.is_some_and(|limit| self.found.len() >= limit)
    }

    /// Collect uses inside `scope`. `true` once the limit is reached.
    fn scan(&mut self, scope: &SyntaxNode) -> bool {
        let target = self.target;
        let name = target.name();
        walk(scope, |node| {
            if !matches!(node.kind(), NodeKind::Identifier | NodeKind::TypeIdentifier) {
                return Walk::Continue;
            }
            let text = node.text();
            let spelled = trim_backticks(text) == name;
            if !spelled && !(self.options.include_self && text == "self") {
                return Walk::Continue;
            }
            if text == "self" && !self.options.include_self {
                return Walk::Continue;
            }

            for decl in self.db.multi_resolve(node) {
                if !decl.is_same_declaration(target) {
                    continue;
                }
                // The declaration's own name.
                if decl.name_anchor().as_ref() == Some(node) {
                    continue;
                }
                self.found.push(node.clone());
                if self.is_full() {
                    return Walk::Stop;
                }
                break;
            }
            Walk::Continue
        })
    }
}

/// Node outside of which `decl` cannot be used; `None` for top-level
/// declarations and fields, which any file may use.
fn use_scope(decl: &Decl) -> Option<SyntaxNode> {
    let node = decl.node();
    match decl.kind() {
        DeclKind::LocalVariable => {
            let block = node.ancestor_of_kind(NodeKind::BlockStatement)?;
            // `do { var a = 1; } while (a)`
            match block.parent() {
                Some(parent) if parent.is(NodeKind::DoWhileStatement) => Some(parent),
                _ => Some(block),
            }
        }
        DeclKind::CatchVariable => node.parent()?.child_by_field(FieldName::CatchBody),
        DeclKind::Parameter => decl.as_parameter()?.owner().map(|owner| owner.node().clone()),
        DeclKind::TypeParameter => decl.as_type_parameter()?.owner().map(|owner| owner.node().clone()),
        DeclKind::Function
        | DeclKind::GetMethod
        | DeclKind::InstanceMethod
        | DeclKind::StaticMethod
        | DeclKind::Struct
        | DeclKind::Field
        | DeclKind::TypeAlias
        | DeclKind::Enum
        | DeclKind::EnumMember
        | DeclKind::Constant
        | DeclKind::GlobalVariable => None,
    }
}
