//! Query traits shared by the resolution and inference engines.
//!
//! Resolution needs types (`foo.bar` depends on the type of `foo`) and
//! inference needs resolution (`x` has the type of whatever `x` names), so
//! both engines take a `&dyn Db` and call back into it instead of into each
//! other. [`crate::Session`] is the production implementation.

use std::sync::Arc;

use tolk_ir::{FileId, SyntaxNode, SyntaxTree};

use crate::cache::Caches;
use crate::config::SessionConfig;
use crate::decl::Decl;
use crate::index::FileIndex;
use crate::ty::Ty;

/// Name resolution.
pub trait Resolver {
    /// The declaration `node` refers to, first in search order.
    fn resolve(&self, node: &SyntaxNode) -> Option<Decl>;

    /// Every declaration `node` legally refers to. Differs from
    /// [`Resolver::resolve`] only for struct literal shorthand, where
    /// `Point { x }` names both the field and the variable.
    fn multi_resolve(&self, node: &SyntaxNode) -> Vec<Decl>;
}

/// Type inference.
pub trait TypeOracle {
    fn infer_type(&self, node: &SyntaxNode) -> Option<Ty>;
}

/// Workspace access for the engines.
pub trait Db: Resolver + TypeOracle + Sync {
    fn config(&self) -> &SessionConfig;

    fn tree(&self, file: FileId) -> Option<&Arc<SyntaxTree>>;

    fn file_index(&self, file: FileId) -> Option<&FileIndex>;

    /// Every known file, stubs included, in registration order.
    fn file_ids(&self) -> Vec<FileId>;

    /// Files named by the import directives of `file`, in order. Imports
    /// that point at unknown files are skipped.
    fn imported_files(&self, file: FileId) -> Vec<FileId>;

    /// Files searched after the import graph: the embedded stubs, then the
    /// stdlib `common.tolk` when a stdlib root is configured.
    fn stub_files(&self) -> Vec<FileId>;

    fn caches(&self) -> &Caches;
}
