//! The set of files being analyzed, with their caches.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tolk_ir::{FieldName, FileId, NodeKind, SyntaxNode, SyntaxTree};
use tolk_parse::ParseError;

use crate::cache::Caches;
use crate::config::SessionConfig;
use crate::db::{Db, Resolver, TypeOracle};
use crate::decl::Decl;
use crate::error::{SearchError, SessionError};
use crate::imports::{normalize_path, resolve_import, unquote};
use crate::index::FileIndex;
use crate::references::FindReferencesOptions;
use crate::size::SizeOf;
use crate::stubs::{STUBS_PATH, STUBS_SOURCE};
use crate::ty::Ty;

/// One parsed file.
pub struct SourceFile {
    path: String,
    tree: Arc<SyntaxTree>,
    index: FileIndex,
    /// Resolved paths of the file's imports, in source order.
    imports: Vec<String>,
    errors: Vec<ParseError>,
}

impl SourceFile {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }
}

/// Files, their indexes and the memo tables of every query over them.
///
/// Queries take `&self` and fill the caches lazily; replacing any file
/// drops every cached result.
pub struct Session {
    config: SessionConfig,
    files: FxHashMap<FileId, SourceFile>,
    /// Registration order.
    order: Vec<FileId>,
    by_path: FxHashMap<String, FileId>,
    stubs: Option<FileId>,
    next_file: u32,
    caches: Caches,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let load_stubs = config.load_stubs;
        let mut session = Session {
            config,
            files: FxHashMap::default(),
            order: Vec::new(),
            by_path: FxHashMap::default(),
            stubs: None,
            next_file: 0,
            caches: Caches::new(),
        };
        if load_stubs {
            session.stubs = Some(session.load(STUBS_PATH.to_owned(), STUBS_SOURCE));
        }
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register a new file. Same as [`Session::on_file_replaced`].
    pub fn add_file(&mut self, path: &str, text: &str) -> FileId {
        self.on_file_replaced(path, text)
    }

    /// Parse `text` as the new content of `path`. A known path keeps its
    /// [`FileId`]. Every cached result is dropped.
    pub fn on_file_replaced(&mut self, path: &str, text: &str) -> FileId {
        let path = normalize_path(path);
        let file = self.load(path, text);
        self.caches.clear_all();
        file
    }

    pub fn remove_file(&mut self, path: &str) -> Result<(), SessionError> {
        let path = normalize_path(path);
        let file = self
            .by_path
            .remove(&path)
            .ok_or_else(|| SessionError::UnknownPath(path.clone()))?;
        self.files.remove(&file);
        self.order.retain(|id| *id != file);
        self.caches.clear_all();
        tracing::debug!(path = %path, "file removed");
        Ok(())
    }

    /// Drop every cached result.
    pub fn clear_all(&self) {
        self.caches.clear_all();
    }

    pub fn file(&self, file: FileId) -> Result<&SourceFile, SessionError> {
        self.files.get(&file).ok_or(SessionError::UnknownFile(file))
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    /// Innermost node covering `offset` in `file`.
    pub fn node_at(&self, file: FileId, offset: u32) -> Result<Option<SyntaxNode>, SessionError> {
        Ok(self.file(file)?.tree.node_at_offset(offset))
    }

    pub fn resolve(&self, node: &SyntaxNode) -> Option<Decl> {
        crate::resolve::resolve(self, node)
    }

    pub fn multi_resolve(&self, node: &SyntaxNode) -> Vec<Decl> {
        crate::resolve::multi_resolve(self, node)
    }

    pub fn infer_type(&self, node: &SyntaxNode) -> Option<Ty> {
        crate::infer::infer_type(self, node)
    }

    /// Serialized size of the value or type at `node`.
    pub fn estimate_size(&self, node: &SyntaxNode) -> Option<SizeOf> {
        self.infer_type(node).map(|ty| crate::size::estimate(&ty))
    }

    pub fn find_references(
        &self,
        target: &Decl,
        options: &FindReferencesOptions,
    ) -> Result<Vec<SyntaxNode>, SearchError> {
        crate::references::find_references(self, target, options)
    }

    fn load(&mut self, path: String, text: &str) -> FileId {
        let file = match self.by_path.get(&path) {
            Some(&file) => file,
            None => {
                let file = FileId::new(self.next_file);
                self.next_file += 1;
                self.by_path.insert(path.clone(), file);
                self.order.push(file);
                file
            }
        };

        let output = tolk_parse::parse(file, text);
        let index = FileIndex::build(&output.tree);
        let stdlib_root = self.config.stdlib_root.as_deref();
        let imports: Vec<String> = output
            .tree
            .root()
            .children_of_kind(NodeKind::ImportDirective)
            .filter_map(|directive| directive.child_by_field(FieldName::Path))
            .filter_map(|literal| resolve_import(&path, unquote(literal.text()), stdlib_root))
            .collect();
        tracing::debug!(
            path = %path,
            file = file.raw(),
            declarations = index.len(),
            imports = imports.len(),
            errors = output.errors.len(),
            "file loaded"
        );

        self.files.insert(
            file,
            SourceFile {
                path,
                tree: output.tree,
                index,
                imports,
                errors: output.errors,
            },
        );
        file
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Resolver for Session {
    fn resolve(&self, node: &SyntaxNode) -> Option<Decl> {
        crate::resolve::resolve(self, node)
    }

    fn multi_resolve(&self, node: &SyntaxNode) -> Vec<Decl> {
        crate::resolve::multi_resolve(self, node)
    }
}

impl TypeOracle for Session {
    fn infer_type(&self, node: &SyntaxNode) -> Option<Ty> {
        crate::infer::infer_type(self, node)
    }
}

impl Db for Session {
    fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn tree(&self, file: FileId) -> Option<&Arc<SyntaxTree>> {
        self.files.get(&file).map(|source| &source.tree)
    }

    fn file_index(&self, file: FileId) -> Option<&FileIndex> {
        self.files.get(&file).map(|source| &source.index)
    }

    fn file_ids(&self) -> Vec<FileId> {
        self.order.clone()
    }

    fn imported_files(&self, file: FileId) -> Vec<FileId> {
        let Some(source) = self.files.get(&file) else {
            return Vec::new();
        };
        source
            .imports
            .iter()
            .filter_map(|path| self.by_path.get(path).copied())
            .collect()
    }

    fn stub_files(&self) -> Vec<FileId> {
        let common = self.config.stdlib_root.as_deref().and_then(|root| {
            let path = normalize_path(&format!("{root}/common.tolk"));
            self.by_path.get(&path).copied()
        });
        self.stubs.into_iter().chain(common).collect()
    }

    fn caches(&self) -> &Caches {
        &self.caches
    }
}

#[cfg(test)]
mod tests;
