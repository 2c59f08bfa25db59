//! Per-file index of top-level declarations.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tolk_ir::{FileId, NodeKind, SyntaxTree};

use crate::decl::Decl;

/// Category of a top-level declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Funcs,
    GetMethods,
    /// Instance and static methods.
    Methods,
    GlobalVariables,
    Constants,
    Structs,
    Enums,
    TypeAliases,
}

impl IndexKey {
    pub const ALL: [IndexKey; 8] = [
        IndexKey::Funcs,
        IndexKey::GetMethods,
        IndexKey::Methods,
        IndexKey::GlobalVariables,
        IndexKey::Constants,
        IndexKey::Structs,
        IndexKey::Enums,
        IndexKey::TypeAliases,
    ];

    fn of(kind: NodeKind) -> Option<IndexKey> {
        Some(match kind {
            NodeKind::FunctionDeclaration => IndexKey::Funcs,
            NodeKind::GetMethodDeclaration => IndexKey::GetMethods,
            NodeKind::MethodDeclaration => IndexKey::Methods,
            NodeKind::GlobalVarDeclaration => IndexKey::GlobalVariables,
            NodeKind::ConstantDeclaration => IndexKey::Constants,
            NodeKind::StructDeclaration => IndexKey::Structs,
            NodeKind::EnumDeclaration => IndexKey::Enums,
            NodeKind::TypeAliasDeclaration => IndexKey::TypeAliases,
            _ => return None,
        })
    }
}

/// Top-level declarations of one file, grouped by [`IndexKey`] in source
/// order.
#[derive(Clone, Debug)]
pub struct FileIndex {
    file: FileId,
    elements: FxHashMap<IndexKey, Vec<Decl>>,
    by_name: FxHashMap<(IndexKey, Arc<str>), SmallVec<[usize; 1]>>,
}

impl FileIndex {
    pub fn build(tree: &Arc<SyntaxTree>) -> Self {
        let mut index = FileIndex {
            file: tree.file(),
            elements: FxHashMap::default(),
            by_name: FxHashMap::default(),
        };
        for node in tree.root().children() {
            let Some(key) = IndexKey::of(node.kind()) else {
                continue;
            };
            let Some(decl) = Decl::from_node(node) else {
                continue;
            };
            let slot = index.elements.entry(key).or_default();
            index
                .by_name
                .entry((key, Arc::from(decl.name())))
                .or_default()
                .push(slot.len());
            slot.push(decl);
        }
        index
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn elements(&self, key: IndexKey) -> &[Decl] {
        self.elements.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Feed every element of `key` to `processor` until it returns `false`.
    /// Returns `false` when stopped early.
    pub fn process(&self, key: IndexKey, mut processor: impl FnMut(&Decl) -> bool) -> bool {
        self.elements(key).iter().all(|decl| processor(decl))
    }

    /// Elements of `key` named `name`, in source order.
    pub fn by_name<'a>(&'a self, key: IndexKey, name: &str) -> impl Iterator<Item = &'a Decl> {
        let elements = self.elements(key);
        self.by_name
            .get(&(key, Arc::from(name)))
            .into_iter()
            .flatten()
            .filter_map(move |&i| elements.get(i))
    }

    pub fn len(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::DeclKind;
    use pretty_assertions::assert_eq;

    fn index(source: &str) -> FileIndex {
        let output = tolk_parse::parse(FileId::new(3), source);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        FileIndex::build(&output.tree)
    }

    fn names(index: &FileIndex, key: IndexKey) -> Vec<&str> {
        index.elements(key).iter().map(Decl::name).collect()
    }

    #[test]
    fn groups_top_level_declarations() {
        let index = index(
            r#"
            import "other";
            const A = 1;
            global g: int;
            type Id = int;
            enum Color { Red }
            struct Point { x: int }
            fun main() { val local = 1; }
            fun helper() {}
            get fun seqno(): int { return 0; }
            fun Point.origin(): Point { return Point { x: 0 }; }
            fun Point.norm(self): int { return self.x; }
            "#,
        );
        assert_eq!(index.file(), FileId::new(3));
        assert_eq!(names(&index, IndexKey::Funcs), ["main", "helper"]);
        assert_eq!(names(&index, IndexKey::GetMethods), ["seqno"]);
        assert_eq!(names(&index, IndexKey::Methods), ["origin", "norm"]);
        assert_eq!(names(&index, IndexKey::Constants), ["A"]);
        assert_eq!(names(&index, IndexKey::GlobalVariables), ["g"]);
        assert_eq!(names(&index, IndexKey::Structs), ["Point"]);
        assert_eq!(names(&index, IndexKey::Enums), ["Color"]);
        assert_eq!(names(&index, IndexKey::TypeAliases), ["Id"]);
        assert_eq!(index.len(), 10);

        let kinds: Vec<DeclKind> = index
            .elements(IndexKey::Methods)
            .iter()
            .map(Decl::kind)
            .collect();
        assert_eq!(kinds, [DeclKind::StaticMethod, DeclKind::InstanceMethod]);
    }

    #[test]
    fn lookup_by_name_keeps_overloads_in_order() {
        let index = index(
            "
            fun Point.len(self): int { return 0; }
            fun Vec.len(self): int { return 1; }
            ",
        );
        let starts: Vec<u32> = index
            .by_name(IndexKey::Methods, "len")
            .map(|decl| decl.node().span().start)
            .collect();
        assert_eq!(starts.len(), 2);
        assert!(starts[0] < starts[1]);
        assert_eq!(index.by_name(IndexKey::Funcs, "len").count(), 0);
    }

    #[test]
    fn process_stops_early() {
        let index = index("fun a() {} fun b() {} fun c() {}");
        let mut seen = Vec::new();
        let finished = index.process(IndexKey::Funcs, |decl| {
            seen.push(decl.name().to_owned());
            decl.name() != "b"
        });
        assert!(!finished);
        assert_eq!(seen, ["a", "b"]);
    }
}
