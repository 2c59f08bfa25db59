//! Declarations of builtin types and intrinsics, embedded in the crate.

/// Path the stubs file is registered under.
pub const STUBS_PATH: &str = "<builtin>/stubs.tolk";

pub const STUBS_SOURCE: &str = include_str!("stubs.tolk");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FileIndex, IndexKey};
    use tolk_ir::FileId;

    #[test]
    fn stubs_parse_cleanly() {
        let output = tolk_parse::parse(FileId::new(0), STUBS_SOURCE);
        assert!(output.errors.is_empty(), "{:?}", output.errors);

        let index = FileIndex::build(&output.tree);
        for name in ["int", "cell", "slice", "builder", "address", "intN", "map"] {
            assert_eq!(index.by_name(IndexKey::TypeAliases, name).count(), 1, "{name}");
        }
        assert_eq!(index.by_name(IndexKey::Structs, "Cell").count(), 1);
        assert!(index.by_name(IndexKey::Methods, "fromCell").next().is_some());
    }
}
