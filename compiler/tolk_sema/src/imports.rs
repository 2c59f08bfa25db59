//! Import path resolution.
//!
//! Paths are plain `/`-separated strings, normalized lexically, so the same
//! file reached through different relative imports maps to one key.

/// Resolve the import `import` written in the file at `from_path`.
///
/// - `@stdlib/x` resolves to `<stdlib_root>/x.tolk`, or nothing without a
///   stdlib root.
/// - Other `@` mappings are not supported and resolve to nothing.
/// - Anything else is relative to the importing file's directory.
///
/// `.tolk` is appended when missing.
pub fn resolve_import(from_path: &str, import: &str, stdlib_root: Option<&str>) -> Option<String> {
    let without_ext = import.strip_suffix(".tolk").unwrap_or(import);
    if let Some(rest) = without_ext.strip_prefix("@stdlib/") {
        let root = stdlib_root?;
        return Some(format!("{}.tolk", normalize_path(&join(root, rest))));
    }
    if without_ext.starts_with('@') {
        return None;
    }
    let dir = parent_dir(from_path);
    Some(format!("{}.tolk", normalize_path(&join(dir, without_ext))))
}

/// The string inside an import directive's quotes.
pub(crate) fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(literal)
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}

fn join(dir: &str, relative: &str) -> String {
    if relative.starts_with('/') || dir.is_empty() {
        relative.to_owned()
    } else {
        format!("{}/{relative}", dir.trim_end_matches('/'))
    }
}

/// Collapse `.`, `..` and repeated separators.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_imports() {
        let from = "/work/contracts/main.tolk";
        assert_eq!(
            resolve_import(from, "./messages", None).as_deref(),
            Some("/work/contracts/messages.tolk")
        );
        assert_eq!(
            resolve_import(from, "../lib/math.tolk", None).as_deref(),
            Some("/work/lib/math.tolk")
        );
        assert_eq!(
            resolve_import(from, "storage", None).as_deref(),
            Some("/work/contracts/storage.tolk")
        );
    }

    #[test]
    fn stdlib_imports_need_a_root() {
        assert_eq!(
            resolve_import("/a/main.tolk", "@stdlib/tvm-dicts", Some("/std/")).as_deref(),
            Some("/std/tvm-dicts.tolk")
        );
        assert_eq!(resolve_import("/a/main.tolk", "@stdlib/common", None), None);
        assert_eq!(resolve_import("/a/main.tolk", "@mapped/x", Some("/std")), None);
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_path("/a/./b//c/../d"), "/a/b/d");
        assert_eq!(normalize_path("../x/../../y"), "../../y");
        assert_eq!(normalize_path("/../x"), "/x");
        assert_eq!(unquote("\"./foo\""), "./foo");
    }
}
