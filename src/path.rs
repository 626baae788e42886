//! Path manipulation utilities for fragment references

use std::path::{Component, Path, PathBuf};

/// Directory holding installed packages
pub const MODULES_DIR: &str = "node_modules";

/// Resolve a `parentReference` found in the fragment stored at `from`.
///
/// - `./x`, `../x` and absolute paths are files relative to the directory of `from`
/// - anything else is a module path looked up under `node_modules/`, the way
///   `parent/package-dry.json` points into the installed `parent` package
pub fn resolve_reference(from: &Path, reference: &str) -> PathBuf {
    let reference_path = Path::new(reference);
    let resolved = if reference.starts_with('.') || reference_path.is_absolute() {
        from.parent()
            .unwrap_or_else(|| Path::new(""))
            .join(reference_path)
    } else {
        Path::new(MODULES_DIR).join(reference_path)
    };
    normalize(&resolved)
}

/// Lexically remove `.` and `..` components
///
/// `..` at the start of a relative path is kept, it cannot be folded without
/// touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_reference_goes_to_node_modules() {
        assert_eq!(
            resolve_reference(Path::new("package-dry.json"), "parent/package-dry.json"),
            PathBuf::from("node_modules/parent/package-dry.json")
        );
    }

    #[test]
    fn test_module_reference_from_nested_fragment_is_rooted() {
        assert_eq!(
            resolve_reference(
                Path::new("node_modules/parent/package-dry.json"),
                "grand/package-dry.json"
            ),
            PathBuf::from("node_modules/grand/package-dry.json")
        );
    }

    #[test]
    fn test_relative_reference_uses_fragment_directory() {
        assert_eq!(
            resolve_reference(
                Path::new("node_modules/parent/package-dry.json"),
                "./base/package-dry.json"
            ),
            PathBuf::from("node_modules/parent/base/package-dry.json")
        );
        assert_eq!(
            resolve_reference(Path::new("package-dry.json"), "../shared/package-dry.json"),
            PathBuf::from("../shared/package-dry.json")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a/b/..")), PathBuf::from("../a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_reference() {
        assert_eq!(
            resolve_reference(Path::new("package-dry.json"), "/opt/base/package-dry.json"),
            PathBuf::from("/opt/base/package-dry.json")
        );
    }
}
