//! @ai:module:intent Lexical path normalization and base-relative display
//! @ai:module:layer domain
//! @ai:module:public_api normalize_path, resolve, display_relative, has_trailing_separator
//! @ai:module:stateless true

use std::path::{is_separator, Component, Path, PathBuf};

/// @ai:intent Normalize a path to the host convention without touching the filesystem
/// @ai:post no `.` components remain; `..` only remains as a leading component of a relative path
/// @ai:example normalize_path("/src/./lib/../a.pas") -> "/src/a.pas"
/// @ai:edge_cases "" and "." both normalize to "."; "/.." normalizes to "/"
/// @ai:effects pure
pub fn normalize_path(path: &str) -> String {
    normalize(Path::new(path)).to_string_lossy().into_owned()
}

fn normalize(path: &Path) -> PathBuf {
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

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// @ai:intent Resolve a possibly relative path against a base directory and normalize it
/// @ai:effects pure
pub fn resolve(path: &str, base: &Path) -> String {
    let path = Path::new(path);
    if path.is_absolute() {
        normalize(path).to_string_lossy().into_owned()
    } else {
        normalize(&base.join(path)).to_string_lossy().into_owned()
    }
}

/// @ai:intent Display a path relative to `base`, falling back to the resolved form when it would escape
/// @ai:example display_relative("/work/src/a.pas", "/work") -> "src/a.pas"
/// @ai:example display_relative("/src/b.pas", "/work") -> "/src/b.pas"
/// @ai:effects pure
pub fn display_relative(path: &str, base: &Path) -> String {
    let resolved = resolve(path, base);
    let base = normalize(base);

    if base == Path::new(".") {
        return resolved;
    }

    match Path::new(&resolved).strip_prefix(&base) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => resolved,
    }
}

/// @ai:intent Check whether a raw path string ends with a directory separator
/// @ai:effects pure
pub fn has_trailing_separator(path: &str) -> bool {
    path.chars().last().is_some_and(is_separator)
}
