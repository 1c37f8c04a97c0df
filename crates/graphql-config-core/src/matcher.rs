//! File membership matching for schema/documents/include/exclude pointers
//!
//! Paths are compared relative to the project's directory, with `/`
//! separators and `.`/`..` segments collapsed. Wildcards match dotfiles, and
//! brace alternatives such as `*.{ts,tsx}` are supported.

use std::path::{Component, Path};

use globset::{GlobBuilder, GlobMatcher};

use crate::pointer::Pointer;

/// Compile a pattern with the matching rules shared by membership tests and
/// glob expansion: `*` stays within one path segment, `**` crosses segments.
pub fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
}

/// Check whether `filepath` is covered by `pointer`.
///
/// Absolute file paths are made relative to `base_dir` first. Sequences match
/// if any element matches; configured pointers match on their target.
pub fn matches(filepath: &Path, base_dir: &Path, pointer: &Pointer) -> bool {
    match pointer {
        Pointer::Sequence(items) => items.iter().any(|p| matches(filepath, base_dir, p)),
        Pointer::Configured { target, .. } => matches(filepath, base_dir, target),
        Pointer::Literal(pattern) | Pointer::Glob(pattern) => {
            matches_pattern(filepath, base_dir, pattern)
        }
    }
}

/// Match a single pattern string against a file path
pub fn matches_pattern(filepath: &Path, base_dir: &Path, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let relative = if filepath.is_absolute() {
        relative_path(filepath, base_dir)
    } else {
        filepath.to_string_lossy().into_owned()
    };
    let candidate = normalize(&relative);
    let pattern = normalize(pattern);

    match compile(&pattern) {
        Ok(compiled) => compiled.is_match(&candidate),
        Err(e) => {
            log::warn!(
                "Invalid glob pattern '{}' ({}) - falling back to exact match",
                pattern,
                e
            );
            candidate == pattern
        }
    }
}

/// Normalize a path string: `/` separators, no `.` segments, `..` collapsed
/// where a preceding segment exists.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Lexical relative path from `base` to `path` (no filesystem access)
pub fn relative_path(path: &Path, base: &Path) -> String {
    let path_parts = normal_components(path);
    let base_parts = normal_components(base);

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat("..".to_string()).take(base_parts.len() - common));
    parts.extend(path_parts[common..].iter().cloned());

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts
}
