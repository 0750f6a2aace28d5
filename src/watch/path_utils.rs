// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root`, with forward slashes, for glob matching.
///
/// Falls back to comparing canonical forms, since notify may report paths
/// through a different prefix than the one we watched (macOS `/private/var`).
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

/// Whether a root-relative path lies inside `dir` (also root-relative).
pub fn is_within(rel_path: &str, dir: &Path) -> bool {
    Path::new(rel_path).starts_with(dir)
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/site");
        assert_eq!(
            relative_str(root, Path::new("/site/scss/main.scss")).as_deref(),
            Some("scss/main.scss")
        );
        assert_eq!(relative_str(root, Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn output_tree_detection_is_component_wise() {
        let dist = Path::new("dist");
        assert!(is_within("dist/css/main.css", dist));
        assert!(is_within("dist", dist));
        assert!(!is_within("distillery/notes.html", dist));
    }
}
