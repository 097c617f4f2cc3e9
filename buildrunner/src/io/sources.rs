//! Source selection: expand a task's glob into in-memory artifacts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::core::artifact::Artifact;

/// Read every regular file matching `pattern`, relative to `root`.
///
/// Order is the glob enumeration order (lexicographic within a directory).
/// Entries that cannot be read are skipped with a warning, and contents that
/// are not UTF-8 are decoded lossily. No matches is not an error here; callers
/// decide the empty-input policy.
#[instrument(skip(root), fields(root = %root.display()))]
pub fn select_sources(root: &Path, pattern: &str) -> Result<Vec<Artifact>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
    let entries =
        glob::glob(&full_pattern).with_context(|| format!("invalid source pattern {pattern}"))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %e.path().display(), err = %e.error(), "skipping unreadable source");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("source path has no file name {}", path.display()))?
            .to_string_lossy()
            .into_owned();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), err = %e, "skipping unreadable source");
                continue;
            }
        };
        if std::str::from_utf8(&bytes).is_err() {
            warn!(path = %path.display(), "source is not valid UTF-8, decoding lossily");
        }
        debug!(path = %path.display(), bytes = bytes.len(), "selected source");
        artifacts.push(Artifact::new(name, String::from_utf8_lossy(&bytes)));
    }
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_matching_files_in_name_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("nested.coffee")).expect("mkdir");
        fs::write(src.join("b.coffee"), "b = 2").expect("write b");
        fs::write(src.join("a.coffee"), "a = 1").expect("write a");
        fs::write(src.join("notes.txt"), "skip").expect("write txt");

        let artifacts = select_sources(temp.path(), "src/*.coffee").expect("select");
        assert_eq!(
            artifacts,
            vec![Artifact::new("a.coffee", "a = 1"), Artifact::new("b.coffee", "b = 2")]
        );
    }

    #[test]
    fn non_utf8_source_is_decoded_lossily() {
        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("src");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(src.join("one.coffee"), "x = 1").expect("write one");
        fs::write(src.join("two.coffee"), b"# caf\xe9\ny = 2").expect("write two");

        let artifacts = select_sources(temp.path(), "src/*.coffee").expect("select");
        assert_eq!(
            artifacts,
            vec![
                Artifact::new("one.coffee", "x = 1"),
                Artifact::new("two.coffee", "# caf\u{fffd}\ny = 2"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_source_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let src = temp.path().join("src");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(src.join("a.coffee"), "a = 1").expect("write a");
        let locked = src.join("b.coffee");
        fs::write(&locked, "b = 2").expect("write b");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");
        if fs::read(&locked).is_ok() {
            // Running as root: permission bits do not block reads.
            return;
        }

        let artifacts = select_sources(temp.path(), "src/*.coffee").expect("select");
        assert_eq!(artifacts, vec![Artifact::new("a.coffee", "a = 1")]);
    }

    #[test]
    fn no_matches_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let artifacts = select_sources(temp.path(), "tests/math.coffee").expect("select");
        assert!(artifacts.is_empty());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = select_sources(temp.path(), "src/[*.coffee").unwrap_err();
        assert!(err.to_string().contains("invalid source pattern"));
    }
}
