//! Dest stage: write artifacts into a directory under the project root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::artifact::Artifact;

/// Write every artifact to `root/dir/<name>`, creating `dir` if needed.
///
/// Existing files are overwritten. Returns the written paths in artifact order.
pub fn write_artifacts(root: &Path, dir: &str, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    if artifacts.is_empty() {
        return Ok(Vec::new());
    }
    let out_dir = root.join(dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.name);
        fs::write(&path, &artifact.contents)
            .with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_overwrites() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = write_artifacts(temp.path(), "lib", &[Artifact::new("a.js", "old")])
            .expect("first write");
        let second = write_artifacts(temp.path(), "lib", &[Artifact::new("a.js", "new")])
            .expect("second write");
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second[0]).expect("read"), "new");
    }

    #[test]
    fn nothing_to_write_leaves_directory_absent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let written = write_artifacts(temp.path(), "lib", &[]).expect("write");
        assert!(written.is_empty());
        assert!(!temp.path().join("lib").exists());
    }
}
