//! In-memory files flowing between pipeline stages.

/// A named file held in memory while a task runs.
///
/// `name` is a bare file name; the destination directory is chosen by the
/// dest stage that writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub contents: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Return a copy of this artifact named with `extension` in place of its
    /// source extension.
    pub fn with_extension(&self, extension: &str) -> Self {
        let stem = self
            .name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| !stem.is_empty())
            .unwrap_or(&self.name);
        Self {
            name: format!("{stem}.{extension}"),
            contents: self.contents.clone(),
        }
    }
}
