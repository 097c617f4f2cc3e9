//! Concatenation stage.

use crate::core::artifact::Artifact;

/// Separator placed between concatenated files.
pub const NEWLINE: &str = "\n";

/// Join `inputs` in order into a single artifact named `file_name`.
///
/// No inputs yields no output, so downstream stages see an empty list and a
/// dest stage writes nothing.
pub fn concat(file_name: &str, inputs: &[Artifact]) -> Vec<Artifact> {
    if inputs.is_empty() {
        return Vec::new();
    }
    let contents = inputs
        .iter()
        .map(|artifact| artifact.contents.as_str())
        .collect::<Vec<_>>()
        .join(NEWLINE);
    vec![Artifact::new(file_name, contents)]
}
