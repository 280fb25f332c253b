// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Version collision mitigation for locally built components.
///
/// When the branch being built matches none of the global branch patterns the
/// local component version could clash with a published one. The rewriter
/// replaces the version in the local component descriptor with a sentinel.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::error::{self, Error};

/// Version written into the component descriptor to avoid collisions.
pub const SNAPSHOT_VERSION: &str = "snapshot_ci";

/// Default location of the local component descriptor.
pub const DEFAULT_COMPONENT_DESCRIPTOR: &str = "./docs/antora.yml";

/// Reaction to a branch that matches no global content source.
pub trait VersionGuard
{
    /// Called once when branch resolution falls back to the first candidate.
    fn on_unmatched_branch(&self, branch: &str,);
}

/// Rewrites `version`, `display_version` and `full-version` in an
/// `antora.yml` component descriptor.
///
/// Failures are logged and swallowed; the build continues without the
/// mitigation.
#[derive(Debug, Clone,)]
pub struct AntoraVersionRewriter
{
    path: PathBuf,
}

impl AntoraVersionRewriter
{
    /// Creates a rewriter for the descriptor at `path`.
    pub fn new<P,>(path: P,) -> Self
    where
        P: Into<PathBuf,>,
    {
        Self {
            path: path.into(),
        }
    }

    /// Returns the descriptor location.
    pub fn path(&self,) -> &Path
    {
        &self.path
    }
}

impl Default for AntoraVersionRewriter
{
    fn default() -> Self
    {
        Self::new(DEFAULT_COMPONENT_DESCRIPTOR,)
    }
}

impl VersionGuard for AntoraVersionRewriter
{
    fn on_unmatched_branch(&self, branch: &str,)
    {
        match rewrite_component_version(&self.path, SNAPSHOT_VERSION,) {
            Ok((),) => info!(
                "Rewrote component version in {} to {SNAPSHOT_VERSION} for branch {branch}",
                self.path.display()
            ),
            Err(error,) => {
                debug!("{error}");
                warn!("Could not rewrite version. There might be an error with version collision!");
            }
        }
    }
}

/// Replaces the version fields of a component descriptor.
///
/// # Errors
///
/// Returns [`Error::Io`] when the descriptor cannot be read or written,
/// [`Error::Parse`] when it is not valid YAML, and [`Error::Schema`] when it
/// is not a mapping with an `asciidoc.attributes` mapping.
pub fn rewrite_component_version(path: &Path, version: &str,) -> Result<(), Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    let mut descriptor: Value = serde_yaml::from_str(&contents,)?;

    let root = descriptor
        .as_mapping_mut()
        .ok_or_else(|| Error::schema("component descriptor must be a mapping",),)?;
    root.insert(Value::from("version",), Value::from(version,),);
    root.insert(Value::from("display_version",), Value::from(version,),);

    let attributes = root
        .get_mut("asciidoc",)
        .and_then(Value::as_mapping_mut,)
        .and_then(|asciidoc| asciidoc.get_mut("attributes",),)
        .and_then(Value::as_mapping_mut,)
        .ok_or_else(|| Error::schema("component descriptor has no asciidoc.attributes",),)?;
    attributes.insert(Value::from("full-version",), Value::from(version,),);

    let rendered = serde_yaml::to_string(&descriptor,).map_err(Error::emit,)?;
    fs::write(path, rendered,).map_err(|source| error::io_error(path, source,),)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use serde_yaml::Value;
    use tempfile::tempdir;

    use super::{
        AntoraVersionRewriter, Error, SNAPSHOT_VERSION, VersionGuard, rewrite_component_version,
    };

    const DESCRIPTOR: &str = r"
name: hazelcast
title: Hazelcast Platform
version: '5.6'
display_version: '5.6'
asciidoc:
  attributes:
    full-version: 5.6.0
    page-latest-supported-mc: '5.6'
";

    #[test]
    fn rewrites_all_version_fields()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("antora.yml",);
        fs::write(&path, DESCRIPTOR,).expect("failed to write descriptor",);

        rewrite_component_version(&path, SNAPSHOT_VERSION,).expect("rewrite failed",);

        let updated: Value =
            serde_yaml::from_str(&fs::read_to_string(&path,).expect("read",),).expect("yaml",);
        assert_eq!(updated["version"], Value::from(SNAPSHOT_VERSION));
        assert_eq!(updated["display_version"], Value::from(SNAPSHOT_VERSION));
        assert_eq!(updated["asciidoc"]["attributes"]["full-version"], Value::from(SNAPSHOT_VERSION));
        assert_eq!(updated["asciidoc"]["attributes"]["page-latest-supported-mc"], Value::from("5.6"));
        assert_eq!(updated["name"], Value::from("hazelcast"));
    }

    #[test]
    fn missing_attributes_leave_file_untouched()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("antora.yml",);
        let original = "name: hazelcast\nversion: '5.6'\n";
        fs::write(&path, original,).expect("failed to write descriptor",);

        let error = rewrite_component_version(&path, SNAPSHOT_VERSION,).unwrap_err();
        assert!(matches!(error, Error::Schema { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), original);
    }

    #[test]
    fn malformed_descriptor_is_reported_and_left_untouched()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("antora.yml",);
        let original = "version: [\n";
        fs::write(&path, original,).expect("failed to write descriptor",);

        let error = rewrite_component_version(&path, SNAPSHOT_VERSION,).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));

        AntoraVersionRewriter::new(&path,).on_unmatched_branch("feature/x",);
        assert_eq!(fs::read_to_string(&path).expect("read"), original);
    }

    #[test]
    fn missing_descriptor_is_an_io_error()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let error =
            rewrite_component_version(&temp.path().join("antora.yml",), SNAPSHOT_VERSION,)
                .unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn guard_swallows_failures()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let guard = AntoraVersionRewriter::new(temp.path().join("missing.yml",),);
        guard.on_unmatched_branch("feature/x",);
        assert!(!guard.path().exists());
    }

    #[test]
    fn guard_rewrites_descriptor()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("antora.yml",);
        fs::write(&path, DESCRIPTOR,).expect("failed to write descriptor",);

        AntoraVersionRewriter::new(&path,).on_unmatched_branch("feature/x",);

        let updated = fs::read_to_string(&path,).expect("read",);
        assert!(updated.contains("version: snapshot_ci"));
    }

    #[test]
    fn default_points_at_docs_descriptor()
    {
        let guard = AntoraVersionRewriter::default();
        assert_eq!(guard.path(), std::path::Path::new("./docs/antora.yml"));
    }
}
