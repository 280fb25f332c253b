// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Playbook loading pipelines.
//!
//! [`load_global_playbook`] produces the playbook a single documentation
//! repository builds with: the hosted global playbook, the repository's own
//! overrides, and a content source list in which the branch being built is
//! served from the local checkout. [`load_docs_ui_playbook`] produces the
//! playbook the UI repository previews its bundle with.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::{
    config::{ContentSource, Playbook, Ui, load_playbook, parse_playbook},
    context::BuildContext,
    error::{self, Error},
    github::{GLOBAL_PLAYBOOK_PATH, REDIRECTS_PATH, RemoteRepository},
    merge::merge_playbooks,
    sources::{reconcile_sources, remove_protected_sources, rewrite_root_marker},
    version::{AntoraVersionRewriter, DEFAULT_COMPONENT_DESCRIPTOR, VersionGuard},
};

/// Default location of the repository's own playbook.
pub const DEFAULT_LOCAL_PLAYBOOK: &str = "./antora-playbook.yml";
/// Default location of the generated playbook.
pub const DEFAULT_OUTPUT_PLAYBOOK: &str = "./global-antora-playbook.yml";
/// Default location of the downloaded redirects file.
pub const DEFAULT_REDIRECTS: &str = "_redirects";
/// Default UI bundle used by the docs UI preview.
pub const DEFAULT_BUNDLE_PATH: &str = "./build/ui-bundle.zip";

/// Files read and written by the loaders.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct LoaderPaths
{
    /// Playbook checked into the repository being built.
    pub local_playbook:       PathBuf,
    /// Destination of the merged playbook.
    pub output_playbook:      PathBuf,
    /// Destination of the downloaded redirects file.
    pub redirects:            PathBuf,
    /// Component descriptor rewritten on version collisions.
    pub component_descriptor: PathBuf,
}

impl Default for LoaderPaths
{
    fn default() -> Self
    {
        Self {
            local_playbook:       PathBuf::from(DEFAULT_LOCAL_PLAYBOOK,),
            output_playbook:      PathBuf::from(DEFAULT_OUTPUT_PLAYBOOK,),
            redirects:            PathBuf::from(DEFAULT_REDIRECTS,),
            component_descriptor: PathBuf::from(DEFAULT_COMPONENT_DESCRIPTOR,),
        }
    }
}

impl LoaderPaths
{
    /// Resolves every default path relative to `root`.
    pub fn rooted_at(root: &Path,) -> Self
    {
        let defaults = Self::default();
        Self {
            local_playbook:       root.join(defaults.local_playbook,),
            output_playbook:      root.join(defaults.output_playbook,),
            redirects:            root.join(defaults.redirects,),
            component_descriptor: root.join(defaults.component_descriptor,),
        }
    }
}

/// Switches accepted by the `global` pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub struct GlobalOptions
{
    /// Drop private repositories from the global source list.
    pub skip_private_repos:      bool,
    /// Ignore local content sources and always reconcile the global list.
    pub enforce_global_sources:  bool,
    /// Do not download the shared redirects file.
    pub skip_redirects_download: bool,
}

/// Fetches and validates the hosted global playbook.
///
/// # Errors
///
/// Propagates remote failures and returns [`Error::Parse`] or
/// [`Error::Schema`] when the document is malformed.
pub async fn fetch_global_playbook<R,>(remote: &R,) -> Result<Playbook, Error,>
where
    R: RemoteRepository,
{
    let contents = remote.fetch_file(GLOBAL_PLAYBOOK_PATH,).await?;
    let playbook = parse_playbook(&contents,)?;
    playbook.validate_global()?;
    Ok(playbook,)
}

/// Chooses the content sources of the merged playbook.
///
/// Local sources win unless `enforce_global_sources` is set; otherwise the
/// global list is optionally stripped of private repositories and reconciled
/// against `context`.
///
/// # Errors
///
/// Propagates reconciliation failures.
pub fn select_content_sources(
    global: &Playbook,
    local: &Playbook,
    context: &BuildContext,
    options: &GlobalOptions,
    guard: &dyn VersionGuard,
) -> Result<Vec<ContentSource,>, Error,>
{
    if !options.enforce_global_sources
        && let Some(sources,) = local.declared_sources()
    {
        info!("Using {} content source(s) from the local playbook", sources.len());
        return Ok(sources.to_vec(),);
    }

    let mut sources = global.sources().to_vec();
    if options.skip_private_repos {
        sources = remove_protected_sources(sources,);
        debug!("{} source(s) left after removing private repositories", sources.len());
    }

    reconcile_sources(sources, &context.repository, &context.branch, guard,)
}

/// Serializes `playbook` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written.
pub fn write_playbook(playbook: &Playbook, path: &Path,) -> Result<(), Error,>
{
    let rendered = playbook.to_yaml()?;
    debug!("{rendered}");
    write_file(path, &rendered,)
}

/// Downloads the shared redirects file to `path`.
///
/// # Errors
///
/// Propagates remote failures and returns [`Error::Io`] when the file cannot
/// be written.
pub async fn download_redirects<R,>(remote: &R, path: &Path,) -> Result<(), Error,>
where
    R: RemoteRepository,
{
    let contents = remote.fetch_file(REDIRECTS_PATH,).await?;
    write_file(path, &contents,)?;
    info!("Downloaded redirects to {}", path.display());
    Ok((),)
}

/// Builds and writes the playbook for a single documentation repository.
///
/// # Errors
///
/// Returns configuration errors before anything is written, and propagates
/// remote and I/O failures.
pub async fn load_global_playbook<R,>(
    remote: &R,
    context: &BuildContext,
    options: &GlobalOptions,
    paths: &LoaderPaths,
) -> Result<Playbook, Error,>
where
    R: RemoteRepository,
{
    let local = load_playbook(&paths.local_playbook,)?;
    let global = fetch_global_playbook(remote,).await?;

    let guard = AntoraVersionRewriter::new(&paths.component_descriptor,);
    let sources = select_content_sources(&global, &local, context, options, &guard,)?;
    let playbook = merge_playbooks(global, &local, sources,);

    write_playbook(&playbook, &paths.output_playbook,)?;
    info!("Wrote {}", paths.output_playbook.display());

    if !options.skip_redirects_download {
        download_redirects(remote, &paths.redirects,).await?;
    }

    Ok(playbook,)
}

/// Builds and writes the playbook previewing a local UI bundle.
///
/// # Errors
///
/// Returns [`Error::MissingRootMarker`] when the global playbook lacks its
/// root entry, and propagates remote and I/O failures.
pub async fn load_docs_ui_playbook<R,>(
    remote: &R,
    bundle_path: &str,
    paths: &LoaderPaths,
) -> Result<Playbook, Error,>
where
    R: RemoteRepository,
{
    let local = bundle_playbook(bundle_path,);
    let global = fetch_global_playbook(remote,).await?;

    let mut sources = global.sources().to_vec();
    rewrite_root_marker(&mut sources,)?;
    let playbook = merge_playbooks(global, &local, sources,);

    write_playbook(&playbook, &paths.output_playbook,)?;
    info!("Wrote {}", paths.output_playbook.display());
    Ok(playbook,)
}

fn bundle_playbook(bundle_path: &str,) -> Playbook
{
    let mut bundle = Mapping::new();
    bundle.insert(Value::from("url",), Value::from(bundle_path,),);

    Playbook {
        ui: Some(Ui {
            bundle,
            fields: Mapping::new(),
        },),
        ..Playbook::default()
    }
}

fn write_file(path: &Path, contents: &str,) -> Result<(), Error,>
{
    if let Some(parent,) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent,).map_err(|source| error::io_error(parent, source,),)?;
    }
    fs::write(path, contents,).map_err(|source| error::io_error(path, source,),)
}
