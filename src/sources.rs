// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Content source reconciliation.
//!
//! The global playbook lists every documentation repository and the branches
//! each contributes. When one of those repositories is built on its own, the
//! source entry for the branch being built is replaced by the local checkout:
//! the branch is excluded from the remote entry and a `url: .` entry pointing
//! at `HEAD` is placed first, so the same pages are never indexed twice.

use tracing::{debug, warn};

use crate::{
    config::{ContentSource, OneOrMany},
    error::Error,
    pattern::matches_any,
    version::VersionGuard,
};

/// URL marker for the repository being built.
pub const LOCAL_SOURCE_URL: &str = ".";
/// Branch value of the synthetic local source.
pub const LOCAL_SOURCE_BRANCH: &str = "HEAD";
/// Remote URL of the repository hosting the global playbook.
pub const CANONICAL_DOCS_URL: &str = "https://github.com/hazelcast/hazelcast-docs";
/// Branch of the canonical docs repository pulled into every build.
pub const CANONICAL_DOCS_BRANCH: &str = "main";
/// Sources dropped by `--skip-private-repos`.
pub const PROTECTED_SOURCE_URLS: [&str; 2] = [
    "https://github.com/hazelcast/hazelcast-mono",
    "https://github.com/hazelcast/management-center",
];
/// Branches Antora selects when a source declares none.
const ANTORA_DEFAULT_BRANCHES: [&str; 2] = ["HEAD", "v{0..9}*"];

/// Returns the indices of every source whose URL ends with `repository`.
///
/// # Errors
///
/// Returns [`Error::RepositoryNotFound`] when no source matches.
///
/// # Examples
///
/// ```
/// use playbook_loader::{ContentSource, find_sources_for_repo};
///
/// let sources = vec![
///     ContentSource::new(".", None,),
///     ContentSource::new("https://github.com/hazelcast/hz-docs", None,),
/// ];
/// assert_eq!(find_sources_for_repo(&sources, "hazelcast/hz-docs",)?, vec![1]);
/// # Ok::<(), playbook_loader::Error>(())
/// ```
pub fn find_sources_for_repo(
    sources: &[ContentSource],
    repository: &str,
) -> Result<Vec<usize,>, Error,>
{
    let matched: Vec<usize,> = sources
        .iter()
        .enumerate()
        .filter(|(_, source,)| source.url.ends_with(repository,),)
        .map(|(index, _,)| index,)
        .collect();

    if matched.is_empty() {
        return Err(Error::RepositoryNotFound {
            repository: repository.to_owned(),
        },);
    }

    debug!("Found {} source(s) for {repository}", matched.len());
    Ok(matched,)
}

/// Returns the first candidate whose branch patterns match `branch`.
///
/// Patterns are matched as globs; exclusion prefixes are not interpreted.
///
/// # Errors
///
/// Propagates pattern compilation failures.
pub fn match_current_source(
    sources: &[ContentSource],
    candidates: &[usize],
    branch: &str,
) -> Result<Option<usize,>, Error,>
{
    for &index in candidates {
        let Some(patterns,) = sources.get(index,).and_then(|source| source.branches.as_ref(),)
        else {
            continue;
        };
        if matches_any(patterns.iter(), branch,)? {
            return Ok(Some(index,),);
        }
    }
    Ok(None,)
}

/// Picks the source slot that corresponds to the branch being built.
///
/// When no candidate matches, the `guard` is notified so the local version
/// cannot collide with a published one, and the first candidate is used.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `candidates` is empty and propagates
/// pattern compilation failures.
pub fn resolve_current_source(
    sources: &[ContentSource],
    candidates: &[usize],
    branch: &str,
    guard: &dyn VersionGuard,
) -> Result<usize, Error,>
{
    if let Some(index,) = match_current_source(sources, candidates, branch,)? {
        return Ok(index,);
    }

    let first = *candidates
        .first()
        .ok_or_else(|| Error::validation("branch resolution requires at least one candidate",),)?;

    warn!("No matching base branch found. Rewriting version to omit version collision!");
    guard.on_unmatched_branch(branch,);
    Ok(first,)
}

/// Excludes `branch` from a source by appending `!branch` to its patterns.
pub fn exclude_branch(source: &mut ContentSource, branch: &str,)
{
    let excluded = format!("!{branch}");
    match source.branches.as_mut() {
        Some(branches,) => branches.push(excluded,),
        None => {
            let mut branches: Vec<String,> =
                ANTORA_DEFAULT_BRANCHES.iter().map(|value| (*value).to_owned(),).collect();
            branches.push(excluded,);
            source.branches = Some(OneOrMany::Many(branches,),);
        }
    }
}

/// Builds the `url: .` source for the local checkout.
///
/// Start paths are copied from `resolved` so the local build keeps the same
/// documentation root.
pub fn build_local_source(resolved: &ContentSource,) -> ContentSource
{
    let mut local =
        ContentSource::new(LOCAL_SOURCE_URL, Some(OneOrMany::from(LOCAL_SOURCE_BRANCH,),),);
    local.start_path = resolved.start_path.clone();
    local.start_paths = resolved.start_paths.clone();
    local
}

/// Points the global playbook's `url: .` entry at the canonical docs
/// repository's `main` branch.
///
/// # Errors
///
/// Returns [`Error::MissingRootMarker`] when no entry has `url: .`.
pub fn rewrite_root_marker(sources: &mut [ContentSource],) -> Result<(), Error,>
{
    let root = sources
        .iter_mut()
        .find(|source| source.url == LOCAL_SOURCE_URL,)
        .ok_or(Error::MissingRootMarker,)?;

    root.url = CANONICAL_DOCS_URL.to_owned();
    root.branches = Some(OneOrMany::Many(vec![CANONICAL_DOCS_BRANCH.to_owned()],),);
    Ok((),)
}

/// Drops the private repositories that public builds cannot clone.
pub fn remove_protected_sources(sources: Vec<ContentSource,>,) -> Vec<ContentSource,>
{
    sources
        .into_iter()
        .filter(|source| !PROTECTED_SOURCE_URLS.contains(&source.url.as_str(),),)
        .collect()
}

/// Rewrites the global source list for a build of `repository` at `branch`.
///
/// The returned list starts with the local source, followed by the global
/// sources with the root marker rewritten and `branch` excluded from the
/// resolved entry.
///
/// # Errors
///
/// Returns [`Error::MissingRootMarker`] or [`Error::RepositoryNotFound`] when
/// the global list cannot be reconciled.
pub fn reconcile_sources(
    mut sources: Vec<ContentSource,>,
    repository: &str,
    branch: &str,
    guard: &dyn VersionGuard,
) -> Result<Vec<ContentSource,>, Error,>
{
    rewrite_root_marker(&mut sources,)?;

    let candidates = find_sources_for_repo(&sources, repository,)?;
    let current = resolve_current_source(&sources, &candidates, branch, guard,)?;

    let resolved = &mut sources[current];
    exclude_branch(resolved, branch,);
    debug!("Excluded branch {branch} from {}", resolved.url);

    let local = build_local_source(resolved,);
    sources.insert(0, local,);
    Ok(sources,)
}
