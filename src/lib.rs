// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Playbook loading for multi-repository Antora documentation builds.
//!
//! A hosted global playbook lists every repository and branch that makes up
//! the documentation site. A single repository building a preview needs that
//! playbook with one change: the branch being built must come from the local
//! checkout instead of the remote. This crate locates the repository's
//! content source, excludes the built branch from it, prepends a local
//! source, and merges the result with the repository's own overrides.
//!
//! It also ships the companion tooling used by the docs builds: an orphan
//! page checker for Antora navigation trees and an expander for the custom
//! AsciiDoc block macros.
//!
//! # Example
//!
//! ```
//! use playbook_loader::{AntoraVersionRewriter, parse_playbook, reconcile_sources};
//!
//! # fn main() -> Result<(), playbook_loader::Error> {
//! let global = parse_playbook(
//!     "content:
//!   sources:
//!     - url: .
//!       branches: HEAD
//!     - url: https://github.com/hazelcast/hz-docs
//!       branches: [main]
//! ",
//! )?;
//! let guard = AntoraVersionRewriter::new("./docs/antora.yml",);
//! let sources =
//!     reconcile_sources(global.sources().to_vec(), "hazelcast/hz-docs", "main", &guard,)?;
//!
//! assert_eq!(sources[0].url, ".");
//! assert_eq!(sources.len(), 3);
//! # Ok(())
//! # }
//! ```

mod asciidoc;
mod config;
mod context;
mod error;
mod github;
mod loader;
mod logging;
mod merge;
mod orphans;
mod pattern;
mod retry;
mod sources;
mod version;

pub use asciidoc::{Attributes, MacroExpander, expand_file, parse_attribute};
pub use config::{
    Antora, Asciidoc, Content, ContentSource, OneOrMany, Playbook, Site, Ui, load_playbook,
    parse_playbook,
};
pub use context::{BuildContext, CiEnvironment, parse_pull_request_id, resolve_build_context};
pub use error::{Error, io_error};
pub use github::{
    DOCS_REPO_NAME, DOCS_REPO_OWNER, GLOBAL_PLAYBOOK_PATH, GithubRepository, REDIRECTS_PATH,
    RemoteRepository,
};
pub use loader::{
    DEFAULT_BUNDLE_PATH, DEFAULT_LOCAL_PLAYBOOK, DEFAULT_OUTPUT_PLAYBOOK, DEFAULT_REDIRECTS,
    GlobalOptions, LoaderPaths, download_redirects, fetch_global_playbook, load_docs_ui_playbook,
    load_global_playbook, select_content_sources, write_playbook,
};
pub use logging::{LogLevel, init_logging};
pub use merge::merge_playbooks;
pub use orphans::{
    FailureLevel, NavCollector, OrphanReport, RootReport, check_roots, find_orphan_pages,
    parse_roots,
};
pub use pattern::{BranchPattern, matches_any};
pub use retry::{RetryConfig, retry_with_backoff};
pub use sources::{
    CANONICAL_DOCS_BRANCH, CANONICAL_DOCS_URL, LOCAL_SOURCE_BRANCH, LOCAL_SOURCE_URL,
    PROTECTED_SOURCE_URLS, build_local_source, exclude_branch, find_sources_for_repo,
    match_current_source, reconcile_sources, remove_protected_sources, resolve_current_source,
    rewrite_root_marker,
};
pub use version::{
    AntoraVersionRewriter, DEFAULT_COMPONENT_DESCRIPTOR, SNAPSHOT_VERSION, VersionGuard,
    rewrite_component_version,
};
