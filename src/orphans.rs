// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Detection of pages that no navigation file links to.
//!
//! A documentation root follows the Antora layout: `modules/<module>/pages`
//! holds the pages and `modules/ROOT/nav.adoc` is the entry navigation file.
//! Navigation files reference pages through `xref:` and pull in module menus
//! through `include::<module>:partial$nav.adoc`. Every `.adoc` page that is not
//! reachable this way is reported as an orphan.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{self, Error};

const ROOT_MODULE: &str = "ROOT";
const NAV_FILE: &str = "nav.adoc";
const PAGE_EXTENSION: &str = "adoc";

/// Severity used when orphan pages are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub enum FailureLevel
{
    /// Report orphans and exit successfully.
    #[default]
    Warn,
    /// Report orphans and exit with status 1.
    Error,
}

impl FailureLevel
{
    /// Parses `--log-failure-level`. Only `error` is strict; any other value
    /// reports orphans without failing.
    pub fn from_arg(value: &str,) -> Self
    {
        if value.trim() == "error" { Self::Error } else { Self::Warn }
    }
}

/// Result of checking one documentation root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RootReport
{
    /// Directory that was checked.
    pub root:    PathBuf,
    /// Whether the directory exists.
    pub exists:  bool,
    /// Pages absent from every navigation file, sorted.
    pub orphans: Vec<PathBuf,>,
}

/// Results for every requested root, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct OrphanReport
{
    /// One entry per requested root.
    pub roots: Vec<RootReport,>,
}

impl OrphanReport
{
    /// Returns `true` when any root has orphan pages.
    pub fn has_orphans(&self,) -> bool
    {
        self.roots.iter().any(|root| !root.orphans.is_empty(),)
    }

    /// Process exit status for this report under `level`.
    pub fn exit_code(&self, level: FailureLevel,) -> i32
    {
        i32::from(self.has_orphans() && level == FailureLevel::Error,)
    }

    /// Logs missing roots, orphan pages, or the all-clear message.
    pub fn log(&self,)
    {
        for root in &self.roots {
            if !root.exists {
                warn!("There is no directory \"{}\" found!", root.root.display());
            } else if !root.orphans.is_empty() {
                error!("The following orphan pages were detected in \"{}\":", root.root.display());
                for page in &root.orphans {
                    error!("  {}", page.display());
                }
            }
        }

        if !self.has_orphans() {
            info!("No orphan pages detected. YAY!");
        }
    }
}

/// Collects the page paths referenced from a root's navigation tree.
#[derive(Debug,)]
pub struct NavCollector
{
    root:      PathBuf,
    level:     FailureLevel,
    file_link: Regex,
    child_nav: Regex,
    visited:   HashSet<PathBuf,>,
    links:     HashSet<PathBuf,>,
}

impl NavCollector
{
    /// Creates a collector for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a link pattern fails to compile.
    pub fn new(root: &Path, level: FailureLevel,) -> Result<Self, Error,>
    {
        let compile = |pattern: &str| {
            Regex::new(pattern,).map_err(|e| Error::validation(format!("invalid regex: {e}"),),)
        };

        Ok(Self {
            root: root.to_path_buf(),
            level,
            file_link: compile(r"xref:([\w,\s-]+:)?([./\w,\s-]+\.adoc)",)?,
            child_nav: compile(r"include::([\w,\s-]+):partial\$nav\.adoc",)?,
            visited: HashSet::new(),
            links: HashSet::new(),
        },)
    }

    /// Walks the navigation tree starting at `modules/ROOT/nav.adoc`.
    pub fn collect(mut self,) -> HashSet<PathBuf,>
    {
        let entry = self.root.join("modules",).join(ROOT_MODULE,).join(NAV_FILE,);
        self.read_nav_file(&entry, ROOT_MODULE,);
        self.links
    }

    fn read_nav_file(&mut self, path: &Path, nav_module: &str,)
    {
        if !self.visited.insert(path.to_path_buf(),) {
            debug!("Skipping already visited nav file {}", path.display());
            return;
        }

        let contents = match fs::read_to_string(path,) {
            Ok(contents,) => contents,
            Err(e,) => {
                warn!("Could not read nav file in \"{}\"!", self.root.display());
                if self.level == FailureLevel::Error {
                    error!("{}: {e}", path.display());
                }
                return;
            }
        };

        for line in contents.lines() {
            if let Some(captures,) = self.file_link.captures(line,) {
                let module = captures.get(1,).map(|m| m.as_str().trim_end_matches(':',).trim(),);
                let filename = captures[2].trim().to_owned();
                let pages = self.page_paths(&filename, module, nav_module,);
                self.links.extend(pages,);
            } else if let Some(captures,) = self.child_nav.captures(line,) {
                let child_module = captures[1].trim().to_owned();
                let child_nav = self.root.join("modules",).join(&child_module,).join("partials",).join(NAV_FILE,);
                self.read_nav_file(&child_nav, &child_module,);
            }
        }
    }

    /// Without an explicit module a page may live in `ROOT` or in the module
    /// owning the nav file.
    fn page_paths(&self, filename: &str, module: Option<&str,>, nav_module: &str,) -> Vec<PathBuf,>
    {
        let page = |module: &str| self.root.join("modules",).join(module,).join("pages",).join(filename,);

        match module.filter(|module| !module.is_empty(),) {
            Some(module,) => vec![page(module)],
            None if nav_module == ROOT_MODULE => vec![page(ROOT_MODULE)],
            None => vec![page(ROOT_MODULE), page(nav_module)],
        }
    }
}

/// Lists the orphan pages of a single documentation root.
///
/// # Errors
///
/// Returns [`Error::Io`] when the module directories cannot be read.
pub fn find_orphan_pages(root: &Path, level: FailureLevel,) -> Result<Vec<PathBuf,>, Error,>
{
    let links = NavCollector::new(root, level,)?.collect();
    debug!("Collected {} navigation link(s) in {}", links.len(), root.display());

    let modules_dir = root.join("modules",);
    let mut orphans = Vec::new();
    for entry in fs::read_dir(&modules_dir,).map_err(|e| error::io_error(&modules_dir, e,),)? {
        let module = entry.map_err(|e| error::io_error(&modules_dir, e,),)?.path();
        if !module.is_dir() {
            continue;
        }

        let pages_dir = module.join("pages",);
        if !pages_dir.is_dir() {
            continue;
        }

        for page in collect_pages(&pages_dir,)? {
            if !links.contains(&page,) {
                orphans.push(page,);
            }
        }
    }

    orphans.sort();
    Ok(orphans,)
}

/// Checks every root in parallel and reports them in input order.
///
/// # Errors
///
/// Propagates the first I/O failure encountered.
pub fn check_roots(roots: &[PathBuf], level: FailureLevel,) -> Result<OrphanReport, Error,>
{
    let roots = roots
        .par_iter()
        .map(|root| -> Result<RootReport, Error,> {
            if !root.exists() {
                return Ok(RootReport {
                    root:    root.clone(),
                    exists:  false,
                    orphans: Vec::new(),
                },);
            }

            Ok(RootReport {
                root:    root.clone(),
                exists:  true,
                orphans: find_orphan_pages(root, level,)?,
            },)
        },)
        .collect::<Result<Vec<_,>, Error,>>()?;

    Ok(OrphanReport {
        roots,
    },)
}

/// Splits the comma separated `--directory` value.
pub fn parse_roots(value: &str,) -> Vec<PathBuf,>
{
    value
        .split(',',)
        .map(str::trim,)
        .filter(|root| !root.is_empty(),)
        .map(PathBuf::from,)
        .collect()
}

fn collect_pages(dir: &Path,) -> Result<Vec<PathBuf,>, Error,>
{
    let mut pages = Vec::new();
    for entry in fs::read_dir(dir,).map_err(|e| error::io_error(dir, e,),)? {
        let path = entry.map_err(|e| error::io_error(dir, e,),)?.path();
        if path.is_dir() {
            pages.extend(collect_pages(&path,)?,);
        } else if path.extension().is_some_and(|ext| ext == PAGE_EXTENSION,) {
            pages.push(path,);
        }
    }
    Ok(pages,)
}

#[cfg(test)]
mod tests
{
    use std::{fs, path::Path};

    use tempfile::tempdir;

    use super::{FailureLevel, NavCollector, check_roots, find_orphan_pages, parse_roots};

    fn write(root: &Path, relative: &str, contents: &str,)
    {
        let path = root.join(relative,);
        fs::create_dir_all(path.parent().expect("parent",),).expect("failed to create dirs",);
        fs::write(path, contents,).expect("failed to write file",);
    }

    fn docs_tree(root: &Path,)
    {
        write(
            root,
            "modules/ROOT/nav.adoc",
            "* xref:index.adoc[Home]\n* xref:clients:java.adoc[Java]\ninclude::maintain:partial$nav.adoc[]\n",
        );
        write(root, "modules/maintain/partials/nav.adoc", "** xref:backup.adoc[Backup]\n** xref:guides/upgrade.adoc[]\n",);
        write(root, "modules/ROOT/pages/index.adoc", "= Home",);
        write(root, "modules/ROOT/pages/orphan.adoc", "= Orphan",);
        write(root, "modules/clients/pages/java.adoc", "= Java",);
        write(root, "modules/maintain/pages/backup.adoc", "= Backup",);
        write(root, "modules/maintain/pages/guides/upgrade.adoc", "= Upgrade",);
        write(root, "modules/maintain/pages/guides/draft.adoc", "= Draft",);
        write(root, "modules/maintain/pages/notes.txt", "not a page",);
    }

    #[test]
    fn collects_links_from_root_and_child_navs()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        docs_tree(temp.path(),);

        let links = NavCollector::new(temp.path(), FailureLevel::Warn,).expect("collector",).collect();
        let modules = temp.path().join("modules",);

        assert!(links.contains(&modules.join("ROOT/pages/index.adoc")));
        assert!(links.contains(&modules.join("clients/pages/java.adoc")));
        assert!(links.contains(&modules.join("ROOT/pages/backup.adoc")));
        assert!(links.contains(&modules.join("maintain/pages/backup.adoc")));
        assert!(links.contains(&modules.join("maintain/pages/guides/upgrade.adoc")));
        assert_eq!(links.len(), 6);
    }

    #[test]
    fn reports_unlinked_pages_only()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        docs_tree(temp.path(),);

        let orphans = find_orphan_pages(temp.path(), FailureLevel::Warn,).expect("orphans",);
        let modules = temp.path().join("modules",);
        assert_eq!(orphans, vec![
            modules.join("ROOT/pages/orphan.adoc"),
            modules.join("maintain/pages/guides/draft.adoc"),
        ]);
    }

    #[test]
    fn missing_nav_file_makes_every_page_orphan()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        write(temp.path(), "modules/ROOT/pages/index.adoc", "= Home",);

        let orphans = find_orphan_pages(temp.path(), FailureLevel::Error,).expect("orphans",);
        assert_eq!(orphans.len(), 1);
    }

    #[test]
    fn cyclic_includes_terminate()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        write(temp.path(), "modules/ROOT/nav.adoc", "include::a:partial$nav.adoc[]\n",);
        write(temp.path(), "modules/a/partials/nav.adoc", "* xref:a.adoc[]\ninclude::a:partial$nav.adoc[]\n",);
        write(temp.path(), "modules/a/pages/a.adoc", "= A",);

        let orphans = find_orphan_pages(temp.path(), FailureLevel::Warn,).expect("orphans",);
        assert!(orphans.is_empty());
    }

    #[test]
    fn report_preserves_order_and_exit_code()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let clean = temp.path().join("clean",);
        let dirty = temp.path().join("dirty",);
        write(&clean, "modules/ROOT/nav.adoc", "* xref:index.adoc[]\n",);
        write(&clean, "modules/ROOT/pages/index.adoc", "= Home",);
        docs_tree(&dirty,);
        let missing = temp.path().join("missing",);

        let report = check_roots(&[clean.clone(), missing.clone(), dirty.clone()], FailureLevel::Warn,)
            .expect("report",);

        assert_eq!(report.roots.len(), 3);
        assert_eq!(report.roots[0].root, clean);
        assert!(report.roots[0].orphans.is_empty());
        assert!(!report.roots[1].exists);
        assert_eq!(report.roots[2].orphans.len(), 2);
        assert!(report.has_orphans());
        assert_eq!(report.exit_code(FailureLevel::Warn), 0);
        assert_eq!(report.exit_code(FailureLevel::Error), 1);

        let json = serde_json::to_value(&report,).expect("json",);
        assert_eq!(json["roots"][1]["exists"], serde_json::Value::Bool(false));
    }

    #[test]
    fn only_error_is_a_strict_failure_level()
    {
        assert_eq!(FailureLevel::from_arg("error",), FailureLevel::Error);
        assert_eq!(FailureLevel::from_arg("warn",), FailureLevel::Warn);
        assert_eq!(FailureLevel::from_arg("fatal",), FailureLevel::Warn);
        assert_eq!(FailureLevel::from_arg("",), FailureLevel::Warn);
    }

    #[test]
    fn directory_list_is_comma_separated()
    {
        assert_eq!(parse_roots("docs, api-docs,,",), vec![
            std::path::PathBuf::from("docs"),
            std::path::PathBuf::from("api-docs"),
        ]);
    }
}
