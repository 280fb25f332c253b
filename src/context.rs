// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Resolution of the repository and branch being built.
//!
//! Locally both values come from `--repo` and `--branch`. On the hosted CI
//! platform they are derived from its environment: the repository from
//! `REPOSITORY_URL`, the branch from `BRANCH`, and for pull request previews
//! the base branch of the pull request named by `BRANCH=pull/<id>/head`.

use tracing::debug;

use crate::{error::Error, github::RemoteRepository};

const GITHUB_URL_PREFIX: &str = "https://github.com/";

/// The repository and branch the current build represents.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct BuildContext
{
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Branch whose global source slot is replaced by the local checkout.
    pub branch:     String,
}

/// Snapshot of the hosted CI variables the loader understands.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct CiEnvironment
{
    /// `NETLIFY` is set: the build runs on the hosted platform.
    pub hosted:         bool,
    /// `REPOSITORY_URL`, e.g. `https://github.com/hazelcast/hz-docs`.
    pub repository_url: Option<String,>,
    /// `PULL_REQUEST` is `true`: the build is a pull request preview.
    pub pull_request:   bool,
    /// `BRANCH`: branch name, or `pull/<id>/head` for previews.
    pub branch:         Option<String,>,
}

impl CiEnvironment
{
    /// Reads the CI variables from the process environment.
    pub fn from_env() -> Self
    {
        Self::from_lookup(|name| std::env::var(name,).ok(),)
    }

    /// Reads the CI variables through `lookup`.
    pub fn from_lookup<F,>(lookup: F,) -> Self
    where
        F: Fn(&str,) -> Option<String,>,
    {
        let non_empty = |name: &str| lookup(name,).filter(|value| !value.trim().is_empty(),);

        Self {
            hosted:         non_empty("NETLIFY",).is_some(),
            repository_url: non_empty("REPOSITORY_URL",),
            pull_request:   non_empty("PULL_REQUEST",)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true",),),
            branch:         non_empty("BRANCH",),
        }
    }
}

/// Resolves the build context from flags and the CI environment.
///
/// On the hosted platform the environment takes precedence over the flags.
///
/// # Errors
///
/// Returns [`Error::MissingBuildContext`] when the repository or branch is
/// unknown, [`Error::Validation`] when a pull request reference is
/// malformed, and propagates remote lookup failures.
pub async fn resolve_build_context<R,>(
    repository: Option<&str,>,
    branch: Option<&str,>,
    ci: &CiEnvironment,
    remote: &R,
) -> Result<BuildContext, Error,>
where
    R: RemoteRepository,
{
    let mut repository = repository.map(str::to_owned,);
    let mut branch = branch.map(str::to_owned,);

    if ci.hosted {
        if let Some(url,) = ci.repository_url.as_deref() {
            repository = Some(url.trim_start_matches(GITHUB_URL_PREFIX,).to_owned(),);
        }
        if let Some(ci_branch,) = ci.branch.as_deref() {
            branch = Some(ci_branch.to_owned(),);
        }

        if ci.pull_request
            && let (Some(repository,), Some(reference,)) = (repository.as_deref(), ci.branch.as_deref())
        {
            let number = parse_pull_request_id(reference,)?;
            branch = Some(remote.pull_request_base(repository, number,).await?,);
        }
    }

    let repository = repository
        .map(|value| value.trim().trim_end_matches('/',).to_owned(),)
        .filter(|value| !value.is_empty(),);
    let branch = branch.map(|value| value.trim().to_owned(),).filter(|value| !value.is_empty(),);

    match (repository, branch,) {
        (Some(repository,), Some(branch,),) => {
            debug!("Repository name: {repository}");
            debug!("Base branch: {branch}");
            Ok(BuildContext {
                repository,
                branch,
            },)
        }
        _ => Err(Error::MissingBuildContext,),
    }
}

/// Extracts the pull request number from `pull/<id>/head`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the identifier is not a number.
pub fn parse_pull_request_id(reference: &str,) -> Result<u64, Error,>
{
    let trimmed = reference.trim();
    let id = trimmed.strip_prefix("pull/",).unwrap_or(trimmed,);
    let id = id.strip_suffix("/head",).unwrap_or(id,);
    id.parse::<u64,>()
        .map_err(|e| Error::validation(format!("invalid pull request reference '{reference}': {e}"),),)
}

#[cfg(test)]
mod tests
{
    use std::{cell::RefCell, collections::HashMap};

    use super::{BuildContext, CiEnvironment, parse_pull_request_id, resolve_build_context};
    use crate::{error::Error, github::RemoteRepository};

    #[derive(Default,)]
    struct PullRequests
    {
        bases:    HashMap<(String, u64,), String,>,
        requests: RefCell<Vec<(String, u64,),>,>,
    }

    impl RemoteRepository for PullRequests
    {
        async fn fetch_file(&self, path: &str,) -> Result<String, Error,>
        {
            Err(Error::remote(format!("unexpected fetch of {path}"),),)
        }

        async fn pull_request_base(&self, repository: &str, number: u64,) -> Result<String, Error,>
        {
            self.requests.borrow_mut().push((repository.to_owned(), number,),);
            self.bases
                .get(&(repository.to_owned(), number,),)
                .cloned()
                .ok_or_else(|| Error::remote("pull request not found",),)
        }
    }

    fn env(pairs: &[(&str, &str,)],) -> CiEnvironment
    {
        let values: HashMap<String, String,> =
            pairs.iter().map(|(key, value,)| ((*key).to_owned(), (*value).to_owned(),),).collect();
        CiEnvironment::from_lookup(|name| values.get(name,).cloned(),)
    }

    #[tokio::test]
    async fn flags_define_the_context_outside_ci()
    {
        let remote = PullRequests::default();
        let context = resolve_build_context(
            Some("hazelcast/hz-docs",),
            Some("main",),
            &CiEnvironment::default(),
            &remote,
        )
        .await
        .expect("context",);

        assert_eq!(context, BuildContext {
            repository: "hazelcast/hz-docs".to_owned(),
            branch:     "main".to_owned(),
        });
    }

    #[tokio::test]
    async fn missing_flags_are_fatal()
    {
        let remote = PullRequests::default();
        let error = resolve_build_context(Some("hazelcast/hz-docs",), None, &CiEnvironment::default(), &remote,)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::MissingBuildContext));
    }

    #[tokio::test]
    async fn hosted_branch_build_uses_environment()
    {
        let ci = env(&[
            ("NETLIFY", "true",),
            ("REPOSITORY_URL", "https://github.com/hazelcast/mc-docs",),
            ("PULL_REQUEST", "false",),
            ("BRANCH", "v/5.6",),
        ],);
        let remote = PullRequests::default();

        let context =
            resolve_build_context(Some("ignored/repo",), Some("main",), &ci, &remote,).await.expect("context",);

        assert_eq!(context.repository, "hazelcast/mc-docs");
        assert_eq!(context.branch, "v/5.6");
        assert!(remote.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn hosted_preview_uses_pull_request_base()
    {
        let ci = env(&[
            ("NETLIFY", "true",),
            ("REPOSITORY_URL", "https://github.com/hazelcast/hz-docs",),
            ("PULL_REQUEST", "true",),
            ("BRANCH", "pull/1234/head",),
        ],);
        let mut remote = PullRequests::default();
        remote.bases.insert(("hazelcast/hz-docs".to_owned(), 1234,), "v/5.5".to_owned(),);

        let context = resolve_build_context(None, None, &ci, &remote,).await.expect("context",);

        assert_eq!(context.branch, "v/5.5");
        assert_eq!(remote.requests.borrow().as_slice(), [("hazelcast/hz-docs".to_owned(), 1234)]);
    }

    #[test]
    fn environment_snapshot_parses_flags()
    {
        let ci = env(&[("NETLIFY", "1",), ("PULL_REQUEST", "TRUE",), ("BRANCH", " ",)],);
        assert!(ci.hosted);
        assert!(ci.pull_request);
        assert!(ci.branch.is_none());
        assert!(!env(&[],).hosted);
    }

    #[test]
    fn pull_request_id_is_extracted()
    {
        assert_eq!(parse_pull_request_id("pull/42/head",).expect("id",), 42);
        assert_eq!(parse_pull_request_id("42",).expect("id",), 42);
        assert!(matches!(parse_pull_request_id("pull/x/head",), Err(Error::Validation { .. })));
    }
}
