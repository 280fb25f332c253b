// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Access to the repository hosting the global playbook.
//!
//! The loaders only need two remote operations: reading a file from the
//! canonical docs repository and looking up the base branch of a pull request.
//! Both sit behind [`RemoteRepository`] so the pipelines can run against an
//! in-memory double in tests.

use std::{future::Future, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use octocrab::Octocrab;
use tracing::debug;

use crate::{
    error::Error,
    retry::{RetryConfig, retry_with_backoff},
};

/// Owner of the canonical docs repository.
pub const DOCS_REPO_OWNER: &str = "hazelcast";
/// Name of the canonical docs repository.
pub const DOCS_REPO_NAME: &str = "hazelcast-docs";
/// Path of the global playbook inside the docs repository.
pub const GLOBAL_PLAYBOOK_PATH: &str = "antora-playbook.yml";
/// Path of the shared redirects file inside the docs repository.
pub const REDIRECTS_PATH: &str = "_redirects";

/// Remote operations used by the loaders.
pub trait RemoteRepository
{
    /// Fetches the decoded contents of `path` from the docs repository.
    fn fetch_file(&self, path: &str,) -> impl Future<Output = Result<String, Error,>,>;

    /// Returns the base branch of pull request `number` in `repository`
    /// (`owner/name`).
    fn pull_request_base(
        &self,
        repository: &str,
        number: u64,
    ) -> impl Future<Output = Result<String, Error,>,>;
}

/// [`RemoteRepository`] backed by the GitHub REST API.
#[derive(Debug, Clone,)]
pub struct GithubRepository
{
    client: Octocrab,
    owner:  String,
    name:   String,
    retry:  RetryConfig,
}

impl GithubRepository
{
    /// Creates a client for the canonical docs repository.
    ///
    /// Requests are anonymous unless a `token` is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] when the HTTP client cannot be initialized.
    pub fn new(token: Option<&str,>, retry: RetryConfig,) -> Result<Self, Error,>
    {
        let builder = Octocrab::builder();
        let client = match token.map(str::trim,).filter(|token| !token.is_empty(),) {
            Some(token,) => builder.personal_token(token,).build(),
            None => builder.build(),
        }
        .map_err(|e| Error::remote(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self::with_client(client, DOCS_REPO_OWNER, DOCS_REPO_NAME, retry,),)
    }

    /// Wraps an existing client pointed at `owner/name`.
    pub fn with_client(client: Octocrab, owner: &str, name: &str, retry: RetryConfig,) -> Self
    {
        Self {
            client,
            owner: owner.to_owned(),
            name: name.to_owned(),
            retry,
        }
    }
}

impl RemoteRepository for GithubRepository
{
    async fn fetch_file(&self, path: &str,) -> Result<String, Error,>
    {
        let pb = spinner(format!("Fetching {}/{}/{path}...", self.owner, self.name),);
        debug!("Fetching {path} from {}/{}", self.owner, self.name);

        let items = retry_with_backoff(&self.retry, &format!("fetch {path}"), move || async move {
            self.client
                .repos(&self.owner, &self.name,)
                .get_content()
                .path(path,)
                .send()
                .await
                .map_err(|e| {
                    Error::remote(format!(
                        "failed to fetch {path} from {}/{}: {e}",
                        self.owner, self.name
                    ),)
                },)
        },)
        .await;
        pb.finish_and_clear();

        let content = items?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::remote(format!("{path} was not found in {}/{}", self.owner, self.name),)
            },)?;

        content
            .decoded_content()
            .ok_or_else(|| Error::remote(format!("{path} has no decodable content"),),)
    }

    async fn pull_request_base(&self, repository: &str, number: u64,) -> Result<String, Error,>
    {
        let (owner, name,) = repository.split_once('/',).ok_or_else(|| {
            Error::validation(format!("repository '{repository}' must have the form owner/name"),)
        },)?;

        debug!("Fetching base branch of {repository}#{number}");
        let operation = format!("fetch {repository}#{number}");
        let pull = retry_with_backoff(&self.retry, &operation, move || async move {
            self.client.pulls(owner, name,).get(number,).await.map_err(|e| {
                Error::remote(format!("failed to fetch pull request {repository}#{number}: {e}"),)
            },)
        },)
        .await?;

        Ok(pull.base.ref_field,)
    }
}

fn spinner(message: String,) -> ProgressBar
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );
    pb.enable_steady_tick(Duration::from_millis(120,),);
    pb.set_message(message,);
    pb
}
