//! Command-line interface for the playbook loader.
//!
//! The CLI exposes subcommands for generating the global Antora playbook of a
//! documentation repository, generating the UI preview playbook, checking
//! navigation trees for orphan pages and expanding custom AsciiDoc macros.

use std::{convert::Infallible, io, path::PathBuf, process};

use clap::{ArgAction, Args, Parser, Subcommand};
use playbook_loader::{
    Attributes, CiEnvironment, DEFAULT_BUNDLE_PATH, Error, FailureLevel, GithubRepository,
    GlobalOptions, LoaderPaths, LogLevel, OrphanReport, RetryConfig, check_roots, expand_file,
    init_logging, load_docs_ui_playbook, load_global_playbook, parse_attribute, parse_roots,
    resolve_build_context,
};

/// Command line interface for loading Antora playbooks.
#[derive(Debug, Parser,)]
#[command(name = "playbook-loader", version, about = "Load Antora playbooks for documentation builds")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Build the playbook of a documentation repository from the global one.
    Global(GlobalArgs,),
    /// Build the playbook previewing a local UI bundle.
    #[command(name = "docs-ui")]
    DocsUi(DocsUiArgs,),
    /// Report pages that no navigation file links to.
    Orphans(OrphansArgs,),
    /// Expand custom AsciiDoc block macros into passthrough HTML.
    #[command(name = "expand-macros")]
    ExpandMacros(ExpandMacrosArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `global` subcommand.
struct GlobalArgs
{
    /// Repository being built, in `owner/name` form.
    #[arg(short = 'r', long = "repo", value_name = "OWNER/NAME")]
    repo: Option<String,>,

    /// Branch being built.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    branch: Option<String,>,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Log)]
    log_level: LogLevel,

    /// Drop private repositories from the global content sources.
    #[arg(long = "skip-private-repos", action = ArgAction::SetTrue)]
    skip_private_repos: bool,

    /// Do not download the shared redirects file.
    #[arg(long = "skip-redirects-download", action = ArgAction::SetTrue)]
    skip_redirects_download: bool,

    /// Use the global content sources even if the local playbook declares some.
    #[arg(long = "enforce-global-sources", action = ArgAction::SetTrue)]
    enforce_global_sources: bool,

    /// Token used for GitHub API requests.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `docs-ui` subcommand.
struct DocsUiArgs
{
    /// UI bundle the preview site is built with.
    #[arg(long = "bundle-path", value_name = "PATH", default_value = DEFAULT_BUNDLE_PATH)]
    bundle_path: String,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Log)]
    log_level: LogLevel,

    /// Token used for GitHub API requests.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String,>,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `orphans` subcommand.
struct OrphansArgs
{
    /// Comma separated documentation roots.
    #[arg(short = 'd', long = "directory", value_name = "DIRS", default_value = "docs")]
    directory: String,

    /// `error` makes orphan pages fail the run; any other value only reports.
    #[arg(long = "log-failure-level", value_name = "LEVEL", default_value = "warn", value_parser = parse_failure_level)]
    log_failure_level: FailureLevel,

    /// Print the report as JSON on stdout.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `expand-macros` subcommand.
struct ExpandMacrosArgs
{
    /// AsciiDoc document to expand.
    #[arg(long = "input", value_name = "PATH")]
    input: PathBuf,

    /// Destination of the expanded document.
    #[arg(long = "output", value_name = "PATH")]
    output: PathBuf,

    /// Document attribute available to macro targets, as `name=value`.
    #[arg(long = "attribute", value_name = "NAME=VALUE")]
    attributes: Vec<String,>,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Log)]
    log_level: LogLevel,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    match run().await {
        Ok(code,) => process::exit(code,),
        Err(error,) => {
            eprintln!("{}", error.to_display_string());
            process::exit(1,);
        }
    }
}

/// Executes the CLI using parsed arguments and returns the exit status.
///
/// # Errors
///
/// Propagates errors originating from loading, checking and expansion.
async fn run() -> Result<i32, Error,>
{
    let cli = Cli::parse();

    match cli.command {
        Command::Global(args,) => run_global(args,).await.map(|()| 0,),
        Command::DocsUi(args,) => run_docs_ui(args,).await.map(|()| 0,),
        Command::Orphans(args,) => run_orphans(&args,),
        Command::ExpandMacros(args,) => run_expand_macros(args,).map(|()| 0,),
    }
}

async fn run_global(args: GlobalArgs,) -> Result<(), Error,>
{
    init_logging(args.log_level,);

    let remote = GithubRepository::new(args.github_token.as_deref(), RetryConfig::default(),)?;
    let context = resolve_build_context(
        args.repo.as_deref(),
        args.branch.as_deref(),
        &CiEnvironment::from_env(),
        &remote,
    )
    .await?;

    let options = global_options(&args,);
    load_global_playbook(&remote, &context, &options, &LoaderPaths::default(),).await?;
    Ok((),)
}

fn global_options(args: &GlobalArgs,) -> GlobalOptions
{
    GlobalOptions {
        skip_private_repos:      args.skip_private_repos,
        enforce_global_sources:  args.enforce_global_sources,
        skip_redirects_download: args.skip_redirects_download,
    }
}

async fn run_docs_ui(args: DocsUiArgs,) -> Result<(), Error,>
{
    init_logging(args.log_level,);

    let remote = GithubRepository::new(args.github_token.as_deref(), RetryConfig::default(),)?;
    load_docs_ui_playbook(&remote, &args.bundle_path, &LoaderPaths::default(),).await?;
    Ok((),)
}

fn run_orphans(args: &OrphansArgs,) -> Result<i32, Error,>
{
    init_logging(LogLevel::Log,);

    let roots = parse_roots(&args.directory,);
    let report = check_roots(&roots, args.log_failure_level,)?;
    report.log();

    if args.json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_report(&mut handle, &report,)?;
    }

    Ok(report.exit_code(args.log_failure_level,),)
}

fn parse_failure_level(value: &str,) -> Result<FailureLevel, Infallible,>
{
    Ok(FailureLevel::from_arg(value,),)
}

fn write_report<W: io::Write,>(writer: &mut W, report: &OrphanReport,) -> Result<(), Error,>
{
    serde_json::to_writer_pretty(writer, report,)?;
    Ok((),)
}

fn run_expand_macros(args: ExpandMacrosArgs,) -> Result<(), Error,>
{
    init_logging(args.log_level,);

    let attributes = args
        .attributes
        .iter()
        .map(|pair| parse_attribute(pair,),)
        .collect::<Result<Attributes, Error,>>()?;
    expand_file(&args.input, &args.output, attributes,)
}
