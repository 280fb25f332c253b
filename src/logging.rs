// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Log level selection for the command-line tools.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum,)]
pub enum LogLevel
{
    /// Progress and warnings only.
    #[default]
    Log,
    /// Additionally prints resolved inputs and the generated playbook.
    Debug,
}

impl LogLevel
{
    /// Filter directive applied when `RUST_LOG` is not set.
    pub fn directive(self,) -> &'static str
    {
        match self {
            Self::Log => "info",
            Self::Debug => "debug",
        }
    }

    /// Builds the subscriber filter, preferring `RUST_LOG` when present.
    pub fn filter(self,) -> EnvFilter
    {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive(),),)
    }
}

/// Installs the stderr subscriber for `level`.
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_logging(level: LogLevel,)
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level.filter(),)
        .with_target(false,)
        .with_writer(std::io::stderr,)
        .try_init();
}
