#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the playbook loader crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the loaders, checkers and the CLI.
///
/// Configuration problems (missing build context, unknown repository, missing
/// root marker) are fatal and surface before any output file is written.
/// Remote failures are reported through [`Error::Remote`].
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading or writing files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse YAML document: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps YAML encoding errors when writing documents.
    #[error("failed to serialize YAML document: {source}")]
    Emit {
        /// Source encoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when a playbook document does not match the expected shape.
    #[error("invalid playbook: {message}")]
    Schema {
        /// Human readable message describing the schema problem.
        message: String
    },
    /// Returned when user input violates invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Returned when no content source refers to the repository being built.
    #[error("There is no repository {repository} among the playbook sources!")]
    RepositoryNotFound {
        /// Repository name in `owner/name` form.
        repository: String
    },
    /// Returned when the global playbook lacks the `url: .` source entry.
    #[error("the global playbook has no content source with url '.'")]
    MissingRootMarker,
    /// Returned when neither flags nor the CI environment name a repo/branch.
    #[error("`repo` and `branch` must be specified!")]
    MissingBuildContext,
    /// Errors reported by the hosted repository API.
    #[error("remote request failed: {message}")]
    Remote {
        /// Human readable message describing the remote failure.
        message: String
    },
    /// Wraps serialization errors when writing output documents.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Wraps a YAML encoding failure.
    pub fn emit(source: serde_yaml::Error) -> Self {
        Self::Emit {
            source
        }
    }

    /// Constructs a schema error from the provided displayable value.
    pub fn schema<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Schema {
            message: message.into()
        }
    }

    /// Constructs a remote error from the provided displayable value.
    pub fn remote<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Remote {
            message: message.into()
        }
    }

    /// Returns `true` for failures a repeated request may not hit again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        Self::Remote {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::remote("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn emit_errors_describe_a_write() {
        let source = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let error = Error::emit(source);
        assert!(matches!(error, Error::Emit { .. }));
        assert!(error.to_display_string().starts_with("failed to serialize YAML document"));
    }

    #[test]
    fn only_remote_failures_are_retryable() {
        assert!(Error::remote("502 Bad Gateway").is_retryable());
        assert!(!Error::MissingRootMarker.is_retryable());
        assert!(!Error::schema("global playbook must declare content.sources").is_retryable());
    }

    #[test]
    fn missing_build_context_names_both_flags() {
        assert_eq!(
            Error::MissingBuildContext.to_display_string(),
            "`repo` and `branch` must be specified!"
        );
    }

    #[test]
    fn repository_not_found_names_the_repository() {
        let error = Error::RepositoryNotFound {
            repository: "hazelcast/imdg-docs".to_owned()
        };
        assert_eq!(
            error.to_display_string(),
            "There is no repository hazelcast/imdg-docs among the playbook sources!"
        );
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/antora-playbook.yml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }
}
