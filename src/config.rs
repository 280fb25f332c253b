//! Playbook document types consumed and produced by the loaders.
//!
//! The types mirror the subset of the Antora playbook schema that the merge
//! and reconciliation logic reads. Every section keeps the keys it does not
//! model in a pass-through mapping so that unknown settings survive a
//! parse/serialize cycle untouched.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{self, Error};

/// A YAML field that accepts either a single string or a list of strings.
///
/// The variant is preserved on serialization, so a scalar stays a scalar.
/// Consumers that only need the values use [`OneOrMany::iter`].
///
/// # Examples
///
/// ```
/// use playbook_loader::OneOrMany;
///
/// let mut branches = OneOrMany::from("main",);
/// branches.push("!main",);
/// assert_eq!(branches, OneOrMany::Many(vec!["main".to_owned(), "!main".to_owned()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(untagged)]
pub enum OneOrMany
{
    /// A single scalar value.
    Single(String,),
    /// An ordered list of values.
    Many(Vec<String,>,),
}

impl OneOrMany
{
    /// Iterates over the contained values in declaration order.
    pub fn iter(&self,) -> std::slice::Iter<'_, String,>
    {
        match self {
            Self::Single(value,) => std::slice::from_ref(value,).iter(),
            Self::Many(values,) => values.iter(),
        }
    }

    /// Appends a value, promoting a scalar to a two-element list.
    pub fn push<V,>(&mut self, value: V,)
    where
        V: Into<String,>,
    {
        match self {
            Self::Single(first,) => {
                let first = std::mem::take(first,);
                *self = Self::Many(vec![first, value.into()],);
            }
            Self::Many(values,) => values.push(value.into(),),
        }
    }

    /// Returns the number of contained values.
    pub fn len(&self,) -> usize
    {
        match self {
            Self::Single(_,) => 1,
            Self::Many(values,) => values.len(),
        }
    }

    /// Returns `true` when the list variant holds no values.
    pub fn is_empty(&self,) -> bool
    {
        self.len() == 0
    }
}

impl From<&str,> for OneOrMany
{
    fn from(value: &str,) -> Self
    {
        Self::Single(value.to_owned(),)
    }
}

impl From<Vec<String,>,> for OneOrMany
{
    fn from(values: Vec<String,>,) -> Self
    {
        Self::Many(values,)
    }
}

/// One repository contribution to the aggregated documentation build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct ContentSource
{
    /// Remote repository URL, or `.` for the repository being built.
    pub url:         String,
    /// Branch glob pattern(s); a leading `!` excludes matching branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches:    Option<OneOrMany,>,
    /// Directory holding the component descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_path:  Option<String,>,
    /// Directories (or a glob) holding component descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_paths: Option<OneOrMany,>,
    /// Remaining descriptor keys such as `tags` or `edit_url`.
    #[serde(flatten)]
    pub extra:       Mapping,
}

impl ContentSource
{
    /// Creates a descriptor with the given URL and branch patterns.
    pub fn new<U,>(url: U, branches: Option<OneOrMany,>,) -> Self
    where
        U: Into<String,>,
    {
        Self {
            url: url.into(),
            branches,
            start_path: None,
            start_paths: None,
            extra: Mapping::new(),
        }
    }
}

/// The `site` section; `keys` is merged one level deeper than the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Site
{
    /// Site keys such as analytics or search credentials.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub keys:   Mapping,
    /// Every other site setting (`title`, `url`, `start_page`, ...).
    #[serde(flatten)]
    pub fields: Mapping,
}

/// The `content` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Content
{
    /// Ordered content sources.
    #[serde(default)]
    pub sources: Vec<ContentSource,>,
    /// Remaining content settings (`branches`, `edit_url`, ...).
    #[serde(flatten)]
    pub extra:   Mapping,
}

/// The `ui` section; `bundle` is merged one level deep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Ui
{
    /// UI bundle settings (`url`, `snapshot`, ...).
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub bundle: Mapping,
    /// Every other UI setting.
    #[serde(flatten)]
    pub fields: Mapping,
}

/// The `antora` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Antora
{
    /// Registered Antora extensions (strings or mappings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Value,>,>,
    /// Remaining Antora settings.
    #[serde(flatten)]
    pub extra:      Mapping,
}

/// The `asciidoc` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Asciidoc
{
    /// Document attributes shared by every page.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub attributes: Mapping,
    /// Registered Asciidoctor extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Value,>,>,
    /// Remaining AsciiDoc settings.
    #[serde(flatten)]
    pub extra:      Mapping,
}

/// Typed playbook document.
///
/// # Examples
///
/// ```
/// use playbook_loader::parse_playbook;
///
/// let yaml = r#"
/// site:
///   title: Documentation
/// content:
///   sources:
///     - url: .
///       branches: HEAD
/// "#;
/// let playbook = parse_playbook(yaml,).expect("valid playbook",);
/// assert_eq!(playbook.sources().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize,)]
pub struct Playbook
{
    /// Site metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site:     Option<Site,>,
    /// Content sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content:  Option<Content,>,
    /// UI settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui:       Option<Ui,>,
    /// Antora runtime extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antora:   Option<Antora,>,
    /// AsciiDoc attributes and extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asciidoc: Option<Asciidoc,>,
    /// Top-level keys outside the merged set (`output`, `runtime`, ...).
    #[serde(flatten)]
    pub extra:    Mapping,
}

impl Playbook
{
    /// Returns the declared content sources, or an empty slice.
    pub fn sources(&self,) -> &[ContentSource]
    {
        self.content.as_ref().map_or(&[], |content| content.sources.as_slice(),)
    }

    /// Returns the local content sources when the document declares any.
    pub fn declared_sources(&self,) -> Option<&[ContentSource],>
    {
        self.content
            .as_ref()
            .map(|content| content.sources.as_slice(),)
            .filter(|sources| !sources.is_empty(),)
    }

    /// Checks the invariants every global playbook satisfies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the document has no content sources or
    /// a source has a blank URL.
    pub fn validate_global(&self,) -> Result<(), Error,>
    {
        let sources = self.sources();
        if sources.is_empty() {
            return Err(Error::schema("global playbook must declare content.sources",),);
        }
        validate_sources(sources,)
    }

    /// Serializes the playbook into a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Emit`] when serialization fails.
    pub fn to_yaml(&self,) -> Result<String, Error,>
    {
        serde_yaml::to_string(self,).map_err(Error::emit,)
    }
}

fn validate_sources(sources: &[ContentSource],) -> Result<(), Error,>
{
    for (index, source,) in sources.iter().enumerate() {
        if source.url.trim().is_empty() {
            return Err(Error::schema(format!("content.sources[{index}].url cannot be empty"),),);
        }
        if let Some(branches,) = source.branches.as_ref()
            && branches.iter().any(|branch| branch.trim().is_empty(),)
        {
            return Err(Error::schema(format!(
                "content.sources[{index}].branches cannot contain empty patterns"
            ),),);
        }
    }
    Ok((),)
}

/// Parses a playbook from a YAML document string.
///
/// An empty document yields an empty playbook.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the YAML is malformed or a section has the
/// wrong shape, and [`Error::Schema`] when a content source is invalid.
pub fn parse_playbook(contents: &str,) -> Result<Playbook, Error,>
{
    if contents.trim().is_empty() {
        return Ok(Playbook::default(),);
    }

    let playbook: Playbook = serde_yaml::from_str(contents,)?;
    validate_sources(playbook.sources(),)?;
    Ok(playbook,)
}

/// Loads a playbook from the provided file path.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and propagates
/// [`parse_playbook`] errors.
pub fn load_playbook(path: &Path,) -> Result<Playbook, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_playbook(&contents,)
}
