// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Expansion of the custom AsciiDoc block macros used across the docs.
//!
//! Two constructs are rewritten into passthrough (`++++`) blocks:
//!
//! - `swagger_ui::<spec-url>[]` becomes a Redoc viewer for the OpenAPI
//!   document at `spec-url`. Attribute references such as `{attachmentsdir}`
//!   in the target are resolved from the supplied attributes.
//! - An example block (`====`) preceded by `[home_card, title=..., link=...]`
//!   becomes a landing page card. The block body is discarded.
//!
//! Listing, literal, passthrough and comment blocks are copied untouched.

use std::{collections::BTreeMap, fs, path::Path};

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{self, Error};

/// Document attributes available to macro targets.
pub type Attributes = BTreeMap<String, String,>;

const PASSTHROUGH_DELIMITER: &str = "++++";
const REDOC_FONTS: &str =
    "https://fonts.googleapis.com/css?family=Montserrat:300,400,700|Roboto:300,400,700";
const REDOC_BUNDLE: &str = "https://cdn.jsdelivr.net/npm/redoc@latest/bundles/redoc.standalone.js";

/// Rewrites custom block macros in AsciiDoc sources.
#[derive(Debug, Clone,)]
pub struct MacroExpander
{
    swagger_ui: Regex,
    home_card:  Regex,
    named:      Regex,
    reference:  Regex,
    attributes: Attributes,
}

impl MacroExpander
{
    /// Creates an expander resolving attribute references from `attributes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a macro pattern fails to compile.
    pub fn new(attributes: Attributes,) -> Result<Self, Error,>
    {
        Ok(Self {
            swagger_ui: compile(r"^swagger_ui::([^\[\s]+)\[[^\]]*\]$",)?,
            home_card: compile(r"^\[home_card\s*(?:,(.*))?\]$",)?,
            named: compile(r#"([\w-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^,]*))"#,)?,
            reference: compile(r"\{([\w-]+)\}",)?,
            attributes,
        },)
    }

    /// Returns `source` with every recognized macro expanded.
    ///
    /// A document using CRLF line endings keeps them, including inside the
    /// generated passthrough blocks.
    pub fn expand(&self, source: &str,) -> String
    {
        let lines: Vec<&str,> = source.lines().collect();
        let mut output: Vec<String,> = Vec::with_capacity(lines.len(),);
        let mut verbatim: Option<&str,> = None;
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index];
            let trimmed = line.trim_end();

            if let Some(delimiter,) = verbatim {
                if trimmed == delimiter {
                    verbatim = None;
                }
                output.push(line.to_owned(),);
                index += 1;
                continue;
            }

            if is_verbatim_delimiter(trimmed,) {
                verbatim = Some(trimmed,);
                output.push(line.to_owned(),);
                index += 1;
                continue;
            }

            if let Some(captures,) = self.swagger_ui.captures(trimmed,) {
                let spec_url = self.resolve_references(&captures[1],);
                debug!("Expanding swagger_ui macro for {spec_url}");
                output.push(passthrough(&swagger_ui_html(&spec_url,),),);
                index += 1;
                continue;
            }

            if let Some(captures,) = self.home_card.captures(trimmed,)
                && let Some(delimiter,) = lines
                    .get(index + 1,)
                    .map(|next| next.trim_end(),)
                    .filter(|next| is_example_delimiter(next,),)
            {
                let attributes = self.block_attributes(captures.get(1,).map_or("", |m| m.as_str(),),);
                let title = attributes.get("title",).map_or("", String::as_str,);
                debug!("Expanding home_card block '{title}'");
                output.push(passthrough(&home_card_html(
                    title,
                    attributes.get("link",).map(String::as_str,),
                ),),);

                let body_start = index + 2;
                index = lines[body_start.min(lines.len(),)..]
                    .iter()
                    .position(|body| body.trim_end() == delimiter,)
                    .map_or(lines.len(), |offset| body_start + offset + 1,);
                continue;
            }

            output.push(line.to_owned(),);
            index += 1;
        }

        let newline = if source.contains("\r\n",) { "\r\n" } else { "\n" };
        let mut expanded = output.join("\n",);
        if source.ends_with('\n',) {
            expanded.push('\n',);
        }
        if newline == "\n" { expanded } else { expanded.replace('\n', newline,) }
    }

    fn resolve_references(&self, target: &str,) -> String
    {
        self.reference
            .replace_all(target, |captures: &Captures| {
                self.attributes
                    .get(&captures[1],)
                    .cloned()
                    .unwrap_or_else(|| captures[0].to_owned(),)
            },)
            .into_owned()
    }

    fn block_attributes(&self, list: &str,) -> BTreeMap<String, String,>
    {
        self.named
            .captures_iter(list,)
            .map(|captures| {
                let value = captures
                    .get(2,)
                    .or_else(|| captures.get(3,),)
                    .or_else(|| captures.get(4,),)
                    .map_or("", |m| m.as_str(),);
                (captures[1].to_owned(), value.trim().to_owned(),)
            },)
            .collect()
    }
}

/// Parses a `name=value` attribute passed on the command line.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the pair has no `=` or an empty name.
pub fn parse_attribute(pair: &str,) -> Result<(String, String,), Error,>
{
    let (name, value,) = pair
        .split_once('=',)
        .ok_or_else(|| Error::validation(format!("attribute '{pair}' must have the form name=value"),),)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(format!("attribute '{pair}' has an empty name"),),);
    }
    Ok((name.to_owned(), value.trim().to_owned(),),)
}

/// Expands the macros of `input` and writes the result to `output`,
/// creating parent directories.
///
/// # Errors
///
/// Returns [`Error::Io`] when reading or writing fails.
pub fn expand_file(input: &Path, output: &Path, attributes: Attributes,) -> Result<(), Error,>
{
    let source = fs::read_to_string(input,).map_err(|e| error::io_error(input, e,),)?;
    let expanded = MacroExpander::new(attributes,)?.expand(&source,);

    if let Some(parent,) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent,).map_err(|e| error::io_error(parent, e,),)?;
    }
    fs::write(output, expanded,).map_err(|e| error::io_error(output, e,),)
}

fn compile(pattern: &str,) -> Result<Regex, Error,>
{
    Regex::new(pattern,).map_err(|e| Error::validation(format!("invalid regex: {e}"),),)
}

fn is_delimiter_of(line: &str, marker: char,) -> bool
{
    line.len() >= 4 && line.chars().all(|c| c == marker,)
}

fn is_verbatim_delimiter(line: &str,) -> bool
{
    ['-', '.', '+', '/',].into_iter().any(|marker| is_delimiter_of(line, marker,),)
}

fn is_example_delimiter(line: &str,) -> bool
{
    is_delimiter_of(line, '=',)
}

fn passthrough(html: &str,) -> String
{
    format!("{PASSTHROUGH_DELIMITER}\n{html}\n{PASSTHROUGH_DELIMITER}")
}

fn swagger_ui_html(spec_url: &str,) -> String
{
    format!(
        "<link href=\"{REDOC_FONTS}\" rel=\"stylesheet\">\n\
         <redoc spec-url='{}' disable-search=\"true\"></redoc>\n\
         <script src=\"{REDOC_BUNDLE}\"> </script>",
        escape_html(spec_url)
    )
}

fn home_card_html(title: &str, link: Option<&str,>,) -> String
{
    let title = escape_html(title,);
    let heading = match link.filter(|link| !link.is_empty(),) {
        Some(link,) => format!("<a href=\"{}\">{title}</a>", escape_html(link)),
        None => title,
    };

    format!(
        r#"<div class="card">
  <div class="card-header">
    <i data-feather="server" class="card-img"></i>
    <h4 class="card-title">{heading}</h4>
  </div>
  <ul class="card-list">
    <li class="card-list-item">
      <a href="{{{{{{siteRootPath}}}}}}/hazelcast/5.6/whats-new">What’s new in 5.6</a>
    </li>
    <li class="card-list-item">
      <a href="{{{{{{siteRootPath}}}}}}/hazelcast/latest/deploy/choosing-a-deployment-option">Available topologies</a>
    </li>
    <li class="card-list-item">
      <a href="{{{{{{siteRootPath}}}}}}/hazelcast/latest/getting-started/editions">Community vs. Enterprise</a>
    </li>
    <li class="card-list-item">
      <a href="{{{{{{siteRootPath}}}}}}/hazelcast/latest/deploy/deploying-in-cloud">Cloud deployment</a>
    </li>
  </ul>
</div>"#
    )
}

fn escape_html(value: &str,) -> String
{
    let mut escaped = String::with_capacity(value.len(),);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;",),
            '<' => escaped.push_str("&lt;",),
            '>' => escaped.push_str("&gt;",),
            '"' => escaped.push_str("&quot;",),
            '\'' => escaped.push_str("&#39;",),
            other => escaped.push(other,),
        }
    }
    escaped
}
