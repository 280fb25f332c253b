// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Global/local playbook merging.
//!
//! The global document is the base. The local document overrides `site`
//! (with `site.keys` one level deeper), `ui.bundle`, `asciidoc.attributes`
//! and the two extension lists; the content source list is supplied by the
//! caller. Every other key comes from the global document only.

use serde_yaml::{Mapping, Value};

use crate::config::{Antora, Asciidoc, ContentSource, Playbook, Site, Ui};

/// Merges `local` over `global` and installs `sources` as the content list.
///
/// # Examples
///
/// ```
/// use playbook_loader::{merge_playbooks, parse_playbook};
///
/// let global = parse_playbook("asciidoc:\n  attributes:\n    a: 1\n    b: 2\n",)?;
/// let local = parse_playbook("asciidoc:\n  attributes:\n    b: 3\n    c: 4\n",)?;
/// let merged = merge_playbooks(global, &local, Vec::new(),);
/// let attributes = &merged.asciidoc.expect("asciidoc section",).attributes;
/// assert_eq!(attributes.len(), 3);
/// assert_eq!(attributes["b"], serde_yaml::Value::from(3));
/// # Ok::<(), playbook_loader::Error>(())
/// ```
pub fn merge_playbooks(global: Playbook, local: &Playbook, sources: Vec<ContentSource,>,) -> Playbook
{
    let mut content = global.content.unwrap_or_default();
    content.sources = sources;

    Playbook {
        site:     merge_site(global.site, local.site.as_ref(),),
        content:  Some(content,),
        ui:       merge_ui(global.ui, local.ui.as_ref(),),
        antora:   merge_antora(global.antora, local.antora.as_ref(),),
        asciidoc: merge_asciidoc(global.asciidoc, local.asciidoc.as_ref(),),
        extra:    global.extra,
    }
}

fn merge_site(global: Option<Site,>, local: Option<&Site,>,) -> Option<Site,>
{
    if global.is_none() && local.is_none() {
        return None;
    }

    let mut merged = global.unwrap_or_default();
    if let Some(local,) = local {
        overlay(&mut merged.fields, &local.fields,);
        overlay(&mut merged.keys, &local.keys,);
    }
    Some(merged,)
}

fn merge_ui(global: Option<Ui,>, local: Option<&Ui,>,) -> Option<Ui,>
{
    if global.is_none() && local.is_none() {
        return None;
    }

    let mut merged = global.unwrap_or_default();
    if let Some(local,) = local {
        overlay(&mut merged.bundle, &local.bundle,);
    }
    Some(merged,)
}

fn merge_antora(global: Option<Antora,>, local: Option<&Antora,>,) -> Option<Antora,>
{
    if global.is_none() && local.is_none() {
        return None;
    }

    let mut merged = global.unwrap_or_default();
    merged.extensions =
        pick_extensions(local.and_then(|local| local.extensions.as_ref(),), merged.extensions,);
    Some(merged,)
}

fn merge_asciidoc(global: Option<Asciidoc,>, local: Option<&Asciidoc,>,) -> Option<Asciidoc,>
{
    if global.is_none() && local.is_none() {
        return None;
    }

    let mut merged = global.unwrap_or_default();
    if let Some(local,) = local {
        overlay(&mut merged.attributes, &local.attributes,);
    }
    merged.extensions =
        pick_extensions(local.and_then(|local| local.extensions.as_ref(),), merged.extensions,);
    Some(merged,)
}

/// Local extensions replace the global list unless they are absent or empty.
fn pick_extensions(
    local: Option<&Vec<Value,>,>,
    global: Option<Vec<Value,>,>,
) -> Option<Vec<Value,>,>
{
    match local {
        Some(extensions,) if !extensions.is_empty() => Some(extensions.clone(),),
        _ => global,
    }
}

/// Inserts every entry of `overrides` into `base`; existing keys keep their
/// position.
fn overlay(base: &mut Mapping, overrides: &Mapping,)
{
    for (key, value,) in overrides {
        base.insert(key.clone(), value.clone(),);
    }
}
