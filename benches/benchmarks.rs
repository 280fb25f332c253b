// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use playbook_loader::{
    ContentSource, OneOrMany, Playbook, VersionGuard, merge_playbooks, parse_playbook,
    reconcile_sources,
};

struct SilentGuard;

impl VersionGuard for SilentGuard
{
    fn on_unmatched_branch(&self, _branch: &str,) {}
}

fn global_playbook(repositories: usize,) -> Playbook
{
    let mut yaml = String::from(
        "site:\n  title: Docs\n  keys:\n    docsearch_id: ABC\ncontent:\n  sources:\n    - url: .\n      branches: HEAD\n",
    );
    for index in 0..repositories {
        yaml.push_str(&format!(
            "    - url: https://github.com/hazelcast/repo-{index}\n      branches: [main, v/5.*, v/4.*]\n      start_path: docs\n"
        ),);
    }
    yaml.push_str("antora:\n  extensions: ['@antora/lunr-extension']\nasciidoc:\n  attributes:\n    page-toclevels: 3\n",);
    parse_playbook(&yaml,).expect("parse failed",)
}

fn benchmark_reconcile_sources(c: &mut Criterion,)
{
    let global = global_playbook(50,);
    let sources: Vec<ContentSource,> = global.sources().to_vec();

    c.bench_function("reconcile_sources_matched", |b| {
        b.iter(|| {
            reconcile_sources(
                black_box(sources.clone(),),
                black_box("hazelcast/repo-42",),
                black_box("v/5.6",),
                &SilentGuard,
            )
            .expect("reconcile failed",)
        },)
    },);

    c.bench_function("reconcile_sources_fallback", |b| {
        b.iter(|| {
            reconcile_sources(
                black_box(sources.clone(),),
                black_box("hazelcast/repo-42",),
                black_box("feature/unmatched",),
                &SilentGuard,
            )
            .expect("reconcile failed",)
        },)
    },);
}

fn benchmark_merge_playbooks(c: &mut Criterion,)
{
    let global = global_playbook(50,);
    let local = parse_playbook(
        "site:\n  title: Platform\nasciidoc:\n  attributes:\n    full-version: 5.6.0\n",
    )
    .expect("parse failed",);
    let mut sources = global.sources().to_vec();
    sources.insert(0, ContentSource::new(".", Some(OneOrMany::from("HEAD",),),),);

    c.bench_function("merge_playbooks", |b| {
        b.iter(|| merge_playbooks(black_box(global.clone(),), black_box(&local,), sources.clone(),),)
    },);
}

criterion_group!(benches, benchmark_reconcile_sources, benchmark_merge_playbooks);
criterion_main!(benches);
