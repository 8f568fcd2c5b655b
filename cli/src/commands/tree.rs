use std::time::Instant;

use anyhow::Context;

use crate::commands::BuildArgs;
use crate::terminal::print;

pub async fn tree(hosts: Vec<String>, filters: Vec<String>, json: bool, build: &BuildArgs) -> anyhow::Result<()> {
    let builder = build.tree_builder()?;

    let started = Instant::now();
    let trees = builder
        .build_for_hosts(&hosts, &filters)
        .await
        .context("cannot build device trees")?;

    if json {
        let document = serde_json::to_string_pretty(&trees).context("serializing device trees")?;
        print::print(&document);
    } else {
        print::host_trees(&trees, started.elapsed());
    }
    Ok(())
}
