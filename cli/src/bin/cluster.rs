/*
 * This file is a part of the tracecache project.
*/

use clap::Parser;
use env_logger::Builder;
use serde::Serialize;
use std::{env, fs, process};
use tracecache_cli::config::{CacheMode, Cli, ClusterArgs, Command};
use tracecache_cli::error::{CResult, Error};
use tracecache_cli::lookup_table::{read_cardinalities, read_lookup_table, size_from_cardinality};
use tracecache_cli::report::ClusterReport;
use tracecache_cli::stopwatch::timed;
use tracecache_cli::trace::read_cluster_queries;
use tracecache_core::cluster::ClusterSimulator;
use tracecache_core::cluster_cache::ClusterCache;
use tracecache_core::sharding::Sharding;

#[macro_use]
extern crate log;

fn main() {
    Builder::new()
        .parse_filters(&env::var("TRACECACHE_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();
    if let Err(e) = run() {
        error!("tracecache-cluster exited with error: {e}");
        process::exit(0x01);
    }
}

fn run() -> CResult<()> {
    let cli = Cli::parse();
    let args = match cli.command {
        Command::Cluster(args) => args,
        Command::Hrc(_) => {
            return Err(Error::config(
                "tracecache-cluster only accepts the `cluster` subcommand",
            ))
        }
    };

    if args.n_processors.is_empty() {
        return Err(Error::config("--n-processors must name at least one processor count"));
    }

    let cardinalities = timed("read cardinalities", || read_cardinalities(&args.counts))?;
    let tables = cardinalities.len();
    let sizes: Vec<usize> = cardinalities
        .iter()
        .map(|&c| size_from_cardinality(c, args.min_size, args.rel_size) as usize)
        .collect();
    info!("derived per-table cache sizes: {sizes:?}");

    let queries = timed("read queries", || read_cluster_queries(&args.queries, None))?;
    info!("loaded {} queries across {tables} table(s)", queries.len());
    if let Some(row) = queries.iter().find(|row| row.len() != tables) {
        return Err(Error::config(format!(
            "query row has {} feature(s) but the cardinalities file names {tables} table(s)",
            row.len()
        )));
    }

    let lookup_tables = args
        .lookup_table
        .as_ref()
        .map(|p| read_lookup_table(p))
        .transpose()?;
    let sharding_mode = if lookup_tables.is_some() { "table" } else { "by_modulo" };

    let mut all_results = Vec::new();
    for &processors in &args.n_processors {
        let sharding = match &lookup_tables {
            Some(tables) => Sharding::from_tables(tables.clone()),
            None => Sharding::by_modulo(processors),
        };

        let mut cache = match args.cache_mode {
            CacheMode::Private => ClusterCache::private(processors, &sizes),
            CacheMode::Shared => ClusterCache::shared(processors, &sizes),
        };

        let results = timed(&format!("simulate {processors} processor(s)"), || {
            let mut sim = ClusterSimulator::new(processors, tables, &sharding, Some(&mut cache), args.seed);
            sim.run(&queries)
        });
        all_results.push(results);
    }

    let aggregate: u64 = sizes.iter().map(|&s| s as u64).sum();
    let cache_mode = args.cache_mode.to_string();
    let sharding_file = args.lookup_table.as_ref().and_then(|p| p.to_str());
    let reports: Vec<ClusterReport> = all_results
        .iter()
        .map(|results| {
            ClusterReport::from_results(
                results,
                "lfu",
                &cache_mode,
                sharding_mode,
                sharding_file,
                &args.sharding_name,
                Some((args.min_size, args.rel_size, aggregate, &sizes)),
            )
        })
        .collect();

    write_reports(&args, &reports)
}

#[derive(Serialize)]
struct RunReports<'a> {
    runs: &'a [ClusterReport<'a>],
}

fn write_reports(args: &ClusterArgs, reports: &[ClusterReport]) -> CResult<()> {
    let json = serde_json::to_string_pretty(&RunReports { runs: reports })
        .expect("cluster reports are always representable as JSON");
    fs::write(&args.out, json)?;
    info!("wrote {} run(s) to {:?}", reports.len(), args.out);
    Ok(())
}
