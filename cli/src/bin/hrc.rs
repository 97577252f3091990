/*
 * This file is a part of the tracecache project.
*/

use clap::Parser;
use env_logger::Builder;
use std::{env, fs, process};
use tracecache_cli::config::{Cli, Command, HrcArgs};
use tracecache_cli::error::{CResult, Error};
use tracecache_cli::report::{self, ComparisonRow, LruRow};
use tracecache_cli::stopwatch::timed;
use tracecache_cli::trace::{self, HrcTraceOptions, Key};
use tracecache_core::{lfu, lru, opt};

#[macro_use]
extern crate log;

fn main() {
    Builder::new()
        .parse_filters(&env::var("TRACECACHE_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();
    if let Err(e) = run() {
        error!("tracecache-hrc exited with error: {e}");
        process::exit(0x01);
    }
}

fn run() -> CResult<()> {
    let cli = Cli::parse();
    let args = match cli.command {
        Command::Hrc(args) => args,
        Command::Cluster(_) => {
            return Err(Error::config("tracecache-hrc only accepts the `hrc` subcommand"))
        }
    };

    let opts = HrcTraceOptions {
        separator: args.sep,
        columns: args.columns.clone(),
        max_rows: args.max_rows,
    };
    let columns = timed("parse trace", || trace::read_hrc_trace(&args.trace, &opts))?;
    info!("parsed {} column(s) from {:?}", columns.len(), args.trace);

    fs::create_dir_all(&args.out_dir)?;

    for (i, column) in columns.iter().enumerate() {
        timed(&format!("simulate column {i}"), || {
            process_column(i, column, &args)
        })?;
    }

    Ok(())
}

fn process_column(index: usize, column: &[Key], args: &HrcArgs) -> CResult<()> {
    let distinct = lru::distinct_count(column);
    let mut engine = lru::LruEngine::with_seed(tracecache_cli::config::DEFAULT_SEED);
    let distances = engine.distances(column);
    let curve = lru::hitrate_curve(&distances);

    if !args.relative.is_empty() {
        for (pct, size, rate) in lru::hitrates_relative(&curve, distinct, &args.relative) {
            info!("column {index}: {:.1}% of {distinct} distinct keys (size {size}) -> hitrate {rate:.5}");
        }
    }

    let path = args.out_dir.join(format!("column_{index}.csv"));

    if args.sizes.is_empty() {
        let rows: Vec<LruRow> = curve
            .iter()
            .map(|(&size, &hitrate)| LruRow { size, hitrate })
            .collect();
        report::write_lru_only_csv(&path, &rows)?;
    } else {
        let rows: Vec<ComparisonRow> = args
            .sizes
            .iter()
            .map(|&size| ComparisonRow {
                cache_size: size,
                cache_size_relative: if distinct == 0 {
                    0.0
                } else {
                    size as f64 / distinct as f64
                },
                hitrate_lru: lru::hitrate_at(&curve, size),
                hitrate_lfu: lfu::hitrate(column, size),
                hitrate_opt: opt::hitrate(column, size),
            })
            .collect();
        report::write_comparison_csv(&path, &rows)?;
    }

    Ok(())
}
