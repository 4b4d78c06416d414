use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;
use permit_model::Frequency;
use permit_output::{aggregate_artifacts, load_order_list};
use permit_x13::X13Engine;
use tracing::{info, info_span};

use permit_cli::config::RunConfig;
use permit_cli::driver::{RunOptions, RunReport, build_tables, collect_series, run_series};
use permit_transform::{extract_series, find_name_collisions};

use crate::cli::{AggregateArgs, RunArgs, SeriesArgs};
use crate::summary::apply_table_style;

pub fn run_adjust(args: &RunArgs) -> Result<RunReport> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(binary) = &args.binary {
        config.engine.binary.clone_from(binary);
    }
    let mut layout = config.layout();
    if let Some(dir) = &args.output_dir {
        layout.output_dir.clone_from(dir);
    }
    if let Some(dir) = &args.errors_dir {
        layout.errors_dir.clone_from(dir);
    }

    let domains = config.select_domains(&args.domains)?;
    let tables = build_tables(&domains, &config.base_dir)?;
    let series = collect_series(&tables)?;
    info!(domains = tables.len(), series = series.len(), "domain tables built");

    let engine = X13Engine::new(config.engine_config(), config.adjustment.clone());
    run_series(
        &engine,
        &series,
        &layout,
        RunOptions {
            jobs: args.jobs.max(1),
            progress: !args.no_progress,
        },
    )
}

pub fn run_list_series(args: &SeriesArgs) -> Result<()> {
    let config = RunConfig::load(&args.config)?;
    let domains = config.select_domains(&args.domains)?;
    let tables = build_tables(&domains, &config.base_dir)?;

    let mut table = Table::new();
    table.set_header(vec!["Domain", "Series", "Observed", "Periods"]);
    apply_table_style(&mut table);
    for series in tables.iter().flat_map(extract_series) {
        let periods = match (series.index.first(), series.index.last()) {
            (Some(first), Some(last)) => format!("{}..{}", first.format("%Y-%m"), last.format("%Y-%m")),
            _ => "-".to_string(),
        };
        let observed = series.observed_count();
        table.add_row(vec![series.domain, series.name, observed.to_string(), periods]);
    }
    println!("{table}");

    let collisions = find_name_collisions(&tables);
    if !collisions.is_empty() {
        eprintln!("Name collisions:");
        for collision in collisions {
            eprintln!("- {} ({} columns)", collision.name, collision.origins.len());
        }
    }
    Ok(())
}

pub fn run_aggregate(args: &AggregateArgs) -> Result<PathBuf> {
    let _span = info_span!("aggregate", dir = %args.dir.display()).entered();
    let frequency: Frequency = args.frequency.into();
    let extension = args.extension.trim_start_matches('.');
    let order = load_order_list(&args.order)
        .with_context(|| format!("read order list {}", args.order.display()))?;
    let frame = aggregate_artifacts(&args.dir, extension, frequency, &order)
        .with_context(|| format!("aggregate *.{extension} in {}", args.dir.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("x13results_{extension}.csv")));
    frame
        .write_csv(&output)
        .with_context(|| format!("write {}", output.display()))?;
    Ok(output)
}
