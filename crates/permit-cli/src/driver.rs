//! Batch driver: build every domain table, then adjust series one by one.
//!
//! Domain tables are built up front so a schema problem stops the run before
//! any engine time is spent. After that each series stands alone: a failure
//! is written to its error trace and the batch moves on.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use permit_model::{CanonicalTable, Decomposition, NamedSeries};
use permit_output::{
    FailureRecord, ModelRecord, OutputLayout, RunSummary, format_error_chain, read_run_summary,
    write_component_tables, write_decomposition_csv, write_failure_trace, write_run_summary,
};
use permit_transform::{DomainRecipe, build_canonical, extract_series, find_name_collisions};
use permit_x13::{Adjuster, X13Error};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

/// Knobs for [`run_series`].
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Worker threads. `1` runs sequentially on the calling thread.
    pub jobs: usize,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            progress: false,
        }
    }
}

/// What happened to one series.
#[derive(Debug)]
pub enum SeriesOutcome {
    Adjusted(Box<Decomposition>),
    /// Output already on disk from an earlier run.
    Cached,
    Failed(anyhow::Error),
}

/// Result of a whole batch.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub decompositions: Vec<Decomposition>,
    pub component_tables: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.summary.failed.is_empty()
    }
}

/// Builds the canonical table of every domain. The first failure aborts.
pub fn build_tables(domains: &[&DomainRecipe], base_dir: &Path) -> Result<Vec<CanonicalTable>> {
    domains
        .iter()
        .map(|recipe| {
            build_canonical(recipe, base_dir)
                .with_context(|| format!("build domain table {}", recipe.name))
        })
        .collect()
}

/// Every series of every table, in table then column order.
///
/// Fails when different columns map to the same series name, since their
/// outputs would share one file.
pub fn collect_series(tables: &[CanonicalTable]) -> Result<Vec<NamedSeries>> {
    let collisions = find_name_collisions(tables);
    if !collisions.is_empty() {
        let described: Vec<String> = collisions
            .iter()
            .map(|collision| {
                let origins: Vec<String> = collision
                    .origins
                    .iter()
                    .map(|(domain, key)| format!("{domain}:{}", key.join("/")))
                    .collect();
                format!("{} <- {}", collision.name, origins.join(", "))
            })
            .collect();
        bail!("series name collisions:\n  {}", described.join("\n  "));
    }
    Ok(tables.iter().flat_map(extract_series).collect())
}

/// Adjusts one series and persists its decomposition or its failure trace.
pub fn process_series(
    adjuster: &dyn Adjuster,
    series: &NamedSeries,
    layout: &OutputLayout,
) -> SeriesOutcome {
    if layout.is_cached(&series.name) {
        debug!(series = %series.name, "output exists, skipping");
        return SeriesOutcome::Cached;
    }

    let result = adjuster
        .adjust(series)
        .map_err(|error| {
            if matches!(error, X13Error::Engine(_)) {
                warn!(series = %series.name, "engine rejected series");
            }
            anyhow::Error::new(error)
        })
        .and_then(|decomposition| {
            let path = layout.series_csv(&series.name);
            write_decomposition_csv(&decomposition, &path)
                .with_context(|| format!("write {}", path.display()))?;
            Ok(decomposition)
        })
        .with_context(|| format!("adjust series {}", series.name));

    match result {
        Ok(decomposition) => {
            remove_stale_trace(&layout.error_trace(&series.name));
            SeriesOutcome::Adjusted(Box::new(decomposition))
        }
        Err(error) => {
            warn!(series = %series.name, error = %error, "series failed");
            let trace = layout.error_trace(&series.name);
            if let Err(write_error) = write_failure_trace(&trace, error.as_ref()) {
                warn!(path = %trace.display(), error = %write_error, "could not write error trace");
            }
            SeriesOutcome::Failed(error)
        }
    }
}

/// Deletes the trace a failed earlier attempt left behind.
fn remove_stale_trace(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale error trace"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale error trace"),
    }
}

/// Series with a table in the output directory once this run is done: this
/// run's series in run order, then those recorded by earlier runs. Model
/// records from this run replace earlier ones of the same name.
fn output_inventory(
    layout: &OutputLayout,
    series: &[NamedSeries],
    current: &[ModelRecord],
) -> Result<(Vec<String>, Vec<ModelRecord>)> {
    let summary_path = layout.model_summary();
    let earlier = read_run_summary(&summary_path)
        .with_context(|| format!("read earlier model summary {}", summary_path.display()))?
        .map(|summary| summary.adjusted)
        .unwrap_or_default();

    let earlier_names: Vec<String> = earlier.iter().map(|record| record.name.clone()).collect();
    let mut records: HashMap<String, ModelRecord> = earlier
        .into_iter()
        .chain(current.iter().cloned())
        .map(|record| (record.name.clone(), record))
        .collect();

    let mut seen = HashSet::new();
    let names: Vec<String> = series
        .iter()
        .map(|s| s.name.clone())
        .chain(earlier_names)
        .filter(|name| layout.is_cached(name) && seen.insert(name.clone()))
        .collect();
    let models = names.iter().filter_map(|name| records.remove(name)).collect();
    Ok((names, models))
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}

/// Runs every series through `adjuster`, then rebuilds the component tables
/// and `models.json` over everything the output directory holds.
pub fn run_series(
    adjuster: &dyn Adjuster,
    series: &[NamedSeries],
    layout: &OutputLayout,
    options: RunOptions,
) -> Result<RunReport> {
    let span = info_span!("run", series = series.len(), jobs = options.jobs);
    let _guard = span.enter();
    let started = Instant::now();
    layout.ensure_dirs()?;

    let bar = progress_bar(series.len(), options.progress);
    let step = |s: &NamedSeries| {
        bar.set_message(s.name.clone());
        let outcome = process_series(adjuster, s, layout);
        bar.inc(1);
        outcome
    };
    let outcomes: Vec<SeriesOutcome> = if options.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .context("start worker pool")?;
        pool.install(|| series.par_iter().map(step).collect())
    } else {
        series.iter().map(step).collect()
    };
    bar.finish_and_clear();

    let mut summary = RunSummary::default();
    let mut decompositions = Vec::new();
    for (s, outcome) in series.iter().zip(outcomes) {
        match outcome {
            SeriesOutcome::Adjusted(decomposition) => {
                summary
                    .adjusted
                    .push(ModelRecord::from_decomposition(&decomposition));
                decompositions.push(*decomposition);
            }
            SeriesOutcome::Cached => summary.skipped.push(s.name.clone()),
            SeriesOutcome::Failed(error) => summary.failed.push(FailureRecord {
                name: s.name.clone(),
                error: format_error_chain(error.as_ref()),
            }),
        }
    }

    let (names, models) = output_inventory(layout, series, &summary.adjusted)?;
    let component_tables = if names.is_empty() {
        Vec::new()
    } else {
        write_component_tables(layout, &names)?
    };
    let persisted = RunSummary {
        adjusted: models,
        ..summary.clone()
    };
    write_run_summary(&persisted, &layout.model_summary())?;

    info!(
        adjusted = summary.adjusted.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        duration_ms = started.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunReport {
        summary,
        decompositions,
        component_tables,
        output_dir: layout.output_dir.clone(),
    })
}
