//! The adjuster seam and its subprocess implementation.

use std::fs;

use permit_model::{Component, Decomposition, NamedSeries, TimeSeries};
use tracing::{debug, info, info_span};

use crate::config::{AdjustmentOptions, EngineConfig};
use crate::error::{Result, X13Error};
use crate::model::{MeanPhrases, parse_model_choice_with};
use crate::output::{engine_diagnostics, read_artifact, read_component, read_optional_artifact};
use crate::preprocess::preprocess;
use crate::runner::{WorkDir, run_engine};
use crate::spec::build_spec;

/// Seasonally adjusts one series.
///
/// Implementations must be usable from several threads at once.
pub trait Adjuster: Send + Sync {
    fn adjust(&self, series: &NamedSeries) -> Result<Decomposition>;
}

/// Runs the X-13ARIMA-SEATS binary once per series.
#[derive(Debug, Clone)]
pub struct X13Engine {
    config: EngineConfig,
    options: AdjustmentOptions,
    mean_phrases: MeanPhrases,
}

impl X13Engine {
    pub fn new(config: EngineConfig, options: AdjustmentOptions) -> Self {
        Self {
            config,
            options,
            mean_phrases: MeanPhrases::default(),
        }
    }

    /// Replaces the log phrases used to detect a constant term.
    #[must_use]
    pub fn with_mean_phrases(mut self, phrases: MeanPhrases) -> Self {
        self.mean_phrases = phrases;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn options(&self) -> &AdjustmentOptions {
        &self.options
    }

    /// The spec that [`Adjuster::adjust`] would submit, without running anything.
    pub fn spec_for(&self, series: &NamedSeries) -> Result<String> {
        Ok(build_spec(&preprocess(series)?, &self.options))
    }
}

impl Adjuster for X13Engine {
    fn adjust(&self, series: &NamedSeries) -> Result<Decomposition> {
        let _span = info_span!("adjust", series = %series.name).entered();
        let input = preprocess(series)?;
        let spec = build_spec(&input, &self.options);

        let work = WorkDir::create(self.config.work_dir.as_deref())?;
        let spec_path = work.artifact("spc");
        fs::write(&spec_path, &spec).map_err(|e| X13Error::io(&spec_path, e))?;
        debug!(dir = %work.path().display(), observations = input.index.len(), "wrote spec");

        let output = run_engine(&self.config.binary, &work.prefix(), self.config.timeout)?;

        if let Some(errors) = read_optional_artifact(&work.artifact("err"))?
            && engine_diagnostics(&errors).is_some()
        {
            return Err(X13Error::Engine(errors));
        }
        if !output.status.success() {
            return Err(X13Error::EngineExit {
                status: output.status.to_string(),
                stderr: output.stderr,
            });
        }

        let log = read_artifact(&work.artifact("out"))?;
        let component = |component: Component| -> Result<TimeSeries> {
            let extension = component.table_code().unwrap_or_default();
            read_component(&work.artifact(extension), component, &input)
        };
        let seasonally_adjusted = component(Component::SeasonallyAdjusted)?;
        let trend = component(Component::Trend)?;
        let seasonal = component(Component::Seasonal)?;
        let irregular = component(Component::Irregular)?;

        let model = parse_model_choice_with(&log, &self.mean_phrases)?;
        info!(%model, include_mean = model.include_mean, "adjusted series");

        let mut stdout = output.stdout;
        if !output.stderr.is_empty() {
            stdout.push_str(&output.stderr);
        }

        Ok(Decomposition {
            name: series.name.clone(),
            observed: TimeSeries::new(series.name.clone(), input.index, input.values),
            seasonally_adjusted,
            trend,
            seasonal,
            irregular,
            model,
            log,
            stdout,
            spec,
        })
    }
}
