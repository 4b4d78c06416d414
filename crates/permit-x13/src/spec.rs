//! Spec file generation.
//!
//! The spec is plain text in the engine's `spec{ key=value }` syntax. Only
//! the specs this workspace needs are emitted: `series`, `transform`,
//! `outlier`, `automdl`, `regression`, `forecast` and `x11`.

use std::fmt::Write;

use chrono::Datelike;

use crate::config::{AdjustmentOptions, Differencing, Regressors};
use crate::preprocess::SeriesInput;

/// X-11 tables saved by every run: seasonal, adjusted, trend, irregular.
pub const SAVED_TABLES: [&str; 4] = ["d10", "d11", "d12", "d13"];

/// Renders the full spec for `input`.
pub fn build_spec(input: &SeriesInput, options: &AdjustmentOptions) -> String {
    let mut spec = series_spec(input);
    let _ = writeln!(spec, "transform{{function={}}}", options.log.function());
    if options.outlier {
        spec.push_str("outlier{}\n");
    }
    spec.push_str(&automdl_spec(options));
    spec.push_str(&regression_spec(options.trading_days, options.regressors.as_ref()));
    if let Some(horizon) = options.forecast_horizon {
        let _ = writeln!(spec, "forecast{{maxlead={horizon}}}");
    }
    let _ = writeln!(spec, "x11{{ save=({}) }}", SAVED_TABLES.join(" "));
    spec
}

fn series_spec(input: &SeriesInput) -> String {
    let start = input.start();
    let mut spec = String::from("series{\n");
    let _ = writeln!(spec, "    title=\"{}\"", input.identifier);
    let _ = writeln!(
        spec,
        "    start={}.{:02}",
        start.year(),
        input.frequency.period_of_year(start)
    );
    let _ = writeln!(spec, "    period={}", input.frequency.periods_per_year());
    spec.push_str("    data=(\n");
    for value in &input.values {
        let _ = writeln!(spec, "        {value}");
    }
    spec.push_str("    )\n");
    let _ = writeln!(spec, "    name=\"{}\"", input.identifier);
    spec.push_str("}\n");
    spec
}

fn automdl_spec(options: &AdjustmentOptions) -> String {
    let (order, seasonal_order) = options.max_order;
    let differencing = match options.differencing {
        Differencing::MaxDiff(regular, seasonal) => format!("maxdiff = ({regular} {seasonal})"),
        Differencing::Fixed(regular, seasonal) => format!("diff = ({regular} {seasonal})"),
    };
    format!("automdl{{\n    maxorder = ({order} {seasonal_order})\n    {differencing}\n}}\n")
}

fn regression_spec(trading_days: bool, regressors: Option<&Regressors>) -> String {
    if !trading_days && regressors.is_none() {
        return String::new();
    }
    let mut spec = String::from("regression{\n");
    if trading_days {
        spec.push_str("    variables = (td)\n");
    }
    if let Some(regressors) = regressors {
        let _ = writeln!(spec, "    user = ({})", regressors.names.join(" "));
        spec.push_str("    data = (\n");
        for row in &regressors.rows {
            let row: Vec<String> = row.iter().map(f64::to_string).collect();
            let _ = writeln!(spec, "        {}", row.join(" "));
        }
        spec.push_str("    )\n");
    }
    spec.push_str("}\n");
    spec
}
