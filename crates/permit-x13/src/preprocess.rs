//! Preparing a named series for submission.

use chrono::NaiveDate;
use permit_model::{Frequency, NamedSeries};
use tracing::debug;

use crate::error::{Result, X13Error};
use crate::romanize::ascii_identifier;

/// A gap-free series ready to be written into a spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInput {
    /// Original series name.
    pub name: String,
    /// ASCII name used inside the spec.
    pub identifier: String,
    pub frequency: Frequency,
    pub index: Vec<NaiveDate>,
    pub values: Vec<f64>,
    /// Interior gaps that were filled with zero.
    pub filled: usize,
}

impl SeriesInput {
    pub fn start(&self) -> NaiveDate {
        self.index[0]
    }
}

/// Trims leading and trailing gaps and fills interior gaps with zero.
///
/// The zero fill treats a missing month as "no permits", which is a modeling
/// choice rather than an imputation; the count of filled cells is logged.
pub fn preprocess(series: &NamedSeries) -> Result<SeriesInput> {
    let first = series.values.iter().position(Option::is_some);
    let last = series.values.iter().rposition(Option::is_some);
    let (Some(first), Some(last)) = (first, last) else {
        return Err(X13Error::EmptySeries {
            name: series.name.clone(),
        });
    };

    let index = series.index[first..=last].to_vec();
    let mut filled = 0;
    let values = series.values[first..=last]
        .iter()
        .map(|value| {
            value.unwrap_or_else(|| {
                filled += 1;
                0.0
            })
        })
        .collect();

    let frequency = Frequency::infer(&index).ok_or_else(|| X13Error::IrregularIndex {
        name: series.name.clone(),
    })?;

    if filled > 0 {
        debug!(series = %series.name, filled, "filled interior gaps with zero");
    }

    Ok(SeriesInput {
        name: series.name.clone(),
        identifier: ascii_identifier(&series.name),
        frequency,
        index,
        values,
        filled,
    })
}
