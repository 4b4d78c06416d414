//! Seasonal decomposition results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::series::TimeSeries;

/// Series stored in a decomposition, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Observed,
    SeasonallyAdjusted,
    Trend,
    Seasonal,
    Irregular,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Self::Observed,
        Self::SeasonallyAdjusted,
        Self::Trend,
        Self::Seasonal,
        Self::Irregular,
    ];

    /// Components produced by the engine (everything but the input).
    pub const DERIVED: [Component; 4] = [
        Self::SeasonallyAdjusted,
        Self::Trend,
        Self::Seasonal,
        Self::Irregular,
    ];

    /// Column name in persisted CSV files.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::SeasonallyAdjusted => "seasadj",
            Self::Trend => "trend",
            Self::Seasonal => "seasonal",
            Self::Irregular => "irregular",
        }
    }

    /// X-11 table code the engine saves this component under.
    pub fn table_code(self) -> Option<&'static str> {
        match self {
            Self::Observed => None,
            Self::SeasonallyAdjusted => Some("d11"),
            Self::Trend => Some("d12"),
            Self::Seasonal => Some("d10"),
            Self::Irregular => Some("d13"),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// `(p d q)` orders of an ARIMA polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OrderTriple {
    pub p: u32,
    pub d: u32,
    pub q: u32,
}

impl OrderTriple {
    pub const fn new(p: u32, d: u32, q: u32) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for OrderTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.p, self.d, self.q)
    }
}

/// The model the engine settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArimaModel {
    pub order: OrderTriple,
    pub seasonal_order: OrderTriple,
    pub include_mean: bool,
}

impl fmt::Display for ArimaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.order, self.seasonal_order)
    }
}

/// Parsed output of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Original series name, used for artifact paths.
    pub name: String,
    /// The series as submitted, after trimming and gap filling.
    pub observed: TimeSeries,
    pub seasonally_adjusted: TimeSeries,
    pub trend: TimeSeries,
    pub seasonal: TimeSeries,
    pub irregular: TimeSeries,
    pub model: ArimaModel,
    /// Full results log of the engine.
    pub log: String,
    /// Captured standard output and error of the engine process.
    pub stdout: String,
    /// Control file that was submitted.
    pub spec: String,
}

impl Decomposition {
    pub fn component(&self, component: Component) -> &TimeSeries {
        match component {
            Component::Observed => &self.observed,
            Component::SeasonallyAdjusted => &self.seasonally_adjusted,
            Component::Trend => &self.trend,
            Component::Seasonal => &self.seasonal,
            Component::Irregular => &self.irregular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_derived_component_has_a_table_code() {
        for component in Component::DERIVED {
            assert!(component.table_code().is_some());
        }
        assert_eq!(Component::Observed.table_code(), None);
    }

    #[test]
    fn model_displays_in_engine_notation() {
        let model = ArimaModel {
            order: OrderTriple::new(2, 1, 0),
            seasonal_order: OrderTriple::new(0, 1, 1),
            include_mean: false,
        };
        assert_eq!(model.to_string(), "(2 1 0)(0 1 1)");
    }
}
