//! Model choice extraction from the engine log.

use std::sync::LazyLock;

use permit_model::{ArimaModel, OrderTriple};
use regex::Regex;

use crate::error::{Result, X13Error};

static MODEL_CHOICE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Final automatic model choice\s*:\s*(.*)").expect("Invalid model choice regex")
});

static ORDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(\d+)\s+(\d+)\s+(\d+)\s*\)").expect("Invalid order regex")
});

/// Log phrases deciding whether the chosen model includes a constant.
///
/// The engine has no structured flag for this; the decision rests on its
/// wording, so the phrases are kept in one swappable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeanPhrases {
    /// Present when the mean was tested and dropped.
    pub not_significant: String,
    /// Present when a constant term is in the model.
    pub constant: String,
}

impl Default for MeanPhrases {
    fn default() -> Self {
        Self {
            not_significant: "Mean is not significant".to_string(),
            constant: "Constant".to_string(),
        }
    }
}

impl MeanPhrases {
    pub fn include_mean(&self, log: &str) -> bool {
        if log.contains(&self.not_significant) {
            false
        } else {
            log.contains(&self.constant)
        }
    }
}

/// Parses `(p d q)(P D Q)`; a missing seasonal part is `(0 0 0)`.
pub fn parse_order_notation(notation: &str) -> Result<(OrderTriple, OrderTriple)> {
    let mut triples = ORDER_REGEX.captures_iter(notation).map(|caps| {
        let field = |idx: usize| caps[idx].parse::<u32>();
        match (field(1), field(2), field(3)) {
            (Ok(p), Ok(d), Ok(q)) => Ok(OrderTriple::new(p, d, q)),
            _ => Err(X13Error::ModelNotation(notation.to_string())),
        }
    });
    let order = triples
        .next()
        .ok_or_else(|| X13Error::ModelNotation(notation.to_string()))??;
    let seasonal_order = triples.next().transpose()?.unwrap_or_default();
    Ok((order, seasonal_order))
}

/// Finds the final automatic model choice in an engine log.
pub fn parse_model_choice(log: &str) -> Result<ArimaModel> {
    parse_model_choice_with(log, &MeanPhrases::default())
}

pub fn parse_model_choice_with(log: &str, phrases: &MeanPhrases) -> Result<ArimaModel> {
    let notation = MODEL_CHOICE_REGEX
        .captures(log)
        .and_then(|caps| caps.get(1))
        .ok_or(X13Error::ModelNotFound)?
        .as_str()
        .trim();
    let (order, seasonal_order) = parse_order_notation(notation)?;
    Ok(ArimaModel {
        order,
        seasonal_order,
        include_mean: phrases.include_mean(log),
    })
}
