//! Declarative per-domain normalization recipes.
//!
//! A recipe names the source files of a domain and the reshaping steps that
//! bring them to canonical form. Recipes are plain data, deserialized from
//! the run configuration:
//!
//! ```toml
//! [[domains]]
//! name = "use6"
//! levels = ["value", "use6"]
//!
//! [[domains.groups]]
//! sources = [{ path = "data/use6_2001.csv", encoding = "cp949", header = [0, 1, 2], index_columns = [0, 1], date_column = 1 }]
//! steps = [{ kind = "drop_index_level", level = 0 }, { kind = "drop_column_level", level = 1 }]
//! ```

use std::collections::BTreeMap;

use permit_ingest::SourceSchema;
use permit_model::ColumnKey;
use serde::{Deserialize, Serialize};

/// One reshaping operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Remove a row label level that carries no information.
    DropIndexLevel { level: usize },

    /// Remove a column level that carries no information.
    DropColumnLevel { level: usize },

    /// Rename the labels of one column level. The observed labels must be
    /// exactly the mapping's keys.
    RenameValues {
        level: usize,
        mapping: BTreeMap<String, String>,
    },

    /// Keep the single column whose innermost label is `label`, keyed `[rename]`.
    SelectColumn { label: String, rename: String },

    /// Keep columns `start..end` by position; `end` defaults to the width.
    SliceColumns {
        #[serde(default)]
        start: usize,
        #[serde(default)]
        end: Option<usize>,
    },

    /// Move row label levels into the column key (unstack).
    Pivot { levels: Vec<usize> },

    /// Reconcile a category that was renamed between releases.
    MergeRenamed { old: ColumnKey, new: ColumnKey },

    /// Name the column levels, outermost first.
    NameLevels { names: Vec<String> },
}

impl Step {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DropIndexLevel { .. } => "drop index level",
            Self::DropColumnLevel { .. } => "drop column level",
            Self::RenameValues { .. } => "rename values",
            Self::SelectColumn { .. } => "select column",
            Self::SliceColumns { .. } => "slice columns",
            Self::Pivot { .. } => "pivot",
            Self::MergeRenamed { .. } => "merge renamed",
            Self::NameLevels { .. } => "name levels",
        }
    }
}

/// Files of one layout, concatenated before their steps run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceGroup {
    pub sources: Vec<SourceSchema>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Everything needed to build one canonical domain table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecipe {
    /// Domain tag, the first component of every series name.
    pub name: String,

    /// Column level names, outermost (`value`) first. A `name_levels` step
    /// overrides them.
    pub levels: Vec<String>,

    pub groups: Vec<SourceGroup>,

    /// Steps applied after the groups are joined.
    #[serde(default)]
    pub steps: Vec<Step>,
}
