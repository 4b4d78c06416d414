//! TOML run configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use permit_output::OutputLayout;
use permit_transform::DomainRecipe;
use permit_x13::{AdjustmentOptions, EngineConfig};
use serde::Deserialize;

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_errors_dir() -> PathBuf {
    PathBuf::from("errors")
}

/// `[engine]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Path to the X-13ARIMA-SEATS executable, or a bare name looked up on `PATH`.
    pub binary: PathBuf,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Parent of the per-series scratch directories. System temp dir when unset.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

/// `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_errors_dir")]
    pub errors_dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            errors_dir: default_errors_dir(),
        }
    }
}

/// A whole run file. Relative paths are resolved against the directory of
/// the file itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub engine: EngineSection,
    #[serde(default)]
    pub adjustment: AdjustmentOptions,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub domains: Vec<DomainRecipe>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        // A bare program name is left for the OS to find on PATH.
        let binary = if self.engine.binary.components().count() > 1 {
            self.resolve(&self.engine.binary)
        } else {
            self.engine.binary.clone()
        };
        let mut config = EngineConfig::new(binary);
        if let Some(secs) = self.engine.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(dir) = &self.engine.work_dir {
            config = config.with_work_dir(self.resolve(dir));
        }
        config
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(
            self.resolve(&self.output.dir),
            self.resolve(&self.output.errors_dir),
        )
    }

    /// Domains whose name is in `names`, or all of them when `names` is empty.
    pub fn select_domains(&self, names: &[String]) -> Result<Vec<&DomainRecipe>> {
        if names.is_empty() {
            return Ok(self.domains.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.domains
                    .iter()
                    .find(|domain| &domain.name == name)
                    .with_context(|| format!("unknown domain '{name}'"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_x13::Differencing;

    const MINIMAL: &str = r#"
        [engine]
        binary = "x13as/x13as"
        timeout_secs = 60

        [adjustment]
        differencing = { fixed = [1, 1] }
        log = "log"
    "#;

    #[test]
    fn test_minimal_config() {
        let mut config = RunConfig::parse(MINIMAL).unwrap();
        config.base_dir = PathBuf::from("/srv/permits");

        assert_eq!(config.output, OutputSection::default());
        assert_eq!(config.adjustment.differencing, Differencing::Fixed(1, 1));
        assert!(config.domains.is_empty());

        let engine = config.engine_config();
        assert_eq!(engine.binary, PathBuf::from("/srv/permits/x13as/x13as"));
        assert_eq!(engine.timeout, Some(Duration::from_secs(60)));
        assert_eq!(
            config.layout().errors_dir,
            PathBuf::from("/srv/permits/errors")
        );
    }

    #[test]
    fn test_bare_binary_uses_path() {
        let mut config = RunConfig::parse("[engine]\nbinary = \"x13as\"\n").unwrap();
        config.base_dir = PathBuf::from("/srv/permits");
        assert_eq!(config.engine_config().binary, PathBuf::from("x13as"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(RunConfig::parse("[engine]\nbinary = \"x\"\nbinray = \"y\"\n").is_err());
    }

    #[test]
    fn test_unknown_domain() {
        let config = RunConfig::parse(MINIMAL).unwrap();
        let err = config.select_domains(&["use6".to_string()]).unwrap_err();
        assert!(err.to_string().contains("use6"));
    }
}
