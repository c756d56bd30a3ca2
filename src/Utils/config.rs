//! Engine settings: zero-snap tolerance, eigen output precision, grid caps and log level.
//!
//! Settings are plain values passed to every operation, nothing is global. They can be read
//! from a TOML document:
//! ```toml
//! [evaluation]
//! zero_tolerance = 1e-10
//! [linalg]
//! eigen_precision = 6
//! [sampling]
//! max_sample_points = 100000
//! max_grid_points = 1000
//! [logging]
//! level = "info"
//! ```
//! Missing tables and keys keep their defaults.
use crate::Utils::logger::parse_log_level;
use crate::calculator::evaluator::EvaluationContext;
use crate::calculator::stabilizer::DEFAULT_ZERO_TOLERANCE;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_EIGEN_PRECISION: usize = 6;
pub const DEFAULT_MAX_SAMPLE_POINTS: usize = 100_000;
/// per axis, a grid has up to max_grid_points^2 cells
pub const DEFAULT_MAX_GRID_POINTS: usize = 1_000;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid TOML: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid setting: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalcConfig {
    /// components below this magnitude are snapped to zero
    pub zero_tolerance: f64,
    /// significant figures of eigen and matrix output
    pub eigen_precision: usize,
    /// cap on 1D sample count
    pub max_sample_points: usize,
    /// cap on 2D points per axis
    pub max_grid_points: usize,
    pub log_level: String,
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
            eigen_precision: DEFAULT_EIGEN_PRECISION,
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EvaluationSection {
    zero_tolerance: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LinalgSection {
    eigen_precision: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SamplingSection {
    max_sample_points: usize,
    max_grid_points: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingSection {
    level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    evaluation: EvaluationSection,
    linalg: LinalgSection,
    sampling: SamplingSection,
    logging: LoggingSection,
}

impl Default for EvaluationSection {
    fn default() -> Self {
        EvaluationSection {
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }
}

impl Default for LinalgSection {
    fn default() -> Self {
        LinalgSection {
            eigen_precision: DEFAULT_EIGEN_PRECISION,
        }
    }
}

impl Default for SamplingSection {
    fn default() -> Self {
        SamplingSection {
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            level: "info".to_string(),
        }
    }
}

impl CalcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    pub fn with_eigen_precision(mut self, digits: usize) -> Self {
        self.eigen_precision = digits;
        self
    }

    pub fn with_max_sample_points(mut self, n: usize) -> Self {
        self.max_sample_points = n;
        self
    }

    pub fn with_max_grid_points(mut self, n: usize) -> Self {
        self.max_grid_points = n;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zero_tolerance.is_finite() || self.zero_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zero_tolerance must be a finite non-negative number, got {}",
                self.zero_tolerance
            )));
        }
        if !(1..=17).contains(&self.eigen_precision) {
            return Err(ConfigError::Invalid(format!(
                "eigen_precision must be within 1..=17, got {}",
                self.eigen_precision
            )));
        }
        if self.max_sample_points == 0 || self.max_grid_points == 0 {
            return Err(ConfigError::Invalid(
                "sampling caps must be positive".to_string(),
            ));
        }
        if parse_log_level(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "log level must be debug, info, warn, error or off, got '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let config = CalcConfig {
            zero_tolerance: file.evaluation.zero_tolerance,
            eigen_precision: file.linalg.eigen_precision,
            max_sample_points: file.sampling.max_sample_points,
            max_grid_points: file.sampling.max_grid_points,
            log_level: file.logging.level,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// defaults when the file does not exist, any other failure is returned
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// fresh evaluation context carrying this tolerance and no variables
    pub fn evaluation_context(&self) -> EvaluationContext {
        EvaluationContext::new().with_tolerance(self.zero_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CalcConfig::default();
        assert_eq!(config.zero_tolerance, 1e-10);
        assert_eq!(config.eigen_precision, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CalcConfig::from_toml_str("[linalg]\neigen_precision = 4\n").unwrap();
        assert_eq!(config.eigen_precision, 4);
        assert_eq!(config.max_grid_points, DEFAULT_MAX_GRID_POINTS);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_full_toml() {
        let text = r#"
            [evaluation]
            zero_tolerance = 1e-12
            [linalg]
            eigen_precision = 8
            [sampling]
            max_sample_points = 500
            max_grid_points = 50
            [logging]
            level = "debug"
        "#;
        let config = CalcConfig::from_toml_str(text).unwrap();
        assert_eq!(config.zero_tolerance, 1e-12);
        assert_eq!(config.max_sample_points, 500);
        assert_eq!(config.max_grid_points, 50);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.evaluation_context().tolerance, 1e-12);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            CalcConfig::from_toml_str("[linalg]\neigen_precision = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CalcConfig::from_toml_str("[logging]\nlevel = \"loud\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CalcConfig::from_toml_str("[evaluation]\nzero_tolerance = -1.0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CalcConfig::from_toml_str("[sampling]\nmax_points = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CalcConfig::from_toml_str("not toml ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sampling]\nmax_sample_points = 42").unwrap();
        let config = CalcConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_sample_points, 42);
        assert!(matches!(
            CalcConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_optional_file() {
        let missing = CalcConfig::from_optional_file("/definitely/not/here.toml").unwrap();
        assert_eq!(missing, CalcConfig::default());

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "[linalg]\neigen_precision = 0").unwrap();
        assert!(matches!(
            CalcConfig::from_optional_file(broken.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut garbled = tempfile::NamedTempFile::new().unwrap();
        writeln!(garbled, "not toml [").unwrap();
        assert!(matches!(
            CalcConfig::from_optional_file(garbled.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
