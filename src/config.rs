//! Run configuration
//!
//! Defaults can be overridden by environment variables:
//!   LOAN_CURVES_DIR, IRR_TOLERANCE, IRR_MAX_ITERATIONS, IRR_ANNUALIZATION

use crate::curves::loader::{CHARGED_OFF_FILE, DEFAULT_CURVES_PATH, PREPAY_FILE};
use crate::error::InputError;
use crate::projection::IrrSettings;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the curve tables live and how the IRR is solved
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationConfig {
    pub curves_dir: PathBuf,
    pub charged_off_file: String,
    pub prepay_file: String,
    pub irr: IrrSettings,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            curves_dir: PathBuf::from(DEFAULT_CURVES_PATH),
            charged_off_file: CHARGED_OFF_FILE.to_string(),
            prepay_file: PREPAY_FILE.to_string(),
            irr: IrrSettings::default(),
        }
    }
}

impl ValuationConfig {
    /// Defaults overlaid with any environment overrides
    pub fn from_env() -> Result<Self, InputError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Overlay overrides from any key lookup onto the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InputError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("LOAN_CURVES_DIR") {
            config.curves_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("IRR_TOLERANCE") {
            config.irr.tolerance = parse_setting("IRR_TOLERANCE", &value)?;
        }
        if let Some(value) = lookup("IRR_MAX_ITERATIONS") {
            config.irr.max_iterations = parse_setting("IRR_MAX_ITERATIONS", &value)?;
        }
        if let Some(value) = lookup("IRR_ANNUALIZATION") {
            config.irr.annualization = parse_setting("IRR_ANNUALIZATION", &value)?;
        }

        Ok(config)
    }

    pub fn charged_off_path(&self) -> PathBuf {
        self.curves_dir.join(&self.charged_off_file)
    }

    pub fn prepay_path(&self) -> PathBuf {
        self.curves_dir.join(&self.prepay_file)
    }
}

fn parse_setting<T>(key: &str, value: &str) -> Result<T, InputError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| InputError::parse(key, value, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Annualization;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ValuationConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ValuationConfig::default());
        assert_eq!(config.charged_off_path(), PathBuf::from("data/curves/charged_off.csv"));
        assert_eq!(config.irr.annualization, Annualization::Linear);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LOAN_CURVES_DIR", "/tmp/curves"),
            ("IRR_TOLERANCE", "1e-8"),
            ("IRR_MAX_ITERATIONS", "50"),
            ("IRR_ANNUALIZATION", "compound"),
        ]
        .into_iter()
        .collect();
        let config = ValuationConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.prepay_path(), PathBuf::from("/tmp/curves/prepay.csv"));
        assert_eq!(config.irr.tolerance, 1e-8);
        assert_eq!(config.irr.max_iterations, 50);
        assert_eq!(config.irr.annualization, Annualization::Compound);
    }

    #[test]
    fn test_bad_override() {
        let err = ValuationConfig::from_lookup(|k| (k == "IRR_MAX_ITERATIONS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, InputError::Parse { ref field, .. } if field == "IRR_MAX_ITERATIONS"));
    }
}
