//! TOML configuration for the detector binary. Every table and key is
//! optional; omitted values keep their defaults.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    classify::Keywords, ocr::DEFAULT_LANGUAGES, proposal::ProposalParams, DetectionOptions,
    Error, Result,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionOptions,
    pub keywords: Keywords,
    pub proposal: ProposalParams,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub languages: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        toml::from_str(&data).map_err(|err| Error::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::associate::AssociationStrategy;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detection.min_area, 800);
        assert_eq!(config.proposal.min_grad, 10);
        assert_eq!(config.ocr.languages, vec!["es", "en"]);
    }

    #[test]
    fn partial_tables_override_single_keys() {
        let config: Config = toml::from_str(
            r#"
            [detection]
            min_confidence = 0.7
            strategy = "exclusive"

            [keywords]
            button = ["Buy now"]

            [proposal]
            min-grad = 4
            remove-bar = false
            "#,
        )
        .unwrap();
        assert_eq!(config.detection.min_confidence, 0.7);
        assert_eq!(config.detection.strategy, AssociationStrategy::Exclusive);
        assert_eq!(config.detection.min_width, 40);
        assert_eq!(config.keywords.button, vec!["Buy now"]);
        assert_eq!(config.keywords.input, Keywords::default().input);
        assert_eq!(config.proposal.min_grad, 4);
        assert!(!config.proposal.remove_bar);
        assert!(config.proposal.merge_contained_ele);
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uidetect.toml");
        fs::write(&path, "[detection]\nmin_width = \"wide\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("uidetect.toml"));
    }
}
