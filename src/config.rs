use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collaborators::OutputFormat;
use crate::pipeline::assembly::DEFAULT_RECOGNITION_KEYWORDS;
use crate::pipeline::extraction::{CropRegion, DEFAULT_PAGE_SEG_MODE, DEFAULT_RENDER_DPI};
use crate::pipeline::parsing::{ParsingStrategy, DEFAULT_LABEL_WINDOW};

/// Application-level constants
pub const APP_NAME: &str = "SECA Data Converter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under the platform config dir.
const CONFIG_SUBDIR: &str = "seca-converter";
const CONFIG_FILE: &str = "config.json";

pub const ENV_TESSERACT_PATH: &str = "SECA_TESSERACT_PATH";
pub const ENV_PDFIUM_PATH: &str = "PDFIUM_DYNAMIC_LIB_PATH";
pub const ENV_OCR_DEBUG: &str = "SECA_OCR_DEBUG";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "seca_converter=info"
}

/// `<config_dir>/seca-converter/config.json`, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_SUBDIR).join(CONFIG_FILE))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Runtime configuration. Every field has a default, so a partial file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tesseract binary: bare name (resolved on `PATH`) or full path.
    pub tesseract_path: PathBuf,
    pub ocr_language: String,
    pub page_seg_mode: u8,
    /// PDFium shared library (file or directory). `None` = system lookup.
    pub pdfium_library_path: Option<PathBuf>,
    pub render_dpi: u32,
    pub crop: CropRegion,
    pub parsing_strategy: ParsingStrategy,
    pub label_window: usize,
    /// Words the report header must contain to be treated as a SECA report.
    pub recognition_keywords: Vec<String>,
    /// Write `<stem>_ocr.txt` next to each report.
    pub ocr_debug: bool,
    pub output_format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            ocr_language: "eng".to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            pdfium_library_path: None,
            render_dpi: DEFAULT_RENDER_DPI,
            crop: CropRegion::default(),
            parsing_strategy: ParsingStrategy::default(),
            label_window: DEFAULT_LABEL_WINDOW,
            recognition_keywords: DEFAULT_RECOGNITION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            ocr_debug: false,
            output_format: OutputFormat::Xlsx,
        }
    }
}

impl AppConfig {
    /// Config file (when present) plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_TESSERACT_PATH) {
            self.tesseract_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_PDFIUM_PATH) {
            self.pdfium_library_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = get(ENV_OCR_DEBUG) {
            match parse_flag(&flag) {
                Some(enabled) => self.ocr_debug = enabled,
                None => tracing::warn!(
                    var = ENV_OCR_DEBUG,
                    value = %flag,
                    "Unrecognized boolean, keeping config value"
                ),
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_report_layout() {
        let config = AppConfig::default();
        assert_eq!(config.tesseract_path, PathBuf::from("tesseract"));
        assert_eq!(config.render_dpi, 300);
        assert_eq!(config.parsing_strategy, ParsingStrategy::Positional);
        assert_eq!(config.label_window, 200);
        assert_eq!(config.recognition_keywords, vec!["seca".to_string()]);
        assert!(!config.ocr_debug);
        assert_eq!(config.output_format, OutputFormat::Xlsx);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "parsing_strategy": "label_anchored", "ocr_language": "eng+deu", "output_format": "csv" }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.parsing_strategy, ParsingStrategy::LabelAnchored);
        assert_eq!(config.ocr_language, "eng+deu");
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.render_dpi, DEFAULT_RENDER_DPI);
        assert_eq!(config.crop, CropRegion::default());
    }

    #[test]
    fn crop_region_is_configurable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "crop": { "rect": { "x": 10, "y": 20, "width": 30, "height": 40 },
                           "base_width": 100, "base_height": 200 } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.crop.rect.width, 30);
        assert_eq!(config.crop.base_height, 200);
    }

    #[test]
    fn invalid_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load_from(Path::new("/nonexistent/seca/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/seca/config.json"));
    }

    #[test]
    fn env_overrides_tool_paths() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            (ENV_TESSERACT_PATH, "/opt/tesseract/bin/tesseract"),
            (ENV_PDFIUM_PATH, "/opt/pdfium/lib"),
            (ENV_OCR_DEBUG, "1"),
        ]));
        assert_eq!(
            config.tesseract_path,
            PathBuf::from("/opt/tesseract/bin/tesseract")
        );
        assert_eq!(
            config.pdfium_library_path,
            Some(PathBuf::from("/opt/pdfium/lib"))
        );
        assert!(config.ocr_debug);
    }

    #[test]
    fn empty_or_invalid_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.ocr_debug = true;
        config.apply_overrides(env(&[(ENV_TESSERACT_PATH, "  "), (ENV_OCR_DEBUG, "maybe")]));
        assert_eq!(config.tesseract_path, PathBuf::from("tesseract"));
        assert!(config.ocr_debug);
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("2"), None);
    }

    #[test]
    fn config_path_is_namespaced() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("seca-converter/config.json"));
        }
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("seca_converter"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
