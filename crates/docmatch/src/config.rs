//! Settings for the scan and compare steps, read from a TOML file.
//!
//! Every field has a default, so a partial file (or no file at all) is valid.

use crate::compare::JoinKeys;
use crate::error::{DocmatchError, Result};
use crate::io::LoadOptions;
use crate::scan::WalkConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the CLI looks for settings when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub compare: CompareSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Root directory to scan
    #[serde(default = "default_scan_path")]
    pub path: PathBuf,

    /// Where the metadata table is written
    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,

    #[serde(default)]
    pub follow_symlinks: bool,

    #[serde(default = "default_true")]
    pub include_hidden: bool,

    #[serde(default)]
    pub exclude_dir_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSettings {
    /// Merged output file. No export when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Rows shown in the terminal preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    #[serde(default = "default_df1")]
    pub df1: SideSettings,

    #[serde(default = "default_df2")]
    pub df2: SideSettings,
}

/// One input of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSettings {
    pub file_path: PathBuf,
    pub on_columns: Vec<String>,
    /// Worksheet for spreadsheet inputs; first sheet when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

fn default_scan_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_csv() -> PathBuf {
    PathBuf::from("files_details.csv")
}

fn default_true() -> bool {
    true
}

fn default_preview_rows() -> usize {
    5
}

fn default_df1() -> SideSettings {
    SideSettings {
        file_path: default_output_csv(),
        on_columns: vec!["file_name_stem".to_string(), "parent_directory".to_string()],
        sheet: None,
    }
}

fn default_df2() -> SideSettings {
    SideSettings {
        file_path: PathBuf::from("comparison.xlsx"),
        on_columns: vec!["document_name".to_string(), "parent_folder".to_string()],
        sheet: None,
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            path: default_scan_path(),
            output_csv: default_output_csv(),
            follow_symlinks: false,
            include_hidden: default_true(),
            exclude_dir_names: Vec::new(),
        }
    }
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            output: None,
            preview_rows: default_preview_rows(),
            df1: default_df1(),
            df2: default_df2(),
        }
    }
}

impl ScanSettings {
    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
            exclude_dir_names: self.exclude_dir_names.clone(),
        }
    }
}

impl SideSettings {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sheet: self.sheet.clone(),
            ..LoadOptions::default()
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DocmatchError::from_io(path, e))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| DocmatchError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(DocmatchError::FileNotFound(_)) => {
                info!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save settings to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DocmatchError::Config(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DocmatchError::from_io(parent, e))?;
        }
        fs::write(path, content).map_err(|e| DocmatchError::from_io(path, e))?;
        Ok(())
    }

    pub fn join_keys(&self) -> JoinKeys {
        JoinKeys::new(
            self.compare.df1.on_columns.iter().cloned(),
            self.compare.df2.on_columns.iter().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.scan.path, PathBuf::from("."));
        assert_eq!(settings.scan.output_csv, PathBuf::from("files_details.csv"));
        assert!(settings.scan.include_hidden);
        assert_eq!(settings.compare.preview_rows, 5);
        assert_eq!(settings.compare.output, None);
        assert_eq!(
            settings.join_keys(),
            JoinKeys::new(
                ["file_name_stem", "parent_directory"],
                ["document_name", "parent_folder"]
            )
        );
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_sections_fall_back() {
        let settings: Settings = toml::from_str(
            r#"
            [scan]
            path = "/srv/docs"
            exclude_dir_names = [".git", "node_modules"]

            [compare]
            output = "out/merged.xlsx"

            [compare.df2]
            file_path = "index.csv"
            on_columns = ["name", "folder"]
            sheet = "Index"
            "#,
        )
        .unwrap();

        assert_eq!(settings.scan.path, PathBuf::from("/srv/docs"));
        assert_eq!(settings.scan.output_csv, PathBuf::from("files_details.csv"));
        assert_eq!(settings.scan.walk_config().exclude_dir_names.len(), 2);
        assert_eq!(settings.compare.output, Some(PathBuf::from("out/merged.xlsx")));
        assert_eq!(settings.compare.preview_rows, 5);
        assert_eq!(settings.compare.df1, default_df1());
        assert_eq!(settings.compare.df2.on_columns, vec!["name", "folder"]);
        assert_eq!(
            settings.compare.df2.load_options().sheet.as_deref(),
            Some("Index")
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Settings::load(&path),
            Err(DocmatchError::FileNotFound(_))
        ));
        assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[scan\npath = ").unwrap();
        let err = Settings::load_or_default(&path).unwrap_err();
        assert!(matches!(err, DocmatchError::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config/settings.toml");

        let mut settings = Settings::default();
        settings.scan.path = PathBuf::from("/data");
        settings.compare.output = Some(PathBuf::from("merged.csv"));
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
