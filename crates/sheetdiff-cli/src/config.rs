//! TOML plan files.
//!
//! ```toml
//! mode = "sort-aligned"
//! date_mode = "date-only"
//! sheets = ["Orders", "Stock"]
//! exclude = ["UpdatedAt"]
//!
//! [sheet.Orders]
//! key = "OrderId"
//! drop = ["Internal"]
//!
//! [sheet.Orders.filter]
//! column = "Region"
//! values = ["EU", "US"]
//! ```
//!
//! Settings resolve in three layers: command-line flags, then the top level
//! of the file, then the `[sheet.NAME]` table. Scalars from a later layer
//! replace earlier ones; column lists are merged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use sheetdiff_model::{AlignmentMode, ComparisonConfig, ComparisonPlan, DateMode, ValueFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by the top level of a plan file and each sheet table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetSettings {
    pub mode: Option<AlignmentMode>,
    pub key: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub date_mode: Option<DateMode>,
    #[serde(default)]
    pub date_columns: Vec<String>,
    #[serde(default)]
    pub drop: Vec<String>,
    pub require_unique_key: Option<bool>,
    pub filter: Option<FilterSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSettings {
    pub column: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    /// Sheets to compare, in order.
    pub sheets: Option<Vec<String>>,
    pub mode: Option<AlignmentMode>,
    pub key: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub date_mode: Option<DateMode>,
    #[serde(default)]
    pub date_columns: Vec<String>,
    #[serde(default)]
    pub drop: Vec<String>,
    pub require_unique_key: Option<bool>,
    pub filter: Option<FilterSettings>,
    #[serde(default)]
    pub sheet: BTreeMap<String, SheetSettings>,
}

impl SheetSettings {
    /// Applies these settings on top of `base`.
    pub fn apply(&self, mut base: ComparisonConfig) -> ComparisonConfig {
        if let Some(mode) = self.mode {
            base.mode = mode;
        }
        if let Some(key) = &self.key {
            base.key_column = Some(key.clone());
        }
        if let Some(date_mode) = self.date_mode {
            base.date_mode = date_mode;
        }
        if let Some(require) = self.require_unique_key {
            base.require_unique_key = require;
        }
        if let Some(filter) = &self.filter {
            base.value_filter = Some(ValueFilter::new(
                filter.column.clone(),
                filter.values.iter().cloned(),
            ));
        }
        base.excluded_columns.extend(self.exclude.iter().cloned());
        base.date_columns.extend(self.date_columns.iter().cloned());
        base.output_excluded_columns
            .extend(self.drop.iter().cloned());
        base
    }
}

impl PlanFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Top-level settings, applied to every sheet.
    pub fn defaults(&self) -> SheetSettings {
        SheetSettings {
            mode: self.mode,
            key: self.key.clone(),
            exclude: self.exclude.clone(),
            date_mode: self.date_mode,
            date_columns: self.date_columns.clone(),
            drop: self.drop.clone(),
            require_unique_key: self.require_unique_key,
            filter: self.filter.clone(),
        }
    }

    /// Resolves the file against command-line defaults.
    ///
    /// A non-empty `selection` from the command line replaces `sheets`.
    pub fn into_plan(self, cli_defaults: ComparisonConfig, selection: &[String]) -> ComparisonPlan {
        let defaults = self.defaults().apply(cli_defaults);
        let mut plan = ComparisonPlan::new(defaults.clone());
        for (name, settings) in &self.sheet {
            plan = plan.with_sheet(name.clone(), settings.apply(defaults.clone()));
        }
        if !selection.is_empty() {
            plan.with_selection(selection.iter().cloned())
        } else if let Some(sheets) = self.sheets {
            plan.with_selection(sheets)
        } else {
            plan
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
mode = "sort-aligned"
date_mode = "date-only"
sheets = ["Orders", "Stock"]
exclude = ["UpdatedAt"]

[sheet.Orders]
key = "OrderId"
exclude = ["Comment"]
date_columns = ["Shipped"]
drop = ["Internal"]
require_unique_key = true

[sheet.Orders.filter]
column = "Region"
values = ["EU", "US"]
"#;

    fn parse(text: &str) -> Result<PlanFile, ConfigError> {
        PlanFile::parse(text, Path::new("plan.toml"))
    }

    #[test]
    fn parses_documented_layout() {
        let file = parse(EXAMPLE).unwrap();
        assert_eq!(file.sheets.as_deref(), Some(&["Orders".to_string(), "Stock".to_string()][..]));
        assert_eq!(file.mode, Some(AlignmentMode::SortAligned));
        assert_eq!(file.exclude, vec!["UpdatedAt"]);
        let orders = &file.sheet["Orders"];
        assert_eq!(orders.key.as_deref(), Some("OrderId"));
        assert_eq!(orders.filter.as_ref().map(|f| f.values.len()), Some(2));
    }

    #[test]
    fn sheet_entries_layer_over_file_and_cli_defaults() {
        let cli = ComparisonConfig::sort_aligned("id")
            .with_date_mode(DateMode::Exact)
            .with_excluded(["Audit"]);
        let plan = parse(EXAMPLE).unwrap().into_plan(cli, &[]);

        assert_eq!(plan.selection, Some(vec!["Orders".to_string(), "Stock".to_string()]));

        let stock = plan.config_for("Stock");
        assert_eq!(stock.key_column.as_deref(), Some("id"));
        assert_eq!(stock.date_mode, DateMode::DateOnly);
        assert!(stock.excluded_columns.contains("Audit"));
        assert!(stock.excluded_columns.contains("UpdatedAt"));
        assert!(!stock.require_unique_key);

        let orders = plan.config_for("Orders");
        assert_eq!(orders.key_column.as_deref(), Some("OrderId"));
        assert!(orders.excluded_columns.contains("Comment"));
        assert!(orders.excluded_columns.contains("UpdatedAt"));
        assert!(orders.date_columns.contains("Shipped"));
        assert!(orders.output_excluded_columns.contains("Internal"));
        assert!(orders.require_unique_key);
        assert!(orders.value_filter.as_ref().is_some_and(|f| f.accepts("EU")));
    }

    #[test]
    fn command_line_selection_wins() {
        let plan = parse(EXAMPLE)
            .unwrap()
            .into_plan(ComparisonConfig::default(), &["Stock".to_string()]);
        assert_eq!(plan.selection, Some(vec!["Stock".to_string()]));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("colour = \"red\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn key_matched_mode_is_kebab_case() {
        let file = parse("mode = \"key-matched\"\nkey = \"Id\"\n").unwrap();
        let plan = file.into_plan(ComparisonConfig::default(), &[]);
        assert_eq!(plan.defaults.mode, AlignmentMode::KeyMatched);
        assert_eq!(plan.defaults.key_column.as_deref(), Some("Id"));
    }
}
