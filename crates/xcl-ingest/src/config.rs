//! Criteria and plot-group YAML readers.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use xcl_model::Phase;

use crate::error::{IngestError, Result, read_error};
use crate::polars_utils::format_numeric;

/// Factors attached to a raw criteria key, as written.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorValues {
    List(Vec<String>),
    /// Anything that is not a sequence; rejected during validation.
    Scalar(String),
}

/// One `"variable,mode": [factors]` entry of a phase block.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaEntry {
    pub phase: Phase,
    pub key: String,
    pub values: FactorValues,
}

/// Criteria file content before validation against the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaConfig {
    /// Entries in file order.
    pub entries: Vec<CriteriaEntry>,
    /// Variables whose null-vocabulary values must be excluded.
    pub no_nan: Vec<String>,
}

impl CriteriaConfig {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.no_nan.is_empty()
    }
}

/// Read a criteria file. A missing path or file yields an empty configuration.
pub fn read_criteria_config(path: Option<&Path>) -> Result<CriteriaConfig> {
    let Some(text) = read_optional(path, "criteria")? else {
        return Ok(CriteriaConfig::default());
    };
    let path = path.unwrap_or_else(|| Path::new(""));
    parse_criteria_config(&text, path)
}

/// Parse criteria YAML. `path` is only used in error messages.
pub fn parse_criteria_config(text: &str, path: &Path) -> Result<CriteriaConfig> {
    let document: Value = serde_yaml::from_str(text).map_err(|source| IngestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let format_error = |reason: String| IngestError::ConfigFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut config = CriteriaConfig::default();
    let top = match document {
        Value::Null => return Ok(config),
        Value::Mapping(mapping) => mapping,
        _ => return Err(format_error("top level must be a mapping".to_string())),
    };

    for (key, block) in top {
        let Some(name) = scalar_text(&key) else {
            continue;
        };
        if name == "no_nan" {
            config.no_nan.extend(text_list(&block));
            continue;
        }
        let Ok(phase) = name.parse::<Phase>() else {
            debug!(key = %name, "ignoring unknown criteria section");
            continue;
        };
        let entries = match block {
            Value::Null => continue,
            Value::Mapping(entries) => entries,
            _ => {
                return Err(format_error(format!(
                    "\"{phase}\" must map \"variable,mode\" keys to factor lists"
                )));
            }
        };
        for (key, values) in entries {
            let key = scalar_text(&key).unwrap_or_else(|| yaml_text(&key));
            let values = match values {
                Value::Sequence(items) => FactorValues::List(items.iter().map(yaml_text).collect()),
                other => FactorValues::Scalar(yaml_text(&other)),
            };
            config.entries.push(CriteriaEntry { phase, key, values });
        }
    }
    Ok(config)
}

/// Groups of variables to chart together.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PlotGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl PlotGroups {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Lower-cased variables of the `categories` group, when configured.
    pub fn categories(&self) -> Option<Vec<String>> {
        self.group("categories")
            .map(|vars| vars.iter().map(|v| v.trim().to_lowercase()).collect())
    }
}

/// Read a plot-groups file. A missing path or file yields no groups.
pub fn read_plot_groups(path: Option<&Path>) -> Result<PlotGroups> {
    let Some(text) = read_optional(path, "plot groups")? else {
        return Ok(PlotGroups::default());
    };
    let groups: Option<PlotGroups> =
        serde_yaml::from_str(&text).map_err(|source| IngestError::Yaml {
            path: path.unwrap_or_else(|| Path::new("")).to_path_buf(),
            source,
        })?;
    Ok(groups.unwrap_or_default())
}

fn read_optional(path: Option<&Path>, what: &str) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.is_file() {
        warn!(path = %path.display(), "{what} file not found, continuing without it");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(text))
}

/// Text of a YAML scalar. `null` reads as `"None"`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("None".to_string()),
        Value::Bool(flag) => Some(if *flag { "True" } else { "False" }.to_string()),
        Value::Number(number) => Some(match number.as_i64() {
            Some(int) => int.to_string(),
            None => number.as_f64().map_or_else(|| number.to_string(), format_numeric),
        }),
        Value::String(text) => Some(text.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn yaml_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| {
        serde_yaml::to_string(value)
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    })
}

fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.iter().map(yaml_text).collect(),
        other => vec![yaml_text(other)],
    }
}
