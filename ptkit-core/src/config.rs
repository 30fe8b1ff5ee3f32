//! Configuration management for `ptkit-core`.
//!
//! This module defines the data structures for phrase-table layout, lexicon
//! format, scoring and row-filter settings. It handles serialization and
//! deserialization of YAML configurations and provides utilities for loading,
//! merging, and validating these configs.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use log::{debug, info, warn};

/// Field separator of the standard phrase-table format.
pub const DEFAULT_DELIMITER: &str = " ||| ";

/// Default number of records scored per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// What the phrase-table reader does with a line it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log a warning and continue with the next line.
    #[default]
    Skip,
    /// Stop and report the line as an error.
    Fail,
}

/// Layout of a phrase-table row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhraseTableConfig {
    /// Field separator. Field 0 is always the source phrase, field 1 the target.
    pub delimiter: String,
    /// Index of the feature-score field.
    pub feature_field: usize,
    /// Index of the word-alignment field.
    pub alignment_field: usize,
    pub on_malformed: MalformedPolicy,
}

impl Default for PhraseTableConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            feature_field: 2,
            alignment_field: 3,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

/// Settings for the text lexicon format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Token that stands for the NULL word in lexicon files.
    pub null_token: String,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self { null_token: "NULL".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Worker threads for batch scoring. 0 lets rayon decide.
    pub threads: usize,
    /// Records read before a batch is scored and written.
    pub batch_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { threads: 0, batch_size: DEFAULT_BATCH_SIZE }
    }
}

/// Comparison applied between a row's feature value and a rule's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FeatureOp {
    /// Evaluates `value <op> threshold`.
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            FeatureOp::Eq => value == threshold,
            FeatureOp::Ne => value != threshold,
            FeatureOp::Lt => value < threshold,
            FeatureOp::Le => value <= threshold,
            FeatureOp::Gt => value > threshold,
            FeatureOp::Ge => value >= threshold,
        }
    }
}

impl fmt::Display for FeatureOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            FeatureOp::Eq => "==",
            FeatureOp::Ne => "!=",
            FeatureOp::Lt => "<",
            FeatureOp::Le => "<=",
            FeatureOp::Gt => ">",
            FeatureOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// A single row-filter predicate. A row is kept when `feature <op> value` holds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterRule {
    /// Unique identifier for the rule (e.g., "no_singletons").
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Feature name, or the zero-based index of a positional feature.
    pub feature: String,
    pub op: FeatureOp,
    pub value: f64,
    /// If true, the rule is inactive unless explicitly enabled.
    #[serde(default)]
    pub opt_in: bool,
    /// Explicit override for enabling/disabling the rule.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl FilterRule {
    pub fn is_active(&self) -> bool {
        self.enabled.unwrap_or(!self.opt_in)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub rules: Vec<FilterRule>,
    /// Keep only the N best rows per source phrase.
    pub top_n: Option<usize>,
    /// Feature ranked by `top_n`, highest first.
    pub top_n_feature: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { rules: Vec::new(), top_n: None, top_n_feature: "0".to_string() }
    }
}

impl FilterConfig {
    /// Applies CLI enable/disable lists. Enabled names switch opt-in rules on;
    /// disabled names switch any rule off.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();
        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();

        for rule_name in enable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `enable_rules` list does not exist.", rule_name);
        }
        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        for rule in &mut self.rules {
            if disable_set.contains(rule.name.as_str()) {
                rule.enabled = Some(false);
            } else if enable_set.contains(rule.name.as_str()) {
                rule.enabled = Some(true);
            }
        }

        debug!(
            "Active filter rules after enable/disable: {}",
            self.rules.iter().filter(|r| r.is_active()).count()
        );
    }
}

/// Top-level ptkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PtkitConfig {
    pub phrase_table: PhraseTableConfig,
    pub lexicon: LexiconConfig,
    pub scoring: ScoringConfig,
    pub filter: FilterConfig,
}

impl PtkitConfig {
    /// Loads a configuration from a YAML file. Omitted keys take built-in defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PtkitConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        info!("Loaded {} filter rules from file {}.", config.filter.rules.len(), path.display());
        Ok(config)
    }

    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let default_yaml = include_str!("../config/default_config.yaml");
        let config: PtkitConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default configuration")?;

        debug!("Loaded {} default filter rules.", config.filter.rules.len());
        Ok(config)
    }

    /// Checks the invariants the readers and the scorer rely on.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.phrase_table.delimiter.is_empty() {
            errors.push("`phrase_table.delimiter` cannot be empty.".to_string());
        }
        for (key, idx) in [
            ("feature_field", self.phrase_table.feature_field),
            ("alignment_field", self.phrase_table.alignment_field),
        ] {
            if idx < 2 {
                errors.push(format!("`phrase_table.{}` must be 2 or greater (fields 0 and 1 hold the phrases).", key));
            }
        }
        if self.phrase_table.feature_field == self.phrase_table.alignment_field {
            errors.push("`phrase_table.feature_field` and `alignment_field` must differ.".to_string());
        }
        if self.lexicon.null_token.trim().is_empty() || self.lexicon.null_token.contains(char::is_whitespace) {
            errors.push("`lexicon.null_token` must be a single non-empty token.".to_string());
        }
        if self.scoring.batch_size == 0 {
            errors.push("`scoring.batch_size` must be greater than 0.".to_string());
        }
        if self.filter.top_n == Some(0) {
            errors.push("`filter.top_n` must be greater than 0 when set.".to_string());
        }

        let mut rule_names = HashSet::new();
        for rule in &self.filter.rules {
            if rule.name.is_empty() {
                errors.push("A filter rule has an empty `name` field.".to_string());
            } else if !rule_names.insert(rule.name.as_str()) {
                errors.push(format!("Duplicate filter rule name found: '{}'.", rule.name));
            }
            if rule.feature.trim().is_empty() {
                errors.push(format!("Filter rule '{}' has an empty `feature` field.", rule.name));
            }
            if !rule.value.is_finite() {
                errors.push(format!("Filter rule '{}' has a non-finite `value`.", rule.name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

/// Merges a user configuration over the defaults.
///
/// Scalar sections are taken from the user file as a whole. Filter rules are
/// merged by name: a user rule replaces the default rule of the same name, new
/// rules are appended in file order.
pub fn merge_config(default_config: PtkitConfig, user_config: Option<PtkitConfig>) -> PtkitConfig {
    let Some(user_cfg) = user_config else {
        debug!("No user config provided; using defaults.");
        return default_config;
    };

    debug!(
        "Merging {} user filter rules over {} default rules.",
        user_cfg.filter.rules.len(),
        default_config.filter.rules.len()
    );

    let mut rules = default_config.filter.rules;
    for user_rule in user_cfg.filter.rules {
        match rules.iter_mut().find(|r| r.name == user_rule.name) {
            Some(existing) => {
                debug!("Overriding default filter rule '{}'.", user_rule.name);
                *existing = user_rule;
            }
            None => rules.push(user_rule),
        }
    }

    PtkitConfig {
        phrase_table: user_cfg.phrase_table,
        lexicon: user_cfg.lexicon,
        scoring: user_cfg.scoring,
        filter: FilterConfig {
            rules,
            top_n: user_cfg.filter.top_n,
            top_n_feature: user_cfg.filter.top_n_feature,
        },
    }
}
