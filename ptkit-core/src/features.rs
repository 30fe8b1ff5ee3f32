//! Parsing of the phrase-table feature field.
//!
//! Two styles appear in practice: named `key=value` pairs (`EgivenF=0.3
//! IsSingletonFE=1`) and bare positional scores (`0.5 0.25 0.1 0.2`).
//! Positional values are addressed by their zero-based index as a string,
//! counted over bare values only.

use crate::errors::PtkitError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSet {
    named: Vec<(String, f64)>,
    positional: Vec<f64>,
}

impl FeatureSet {
    pub fn parse(field: &str) -> Result<Self, PtkitError> {
        let mut features = FeatureSet::default();
        for item in field.split_whitespace() {
            match item.split_once('=') {
                Some((name, value)) => {
                    let parsed = parse_value(name, value)?;
                    features.named.push((name.to_string(), parsed));
                }
                None => {
                    let name = features.positional.len().to_string();
                    features.positional.push(parse_value(&name, item)?);
                }
            }
        }
        Ok(features)
    }

    /// Looks a feature up by name, falling back to a positional index.
    ///
    /// Named features take precedence, so a feature literally called `"0"`
    /// shadows the first positional score.
    pub fn get(&self, name: &str) -> Option<f64> {
        if let Some((_, value)) = self.named.iter().find(|(n, _)| n == name) {
            return Some(*value);
        }
        name.parse::<usize>().ok().and_then(|idx| self.positional.get(idx).copied())
    }

    pub fn positional(&self) -> &[f64] {
        &self.positional
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, f64)> {
        self.named.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.named.len() + self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_value(name: &str, value: &str) -> Result<f64, PtkitError> {
    value.parse::<f64>().map_err(|_| PtkitError::InvalidFeature {
        name: name.to_string(),
        value: value.to_string(),
    })
}
