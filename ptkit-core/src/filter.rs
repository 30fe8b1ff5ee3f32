//! Row filtering by feature predicates.
//!
//! Rules are compiled once from the [`FilterConfig`] and then applied to each
//! record. A row is kept when every active rule holds. Rows that do not carry
//! a feature referenced by a rule are kept; the rule does not apply to them.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

use crate::config::{FeatureOp, FilterConfig, FilterRule};
use crate::errors::PtkitError;
use crate::features::FeatureSet;
use crate::phrase_table::PhraseTableRecord;

/// A single active rule, ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub feature: String,
    pub op: FeatureOp,
    pub value: f64,
}

impl CompiledRule {
    fn from_rule(rule: &FilterRule) -> Result<Self, PtkitError> {
        if rule.feature.trim().is_empty() {
            return Err(PtkitError::InvalidFilterRule(rule.name.clone(), "empty feature name".to_string()));
        }
        if !rule.value.is_finite() {
            return Err(PtkitError::InvalidFilterRule(rule.name.clone(), "threshold is not finite".to_string()));
        }
        Ok(Self {
            name: rule.name.clone(),
            feature: rule.feature.clone(),
            op: rule.op,
            value: rule.value,
        })
    }

    /// `None` when the row lacks the feature.
    pub fn evaluate(&self, features: &FeatureSet) -> Option<bool> {
        features.get(&self.feature).map(|v| self.op.apply(v, self.value))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    pub rules: Vec<CompiledRule>,
}

impl CompiledFilter {
    /// Compiles the active rules of a filter configuration.
    pub fn from_config(config: &FilterConfig) -> Result<Self, PtkitError> {
        let rules = config
            .rules
            .iter()
            .filter(|r| r.is_active())
            .map(CompiledRule::from_rule)
            .collect::<Result<Vec<_>, _>>()?;

        for rule in &rules {
            debug!("Filter rule '{}' active: {} {} {}", rule.name, rule.feature, rule.op, rule.value);
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keep(&self, record: &PhraseTableRecord) -> Result<bool, PtkitError> {
        if self.rules.is_empty() {
            return Ok(true);
        }
        let features = feature_set_of(record)?;
        for rule in &self.rules {
            match rule.evaluate(&features) {
                Some(true) => {}
                Some(false) => {
                    debug!("Line {} dropped by rule '{}'.", record.line_number, rule.name);
                    return Ok(false);
                }
                None => debug!(
                    "Line {} has no feature '{}'; rule '{}' does not apply.",
                    record.line_number, rule.feature, rule.name
                ),
            }
        }
        Ok(true)
    }
}

/// Keeps the `n` best rows per source phrase, ranked by one feature.
///
/// Rows are grouped by consecutive identical source phrases, which is how a
/// source-sorted phrase table is laid out. Kept rows are emitted in their
/// input order. Rows lacking the ranked feature rank last.
#[derive(Debug)]
pub struct TopNSelector {
    n: usize,
    feature: String,
    group: Vec<(f64, PhraseTableRecord)>,
}

impl TopNSelector {
    pub fn new(n: usize, feature: impl Into<String>) -> Self {
        Self { n, feature: feature.into(), group: Vec::new() }
    }

    /// Adds a record. Returns the kept rows of the previous group once the
    /// source phrase changes.
    pub fn push(&mut self, record: PhraseTableRecord) -> Result<Vec<PhraseTableRecord>, PtkitError> {
        let score = feature_set_of(&record)?.get(&self.feature).unwrap_or(f64::NEG_INFINITY);
        let new_group = self.group.first().is_some_and(|(_, head)| head.source() != record.source());
        let flushed = if new_group { self.flush() } else { Vec::new() };
        self.group.push((score, record));
        Ok(flushed)
    }

    /// Emits the kept rows of the last group.
    pub fn finish(&mut self) -> Vec<PhraseTableRecord> {
        self.flush()
    }

    fn flush(&mut self) -> Vec<PhraseTableRecord> {
        let group = std::mem::take(&mut self.group);
        if group.len() <= self.n {
            return group.into_iter().map(|(_, r)| r).collect();
        }

        let mut ranked: Vec<usize> = (0..group.len()).collect();
        ranked.sort_by(|&a, &b| group[b].0.total_cmp(&group[a].0));
        let mut keep = vec![false; group.len()];
        for &idx in ranked.iter().take(self.n) {
            keep[idx] = true;
        }

        group
            .into_iter()
            .zip(keep)
            .filter_map(|((_, record), kept)| kept.then_some(record))
            .collect()
    }
}

/// Counts reported after a filter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub read: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Streams records through the predicate filter and the optional top-N
/// selector, writing kept rows to `writer`.
pub fn filter_records<I, W>(
    records: I,
    filter: &CompiledFilter,
    mut top_n: Option<TopNSelector>,
    writer: &mut W,
    delimiter: &str,
) -> Result<FilterSummary>
where
    I: IntoIterator<Item = Result<PhraseTableRecord, PtkitError>>,
    W: Write,
{
    let mut summary = FilterSummary::default();

    for record in records {
        let record = record.context("Failed to read phrase-table record")?;
        summary.read += 1;

        if !filter.keep(&record)? {
            continue;
        }
        let ready = match top_n.as_mut() {
            Some(selector) => selector.push(record)?,
            None => vec![record],
        };
        summary.kept += write_records(&ready, writer, delimiter)?;
    }

    if let Some(selector) = top_n.as_mut() {
        summary.kept += write_records(&selector.finish(), writer, delimiter)?;
    }
    writer.flush().context("Failed to flush filter output")?;

    summary.dropped = summary.read - summary.kept;
    info!(
        "Filter finished: {} read, {} kept, {} dropped.",
        summary.read, summary.kept, summary.dropped
    );
    Ok(summary)
}

fn write_records<W: Write>(records: &[PhraseTableRecord], writer: &mut W, delimiter: &str) -> Result<usize> {
    for record in records {
        writeln!(writer, "{}", record.to_line(delimiter)).context("Failed to write filtered row")?;
    }
    Ok(records.len())
}

fn feature_set_of(record: &PhraseTableRecord) -> Result<FeatureSet, PtkitError> {
    record.feature_set().map_err(|e| PtkitError::MalformedRecord {
        line: record.line_number,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhraseTableConfig, PtkitConfig};
    use crate::phrase_table::parse_record;

    fn rec(line: &str, n: usize) -> PhraseTableRecord {
        parse_record(line, n, &PhraseTableConfig::default()).unwrap()
    }

    fn singleton_filter() -> CompiledFilter {
        let mut config = PtkitConfig::load_default().unwrap().filter;
        config.set_active_rules(&["no_singletons".to_string()], &[]);
        CompiledFilter::from_config(&config).unwrap()
    }

    #[test]
    fn test_singleton_rule() {
        let filter = singleton_filter();
        assert!(!filter.keep(&rec("a ||| b ||| IsSingletonFE=1.0", 1)).unwrap());
        assert!(filter.keep(&rec("a ||| b ||| IsSingletonFE=0", 2)).unwrap());
        // no such feature: kept
        assert!(filter.keep(&rec("a ||| b ||| 0.5", 3)).unwrap());
    }

    #[test]
    fn test_inactive_rules_are_not_compiled() {
        let config = PtkitConfig::load_default().unwrap().filter;
        assert!(CompiledFilter::from_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_top_n_per_source_keeps_input_order() {
        let mut selector = TopNSelector::new(2, "0");
        let rows = [
            rec("a ||| x ||| 0.1", 1),
            rec("a ||| y ||| 0.7", 2),
            rec("a ||| z ||| 0.5", 3),
            rec("b ||| x ||| 0.2", 4),
        ];
        let mut out = Vec::new();
        for r in rows {
            out.extend(selector.push(r).unwrap());
        }
        out.extend(selector.finish());
        let lines: Vec<usize> = out.iter().map(|r| r.line_number).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_filter_records_summary() {
        let filter = singleton_filter();
        let rows = vec![
            Ok(rec("a ||| b ||| IsSingletonFE=1", 1)),
            Ok(rec("a ||| c ||| IsSingletonFE=0", 2)),
        ];
        let mut out = Vec::new();
        let summary = filter_records(rows, &filter, None, &mut out, " ||| ").unwrap();
        assert_eq!(summary, FilterSummary { read: 2, kept: 1, dropped: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "a ||| c ||| IsSingletonFE=0\n");
    }

    #[test]
    fn test_unparsable_features_are_skipped_before_filtering() {
        use crate::phrase_table::PhraseTableReader;

        let filter = singleton_filter();
        let input: &[u8] = b"a ||| b ||| IsSingletonFE=0\nc ||| d ||| IsSingletonFE=yes\n\xff ||| e\nf ||| g ||| IsSingletonFE=1\n";
        let mut reader = PhraseTableReader::new(input, PhraseTableConfig::default());
        let mut out = Vec::new();
        let summary = filter_records(reader.by_ref(), &filter, None, &mut out, " ||| ").unwrap();

        assert_eq!(reader.skipped(), 2);
        assert_eq!(summary, FilterSummary { read: 2, kept: 1, dropped: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "a ||| b ||| IsSingletonFE=0\n");
    }
}
