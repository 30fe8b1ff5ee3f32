//! Human-readable rendering of phrase-table statistics.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::io::{self, Write};

use ptkit_core::PhraseTableStats;

use super::output_format::paint;
use super::theme::{ThemeEntry, ThemeMap};

/// Builds the two-column statistics table.
pub fn build_stats_table(stats: &PhraseTableStats, theme: &ThemeMap, supports_color: bool) -> Table {
    let rows: [(&str, String); 7] = [
        ("Phrase pairs", stats.phrase_pairs.to_string()),
        ("Source side phrases", stats.source_phrases.to_string()),
        ("Target side phrases", stats.target_phrases.to_string()),
        ("Source vocabulary", stats.source_vocabulary.to_string()),
        ("Target vocabulary", stats.target_vocabulary.to_string()),
        ("Longest source phrase", stats.longest_source_phrase.to_string()),
        ("Longest target phrase", stats.longest_target_phrase.to_string()),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(paint("Statistic", ThemeEntry::Header, theme, supports_color)),
            Cell::new(paint("Value", ThemeEntry::Header, theme, supports_color)),
        ]);

    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(paint(label, ThemeEntry::StatLabel, theme, supports_color)),
            Cell::new(paint(&value, ThemeEntry::StatValue, theme, supports_color)).set_alignment(CellAlignment::Right),
        ]);
    }

    if let Some(pair) = &stats.longest_target_pair {
        table.add_row(vec![
            Cell::new(paint("Longest pair", ThemeEntry::StatLabel, theme, supports_color)),
            Cell::new(format!("{} ||| {}", pair.source, pair.target)),
        ]);
    }
    table
}

pub fn print_stats_table<W: Write>(
    stats: &PhraseTableStats,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", build_stats_table(stats, theme, supports_color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use ptkit_core::LongestPair;

    #[test]
    fn table_lists_every_statistic() {
        let stats = PhraseTableStats {
            phrase_pairs: 4,
            source_phrases: 3,
            target_phrases: 4,
            source_vocabulary: 3,
            target_vocabulary: 4,
            longest_source_phrase: 2,
            longest_target_phrase: 3,
            longest_target_pair: Some(LongestPair {
                source: "le chat".to_string(),
                target: "the cat here".to_string(),
                target_length: 3,
            }),
        };
        let mut buf = Vec::new();
        print_stats_table(&stats, &mut buf, &ThemeStyle::default_theme_map(), false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Phrase pairs"));
        assert!(text.contains("Longest target phrase"));
        assert!(text.contains("le chat ||| the cat here"));
    }
}
