//! Colour theme for messages written to stderr.
//!
//! A theme maps each logical output element to an optional ANSI foreground
//! colour. Users can override entries from a YAML file; entries the file
//! leaves out keep their default colour.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Left column of the statistics table.
    StatLabel,
    /// Right column of the statistics table.
    StatValue,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 7] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::StatLabel,
        ThemeEntry::StatValue,
    ];
}

/// A named 16-colour ANSI colour, e.g. "red" or "brightgreen".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(AnsiColors);

#[derive(Debug, Clone, Error)]
#[error(
    "Invalid theme color '{0}'; expected one of: black, red, green, yellow, blue, magenta, cyan, white, \
     or their bright variants (e.g. brightred)."
)]
pub struct ParseThemeColorError(String);

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.to_lowercase().as_str() {
            "black" => AnsiColors::Black,
            "red" => AnsiColors::Red,
            "green" => AnsiColors::Green,
            "yellow" => AnsiColors::Yellow,
            "blue" => AnsiColors::Blue,
            "magenta" => AnsiColors::Magenta,
            "cyan" => AnsiColors::Cyan,
            "white" => AnsiColors::White,
            "brightblack" => AnsiColors::BrightBlack,
            "brightred" => AnsiColors::BrightRed,
            "brightgreen" => AnsiColors::BrightGreen,
            "brightyellow" => AnsiColors::BrightYellow,
            "brightblue" => AnsiColors::BrightBlue,
            "brightmagenta" => AnsiColors::BrightMagenta,
            "brightcyan" => AnsiColors::BrightCyan,
            "brightwhite" => AnsiColors::BrightWhite,
            _ => return Err(ParseThemeColorError(s.to_string())),
        };
        Ok(ThemeColor(color))
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ParseThemeColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        let name = match color.0 {
            AnsiColors::Black => "black",
            AnsiColors::Red => "red",
            AnsiColors::Green => "green",
            AnsiColors::Yellow => "yellow",
            AnsiColors::Blue => "blue",
            AnsiColors::Magenta => "magenta",
            AnsiColors::Cyan => "cyan",
            AnsiColors::BrightBlack => "brightblack",
            AnsiColors::BrightRed => "brightred",
            AnsiColors::BrightGreen => "brightgreen",
            AnsiColors::BrightYellow => "brightyellow",
            AnsiColors::BrightBlue => "brightblue",
            AnsiColors::BrightMagenta => "brightmagenta",
            AnsiColors::BrightCyan => "brightcyan",
            AnsiColors::BrightWhite => "brightwhite",
            _ => "white",
        };
        name.to_string()
    }
}

impl ThemeColor {
    pub fn to_ansi_color(&self) -> AnsiColors {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

impl ThemeStyle {
    fn named(color: AnsiColors) -> Self {
        ThemeStyle { fg: Some(ThemeColor(color)) }
    }

    /// Default colours for every entry.
    pub fn default_theme_map() -> ThemeMap {
        ThemeEntry::ALL
            .into_iter()
            .map(|entry| {
                let color = match entry {
                    ThemeEntry::Header => AnsiColors::BrightWhite,
                    ThemeEntry::Success => AnsiColors::Green,
                    ThemeEntry::Info => AnsiColors::Cyan,
                    ThemeEntry::Warn => AnsiColors::Yellow,
                    ThemeEntry::Error => AnsiColors::Red,
                    ThemeEntry::StatLabel => AnsiColors::White,
                    ThemeEntry::StatValue => AnsiColors::BrightCyan,
                };
                (entry, ThemeStyle::named(color))
            })
            .collect()
    }

    /// Loads a theme file and fills in the entries it omits.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut custom: ThemeMap = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        for (entry, style) in Self::default_theme_map() {
            custom.entry(entry).or_insert(style);
        }
        Ok(custom)
    }
}

/// Loads a theme from `theme_path`, or the default theme.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_named_colors() {
        assert!("red".parse::<ThemeColor>().is_ok());
        assert!("BrightGreen".parse::<ThemeColor>().is_ok());
        assert!("mauve".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn partial_theme_file_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"error:\n  fg: brightmagenta\n")?;
        let theme = build_theme_map(Some(file.path()))?;

        let error = theme[&ThemeEntry::Error].fg.as_ref().map(ThemeColor::to_ansi_color);
        assert_eq!(error, Some(AnsiColors::BrightMagenta));
        assert_eq!(theme.len(), ThemeEntry::ALL.len());
        Ok(())
    }

    #[test]
    fn invalid_color_in_file_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"warn:\n  fg: mauve\n")?;
        assert!(build_theme_map(Some(file.path())).is_err());
        Ok(())
    }
}
