// ptkit/src/commands/mod.rs
//! Subcommand implementations and the helpers they share.

pub mod analyze;
pub mod compile;
pub mod filter;
pub mod score;
pub mod unlabeled;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ptkit_core::{merge_config, PtkitConfig};

use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing success messages to stderr.
pub fn success_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_success_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Loads the built-in configuration and merges the user file over it.
pub fn load_config(user_path: Option<&Path>) -> Result<PtkitConfig> {
    let default_config = PtkitConfig::load_default()?;
    let user_config = user_path.map(PtkitConfig::load_from_file).transpose()?;
    let merged = merge_config(default_config, user_config);
    merged.validate().context("Merged configuration is invalid")?;
    debug!("Effective configuration: {:?}", merged);
    Ok(merged)
}

/// Opens the data sink: a buffered file, or buffered stdout. The sink is
/// `Send` so it can be driven from inside a rayon pool.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Reports lines the reader skipped as malformed.
pub fn report_skipped(skipped: usize, quiet: bool, theme: &ThemeMap) {
    if skipped > 0 && !quiet {
        warn_msg(format!("Skipped {} malformed line(s).", skipped), theme);
    }
}
