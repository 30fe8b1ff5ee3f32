//! `ptkit compile-lexicon`: text lexicon to binary model.

use anyhow::Result;
use log::info;
use std::path::Path;

use ptkit_core::{BilingualLexicon, PtkitConfig};

use super::success_msg;
use crate::ui::theme::ThemeMap;

pub fn run_compile_lexicon(
    config: &PtkitConfig,
    input: &Path,
    output: &Path,
    quiet: bool,
    theme: &ThemeMap,
) -> Result<usize> {
    info!("Compiling lexicon {} into {}", input.display(), output.display());
    let lexicon = BilingualLexicon::load(input, &config.lexicon.null_token)?;
    lexicon.save_binary(output)?;

    if !quiet {
        success_msg(
            format!("Compiled {} lexicon entries into {}", lexicon.len(), output.display()),
            theme,
        );
    }
    Ok(lexicon.len())
}
