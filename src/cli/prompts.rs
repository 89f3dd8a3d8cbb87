//! Interactive prompts using dialoguer

use anyhow::{bail, Result};
use dialoguer::MultiSelect;

use crate::pipeline::{AnalysisConfig, FactorGroup};

/// Let the user tick the factor groups to analyse; all start ticked
pub fn select_groups(config: &AnalysisConfig) -> Result<Vec<&FactorGroup>> {
    let names = config.group_names();
    let defaults = vec![true; names.len()];

    let chosen = MultiSelect::new()
        .with_prompt("Factor groups to analyse (space to toggle, enter to confirm)")
        .items(&names)
        .defaults(&defaults)
        .interact()?;

    if chosen.is_empty() {
        bail!("No factor group selected");
    }
    Ok(chosen
        .into_iter()
        .map(|i| &config.factor_groups[i])
        .collect())
}
