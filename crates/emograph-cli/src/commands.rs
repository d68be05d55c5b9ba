//! Subcommand implementations
//!
//! Each command returns the text to print so it can be exercised without a
//! terminal.

use crate::fixture::FixtureClient;
use anyhow::{bail, Context, Result};
use emograph_blueprint::{
    format_yaml_for_display, Blueprint, OutputDocument, ValidatedBlueprint, ValidationOptions,
};
use emograph_core::{load_prompt, load_system_config, Engine, EngineConfig, Session};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn write_validated(out: &mut String, validated: &ValidatedBlueprint) -> Result<()> {
    for warning in &validated.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    out.push_str(&validated.blueprint.to_yaml()?);
    Ok(())
}

/// `emograph validate`
///
/// # Errors
/// IO failure or the first schema error found.
pub fn validate(path: &Path, output_document: bool) -> Result<String> {
    let text = read(path)?;
    let mut out = String::new();

    if output_document {
        let document = OutputDocument::from_yaml(&text, &ValidationOptions::default())
            .with_context(|| format!("{} is not a valid output document", path.display()))?;
        writeln!(out, "response: {}", document.response)?;
        write_validated(&mut out, &document.blueprint)?;
    } else {
        let validated = if is_json(path) {
            Blueprint::from_json(&text)
        } else {
            Blueprint::from_yaml(&text)
        }
        .with_context(|| format!("{} is not a valid blueprint", path.display()))?;
        write_validated(&mut out, &validated)?;
    }

    tracing::info!(path = %path.display(), "blueprint valid");
    Ok(out)
}

/// `emograph format`
///
/// # Errors
/// IO failure or malformed YAML.
pub fn format(path: &Path) -> Result<String> {
    let text = read(path)?;
    format_yaml_for_display(&text).with_context(|| format!("{} is not valid YAML", path.display()))
}

/// Options for `emograph generate`
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub fixtures: PathBuf,
    pub config: Option<PathBuf>,
    pub prompt: Option<PathBuf>,
    pub count: Option<usize>,
    pub select: Option<usize>,
    pub idea: String,
}

/// `emograph generate`
///
/// # Errors
/// Config, fixture, or prompt loading failure; no candidates; bad selection.
pub async fn generate(args: GenerateArgs) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => load_system_config(path)?.generation,
        None => EngineConfig::default(),
    };
    if let Some(count) = args.count {
        config = config.with_candidate_count(count);
    }

    let client = FixtureClient::load(&args.fixtures)?;
    tracing::info!(fixtures = client.len(), candidates = config.candidate_count, "generating");
    let engine = Engine::new(client, config)?;

    let mut session = Session::new();
    if let Some(path) = &args.prompt {
        session = session.with_system_prompt(load_prompt(path)?);
    }

    let mut out = String::new();
    let candidates = engine.process_turn(&mut session, args.idea).await?;
    if let Some(index) = args.select.filter(|&i| i >= candidates.len()) {
        let available = candidates
            .iter()
            .enumerate()
            .map(|(position, c)| format!("{position}: {}", c.response))
            .collect::<Vec<_>>()
            .join("; ");
        bail!(
            "--select {index} is out of range: {} candidate(s) generated ({available})",
            candidates.len()
        );
    }
    for (position, candidate) in candidates.iter().enumerate() {
        writeln!(
            out,
            "== candidate {position} (slot {}, {} attempt(s)) ==",
            candidate.index, candidate.attempts
        )?;
        writeln!(out, "{}", candidate.response)?;
        for warning in &candidate.warnings {
            writeln!(out, "warning: {warning}")?;
        }
        out.push_str(&candidate.blueprint.to_yaml()?);
    }

    if let Some(index) = args.select {
        session.select(index)?;
        writeln!(out, "== history ==")?;
        for message in session.transcript().messages() {
            writeln!(out, "[{}] {}", message.role.as_str(), message.content)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extension_detection() {
        assert!(is_json(Path::new("scene.JSON")));
        assert!(!is_json(Path::new("scene.yml")));
        assert!(!is_json(Path::new("scene")));
    }
}
