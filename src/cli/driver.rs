//! The composition driver: discover inputs, load them, compose, write.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cli::args::CliArgs;
use crate::cli::config::{ResolvedOptions, find_config, load_config, resolve_options};
use declgraph_composer::{ComposedModel, Composer};
use declgraph_model::FileParseResult;

/// Exit status when composition succeeded.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when `--fail-on-warnings` is set and diagnostics were produced.
pub const EXIT_DIAGNOSTICS: i32 = 1;

#[derive(Debug, Clone)]
pub struct CompositionResult {
    pub model: ComposedModel,
    pub files_read: Vec<PathBuf>,
    /// Where the model was written; `None` means the caller prints it.
    pub output: Option<PathBuf>,
    pub pretty: bool,
    pub fail_on_warnings: bool,
}

impl CompositionResult {
    pub fn exit_code(&self) -> i32 {
        if self.fail_on_warnings && !self.model.diagnostics.is_empty() {
            EXIT_DIAGNOSTICS
        } else {
            EXIT_SUCCESS
        }
    }
}

/// One input file holds either a single parse result or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Many(Vec<FileParseResult>),
    One(Box<FileParseResult>),
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<CompositionResult> {
    let config_path = find_config(args.config.as_deref(), cwd)?;
    let config = config_path.as_deref().map(load_config).transpose()?;
    let config_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(cwd)
        .to_path_buf();
    let options = resolve_options(args, config.as_ref(), &config_dir, cwd);
    compose_with(&options)
}

#[tracing::instrument(level = "info", skip_all, fields(inputs = options.inputs.len()))]
pub fn compose_with(options: &ResolvedOptions) -> Result<CompositionResult> {
    if options.inputs.is_empty() {
        bail!("no inputs given; pass parse-result files or directories, or list them in declgraph.json");
    }

    let files = discover_inputs(&options.inputs)?;
    let mut results = Vec::new();
    for file in &files {
        results.extend(load_parse_results(file)?);
    }
    debug!(files = files.len(), parse_results = results.len(), "inputs loaded");

    let model = Composer::new(options.composer.clone()).compose(&results);

    if let Some(out) = &options.out {
        let json = render_model(&model, options.pretty)?;
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
        info!(out = %out.display(), "model written");
    }

    Ok(CompositionResult {
        model,
        files_read: files,
        output: options.out.clone(),
        pretty: options.pretty,
        fail_on_warnings: options.fail_on_warnings,
    })
}

/// Expand directories into their `*.json` files, sorted for a stable
/// composition order. Explicit files are taken as given.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            bail!("input {} does not exist", input.display());
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry =
                entry.with_context(|| format!("failed to walk {}", input.display()))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_none_or(|name| name != crate::cli::config::CONFIG_FILE_NAME)
            {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Read one input file. Results without a `path` get the file's own path so
/// diagnostics point somewhere useful.
pub fn load_parse_results(path: &Path) -> Result<Vec<FileParseResult>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: InputFile = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a parse result", path.display()))?;
    let mut results = match parsed {
        InputFile::Many(results) => results,
        InputFile::One(result) => vec![*result],
    };
    for result in &mut results {
        if result.path.is_none() {
            result.path = Some(path.display().to_string());
        }
    }
    Ok(results)
}

pub fn render_model(model: &ComposedModel, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(model)
    } else {
        serde_json::to_string(model)
    };
    json.context("failed to serialize composed model")
}
