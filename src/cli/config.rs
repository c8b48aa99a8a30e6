//! `declgraph.json` loading and option resolution.
//!
//! Command line flags win over the config file, which wins over
//! [`ComposerOptions::default`].

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::cli::args::CliArgs;
use declgraph_composer::ComposerOptions;

pub const CONFIG_FILE_NAME: &str = "declgraph.json";

/// Accepts `true`, `"true"`, `"yes"`, `"1"` and their negatives.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeclgraphConfig {
    /// Input files or directories, relative to the config file.
    #[serde(default)]
    pub inputs: Option<Vec<String>>,
    /// Output file, relative to the config file.
    #[serde(default)]
    pub out: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub pretty: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub fail_on_warnings: Option<bool>,
    #[serde(default)]
    pub composer_options: Option<ComposerConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub serial: Option<bool>,
    #[serde(default)]
    pub max_alias_depth: Option<u32>,
    #[serde(default)]
    pub max_resolution_depth: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strip_generic_arguments_for_inheritance: Option<bool>,
}

/// Everything the driver needs, after merging flags and config.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOptions {
    pub composer: ComposerOptions,
    pub inputs: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub pretty: bool,
    pub fail_on_warnings: bool,
}

pub fn parse_config(source: &str) -> Result<DeclgraphConfig> {
    serde_json::from_str(source).context("failed to parse declgraph config")
}

pub fn load_config(path: &Path) -> Result<DeclgraphConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&source).with_context(|| format!("in {}", path.display()))
}

/// Locate the config file: an explicit `--config` (file or directory), else
/// `declgraph.json` in `cwd` if present.
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    let Some(explicit) = explicit else {
        let candidate = cwd.join(CONFIG_FILE_NAME);
        return Ok(candidate.is_file().then_some(candidate));
    };
    let path = if explicit.is_absolute() {
        explicit.to_path_buf()
    } else {
        cwd.join(explicit)
    };
    if path.is_dir() {
        let candidate = path.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            bail!("no {CONFIG_FILE_NAME} in {}", path.display());
        }
        return Ok(Some(candidate));
    }
    if !path.is_file() {
        bail!("config file {} does not exist", path.display());
    }
    Ok(Some(path))
}

/// Merge `args` over `config`. Relative paths from the command line resolve
/// against `cwd`, those from the config file against `config_dir`.
pub fn resolve_options(
    args: &CliArgs,
    config: Option<&DeclgraphConfig>,
    config_dir: &Path,
    cwd: &Path,
) -> ResolvedOptions {
    let mut resolved = ResolvedOptions::default();
    let from_cwd = |path: &Path| cwd.join(path);
    let from_config = |path: &str| config_dir.join(path);

    if let Some(config) = config {
        if let Some(inputs) = &config.inputs {
            resolved.inputs = inputs.iter().map(|input| from_config(input)).collect();
        }
        resolved.out = config.out.as_deref().map(from_config);
        resolved.pretty = config.pretty.unwrap_or(false);
        resolved.fail_on_warnings = config.fail_on_warnings.unwrap_or(false);
        if let Some(composer) = &config.composer_options {
            apply_composer_config(&mut resolved.composer, composer);
        }
    }

    if !args.inputs.is_empty() {
        resolved.inputs = args.inputs.iter().map(|input| from_cwd(input)).collect();
    }
    if let Some(out) = &args.out {
        resolved.out = Some(from_cwd(out));
    }
    resolved.pretty |= args.pretty;
    resolved.fail_on_warnings |= args.fail_on_warnings;
    resolved.composer.serial |= args.serial;
    resolved
}

fn apply_composer_config(options: &mut ComposerOptions, config: &ComposerConfig) {
    if let Some(serial) = config.serial {
        options.serial = serial;
    }
    if let Some(depth) = config.max_alias_depth {
        options.max_alias_depth = depth;
    }
    if let Some(depth) = config.max_resolution_depth {
        options.max_resolution_depth = depth;
    }
    if let Some(strip) = config.strip_generic_arguments_for_inheritance {
        options.strip_generic_arguments_for_inheritance = strip;
    }
}
