use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vault_export::{ExportSettings, SelectableItem};
use vault_logging::vault_info;

const ENV_API_URL: &str = "VAULT_API_URL";
const ENV_TOKEN: &str = "VAULT_TOKEN";

/// Reads settings from a RON file, or defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<ExportSettings> {
    let Some(path) = path else {
        return Ok(ExportSettings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings: ExportSettings = ron::from_str(&content)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    vault_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Environment variables win over the file; explicit flags win over both.
pub fn apply_overrides(
    settings: &mut ExportSettings,
    api_url: Option<String>,
    token: Option<String>,
    max_concurrent: Option<usize>,
) {
    if let Some(url) = api_url.or_else(|| std::env::var(ENV_API_URL).ok()) {
        settings.api_base_url = url;
    }
    if let Some(token) = token.or_else(|| std::env::var(ENV_TOKEN).ok()) {
        settings.bearer_token = Some(token);
    }
    if let Some(max) = max_concurrent {
        settings.max_concurrent_transfers = max;
    }
}

/// Reads the JSON listing of files to export.
pub fn load_selection(path: &Path) -> Result<Vec<SelectableItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading selection from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing selection in {}", path.display()))
}
