//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::{PostConfig, Resolution};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::settings::load_resolution;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Execute the `validate` command
///
/// Parse and validation errors fail the command; unresolved device or
/// transport names are reported but do not.
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config_path = args
        .config
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    info!(config = %config_path, "Validating configuration");

    let result = match load_resolution(&args.config) {
        Ok((config, resolution)) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            issues: resolution.issues.iter().map(ToString::to_string).collect(),
            warnings: collect_warnings(&config, &resolution),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            issues: Vec::new(),
            warnings: Vec::new(),
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

/// Collect non-fatal observations about the configuration
fn collect_warnings(config: &PostConfig, resolution: &Resolution) -> Vec<String> {
    let mut warnings = Vec::new();
    let settings = &resolution.settings;

    match &settings.calibration_file {
        Some(path) if !path.exists() => warnings.push(format!(
            "Calibration file {} does not exist - uncorrected geometry will be used",
            path.display()
        )),
        None => warnings.push("No calibration file - uncorrected geometry will be used".to_string()),
        _ => {}
    }

    if settings.num_data_packets.is_none() {
        warnings.push("Packets per cloud unresolved - no cloud will ever be published".to_string());
    }

    if let (Some(device), Some(n)) = (settings.device, config.transport.num_data_packets) {
        if n != device.default_num_data_packets() {
            warnings.push(format!(
                "num_data_packets = {} differs from the {} default of {}",
                n,
                device.name(),
                device.default_num_data_packets()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }

    if !result.issues.is_empty() {
        println!("\n✗ Unresolved parameters:");
        for issue in &result.issues {
            println!("  - {}", issue);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}
