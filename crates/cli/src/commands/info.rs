//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{InputMode, NodeSettings};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::settings::load_resolution;

/// Resolved settings for JSON output
#[derive(Serialize)]
struct SettingsInfo {
    device: Option<String>,
    lasers: Option<usize>,
    calibration_file: Option<String>,
    num_data_packets: Option<usize>,
    min_distance: f64,
    max_distance: f64,
    input: InputInfo,
    output: OutputInfo,
    subscription_updater_period_ms: u128,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
}

#[derive(Serialize)]
struct InputInfo {
    mode: InputMode,
    topic: String,
    queue_depth: usize,
    hints: String,
}

#[derive(Serialize)]
struct OutputInfo {
    topic: String,
    queue_depth: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading configuration info");

    let (_, resolution) = load_resolution(&args.config).context("Failed to load configuration")?;
    let issues: Vec<String> = resolution.issues.iter().map(ToString::to_string).collect();
    let info = build_settings_info(&resolution.settings, issues);

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize settings info")?;
        println!("{}", json);
    } else {
        print_settings_info(&info);
    }

    Ok(())
}

fn build_settings_info(settings: &NodeSettings, issues: Vec<String>) -> SettingsInfo {
    SettingsInfo {
        device: settings.device.map(|d| d.name().to_string()),
        lasers: settings.device.map(|d| d.num_lasers()),
        calibration_file: settings
            .calibration_file
            .as_ref()
            .map(|p| p.display().to_string()),
        num_data_packets: settings.num_data_packets,
        min_distance: settings.min_distance,
        max_distance: settings.max_distance,
        input: InputInfo {
            mode: settings.input,
            topic: settings.input_topic().to_string(),
            queue_depth: settings.queue_depth,
            hints: format!("{:?}", settings.hints),
        },
        output: OutputInfo {
            topic: settings.point_cloud_topic.clone(),
            queue_depth: settings.queue_depth,
        },
        subscription_updater_period_ms: settings.updater_period.as_millis(),
        issues,
    }
}

fn print_settings_info(info: &SettingsInfo) {
    let unresolved = "<unresolved>".to_string();

    println!("\n=== Node Settings ===\n");
    println!("Sensor:");
    println!("  Device: {}", info.device.as_ref().unwrap_or(&unresolved));
    if let Some(lasers) = info.lasers {
        println!("  Lasers: {}", lasers);
    }
    println!(
        "  Calibration: {}",
        info.calibration_file.as_ref().unwrap_or(&unresolved)
    );
    println!(
        "  Packets per cloud: {}",
        info.num_data_packets
            .map(|n| n.to_string())
            .unwrap_or_else(|| unresolved.clone())
    );
    println!(
        "  Range filter: [{}, {}] m",
        info.min_distance, info.max_distance
    );

    println!("\nInput:");
    println!("  Mode: {:?}", info.input.mode);
    println!("  Topic: {}", info.input.topic);
    println!("  Queue depth: {}", info.input.queue_depth);
    println!("  Transport hints: {}", info.input.hints);

    println!("\nOutput:");
    println!("  Topic: {}", info.output.topic);
    println!("  Queue depth: {}", info.output.queue_depth);
    println!(
        "\nSubscription check every {} ms",
        info.subscription_updater_period_ms
    );

    if !info.issues.is_empty() {
        println!("\n✗ Configuration issues:");
        for issue in &info.issues {
            println!("  - {}", issue);
        }
    }

    println!();
}
