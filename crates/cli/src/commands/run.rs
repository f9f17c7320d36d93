//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::settings::load_resolution;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let (_, resolution) = load_resolution(&args.config)?;

    if !resolution.is_clean() {
        warn!(
            issues = resolution.issues.len(),
            "Configuration has unresolved parameters, continuing degraded"
        );
    }

    let settings = resolution.settings;
    info!(
        device = ?settings.device,
        input = ?settings.input,
        topic = %settings.input_topic(),
        output = %settings.point_cloud_topic,
        num_data_packets = ?settings.num_data_packets,
        "Configuration loaded"
    );

    let pipeline_config = PipelineConfig {
        settings,
        mock_rate: args.mock.then_some(args.mock_rate),
        log_clouds: args.log_clouds,
        max_clouds: (args.max_clouds > 0).then_some(args.max_clouds),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        clouds_published = stats.node.clouds_published,
        clouds_suppressed = stats.node.clouds_suppressed,
        duration_secs = stats.duration.as_secs_f64(),
        cloud_rate = format!("{:.2}", stats.cloud_rate()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("Velodyne Post finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, stopping node...");
}
