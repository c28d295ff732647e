//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{RouterBlueprint, TransportConfig};
use std::time::Duration;
use tracing::{error, info};

use crate::cli::{RunArgs, TransportKind};
use crate::error::ensure_config_exists;
use crate::pipeline::{LoadRun, LoadRunConfig, MessageGenerator};

/// Execute the `run` command
pub async fn run_router(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    ensure_config_exists(&args.config)?;

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;

    let mix = MessageGenerator::parse_mix(&args.mix)?;

    info!(
        vendors = blueprint.vendors.len(),
        preferences = blueprint.preferences.len(),
        transport = blueprint.transport.kind(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let config = LoadRunConfig {
        blueprint,
        generator: MessageGenerator::new(args.messages, mix),
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    info!("Starting router...");

    let stats = LoadRun::new(config)
        .run(shutdown_signal())
        .await
        .context("Load run failed")?;

    stats.print_summary();

    info!("Blaster finished");
    Ok(())
}

/// Apply CLI overrides on top of the file configuration
fn apply_overrides(blueprint: &mut RouterBlueprint, args: &RunArgs) {
    if let Some(kind) = args.transport {
        info!(transport = ?kind, "Overriding transport from CLI");
        blueprint.transport = match kind {
            TransportKind::Http => TransportConfig::default(),
            TransportKind::Log => TransportConfig::Log,
            TransportKind::Mock => TransportConfig::Mock {
                latency_ms: 0,
                fail_every: 0,
            },
        };
    }
    if let Some(ms) = args.poll_interval_ms {
        info!(poll_interval_ms = ms, "Overriding retry poll interval from CLI");
        blueprint.router.retry_poll_interval_ms = ms;
    }
    if let Some(ms) = args.delivery_timeout_ms {
        info!(delivery_timeout_ms = ms, "Overriding delivery timeout from CLI");
        blueprint.router.delivery_timeout_ms = ms;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RouterBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Transport: {}", blueprint.transport.kind());
    println!(
        "Retry: poll every {} ms, {} worker(s) per message type",
        blueprint.router.retry_poll_interval_ms, blueprint.router.retry_workers_per_type
    );
    println!("Delivery timeout: {} ms", blueprint.router.delivery_timeout_ms);

    println!("\nVendors ({}):", blueprint.vendors.len());
    for vendor in &blueprint.vendors {
        println!(
            "  - {} (id {}, budget {}) -> {}",
            vendor.name, vendor.id, vendor.budget, vendor.locator
        );
    }

    println!("\nPreferences ({}):", blueprint.preferences.len());
    for pref in &blueprint.preferences {
        let names: Vec<_> = pref.candidates.iter().map(|c| c.vendor.as_str()).collect();
        println!("  - {}: {}", pref.message_type, names.join(" > "));
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["run"];
        argv.extend_from_slice(extra);
        RunArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_apply_overrides() {
        let mut blueprint: RouterBlueprint =
            serde_json::from_str(r#"{ "vendors": [] }"#).unwrap();

        apply_overrides(
            &mut blueprint,
            &args(&[
                "--transport",
                "log",
                "--poll-interval-ms",
                "3",
                "--delivery-timeout-ms",
                "250",
            ]),
        );

        assert_eq!(blueprint.transport, TransportConfig::Log);
        assert_eq!(blueprint.router.retry_poll_interval_ms, 3);
        assert_eq!(blueprint.router.delivery_timeout_ms, 250);
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let mut blueprint: RouterBlueprint =
            serde_json::from_str(r#"{ "vendors": [], "transport": { "kind": "log" } }"#).unwrap();

        apply_overrides(&mut blueprint, &args(&[]));

        assert_eq!(blueprint.transport, TransportConfig::Log);
        assert_eq!(blueprint.router.retry_poll_interval_ms, 10);
    }
}
