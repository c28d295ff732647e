//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RouterBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_config_exists;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    transport: String,
    router: RouterInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vendors: Vec<VendorInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preferences: Vec<PreferenceInfo>,
}

#[derive(Serialize)]
struct RouterInfo {
    inbound_capacity: usize,
    retry_poll_interval_ms: u64,
    retry_workers_per_type: usize,
    delivery_timeout_ms: u64,
    drain_timeout_ms: u64,
}

#[derive(Serialize)]
struct VendorInfo {
    id: u32,
    name: String,
    budget: u64,
    locator: String,
}

#[derive(Serialize)]
struct PreferenceInfo {
    message_type: String,
    candidates: Vec<CandidateInfo>,
}

#[derive(Serialize)]
struct CandidateInfo {
    vendor: String,
    weight: f32,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &RouterBlueprint, args: &InfoArgs) -> ConfigInfo {
    let vendors = if args.vendors {
        blueprint
            .vendors
            .iter()
            .map(|v| VendorInfo {
                id: v.id,
                name: v.name.clone(),
                budget: v.budget,
                locator: v.locator.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let preferences = if args.preferences {
        blueprint
            .preferences
            .iter()
            .map(|p| PreferenceInfo {
                message_type: p.message_type.to_string(),
                candidates: p
                    .candidates
                    .iter()
                    .map(|c| CandidateInfo {
                        vendor: c.vendor.clone(),
                        weight: c.weight,
                    })
                    .collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let settings = &blueprint.router;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        transport: blueprint.transport.kind().to_string(),
        router: RouterInfo {
            inbound_capacity: settings.inbound_capacity,
            retry_poll_interval_ms: settings.retry_poll_interval_ms,
            retry_workers_per_type: settings.retry_workers_per_type,
            delivery_timeout_ms: settings.delivery_timeout_ms,
            drain_timeout_ms: settings.drain_timeout_ms,
        },
        vendors,
        preferences,
    }
}

fn print_config_info(blueprint: &RouterBlueprint, args: &InfoArgs) {
    println!("=== Blaster Configuration ===\n");

    let settings = &blueprint.router;
    println!("Router");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Transport: {}", blueprint.transport.kind());
    println!("   ├─ Inbound capacity: {}", settings.inbound_capacity);
    println!(
        "   ├─ Retry: every {} ms, {} worker(s) per type",
        settings.retry_poll_interval_ms, settings.retry_workers_per_type
    );
    println!("   ├─ Delivery timeout: {} ms", settings.delivery_timeout_ms);
    println!("   └─ Drain timeout: {} ms", settings.drain_timeout_ms);

    println!("\nVendors ({})", blueprint.vendors.len());
    for (i, vendor) in blueprint.vendors.iter().enumerate() {
        let prefix = tree_prefix(i, blueprint.vendors.len());
        if args.vendors {
            println!(
                "   {} {} (id {}, budget {}) -> {}",
                prefix, vendor.name, vendor.id, vendor.budget, vendor.locator
            );
        } else {
            println!("   {} {} (budget {})", prefix, vendor.name, vendor.budget);
        }
    }

    println!("\nPreferences ({})", blueprint.preferences.len());
    for (i, pref) in blueprint.preferences.iter().enumerate() {
        let prefix = tree_prefix(i, blueprint.preferences.len());
        let order: Vec<_> = pref.candidates.iter().map(|c| c.vendor.as_str()).collect();
        println!("   {} {}: {}", prefix, pref.message_type, order.join(" > "));

        if args.preferences {
            let child_prefix = if i + 1 == blueprint.preferences.len() {
                "   "
            } else {
                "│  "
            };
            for (j, candidate) in pref.candidates.iter().enumerate() {
                println!(
                    "   {}  {} {}. {} (weight {})",
                    child_prefix,
                    tree_prefix(j, pref.candidates.len()),
                    j + 1,
                    candidate.vendor,
                    candidate.weight
                );
            }
        }
    }

    println!();
}

fn tree_prefix(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "└─"
    } else {
        "├─"
    }
}
