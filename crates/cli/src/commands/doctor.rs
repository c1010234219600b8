//! `fisibot doctor`: Diagnose configuration and backends.

use fisibot_config::{AppConfig, CONFIG_PATH_ENV};
use fisibot_retrieval::QdrantIndex;
use std::path::PathBuf;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Fisibot Doctor: diagnóstico del sistema");
    println!("==========================================\n");

    let mut issues = 0;

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("fisibot.toml"));
    if config_path.exists() {
        println!("  ✅ Config file: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue found. Fix the configuration and re-run.");
            return Ok(());
        }
    };

    let warnings = config.credential_warnings();
    if warnings.is_empty() {
        println!("  ✅ Credentials configured");
    }
    for warning in &warnings {
        println!("  ⚠️  {warning}");
        issues += 1;
    }

    match QdrantIndex::from_config(&config.qdrant) {
        Ok(index) => match index.health_check().await {
            Ok(true) => println!("  ✅ Qdrant collection '{}' reachable", index.collection()),
            Ok(false) => {
                println!("  ❌ Qdrant reachable but collection '{}' not found", index.collection());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Qdrant unreachable at {}: {e}", config.qdrant.url_or_default());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Qdrant client error: {e}");
            issues += 1;
        }
    }

    match fisibot_providers::from_config(&config.model) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Model provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ❌ Model provider '{}' rejected the request", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Model provider error: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ⚠️  Model provider not configured: {e}");
            issues += 1;
        }
    }

    println!(
        "  ℹ️  Encoder: {} (revision {}, max {} tokens)",
        config.encoder.model_id, config.encoder.revision, config.encoder.max_length
    );

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
