//! `fisibot config`: Configuration management commands.

use fisibot_config::AppConfig;
use std::path::Path;

use crate::runtime;

const REDACTED: &str = "***";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = config.credential_warnings();
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Model:       {}", config.model.name);
            println!("   Qdrant:      {} / {}", config.qdrant.url_or_default(), config.qdrant.collection);
            println!("   Encoder:     {}", config.encoder.model_id);
            println!("   Top k:       {}", config.retrieval.top_k);
            println!("   Gateway:     {}:{}", config.gateway.host, config.gateway.port);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config()?;
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new("fisibot.toml");
    if path.exists() {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("✅ Created {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. export GOOGLE_API_KEY='tu-clave'");
    println!("   2. export QDRANT_URL=... QDRANT_KEY=...");
    println!("   3. Run: fisibot serve");
    Ok(())
}

fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut config = config.clone();
    if config.model.api_key.is_some() {
        config.model.api_key = Some(REDACTED.into());
    }
    if config.qdrant.api_key.is_some() {
        config.qdrant.api_key = Some(REDACTED.into());
    }
    toml::to_string_pretty(&config)
}
