#[cfg(feature = "serde")]
use mcc_cli::{PipelineBuilder, PipelineConfig};

#[cfg(feature = "serde")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("MCC Configuration Serialization Demo");
    println!("====================================\n");

    let reference = PipelineConfig::reference_preset();
    let dense = PipelineConfig::dense_preset().with_metadata("High resolution", "500+ dpi scans");
    let diagnostic = PipelineConfig::diagnostic_preset();

    println!("Presets:");
    for cfg in [&reference, &dense, &diagnostic] {
        println!("   • {}", cfg.summary());
    }

    let dir = std::env::temp_dir();
    let json_path = dir.join("mcc_dense.json");
    let toml_path = dir.join("mcc_diagnostic.toml");

    dense.save_json(&json_path)?;
    diagnostic.save_toml(&toml_path)?;
    println!("\nSaved {} and {}", json_path.display(), toml_path.display());

    let dense_json = dense.to_json()?;
    println!("\nDense preset as JSON (first 200 chars):");
    println!("{}", &dense_json[..200.min(dense_json.len())]);

    let loaded_dense = PipelineConfig::load(&json_path)?;
    let loaded_diag = PipelineConfig::load(&toml_path)?;
    println!("\nReloaded JSON matches: {}", loaded_dense == dense);
    println!("Reloaded TOML matches: {}", loaded_diag == diagnostic);

    // Loaded configs can be tweaked further before building
    let matcher = loaded_dense.to_builder().top_k(5).threads(2).build()?;
    println!("\nBuilt matcher: {}", matcher.config().summary());

    let custom = PipelineBuilder::new().radius(20).bins(10).to_config();
    println!("\nCustom config as TOML:\n{}", custom.to_toml()?);

    std::fs::remove_file(&json_path).ok();
    std::fs::remove_file(&toml_path).ok();
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn main() {
    println!("This demo requires the 'serde' feature.");
    println!("Run with: cargo run --example config_serialization_demo --features serde");
}
