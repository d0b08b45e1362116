use anyhow::{bail, Context, Result};
use bandbook_ai::config::{self, Config};
use bandbook_core::model::Language;
use std::path::Path;
use toml_edit::{value, DocumentMut};

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for key in Config::KEYS {
        if let Some(shown) = config.display_value(key) {
            println!("  {key}: {shown}");
        }
    }

    println!("\nPriority: CLI args > ENV vars (BAND_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value, or print the whole file.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        match config.display_value(&key) {
            Some(shown) => println!("{shown}"),
            None => bail!(
                "Unknown config key: {key}\n\nValid keys: {}",
                Config::KEYS.join(", ")
            ),
        }
    } else {
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{contents}");
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'bandbook config init' to create it.");
        }
    }

    Ok(())
}

/// Write `key = value` into the TOML document, keeping comments and layout.
fn apply_setting(doc: &mut DocumentMut, key: &str, raw: &str) -> Result<()> {
    match key {
        "database_path" | "ai_api_key" | "ai_base_url" | "ai_model" => {
            doc[key] = value(raw);
        }
        "ai_timeout_secs" => {
            let secs: i64 = raw
                .parse()
                .with_context(|| format!("{key} must be a whole number of seconds"))?;
            if secs <= 0 {
                bail!("{key} must be positive");
            }
            doc[key] = value(secs);
        }
        "target_language" => {
            let language: Language = raw.parse()?;
            doc[key] = value(language.to_string());
        }
        _ => bail!(
            "Unknown config key: {key}\n\nValid keys: {}",
            Config::KEYS.join(", ")
        ),
    }
    Ok(())
}

fn set_in_file(path: &Path, key: &str, raw: &str) -> Result<()> {
    let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
    let mut doc: DocumentMut = contents.parse().context("Config file is not valid TOML")?;
    apply_setting(&mut doc, key, raw)?;
    std::fs::write(path, doc.to_string()).context("Failed to write config file")?;
    Ok(())
}

/// Set a config value.
pub fn set_config(key: &str, raw: &str) -> Result<()> {
    let config_path = config::config_file_path();
    config::ensure_config_file()?;

    set_in_file(&config_path, key, raw)?;

    let shown = if key == "ai_api_key" { "<hidden>" } else { raw };
    println!("✓ Updated {key} = {shown}");
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure bandbook.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_keeps_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, config::example_config()).unwrap();

        set_in_file(&path, "ai_model", "local-model").unwrap();
        set_in_file(&path, "ai_timeout_secs", "15").unwrap();
        set_in_file(&path, "target_language", "English").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# Bandbook Configuration File"));

        let parsed: Config = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.ai_model, "local-model");
        assert_eq!(parsed.ai_timeout_secs, 15);
        assert_eq!(parsed.target_language, Language::English);
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut doc: DocumentMut = "ai_model = \"a\"\n".parse().unwrap();
        apply_setting(&mut doc, "ai_model", "b").unwrap();
        assert_eq!(doc["ai_model"].as_str(), Some("b"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut doc = DocumentMut::new();
        assert!(apply_setting(&mut doc, "ai_timeout_secs", "soon").is_err());
        assert!(apply_setting(&mut doc, "ai_timeout_secs", "0").is_err());
        assert!(apply_setting(&mut doc, "target_language", "klingon").is_err());
        assert!(apply_setting(&mut doc, "nonsense", "1").is_err());
    }
}
