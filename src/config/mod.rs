use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-backend configuration block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct SourceConfig {
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub base_url: Option<String>,
}

/// Top-level vidplan config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct VidplanConfig {
    pub youtube: Option<SourceConfig>,
    pub news: Option<SourceConfig>,
    pub openai: Option<SourceConfig>,
    pub defaults: Option<Defaults>,
}

/// Generation defaults applied when the CLI flags are omitted.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Defaults {
    pub tone: Option<String>,
    pub length: Option<String>,
    pub locale: Option<String>,
}

impl VidplanConfig {
    /// Load config from ~/.vidplan/config.toml. Returns default if the file
    /// doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(VidplanConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: VidplanConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
        Ok(config)
    }

    pub fn default_tone(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.tone.as_deref())
    }

    pub fn default_length(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.length.as_deref())
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.locale.as_deref())
    }

    /// Display config with secrets redacted.
    pub fn display_redacted(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref yt) = self.youtube {
            lines.push("[youtube]".to_string());
            display_source_config(&mut lines, yt);
        }
        if let Some(ref news) = self.news {
            lines.push("[news]".to_string());
            display_source_config(&mut lines, news);
        }
        if let Some(ref oa) = self.openai {
            lines.push("[openai]".to_string());
            display_source_config(&mut lines, oa);
        }
        if let Some(ref d) = self.defaults {
            lines.push("[defaults]".to_string());
            if let Some(ref tone) = d.tone {
                lines.push(format!("  tone = \"{}\"", tone));
            }
            if let Some(ref length) = d.length {
                lines.push(format!("  length = \"{}\"", length));
            }
            if let Some(ref locale) = d.locale {
                lines.push(format!("  locale = \"{}\"", locale));
            }
        }
        if lines.is_empty() {
            lines.push("(no backends configured)".to_string());
        }
        lines.join("\n")
    }
}

fn display_source_config(lines: &mut Vec<String>, sc: &SourceConfig) {
    if let Some(ref key) = sc.api_key {
        let redacted = if key.len() > 8 {
            format!("{}...{}", &key[..4], &key[key.len() - 4..])
        } else {
            "****".to_string()
        };
        lines.push(format!("  api_key = \"{}\"", redacted));
    }
    if let Some(ref cmd) = sc.api_key_command {
        lines.push(format!("  api_key_command = \"{}\"", cmd));
    }
    if let Some(ref url) = sc.base_url {
        lines.push(format!("  base_url = \"{}\"", url));
    }
}

/// Resolve a setting through the chain: CLI flag > config `[defaults]` >
/// built-in default.
pub fn resolve_setting<'a>(
    flag: Option<&'a str>,
    configured: Option<&'a str>,
    builtin: &'a str,
) -> &'a str {
    flag.or(configured).unwrap_or(builtin)
}

/// Resolve a credential through the chain: CLI flag > env var > config key > config command.
pub fn resolve_credential(
    cli_flag: Option<&str>,
    env_var_name: &str,
    config: Option<&SourceConfig>,
) -> Result<String> {
    // 1. CLI flag
    if let Some(key) = cli_flag {
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }

    // 2. Environment variable
    if let Ok(val) = std::env::var(env_var_name) {
        if !val.is_empty() {
            return Ok(val);
        }
    }

    if let Some(sc) = config {
        // 3. Config file api_key
        if let Some(ref key) = sc.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        // 4. External command
        if let Some(ref cmd) = sc.api_key_command {
            if !cmd.is_empty() {
                let output = std::process::Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .output()
                    .with_context(|| format!("Failed to run api_key_command: {cmd}"))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!(
                        "api_key_command failed (exit {}): {}",
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    );
                }

                let secret = String::from_utf8(output.stdout)
                    .context("api_key_command output is not valid UTF-8")?
                    .trim()
                    .to_string();

                if !secret.is_empty() {
                    return Ok(secret);
                }
            }
        }
    }

    bail!(
        "No API key found. Provide via --api-key, {} env var, or ~/.vidplan/config.toml",
        env_var_name
    );
}

/// Path to the config file: ~/.vidplan/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".vidplan").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.vidplan/config.toml
# Credential resolution order: CLI flag > env var > api_key > api_key_command

[youtube]
# api_key = "your-youtube-data-api-key"
# api_key_command = "your-secrets-manager-command-here"

[openai]
# api_key = "your-openai-api-key"
# api_key_command = "your-secrets-manager-command-here"

[defaults]
# tone = "professional"
# length = "medium"
# locale = "KR"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_cli_flag() {
        let sc = SourceConfig {
            api_key: Some("from-config".into()),
            api_key_command: None,
            base_url: None,
        };
        let key = resolve_credential(Some("from-flag"), "VIDPLAN_TEST_UNSET", Some(&sc)).unwrap();
        assert_eq!(key, "from-flag");
    }

    #[test]
    fn resolve_falls_back_to_config_key() {
        let sc = SourceConfig {
            api_key: Some("from-config".into()),
            api_key_command: None,
            base_url: None,
        };
        let key = resolve_credential(None, "VIDPLAN_TEST_UNSET", Some(&sc)).unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn resolve_runs_key_command() {
        let sc = SourceConfig {
            api_key: None,
            api_key_command: Some("printf secret-from-cmd".into()),
            base_url: None,
        };
        let key = resolve_credential(None, "VIDPLAN_TEST_UNSET", Some(&sc)).unwrap();
        assert_eq!(key, "secret-from-cmd");
    }

    #[test]
    fn resolve_errors_when_nothing_configured() {
        assert!(resolve_credential(None, "VIDPLAN_TEST_UNSET", None).is_err());
    }

    #[test]
    fn parse_config_toml() {
        let config: VidplanConfig = toml::from_str(
            r#"
            [youtube]
            api_key = "yt-key"

            [defaults]
            tone = "casual"
            locale = "US"
            "#,
        )
        .unwrap();
        assert_eq!(config.youtube.unwrap().api_key.as_deref(), Some("yt-key"));
        assert_eq!(config.defaults.as_ref().unwrap().tone.as_deref(), Some("casual"));
        assert!(config.openai.is_none());
    }

    #[test]
    fn resolve_setting_flag_beats_config_beats_builtin() {
        assert_eq!(
            resolve_setting(Some("casual"), Some("energetic"), "professional"),
            "casual"
        );
        assert_eq!(
            resolve_setting(None, Some("energetic"), "professional"),
            "energetic"
        );
        assert_eq!(resolve_setting(None, None, "professional"), "professional");
    }

    #[test]
    fn defaults_accessors_read_the_block() {
        let config: VidplanConfig = toml::from_str(
            r#"
            [defaults]
            tone = "energetic"
            length = "long"
            locale = "US"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_tone(), Some("energetic"));
        assert_eq!(config.default_length(), Some("long"));
        assert_eq!(config.default_locale(), Some("US"));

        let empty = VidplanConfig::default();
        assert_eq!(empty.default_tone(), None);
        assert_eq!(empty.default_locale(), None);
    }

    #[test]
    fn redacted_display_masks_keys() {
        let config = VidplanConfig {
            youtube: Some(SourceConfig {
                api_key: Some("AIzaSyA-very-long-key-here".into()),
                api_key_command: None,
                base_url: None,
            }),
            news: None,
            openai: None,
            defaults: None,
        };
        let shown = config.display_redacted();
        assert!(shown.contains("AIza...here"));
        assert!(!shown.contains("very-long"));
    }
}
