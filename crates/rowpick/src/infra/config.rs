//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".rowpick/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub keybindings: Keybindings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_page_size")]
    pub page_size: usize,
    #[serde(default = "Defaults::default_export_format")]
    pub export_format: String,
    #[serde(default = "Defaults::default_zebra_stripes")]
    pub zebra_stripes: bool,
}

impl Defaults {
    fn default_page_size() -> usize {
        25
    }

    fn default_export_format() -> String {
        "csv".into()
    }

    fn default_zebra_stripes() -> bool {
        true
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            export_format: Self::default_export_format(),
            zebra_stripes: Self::default_zebra_stripes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybindings {
    #[serde(default = "Keybindings::default_up")]
    pub up: String,
    #[serde(default = "Keybindings::default_down")]
    pub down: String,
    #[serde(default = "Keybindings::default_select")]
    pub select: String,
    #[serde(default = "Keybindings::default_select_page")]
    pub select_page: String,
    #[serde(default = "Keybindings::default_select_all")]
    pub select_all: String,
    #[serde(default = "Keybindings::default_export")]
    pub export: String,
}

impl Keybindings {
    fn default_up() -> String {
        "k".into()
    }

    fn default_down() -> String {
        "j".into()
    }

    fn default_select() -> String {
        "space".into()
    }

    fn default_select_page() -> String {
        "a".into()
    }

    fn default_select_all() -> String {
        "shift+a".into()
    }

    fn default_export() -> String {
        "ctrl+e".into()
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: Self::default_up(),
            down: Self::default_down(),
            select: Self::default_select(),
            select_page: Self::default_select_page(),
            select_all: Self::default_select_all(),
            export: Self::default_export(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    page_size: Option<usize>,
    export_format: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            page_size: env::var("ROWPICK_PAGE_SIZE")
                .ok()
                .and_then(|value| value.parse().ok()),
            export_format: env::var("ROWPICK_EXPORT_FORMAT").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(page_size: usize, export_format: &str) -> Self {
        Self {
            page_size: Some(page_size),
            export_format: Some(export_format.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace
    /// config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            keybindings: merge_keybindings(self.keybindings, other.keybindings),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        page_size: if overlay.page_size != Defaults::default_page_size() {
            overlay.page_size
        } else {
            base.page_size
        },
        export_format: if overlay.export_format != Defaults::default_export_format() {
            overlay.export_format
        } else {
            base.export_format
        },
        zebra_stripes: if overlay.zebra_stripes != Defaults::default_zebra_stripes() {
            overlay.zebra_stripes
        } else {
            base.zebra_stripes
        },
    }
}

fn merge_keybindings(base: Keybindings, overlay: Keybindings) -> Keybindings {
    Keybindings {
        up: choose_keybinding(base.up, overlay.up, Keybindings::default_up),
        down: choose_keybinding(base.down, overlay.down, Keybindings::default_down),
        select: choose_keybinding(base.select, overlay.select, Keybindings::default_select),
        select_page: choose_keybinding(
            base.select_page,
            overlay.select_page,
            Keybindings::default_select_page,
        ),
        select_all: choose_keybinding(
            base.select_all,
            overlay.select_all,
            Keybindings::default_select_all,
        ),
        export: choose_keybinding(base.export, overlay.export, Keybindings::default_export),
    }
}

fn choose_keybinding(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("rowpick/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    Ok(Some(cwd.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(page_size) = env.page_size {
        config.defaults.page_size = page_size;
    }
    if let Some(export_format) = env.export_format {
        config.defaults.export_format = export_format;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.defaults.page_size, 25);
        assert_eq!(config.defaults.export_format, "csv");
        assert!(config.defaults.zebra_stripes);
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[defaults]
page_size = 50
[keybindings]
select = "enter"
"#,
        )?;

        let workspace = temp.path().join("workspace-config.toml");
        fs::write(
            &workspace,
            r#"
[defaults]
export_format = "json"
"#,
        )?;

        let config =
            Config::load_with_layers(Some(global), Some(workspace), EnvOverrides::default())?;

        assert_eq!(config.defaults.page_size, 50);
        assert_eq!(config.defaults.export_format, "json");
        assert_eq!(config.keybindings.select, "enter");
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests(10, "json");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.defaults.page_size, 10);
        assert_eq!(config.defaults.export_format, "json");
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
