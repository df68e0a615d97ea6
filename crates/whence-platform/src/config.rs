//! User configuration: built-in defaults, then the config file, then
//! `WHENCE_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use figment::{
    Figment,
    providers::{self, Format, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::{DEFAULT_ADMIN_DIRS, Widen};

pub const ENV_PREFIX: &str = "WHENCE_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown color choice '{other}' (expected auto, always or never)")),
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub widen:             Widen,
    pub admin_dirs:        Vec<PathBuf>,
    pub alternatives_dirs: Vec<PathBuf>,
    /// Shell started to capture state when none is piped in.
    pub bash:              String,
    pub color:             ColorChoice,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            widen:             Widen::Auto,
            admin_dirs:        DEFAULT_ADMIN_DIRS.iter().map(PathBuf::from).collect(),
            alternatives_dirs: vec![PathBuf::from(whence_resolve::report::DEFAULT_ALTERNATIVES_DIR)],
            bash:              "bash".to_string(),
            color:             ColorChoice::Auto,
        }
    }
}

/// `$XDG_CONFIG_HOME/whence/config.toml`, else `~/.config/whence/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|p| p.join(".config")))
        .map(|dir| dir.join("whence").join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut fig = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_path() {
            tracing::debug!(path = %path.display(), "config file");
            fig = fig.merge(providers::Toml::file(path));
        }
        Self::from_figment(fig.merge(providers::Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(fig: Figment) -> Result<Self> { Ok(fig.extract()?) }
}
