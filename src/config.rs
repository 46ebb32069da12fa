use crate::error::ScriptError;
use crate::interpreter::InterpreterOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCRIPT_EXTENSION: &str = "vns";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scripts_dir: PathBuf,
    pub start_script: String,
    pub env_name: String,
    /// Delay between revealed characters in the terminal player.
    pub text_speed_ms: u64,
    pub max_dispatch_steps: usize,
    pub advance_completes_reveal: bool,
}

fn env_name() -> String {
    env::var("VNS_ENV").unwrap_or_else(|_| String::from("default"))
}

fn base_dir() -> PathBuf {
    let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    PathBuf::from(env::var(home).unwrap_or_else(|_| String::from(".")))
        .join(".vnscript")
        .join(env_name())
}

impl Default for Config {
    fn default() -> Self {
        let scripts_dir = {
            // A local scripts directory wins over the per-environment one
            let local_scripts = Path::new("./scripts");
            if local_scripts.is_dir() {
                local_scripts.to_path_buf()
            } else {
                base_dir().join("scripts")
            }
        };

        Config {
            scripts_dir,
            start_script: String::from("main"),
            env_name: env_name(),
            text_speed_ms: 30,
            max_dispatch_steps: InterpreterOptions::default().max_dispatch_steps,
            advance_completes_reveal: false,
        }
    }
}

impl Config {
    /// Reads the config file of the current environment, falling back to
    /// defaults when there is none. Environment variables override both.
    pub fn load() -> Result<Self, ScriptError> {
        let config_path = Self::get_config_path();
        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            Self::from_json(&contents)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("VNS_SCRIPTS_DIR") {
            self.scripts_dir = PathBuf::from(dir);
        }
        if let Ok(script) = env::var("VNS_START_SCRIPT") {
            self.start_script = script;
        }
    }

    pub fn save(&self) -> Result<(), ScriptError> {
        let config_path = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        base_dir().join("config.json")
    }

    pub fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            max_dispatch_steps: self.max_dispatch_steps,
            advance_completes_reveal: self.advance_completes_reveal,
        }
    }

    /// Finds a script by path, then inside the scripts directory. The `.vns`
    /// extension may be left off.
    pub fn resolve_script(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let given = Path::new(name);
        let with_extension = if given.extension().is_none() {
            given.with_extension(SCRIPT_EXTENSION)
        } else {
            given.to_path_buf()
        };

        let candidates = [
            given.to_path_buf(),
            with_extension.clone(),
            self.scripts_dir.join(given),
            self.scripts_dir.join(&with_extension),
        ];
        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| ScriptError::missing_file(&self.scripts_dir.join(&with_extension)))
    }
}
