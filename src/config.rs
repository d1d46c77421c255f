// Configuration module for reading Planner.toml
// Arena size, search limits, emergency override and client settings live here

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub arena: ArenaConfig,
    pub search: SearchConfig,
    pub emergency: EmergencyConfig,
    pub client: ClientConfig,
    pub debug: DebugConfig,
}

/// Arena dimensions, shared with the game server
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    pub width: i32,
    pub height: i32,
}

/// Best-first search limits
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub max_iterations: u32,
    pub suppress_duplicate_pushes: bool,
    pub max_retarget_attempts: u32,
    #[serde(default)]
    pub rediscovery: RediscoveryPolicy,
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// What happens when the search reaches a cell that already has a cost
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RediscoveryPolicy {
    /// Only a strictly cheaper path replaces the recorded one
    #[default]
    RelaxIfBetter,
    /// The latest discovery always wins. Can leave predecessor cycles behind,
    /// after which no first step can be read off the path.
    AlwaysOverwrite,
}

/// Boundary-proximity override
#[derive(Debug, Deserialize, Clone)]
pub struct EmergencyConfig {
    pub enabled: bool,
    pub boundary_margin: i32,
}

/// UDP client settings
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    pub bind_host: String,
    pub source_port_base: u16,
    pub source_port_span: u16,
    pub recv_buffer_size: usize,
    /// Wait before re-sending the join command after the server refused a datagram
    pub rejoin_interval_ms: u64,
    /// Ask the server for a new game as soon as ours is over
    #[serde(default)]
    pub auto_restart: bool,
}

impl ClientConfig {
    /// Address of the game server
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Planner.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Planner.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Planner.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Planner.toml
    pub fn default_hardcoded() -> Self {
        Config {
            arena: ArenaConfig {
                width: 40,
                height: 40,
            },
            search: SearchConfig {
                max_iterations: 1000,
                suppress_duplicate_pushes: true,
                max_retarget_attempts: 16,
                rediscovery: RediscoveryPolicy::RelaxIfBetter,
                rng_seed: None,
            },
            emergency: EmergencyConfig {
                enabled: true,
                boundary_margin: 1,
            },
            client: ClientConfig {
                server_host: "127.0.0.1".to_string(),
                server_port: 3000,
                bind_host: "127.0.0.1".to_string(),
                source_port_base: 1300,
                source_port_span: 500,
                recv_buffer_size: 1024,
                rejoin_interval_ms: 1000,
                auto_restart: false,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "netsnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Same defaults on a different arena, handy for tests and small boards
    pub fn with_arena(width: i32, height: i32) -> Self {
        let mut config = Self::default_hardcoded();
        config.arena = ArenaConfig { width, height };
        config
    }

    /// Rejects values the planner or the client cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.arena.width < 1 || self.arena.height < 1 {
            return Err(format!(
                "Arena must be at least 1x1, got {}x{}",
                self.arena.width, self.arena.height
            ));
        }
        if self.emergency.boundary_margin < 0 {
            return Err("emergency.boundary_margin must not be negative".to_string());
        }
        if self.client.recv_buffer_size == 0 {
            return Err("client.recv_buffer_size must be positive".to_string());
        }
        if self.client.source_port_span == 0 {
            return Err("client.source_port_span must be positive".to_string());
        }
        if self.client.rejoin_interval_ms == 0 {
            return Err("client.rejoin_interval_ms must be positive".to_string());
        }
        Ok(())
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Planner.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.arena.width, 40);
        assert_eq!(config.search.max_iterations, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_planner_toml_can_be_parsed() {
        let result = Config::from_file("Planner.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Planner.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config =
            Config::from_file("Planner.toml").expect("Planner.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.arena, hardcoded_config.arena);
        assert_eq!(
            file_config.search.max_iterations,
            hardcoded_config.search.max_iterations
        );
        assert_eq!(
            file_config.search.suppress_duplicate_pushes,
            hardcoded_config.search.suppress_duplicate_pushes
        );
        assert_eq!(
            file_config.search.max_retarget_attempts,
            hardcoded_config.search.max_retarget_attempts
        );
        assert_eq!(
            file_config.search.rediscovery,
            hardcoded_config.search.rediscovery
        );
        assert_eq!(file_config.search.rng_seed, None);
        assert_eq!(
            file_config.emergency.boundary_margin,
            hardcoded_config.emergency.boundary_margin
        );
        assert_eq!(
            file_config.client.server_port,
            hardcoded_config.client.server_port
        );
        assert_eq!(
            file_config.client.recv_buffer_size,
            hardcoded_config.client.recv_buffer_size
        );
        assert_eq!(
            file_config.client.rejoin_interval_ms,
            hardcoded_config.client.rejoin_interval_ms
        );
        assert_eq!(
            file_config.client.auto_restart,
            hardcoded_config.client.auto_restart
        );
        assert_eq!(
            file_config.debug.log_file_path,
            hardcoded_config.debug.log_file_path
        );
    }

    #[test]
    fn test_seed_is_optional() {
        let toml_src = r#"
            [arena]
            width = 5
            height = 5

            [search]
            max_iterations = 10
            suppress_duplicate_pushes = false
            max_retarget_attempts = 2
            rng_seed = 7

            [emergency]
            enabled = false
            boundary_margin = 0

            [client]
            server_host = "localhost"
            server_port = 4000
            bind_host = "0.0.0.0"
            source_port_base = 2000
            source_port_span = 10
            recv_buffer_size = 64
            rejoin_interval_ms = 250

            [debug]
            enabled = true
            log_file_path = "x.jsonl"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.search.rng_seed, Some(7));
        assert_eq!(config.search.rediscovery, RediscoveryPolicy::RelaxIfBetter);
        assert_eq!(config.client.server_addr(), "localhost:4000");
        assert_eq!(config.client.rejoin_interval_ms, 250);
        assert!(!config.client.auto_restart);
    }

    #[test]
    fn test_rediscovery_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            rediscovery: RediscoveryPolicy,
        }
        let w: Wrapper = toml::from_str(r#"rediscovery = "always_overwrite""#).unwrap();
        assert_eq!(w.rediscovery, RediscoveryPolicy::AlwaysOverwrite);
        let w: Wrapper = toml::from_str(r#"rediscovery = "relax_if_better""#).unwrap();
        assert_eq!(w.rediscovery, RediscoveryPolicy::RelaxIfBetter);
        assert!(toml::from_str::<Wrapper>(r#"rediscovery = "sometimes""#).is_err());
    }

    #[test]
    fn test_zero_rejoin_interval_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.client.rejoin_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_arena_is_rejected() {
        let config = Config::with_arena(0, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
