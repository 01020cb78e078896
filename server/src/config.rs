use volley_shared::config::AnimationConfig;

/// Environment variable overriding the listen address.
pub const LISTEN_ADDR_ENV: &str = "VOLLEY_LISTEN_ADDR";

/// Server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Capacity of the control command channel into the loop task
    pub command_capacity: usize,
    /// Frames buffered per client before it starts lagging
    pub frame_capacity: usize,
    pub animation: AnimationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9002".to_string(),
            command_capacity: 256,
            frame_capacity: 64,
            animation: AnimationConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults with the listen address taken from the environment if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
            if !addr.trim().is_empty() {
                config.listen_addr = addr.trim().to_string();
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("listen_addr '{}' is not a socket address", self.listen_addr));
        }
        if self.command_capacity == 0 {
            return Err("command_capacity must be > 0".to_string());
        }
        if self.frame_capacity == 0 {
            return Err("frame_capacity must be > 0".to_string());
        }
        self.animation.validate()
    }
}
