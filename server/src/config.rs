/// Server configuration
pub struct ServerConfig {
    pub listen_addr: String,
    /// Capacity of the command channel into the session loop.
    pub command_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9001".to_string(),
            command_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.command_capacity == 0 {
            return Err("command_capacity must be positive".to_string());
        }
        Ok(())
    }
}
