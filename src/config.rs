use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide configuration, read once at startup and passed explicitly
/// to the components that need it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub token: String,
    pub fps: u32,
    pub scale: f32,
    pub quality: u8,
}

impl ServerConfig {
    /// Reads the configuration from the environment. Every value has a
    /// default so the service runs with zero configuration; unparsable
    /// values fall back to the default as well.
    pub fn from_env() -> Self {
        Self {
            host: env::var("RA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // PORT is assigned by the host in managed deployments
            port: env_parsed("PORT", 9000),
            token: env::var("RA_TOKEN").unwrap_or_else(|_| "mysecret123".to_string()),
            fps: env_parsed("RA_FPS", 10),
            scale: env_parsed("RA_SCALE", 1.0),
            quality: env_parsed("RA_QUALITY", 70),
        }
    }

    /// Minimum time between two emitted frames, with fps clamped to >= 1.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}
