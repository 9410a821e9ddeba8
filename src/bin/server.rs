use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

use gym_guard::config::ServerConfig;
use gym_guard::handlers::{routes, AppState};
use gym_guard::security_logger::{log_security_event, SecurityEvent};
use gym_guard::storage::MemoryCredentialRepository;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    // Secrets are validated here so a bad key fails before serving anything
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log_security_event(&SecurityEvent::ConfigurationError {
                component: "config".to_string(),
                error: e.to_string(),
            });
            std::process::exit(1);
        }
    };

    info!("Configuration: host={}, port={}", config.host, config.port);

    let repository = Arc::new(MemoryCredentialRepository::new());
    let state = match AppState::from_config(&config, repository) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize authentication: {}", e);
            std::process::exit(1);
        }
    };

    let routes = routes(state, &config.allowed_origins);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Gym Guard server on {}", addr);
    warp::serve(routes).run(addr).await;
}
