//! Config plugin for the Marka plugin system
//!
//! Registers the server configuration as a service for other plugins.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use marka_core::plugin::{MarkaPlugin, PluginError, ServiceRegistrationContext};

use crate::{ConfigService, ServerConfig};

pub struct ConfigPlugin {
    server_config: Arc<ServerConfig>,
}

impl ConfigPlugin {
    pub fn new(server_config: Arc<ServerConfig>) -> Self {
        Self { server_config }
    }
}

impl MarkaPlugin for ConfigPlugin {
    fn name(&self) -> &'static str {
        "config"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>> {
        Box::pin(async move {
            let config_service = Arc::new(ConfigService::new(self.server_config.clone()));
            context.register_service(config_service);
            context.register_service(self.server_config.clone());

            tracing::debug!("Config plugin services registered successfully");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_plugin_name() {
        let server_config = Arc::new(
            ServerConfig::new(
                "127.0.0.1:8000".to_string(),
                "postgres://localhost/marka".to_string(),
            )
            .unwrap(),
        );
        let config_plugin = ConfigPlugin::new(server_config);
        assert_eq!(config_plugin.name(), "config");
    }
}
