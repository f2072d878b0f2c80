use crate::cli::command_handlers::{AuthHandler, ConfigHandler, StateHandler};
use crate::cli::main_types::Commands;
use log::debug;
use qick_core::api::client::ClientSettings;
use qick_core::core::services::auth_service::AuthService;
use qick_core::error::AppError;
use qick_core::storage::config::{Config, StorageBackend};
use qick_core::storage::state::{FileStorage, KeyringStorage};
use qick_core::store::Store;
use qick_core::store::persist::PersistConfig;
use qick_core::utils::validation::validate_url;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_dir: Option<PathBuf>,
    base_url: Option<String>,
}

impl Dispatcher {
    pub fn new(config: Config, config_dir: Option<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            config,
            config_dir,
            base_url,
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join("config.toml"))
    }

    // Open the store over the configured backend
    fn create_store(&self) -> Result<Store, AppError> {
        let store = match self.config.get_storage() {
            StorageBackend::Keyring => {
                debug!("Using keyring storage for session state");
                Store::rehydrate(KeyringStorage::new(), PersistConfig::default())
            }
            StorageBackend::File => {
                let storage = match &self.config_dir {
                    Some(dir) => FileStorage::new(dir.join("state")),
                    None => FileStorage::default_location()?,
                };
                debug!("Using file storage at {}", storage.dir().display());
                Store::rehydrate(storage, PersistConfig::default())
            }
        };
        Ok(store)
    }

    // CLI argument > environment > config file > default
    fn client_settings(&self) -> Result<ClientSettings, AppError> {
        let mut settings = ClientSettings::from_config(&self.config);
        if let Some(url) = self.base_url.as_ref().filter(|u| !u.is_empty()) {
            settings.base_url = url.clone();
        }
        validate_url(&settings.base_url)?;
        debug!("Backend: {}{}", settings.base_url, settings.api_prefix);
        Ok(settings)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Auth { command } => {
                let store = self.create_store()?;
                let service = AuthService::connect(self.client_settings()?, store)?;
                AuthHandler::new().handle(command, &service).await
            }
            Commands::Config { command } => {
                let mut config = self.config.clone();
                ConfigHandler::new().handle(command, &mut config, self.config_path())
            }
            Commands::State { command } => {
                let store = self.create_store()?;
                StateHandler::new().handle(command, &store)
            }
        }
    }
}
