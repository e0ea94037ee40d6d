use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    load_secrets, CompilerSpec, Compilers, FileLocation, ManifestError, Mnemonic,
    NetworkConfigFile, NetworkRegistry, RegistryError, SecretsError, SecretsLoad,
    ToolchainManifestFile, MANIFEST_FILE_NAME, SECRETS_FILE_NAME,
};

/// Configuration object handed over to the compilation and deployment toolchain.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    pub networks: NetworkRegistry,
    pub compilers: Compilers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedToolchainConfig {
    pub config: ToolchainConfig,
    pub secrets: SecretsLoad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Secrets(SecretsError),
    Manifest(ManifestError),
    Registry(RegistryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Secrets(e) => write!(f, "{}", e),
            ConfigError::Manifest(e) => write!(f, "{}", e),
            ConfigError::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Secrets(e) => Some(e),
            ConfigError::Manifest(e) => Some(e),
            ConfigError::Registry(e) => Some(e),
        }
    }
}

impl From<SecretsError> for ConfigError {
    fn from(e: SecretsError) -> Self {
        ConfigError::Secrets(e)
    }
}

impl From<ManifestError> for ConfigError {
    fn from(e: ManifestError) -> Self {
        ConfigError::Manifest(e)
    }
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        ConfigError::Registry(e)
    }
}

/// Where the loader looks for its input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSettings {
    pub project_root: FileLocation,
    pub secrets_location: Option<FileLocation>,
    pub manifest_location: Option<FileLocation>,
}

impl LoadSettings {
    pub fn from_project_root(project_root: FileLocation) -> LoadSettings {
        LoadSettings {
            project_root,
            secrets_location: None,
            manifest_location: None,
        }
    }

    pub fn get_secrets_location(&self) -> FileLocation {
        self.secrets_location
            .clone()
            .unwrap_or_else(|| self.project_root.join(SECRETS_FILE_NAME))
    }

    pub fn get_manifest_location(&self) -> FileLocation {
        self.manifest_location
            .clone()
            .unwrap_or_else(|| self.project_root.join(MANIFEST_FILE_NAME))
    }
}

impl NetworkRegistry {
    pub fn from_declarations(
        declarations: &IndexMap<String, NetworkConfigFile>,
        mnemonic: &Mnemonic,
    ) -> Result<NetworkRegistry, ConfigError> {
        let mut networks = NetworkRegistry::new();
        for (name, entry) in declarations.iter() {
            let profile = entry.to_network_profile(name, mnemonic)?;
            networks.insert(name, profile)?;
        }
        Ok(networks)
    }

    /// The `live`, `ropsten` and `development` networks a project gets when
    /// it declares none.
    pub fn default_networks(mnemonic: &Mnemonic) -> Result<NetworkRegistry, ConfigError> {
        match ToolchainManifestFile::default_manifest().networks {
            Some(declarations) => NetworkRegistry::from_declarations(&declarations, mnemonic),
            None => Ok(NetworkRegistry::new()),
        }
    }
}

impl ToolchainConfig {
    /// Resolves the declarations of `manifest_file`, sections it leaves out
    /// are taken from the built-in manifest.
    pub fn from_manifest_file(
        manifest_file: &ToolchainManifestFile,
        mnemonic: &Mnemonic,
    ) -> Result<ToolchainConfig, ConfigError> {
        let networks = match &manifest_file.networks {
            Some(declarations) => NetworkRegistry::from_declarations(declarations, mnemonic)?,
            None => NetworkRegistry::default_networks(mnemonic)?,
        };

        let solc_version = manifest_file
            .compilers
            .as_ref()
            .and_then(|compilers| compilers.solc.as_ref())
            .and_then(|solc| solc.version.clone());
        let compilers = match solc_version {
            Some(version) if version.trim().is_empty() => {
                return Err(ManifestError::InvalidCompiler {
                    reason: "solc version cannot be empty".to_string(),
                }
                .into())
            }
            Some(version) => Compilers {
                solc: CompilerSpec { version },
            },
            None => Compilers::default(),
        };

        Ok(ToolchainConfig {
            networks,
            compilers,
        })
    }
}

/// Reads the secrets file and the optional project manifest, and assembles
/// the configuration the toolchain runs with.
pub fn load_toolchain_config(
    settings: &LoadSettings,
) -> Result<LoadedToolchainConfig, ConfigError> {
    let secrets = load_secrets(&settings.get_secrets_location())?;

    let manifest_location = settings.get_manifest_location();
    let manifest_file = match ToolchainManifestFile::from_location(&manifest_location)? {
        Some(manifest_file) => {
            debug!("using networks declared in {}", manifest_location);
            manifest_file
        }
        None => {
            debug!("no {} found, using built-in networks", MANIFEST_FILE_NAME);
            ToolchainManifestFile::default()
        }
    };

    let config = ToolchainConfig::from_manifest_file(&manifest_file, secrets.mnemonic())?;
    Ok(LoadedToolchainConfig { config, secrets })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{NetworkId, NetworkProfile, EXAMPLE_MNEMONIC, MAINNET_RPC_URL};

    fn project() -> (tempfile::TempDir, LoadSettings) {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoadSettings::from_project_root(FileLocation::from_path(
            dir.path().to_path_buf(),
        ));
        (dir, settings)
    }

    fn write(dir: &tempfile::TempDir, file_name: &str, content: &str) {
        std::fs::write(dir.path().join(file_name), content).unwrap();
    }

    #[test]
    fn test_builtin_configuration() {
        let (_dir, settings) = project();
        let loaded = load_toolchain_config(&settings).unwrap();

        assert!(loaded.secrets.is_defaulted());
        assert_eq!(
            loaded.config.networks.names(),
            vec!["live", "ropsten", "development"]
        );
        assert_eq!(loaded.config.compilers.solc.version, "0.8.3");

        match loaded.config.networks.get("live") {
            Some(NetworkProfile::Provider(live)) => {
                assert_eq!(live.provider.url.as_str(), MAINNET_RPC_URL);
                assert_eq!(live.provider.mnemonic.phrase(), EXAMPLE_MNEMONIC);
                assert_eq!(live.network_id, NetworkId::Numeric(1));
            }
            other => panic!("unexpected live network {:?}", other),
        }
        assert_eq!(
            loaded.config.networks.get("ropsten").unwrap().network_id(),
            &NetworkId::Text("3".to_string())
        );
    }

    #[test]
    fn test_default_networks() {
        let mnemonic = Mnemonic::new("test phrase");
        let networks = NetworkRegistry::default_networks(&mnemonic).unwrap();
        assert_eq!(networks.names(), vec!["live", "ropsten", "development"]);

        let ids: Vec<&NetworkId> = networks.iter().map(|(_, p)| p.network_id()).collect();
        assert_eq!(
            ids,
            vec![
                &NetworkId::Numeric(1),
                &NetworkId::Text("3".to_string()),
                &NetworkId::Any
            ]
        );
        assert_eq!(networks.get("development").unwrap().endpoint(), "http://localhost:8545");
        assert!(networks.get("live").unwrap().requires_credentials());
        assert!(!networks.get("development").unwrap().requires_credentials());

        let (_dir, settings) = project();
        let loaded = load_toolchain_config(&settings).unwrap();
        assert_eq!(
            loaded.config.networks,
            NetworkRegistry::default_networks(&Mnemonic::placeholder()).unwrap()
        );
    }

    #[test]
    fn test_configuration_object_shape() {
        let (dir, settings) = project();
        write(&dir, SECRETS_FILE_NAME, r#"{"mnemonic": "test phrase"}"#);
        let loaded = load_toolchain_config(&settings).unwrap();

        let value = serde_json::to_value(&loaded.config).unwrap();
        assert_eq!(value["compilers"]["solc"]["version"], json!("0.8.3"));
        assert_eq!(
            value["networks"]["development"],
            json!({ "host": "localhost", "port": 8545, "network_id": "*" })
        );
        assert_eq!(value["networks"]["live"]["network_id"], json!(1));
        assert_eq!(value["networks"]["ropsten"]["network_id"], json!("3"));
        assert_eq!(
            value["networks"]["ropsten"]["provider"]["placeholder"],
            json!(false)
        );
        assert!(!value.to_string().contains("test phrase"));
    }

    #[test]
    fn test_loaded_mnemonic_reaches_every_provider() {
        let (dir, settings) = project();
        write(&dir, SECRETS_FILE_NAME, r#"{"mnemonic": "test phrase"}"#);
        let loaded = load_toolchain_config(&settings).unwrap();

        assert_eq!(loaded.secrets.mnemonic().phrase(), "test phrase");
        for (_, profile) in loaded.config.networks.iter() {
            if let NetworkProfile::Provider(network) = profile {
                assert_eq!(network.provider.mnemonic.phrase(), "test phrase");
            }
        }
    }

    #[test]
    fn test_malformed_secrets_abort_loading() {
        let (dir, settings) = project();
        write(&dir, SECRETS_FILE_NAME, "mnemonic = 'not json'");
        assert!(matches!(
            load_toolchain_config(&settings),
            Err(ConfigError::Secrets(SecretsError::InvalidJson { .. }))
        ));
    }

    #[test]
    fn test_manifest_replaces_declarations() {
        let (dir, settings) = project();
        write(
            &dir,
            MANIFEST_FILE_NAME,
            r#"
            [compilers.solc]
            version = "^0.5.0"

            [networks.ganache]
            port = 7545
            network_id = "*"

            [networks.sepolia]
            url = "https://sepolia.example.org"
            network_id = 11155111
            "#,
        );
        let loaded = load_toolchain_config(&settings).unwrap();

        assert_eq!(loaded.config.networks.names(), vec!["ganache", "sepolia"]);
        assert_eq!(loaded.config.compilers.solc.version, "^0.5.0");
        assert_eq!(
            loaded.config.networks.get("ganache").unwrap().endpoint(),
            "http://localhost:7545"
        );

        let sepolia = loaded.config.networks.get("sepolia").unwrap();
        assert_eq!(sepolia.endpoint(), "https://sepolia.example.org");
        let value = serde_json::to_value(&loaded.config).unwrap();
        assert_eq!(
            value["networks"]["sepolia"]["provider"]["url"],
            json!("https://sepolia.example.org")
        );
    }

    #[test]
    fn test_partial_manifest_keeps_builtin_networks() {
        let (dir, settings) = project();
        write(&dir, MANIFEST_FILE_NAME, "[compilers.solc]\nversion = \"0.8.19\"\n");
        let loaded = load_toolchain_config(&settings).unwrap();
        assert_eq!(loaded.config.networks.len(), 3);
        assert_eq!(loaded.config.compilers.solc.version, "0.8.19");
    }

    #[test]
    fn test_invalid_manifest_aborts_loading() {
        let (dir, settings) = project();
        write(&dir, MANIFEST_FILE_NAME, "[networks.live]\nurl = \"https://x.org\"\n");
        assert!(matches!(
            load_toolchain_config(&settings),
            Err(ConfigError::Manifest(ManifestError::InvalidNetwork { .. }))
        ));

        write(&dir, MANIFEST_FILE_NAME, "[compilers.solc]\nversion = \"\"\n");
        assert!(matches!(
            load_toolchain_config(&settings),
            Err(ConfigError::Manifest(ManifestError::InvalidCompiler { .. }))
        ));

        write(&dir, MANIFEST_FILE_NAME, "[networks\n");
        assert!(matches!(
            load_toolchain_config(&settings),
            Err(ConfigError::Manifest(ManifestError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_custom_secrets_location() {
        let (dir, mut settings) = project();
        write(&dir, "wallet.json", r#"{"mnemonic": "custom phrase"}"#);
        settings.secrets_location = Some(FileLocation::from_path(dir.path().join("wallet.json")));

        let loaded = load_toolchain_config(&settings).unwrap();
        assert_eq!(loaded.secrets.mnemonic().phrase(), "custom phrase");
    }

    #[test]
    fn test_loading_is_idempotent() {
        let (dir, settings) = project();
        write(&dir, SECRETS_FILE_NAME, r#"{"mnemonic": "test phrase"}"#);
        let first = load_toolchain_config(&settings).unwrap();
        let second = load_toolchain_config(&settings).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.config.networks.names(),
            second.config.networks.names()
        );
        assert_eq!(
            serde_json::to_string(&first.config).unwrap(),
            serde_json::to_string(&second.config).unwrap()
        );
    }
}
