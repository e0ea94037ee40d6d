use std::fmt;

use indexmap::IndexMap;
use crate::{
    FileLocation, HostNetwork, Mnemonic, NetworkId, NetworkProfile, ProviderConfig,
    ProviderNetwork, TransactionDefaults, DEFAULT_SOLC_VERSION,
};

pub const MANIFEST_FILE_NAME: &str = "toolchain.toml";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8545;

pub const MAINNET_RPC_URL: &str = "https://mainnet.infura.io/v3/130dfea36eb541b79694f0b6c003b2b2";
pub const ROPSTEN_RPC_URL: &str = "https://ropsten.infura.io/v3/130dfea36eb541b79694f0b6c003b2b2";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolchainManifestFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilers: Option<CompilersConfigFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<IndexMap<String, NetworkConfigFile>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CompilersConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solc: Option<SolcConfigFile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SolcConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<NetworkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(alias = "gasPrice", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    Unreadable {
        location: FileLocation,
        reason: String,
    },
    Malformed {
        location: FileLocation,
        reason: String,
    },
    InvalidNetwork {
        name: String,
        reason: String,
    },
    InvalidCompiler {
        reason: String,
    },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Unreadable { location, reason } => {
                write!(f, "unable to read manifest {}: {}", location, reason)
            }
            ManifestError::Malformed { location, reason } => {
                write!(f, "manifest {} is malformed: {}", location, reason)
            }
            ManifestError::InvalidNetwork { name, reason } => {
                write!(f, "network {} is invalid: {}", name, reason)
            }
            ManifestError::InvalidCompiler { reason } => {
                write!(f, "compiler settings are invalid: {}", reason)
            }
        }
    }
}

impl std::error::Error for ManifestError {}

impl ToolchainManifestFile {
    /// Declarations used when a project doesn't override them.
    pub fn default_manifest() -> ToolchainManifestFile {
        let mut networks = IndexMap::new();
        networks.insert(
            "live".to_string(),
            NetworkConfigFile {
                url: Some(MAINNET_RPC_URL.to_string()),
                network_id: Some(NetworkId::Numeric(1)),
                ..Default::default()
            },
        );
        networks.insert(
            "ropsten".to_string(),
            NetworkConfigFile {
                url: Some(ROPSTEN_RPC_URL.to_string()),
                network_id: Some(NetworkId::Text("3".to_string())),
                ..Default::default()
            },
        );
        networks.insert(
            "development".to_string(),
            NetworkConfigFile {
                host: Some(DEFAULT_HOST.to_string()),
                port: Some(DEFAULT_PORT),
                network_id: Some(NetworkId::Any),
                ..Default::default()
            },
        );

        ToolchainManifestFile {
            compilers: Some(CompilersConfigFile {
                solc: Some(SolcConfigFile {
                    version: Some(DEFAULT_SOLC_VERSION.to_string()),
                }),
            }),
            networks: Some(networks),
        }
    }

    /// Returns `Ok(None)` when there is no manifest at `location`.
    pub fn from_location(
        location: &FileLocation,
    ) -> Result<Option<ToolchainManifestFile>, ManifestError> {
        let content = location
            .read_content_if_exists()
            .map_err(|reason| ManifestError::Unreadable {
                location: location.clone(),
                reason,
            })?;
        let Some(content) = content else {
            return Ok(None);
        };
        let content = String::from_utf8(content).map_err(|e| ManifestError::Malformed {
            location: location.clone(),
            reason: e.to_string(),
        })?;
        let manifest = toml::from_str(&content).map_err(|e| ManifestError::Malformed {
            location: location.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(manifest))
    }

    pub fn to_toml_string(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("unable to serialize manifest\n{}", e))
    }
}

impl NetworkConfigFile {
    pub fn to_network_profile(
        &self,
        name: &str,
        mnemonic: &Mnemonic,
    ) -> Result<NetworkProfile, ManifestError> {
        let invalid = |reason: &str| ManifestError::InvalidNetwork {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("network name cannot be empty"));
        }
        let network_id = match &self.network_id {
            Some(NetworkId::Text(id)) if id.trim().is_empty() => {
                return Err(invalid("network_id cannot be empty"))
            }
            Some(network_id) => network_id.clone(),
            None => return Err(invalid("missing network_id")),
        };
        let transactions = TransactionDefaults {
            gas: self.gas,
            gas_price: self.gas_price,
            from: self.from.clone(),
        };

        match (&self.url, &self.host, self.port) {
            (Some(url), None, None) => {
                let provider = ProviderConfig::new(url, mnemonic).map_err(|e| {
                    ManifestError::InvalidNetwork {
                        name: name.to_string(),
                        reason: format!("unable to parse {} as a url: {}", url, e),
                    }
                })?;
                if !matches!(provider.url.scheme(), "http" | "https" | "ws" | "wss") {
                    return Err(ManifestError::InvalidNetwork {
                        name: name.to_string(),
                        reason: format!("unsupported url scheme {}", provider.url.scheme()),
                    });
                }
                Ok(NetworkProfile::Provider(ProviderNetwork {
                    provider,
                    network_id,
                    transactions,
                }))
            }
            (Some(_), _, _) => Err(invalid("url cannot be combined with host or port")),
            (None, host, port) => {
                let host = host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string());
                if host.trim().is_empty() {
                    return Err(invalid("host cannot be empty"));
                }
                Ok(NetworkProfile::Host(HostNetwork {
                    host,
                    port: port.unwrap_or(DEFAULT_PORT),
                    network_id,
                    transactions,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ToolchainManifestFile {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_default_manifest_roundtrips_through_toml() {
        let manifest = ToolchainManifestFile::default_manifest();
        let content = manifest.to_toml_string().unwrap();
        assert!(content.contains("[networks.live]"));
        assert_eq!(parse(&content), manifest);
    }

    #[test]
    fn test_host_defaults_are_applied() {
        let manifest = parse(
            r#"
            [networks.ganache]
            network_id = "*"
            gas = 6721975
            gasPrice = 20000000000
            "#,
        );
        let networks = manifest.networks.unwrap();
        let profile = networks["ganache"]
            .to_network_profile("ganache", &Mnemonic::placeholder())
            .unwrap();
        assert_eq!(
            profile,
            NetworkProfile::Host(HostNetwork {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                network_id: NetworkId::Any,
                transactions: TransactionDefaults {
                    gas: Some(6721975),
                    gas_price: Some(20000000000),
                    from: None,
                },
            })
        );
    }

    #[test]
    fn test_provider_network_uses_mnemonic() {
        let entry = NetworkConfigFile {
            url: Some("https://rpc.example.org".to_string()),
            network_id: Some(NetworkId::Numeric(5)),
            from: Some("0x627306090abab3a6e1400e9345bc60c78a8bef57".to_string()),
            ..Default::default()
        };
        let mnemonic = Mnemonic::new("test phrase");
        match entry.to_network_profile("goerli", &mnemonic).unwrap() {
            NetworkProfile::Provider(network) => {
                assert_eq!(network.provider.mnemonic, mnemonic);
                assert_eq!(network.provider.url.host_str(), Some("rpc.example.org"));
                assert_eq!(network.network_id, NetworkId::Numeric(5));
                assert!(network.transactions.from.is_some());
            }
            profile => panic!("unexpected profile {:?}", profile),
        }
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let mnemonic = Mnemonic::placeholder();
        let cases = [
            NetworkConfigFile::default(),
            NetworkConfigFile {
                url: Some("not a url".to_string()),
                network_id: Some(NetworkId::Numeric(1)),
                ..Default::default()
            },
            NetworkConfigFile {
                url: Some("ftp://rpc.example.org".to_string()),
                network_id: Some(NetworkId::Numeric(1)),
                ..Default::default()
            },
            NetworkConfigFile {
                url: Some("https://rpc.example.org".to_string()),
                port: Some(8545),
                network_id: Some(NetworkId::Numeric(1)),
                ..Default::default()
            },
            NetworkConfigFile {
                host: Some(" ".to_string()),
                network_id: Some(NetworkId::Any),
                ..Default::default()
            },
            NetworkConfigFile {
                network_id: Some(NetworkId::Text("".to_string())),
                ..Default::default()
            },
        ];
        for entry in cases.iter() {
            match entry.to_network_profile("broken", &mnemonic) {
                Err(ManifestError::InvalidNetwork { name, .. }) => assert_eq!(name, "broken"),
                other => panic!("{:?} should be rejected, got {:?}", entry, other),
            }
        }
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let location = FileLocation::from_path(dir.path().join(MANIFEST_FILE_NAME));
        location
            .write_content(b"[networks.live]\nnetwork_id = 1\nprovider = \"x\"\n")
            .unwrap();
        assert!(matches!(
            ToolchainManifestFile::from_location(&location),
            Err(ManifestError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let location = FileLocation::from_path(dir.path().join(MANIFEST_FILE_NAME));
        assert_eq!(ToolchainManifestFile::from_location(&location), Ok(None));
    }
}
