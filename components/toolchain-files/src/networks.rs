use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use url::Url;

use crate::Mnemonic;

/// Chain identifier a network profile accepts.
///
/// Numeric and textual identifiers are kept apart so that the configuration
/// object is emitted the way it was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkId {
    Any,
    Numeric(u64),
    Text(String),
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Any => write!(f, "*"),
            NetworkId::Numeric(id) => write!(f, "{}", id),
            NetworkId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for NetworkId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            NetworkId::Any => serializer.serialize_str("*"),
            NetworkId::Numeric(id) => serializer.serialize_u64(*id),
            NetworkId::Text(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D>(deserializer: D) -> Result<NetworkId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NetworkIdFile {
            Numeric(u64),
            Text(String),
        }

        Ok(match NetworkIdFile::deserialize(deserializer)? {
            NetworkIdFile::Numeric(id) => NetworkId::Numeric(id),
            NetworkIdFile::Text(id) if id == "*" => NetworkId::Any,
            NetworkIdFile::Text(id) => NetworkId::Text(id),
        })
    }
}

/// Optional values the toolchain applies to every transaction sent on a network.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(rename = "gasPrice", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// Remote endpoint plus the credential a wallet provider signs with.
///
/// `declared_url` is the endpoint exactly as written in the manifest, it is
/// what gets emitted. `url` is its parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: Url,
    pub declared_url: String,
    pub mnemonic: Mnemonic,
}

impl ProviderConfig {
    pub fn new(
        declared_url: &str,
        mnemonic: &Mnemonic,
    ) -> Result<ProviderConfig, url::ParseError> {
        Ok(ProviderConfig {
            url: Url::parse(declared_url)?,
            declared_url: declared_url.to_string(),
            mnemonic: mnemonic.clone(),
        })
    }
}

impl Serialize for ProviderConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ProviderConfig", 3)?;
        state.serialize_field("url", &self.declared_url)?;
        state.serialize_field("mnemonic", &self.mnemonic.to_string())?;
        state.serialize_field("placeholder", &self.mnemonic.is_placeholder())?;
        state.end()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HostNetwork {
    pub host: String,
    pub port: u16,
    pub network_id: NetworkId,
    #[serde(flatten)]
    pub transactions: TransactionDefaults,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProviderNetwork {
    pub provider: ProviderConfig,
    pub network_id: NetworkId,
    #[serde(flatten)]
    pub transactions: TransactionDefaults,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum NetworkProfile {
    Host(HostNetwork),
    Provider(ProviderNetwork),
}

impl NetworkProfile {
    pub fn network_id(&self) -> &NetworkId {
        match self {
            NetworkProfile::Host(network) => &network.network_id,
            NetworkProfile::Provider(network) => &network.network_id,
        }
    }

    pub fn transactions(&self) -> &TransactionDefaults {
        match self {
            NetworkProfile::Host(network) => &network.transactions,
            NetworkProfile::Provider(network) => &network.transactions,
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            NetworkProfile::Host(network) => format!("http://{}:{}", network.host, network.port),
            NetworkProfile::Provider(network) => network.provider.declared_url.clone(),
        }
    }

    pub fn requires_credentials(&self) -> bool {
        matches!(self, NetworkProfile::Provider(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateNetwork(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateNetwork(name) => {
                write!(f, "network {} is declared more than once", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Network profiles keyed by name, in declaration order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct NetworkRegistry {
    networks: IndexMap<String, NetworkProfile>,
}

impl NetworkRegistry {
    pub fn new() -> NetworkRegistry {
        NetworkRegistry::default()
    }

    pub fn insert(&mut self, name: &str, profile: NetworkProfile) -> Result<(), RegistryError> {
        if self.networks.contains_key(name) {
            return Err(RegistryError::DuplicateNetwork(name.to_string()));
        }
        self.networks.insert(name.to_string(), profile);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NetworkProfile> {
        self.networks.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.networks.keys().map(|name| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkProfile)> {
        self.networks
            .iter()
            .map(|(name, profile)| (name.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
