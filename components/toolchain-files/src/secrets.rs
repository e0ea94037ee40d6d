use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::FileLocation;

pub const SECRETS_FILE_NAME: &str = "secrets.json";

// Publicly known phrase. Never fund an account derived from it.
pub const EXAMPLE_MNEMONIC: &str = "wrist find shock leisure stand barely field sunset script evidence key idea diesel journey gravity";

/// Phrase encoding the wallet seed used by credential based providers.
///
/// The phrase never shows up in `Debug` or `Display` output, use
/// [`Mnemonic::phrase`] to hand it over to a wallet provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    phrase: String,
    placeholder: bool,
}

impl Mnemonic {
    pub fn new(phrase: &str) -> Mnemonic {
        Mnemonic {
            phrase: phrase.to_string(),
            placeholder: false,
        }
    }

    pub fn placeholder() -> Mnemonic {
        Mnemonic {
            phrase: EXAMPLE_MNEMONIC.to_string(),
            placeholder: true,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted {} words>", self.word_count())
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({})", self)
    }
}

/// Outcome of looking up the secrets file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsLoad {
    Loaded {
        location: FileLocation,
        mnemonic: Mnemonic,
    },
    Defaulted {
        expected_location: FileLocation,
        mnemonic: Mnemonic,
    },
}

impl SecretsLoad {
    pub fn mnemonic(&self) -> &Mnemonic {
        match self {
            SecretsLoad::Loaded { mnemonic, .. } | SecretsLoad::Defaulted { mnemonic, .. } => {
                mnemonic
            }
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, SecretsLoad::Defaulted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsError {
    Unreadable {
        location: FileLocation,
        reason: String,
    },
    InvalidUtf8 {
        location: FileLocation,
    },
    InvalidJson {
        location: FileLocation,
        reason: String,
    },
    MissingMnemonic {
        location: FileLocation,
    },
}

impl fmt::Display for SecretsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretsError::Unreadable { location, reason } => {
                write!(f, "unable to read secrets file {}: {}", location, reason)
            }
            SecretsError::InvalidUtf8 { location } => {
                write!(f, "secrets file {} is not valid utf8", location)
            }
            SecretsError::InvalidJson { location, reason } => {
                write!(f, "secrets file {} is not valid json: {}", location, reason)
            }
            SecretsError::MissingMnemonic { location } => write!(
                f,
                "secrets file {} must contain a string field \"mnemonic\"",
                location
            ),
        }
    }
}

impl std::error::Error for SecretsError {}

/// Looks up the mnemonic in the secrets file at `location`.
///
/// A missing file falls back to [`EXAMPLE_MNEMONIC`] and is reported through
/// [`SecretsLoad::Defaulted`]. A file that exists but can't be read, decoded
/// or doesn't hold a `mnemonic` string is an error.
pub fn load_secrets(location: &FileLocation) -> Result<SecretsLoad, SecretsError> {
    let content = location
        .read_content_if_exists()
        .map_err(|reason| SecretsError::Unreadable {
            location: location.clone(),
            reason,
        })?;

    let Some(content) = content else {
        warn!(
            "No secrets file found at {}. If you are trying to publish to a credential network this will fail. Otherwise, you can ignore this message!",
            location
        );
        return Ok(SecretsLoad::Defaulted {
            expected_location: location.clone(),
            mnemonic: Mnemonic::placeholder(),
        });
    };

    let content = String::from_utf8(content).map_err(|_| SecretsError::InvalidUtf8 {
        location: location.clone(),
    })?;
    let secrets: Value =
        serde_json::from_str(&content).map_err(|e| SecretsError::InvalidJson {
            location: location.clone(),
            reason: e.to_string(),
        })?;

    match secrets.get("mnemonic") {
        Some(Value::String(phrase)) => {
            debug!("mnemonic loaded from {}", location);
            Ok(SecretsLoad::Loaded {
                location: location.clone(),
                mnemonic: Mnemonic::new(phrase),
            })
        }
        _ => Err(SecretsError::MissingMnemonic {
            location: location.clone(),
        }),
    }
}
