extern crate serde;

#[macro_use]
extern crate serde_derive;

pub extern crate indexmap;
pub extern crate url;

mod compilers;
mod config;
mod manifest;
mod networks;
mod secrets;

pub use compilers::{CompilerSpec, Compilers, DEFAULT_SOLC_VERSION};
pub use config::{
    load_toolchain_config, ConfigError, LoadSettings, LoadedToolchainConfig, ToolchainConfig,
};
pub use manifest::{
    CompilersConfigFile, ManifestError, NetworkConfigFile, SolcConfigFile, ToolchainManifestFile,
    DEFAULT_HOST, DEFAULT_PORT, MAINNET_RPC_URL, MANIFEST_FILE_NAME, ROPSTEN_RPC_URL,
};
pub use networks::{
    HostNetwork, NetworkId, NetworkProfile, NetworkRegistry, ProviderConfig, ProviderNetwork,
    RegistryError, TransactionDefaults,
};
pub use secrets::{
    load_secrets, Mnemonic, SecretsError, SecretsLoad, EXAMPLE_MNEMONIC, SECRETS_FILE_NAME,
};

use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// A file on the local file system that the toolchain reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocation {
    path: PathBuf,
}

impl FileLocation {
    pub fn from_path(path: PathBuf) -> FileLocation {
        FileLocation { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_path(&mut self, path_string: &str) {
        self.path.push(path_string);
    }

    pub fn join(&self, path_string: &str) -> FileLocation {
        let mut location = self.clone();
        location.append_path(path_string);
        location
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the whole file. A missing file is reported as `Ok(None)`, any
    /// other I/O failure as an error.
    pub fn read_content_if_exists(&self) -> Result<Option<Vec<u8>>, String> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("unable to open file {}\n{}", self, e)),
        };
        let mut file_buffer = vec![];
        file.read_to_end(&mut file_buffer)
            .map_err(|e| format!("unable to read file {}\n{}", self, e))?;
        Ok(Some(file_buffer))
    }

    pub fn write_content(&self, content: &[u8]) -> Result<(), String> {
        if let Some(parent_directory) = self.path.parent() {
            if !parent_directory.as_os_str().is_empty() {
                fs::create_dir_all(parent_directory).map_err(|e| {
                    format!(
                        "unable to create parent directory {}\n{}",
                        parent_directory.display(),
                        e
                    )
                })?;
            }
        }
        fs::write(&self.path, content)
            .map_err(|e| format!("unable to write file {}\n{}", self, e))
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = FileLocation::from_path(dir.path().join("absent.json"));
        assert_eq!(location.read_content_if_exists(), Ok(None));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let location = FileLocation::from_path(dir.path().to_path_buf()).join("nested/file.txt");
        location.write_content(b"hello").unwrap();
        assert!(location.exists());
        assert_eq!(
            location.read_content_if_exists().unwrap(),
            Some(b"hello".to_vec())
        );
    }

    #[test]
    fn test_reading_a_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let location = FileLocation::from_path(dir.path().to_path_buf());
        assert!(location.read_content_if_exists().is_err());
    }
}
