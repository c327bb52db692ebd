//! Local credential store.
//!
//! One flat JSON file maps identities (email addresses, or the fixed
//! single-user key) to bearer tokens. Saves are whole-file
//! read-modify-write; the file is assumed single-process, single-writer
//! (a concurrent external writer can lose an update, accepted for a local
//! credential cache). A missing file reads as an empty map, and clearing
//! the last identity removes the file rather than leaving `{}` behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Identity key used by the single-user convenience operations.
pub const DEFAULT_IDENTITY: &str = "jwtToken";

/// Store file name under the user's home directory.
const STORE_FILE: &str = ".moneylover-client";

/// Handle to a credential file.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Open the store at its default location in the home directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::UserDirs::new()
            .ok_or_else(|| Error::Store("home directory is not resolvable".into()))?;
        Ok(Self::at(dirs.home_dir().join(STORE_FILE)))
    }

    /// Open the store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `token` under `identity`, creating the file if needed.
    pub fn save(&self, identity: &str, token: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(identity.to_string(), token.to_string());
        self.write_map(&map)?;
        tracing::debug!(identity, path = %self.path.display(), "token saved");
        Ok(())
    }

    /// Fetch the token stored under `identity`.
    pub fn load(&self, identity: &str) -> Result<String> {
        let mut map = self.read_map()?;
        map.remove(identity)
            .ok_or_else(|| Error::TokenNotFound(identity.to_string()))
    }

    /// Drop `identity`'s token. Deletes the file once the map is empty;
    /// clearing an unknown identity, or a store whose file does not
    /// exist, succeeds without touching anything.
    pub fn clear(&self, identity: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.remove(identity);
        if map.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(Error::Store(format!(
                    "remove {}: {err}",
                    self.path.display()
                ))),
            };
        }
        self.write_map(&map)
    }

    /// [`TokenStore::save`] under the default single-user identity.
    pub fn save_default(&self, token: &str) -> Result<()> {
        self.save(DEFAULT_IDENTITY, token)
    }

    /// [`TokenStore::load`] under the default single-user identity.
    pub fn load_default(&self) -> Result<String> {
        self.load(DEFAULT_IDENTITY)
    }

    /// [`TokenStore::clear`] under the default single-user identity.
    pub fn clear_default(&self) -> Result<()> {
        self.clear(DEFAULT_IDENTITY)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(Error::Store(format!("read {}: {err}", self.path.display())))
            }
        };
        serde_json::from_slice(&bytes)
            .map_err(|err| Error::Store(format!("parse {}: {err}", self.path.display())))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec(map)
            .map_err(|err| Error::Store(format!("encode token map: {err}")))?;
        std::fs::write(&self.path, bytes)
            .map_err(|err| Error::Store(format!("write {}: {err}", self.path.display())))
    }
}
