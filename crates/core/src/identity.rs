//! Durable per-installation client identity and saved display name.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// File name of the identity record inside the config directory.
pub const IDENTITY_FILE: &str = "identity.json";

const CLIENT_ID_PREFIX: &str = "c_";
const CLIENT_ID_LEN: usize = 8;
const CLIENT_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque, self-chosen identifier of one client installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh identifier such as `c_k3v9x0qa`.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate an identifier from the supplied random source.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..CLIENT_ID_LEN)
            .map(|_| char::from(CLIENT_ID_ALPHABET[rng.gen_range(0..CLIENT_ID_ALPHABET.len())]))
            .collect();
        Self(format!("{CLIENT_ID_PREFIX}{suffix}"))
    }

    /// Wrap an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Identity persisted as JSON, or kept in memory only.
#[derive(Debug)]
pub struct IdentityStore {
    path: Option<PathBuf>,
    record: IdentityRecord,
}

impl IdentityStore {
    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        crate::config::config_dir().join(IDENTITY_FILE)
    }

    /// Open the identity file at `path`; a missing file yields an empty identity.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let record = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read identity {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse identity {}", path.display()))?
        } else {
            IdentityRecord::default()
        };
        debug!(path = %path.display(), "identity opened");
        Ok(Self {
            path: Some(path),
            record,
        })
    }

    /// Identity that is never written to disk.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            record: IdentityRecord::default(),
        }
    }

    /// Identity with a fixed client identifier, never written to disk.
    pub fn with_client_id(client_id: ClientId) -> Self {
        Self {
            path: None,
            record: IdentityRecord {
                client_id: Some(client_id),
                name: None,
            },
        }
    }

    /// The stored client identifier, generating and persisting one if absent.
    pub fn client_id(&mut self) -> Result<ClientId> {
        if let Some(existing) = &self.record.client_id {
            return Ok(existing.clone());
        }
        let generated = ClientId::generate();
        info!(client_id = %generated, "generated client identity");
        self.record.client_id = Some(generated.clone());
        self.persist()?;
        Ok(generated)
    }

    /// Last display name used to join, empty if none.
    pub fn saved_name(&self) -> String {
        self.record.name.clone().unwrap_or_default()
    }

    /// Remember the display name for the next start.
    pub fn save_name(&mut self, name: &str) -> Result<()> {
        if self.record.name.as_deref() == Some(name) {
            return Ok(());
        }
        self.record.name = Some(name.to_string());
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_record(path, &self.record)
    }
}

fn write_record(path: &Path, record: &IdentityRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create identity directory {}", parent.display()))?;
    }
    let serialized =
        serde_json::to_string_pretty(record).context("failed to serialize identity")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write identity {}", path.display()))
}
