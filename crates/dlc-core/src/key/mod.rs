//! Transfer keys: canonical identifiers for download destinations.
//!
//! A key is the normalized absolute path a download will be written to. Two
//! requests that resolve to the same path share a key (and therefore a single
//! in-flight transfer); different paths never share one.

mod error;
mod normalize;
mod path;
mod sanitize;

pub use error::KeyDerivationError;
pub use normalize::normalize_lexically;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

/// Schemes accepted as download sources.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Where a download should land: a directory plus an optional explicit file name.
///
/// When `file_name` is `None` the last path segment of the source URL is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub dir: PathBuf,
    pub file_name: Option<String>,
}

impl Destination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Canonical identifier for one download destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferKey(PathBuf);

impl TransferKey {
    /// Derives the key for downloading `source` into `destination`.
    pub fn derive(source: &str, destination: &Destination) -> Result<Self, KeyDerivationError> {
        resolve(source, destination).map(|(_, key)| key)
    }

    /// Absolute path of the destination file.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Parses `source` and resolves `destination` into the final file path.
///
/// Returns the parsed URL alongside the key so callers that go on to start a
/// transfer do not parse twice.
pub fn resolve(source: &str, destination: &Destination) -> Result<(Url, TransferKey), KeyDerivationError> {
    let url = parse_source(source)?;

    let raw_name = match destination.file_name.as_deref() {
        Some(name) => name.to_string(),
        None => filename_from_url_path(&url).ok_or_else(|| KeyDerivationError::NoFileName {
            source_url: source.to_string(),
        })?,
    };
    let name = sanitize_filename_for_linux(&raw_name);
    if name.is_empty() || name == "." || name == ".." {
        return Err(KeyDerivationError::NoFileName {
            source_url: source.to_string(),
        });
    }

    if destination.dir.as_os_str().is_empty() {
        return Err(KeyDerivationError::EmptyDirectory);
    }
    let dir = if destination.dir.is_absolute() {
        destination.dir.clone()
    } else {
        std::env::current_dir()
            .map_err(KeyDerivationError::WorkingDirectory)?
            .join(&destination.dir)
    };

    let path = normalize_lexically(&dir.join(name));
    Ok((url, TransferKey(path)))
}

/// Whether completed data is already present for this destination.
///
/// Independent of in-flight state: a `.part` file left by a running or
/// interrupted transfer does not count. Returns `false` when the destination
/// cannot be resolved.
pub fn exists(source: &str, destination: &Destination) -> bool {
    match TransferKey::derive(source, destination) {
        Ok(key) => key.path().is_file(),
        Err(e) => {
            tracing::debug!("exists: cannot resolve destination: {}", e);
            false
        }
    }
}

fn parse_source(source: &str) -> Result<Url, KeyDerivationError> {
    let url = Url::parse(source.trim()).map_err(|e| KeyDerivationError::InvalidSource {
        source_url: source.to_string(),
        reason: e.to_string(),
    })?;
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(KeyDerivationError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.scheme() != "file" && url.host_str().map_or(true, str::is_empty) {
        return Err(KeyDerivationError::InvalidSource {
            source_url: source.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}
