use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use thiserror::Error;
use tracing::debug;

/// Directory (relative to the config dir) holding the AT library files
pub const LIBRARY_DIR: &str = "AT_Libraries";

/// Logical commands every AT library has to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
pub enum CommandKey {
    #[strum(serialize = "ID")]
    Id,
    #[strum(serialize = "PAC")]
    Pac,
    #[strum(serialize = "Version")]
    Version,
    #[strum(serialize = "Send")]
    Send,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("AT library '{name}' not found at {path}")]
    NotFound { name: String, path: PathBuf },

    #[error("Failed to read AT library '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("AT library '{name}' is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("AT library '{library}' has no '{key}' command")]
    MissingCommand { library: String, key: CommandKey },

    #[error("Failed to list AT libraries in {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    #[serde(rename = "Commands")]
    commands: HashMap<String, String>,
}

/// A named, immutable table of AT command prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtLibrary {
    name: String,
    commands: [String; 4],
}

impl AtLibrary {
    /// Parse a library definition, rejecting it unless every [`CommandKey`] resolves
    pub fn parse(name: &str, json: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile =
            serde_json::from_str(json).map_err(|source| LibraryError::Malformed {
                name: name.to_string(),
                source,
            })?;

        let mut commands: [String; 4] = Default::default();
        for key in CommandKey::iter() {
            let command = file.commands.get(key.as_ref()).ok_or_else(|| {
                LibraryError::MissingCommand {
                    library: name.to_string(),
                    key,
                }
            })?;
            commands[key as usize] = command.clone();
        }

        Ok(Self {
            name: name.to_string(),
            commands,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command prefix for a logical key
    pub fn command(&self, key: CommandKey) -> &str {
        &self.commands[key as usize]
    }
}

/// The directory of selectable AT libraries
#[derive(Debug, Clone)]
pub struct LibraryCatalog {
    dir: PathBuf,
}

impl LibraryCatalog {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            dir: config_dir.join(LIBRARY_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the library stored under `name`
    pub fn load(&self, name: &str) -> Result<AtLibrary, LibraryError> {
        let path = self.dir.join(name);
        debug!("Loading AT library from {}", path.display());

        let json = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LibraryError::NotFound {
                    name: name.to_string(),
                    path: path.clone(),
                }
            } else {
                LibraryError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })?;

        AtLibrary::parse(name, &json)
    }

    /// File names of all installed libraries, sorted
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let listing_error = |source: io::Error| LibraryError::Listing {
            path: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(listing_error)? {
            let entry = entry.map_err(listing_error)?;
            if entry.file_type().map_err(listing_error)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        Ok(names)
    }
}
