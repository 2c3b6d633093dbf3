use serde::{Deserialize, Deserializer};

/// One entry of an upstream contents listing
///
/// Every field is optional on the wire. Only `path` and `download_url`
/// take part in routing; the rest is carried for logging and debugging.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileDescriptor {
    /// Location of the raw file content, `None` for directories
    pub download_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Path relative to the repository root
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sha: String,
    /// Size in bytes; any JSON number is accepted
    #[serde(deserialize_with = "null_as_default")]
    pub size: f64,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub entry_type: EntryType,
    /// API location of this entry
    pub url: Option<String>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl FileDescriptor {
    /// Build a file entry with just a path and download location
    pub fn file(path: impl Into<String>, download_url: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            download_url: Some(download_url.into()),
            name,
            path,
            ..Self::default()
        }
    }
}

/// Type of listing entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// Repository listing in the order the upstream API returned it
///
/// Duplicate paths are not rejected; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FileListing {
    entries: Vec<FileDescriptor>,
}

impl FileListing {
    pub fn new(entries: Vec<FileDescriptor>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FileDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First descriptor whose path equals `path` exactly
    pub fn find(&self, path: &str) -> Option<&FileDescriptor> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// Download URL of the first descriptor at `path`
    ///
    /// Returns an empty string when nothing matches or the match has no
    /// download location.
    pub fn download_url(&self, path: &str) -> &str {
        self.find(path)
            .and_then(|entry| entry.download_url.as_deref())
            .unwrap_or("")
    }
}

impl From<Vec<FileDescriptor>> for FileListing {
    fn from(entries: Vec<FileDescriptor>) -> Self {
        Self::new(entries)
    }
}
