use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ClassTableError {
    #[error("failed to read class table {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid class table document")]
    Parse(#[from] toml::de::Error),
    #[error("class id {0:?} is not a non-negative integer")]
    InvalidId(String),
    #[error("class table declares nc = {declared} but lists {found} names")]
    CountMismatch { declared: usize, found: usize },
}

#[derive(Deserialize)]
struct ClassTableFile {
    nc: Option<usize>,
    names: BTreeMap<String, String>,
}

/// Mapping from class id to display name, immutable once loaded
#[derive(Debug, Clone, Default)]
pub struct ClassNameTable {
    names: BTreeMap<u32, String>,
}

impl ClassNameTable {
    pub fn load(path: &Path) -> Result<Self, ClassTableError> {
        let text = std::fs::read_to_string(path).map_err(|source| ClassTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse a TOML document with a `[names]` table, e.g. `0 = "2.1"`
    pub fn parse(text: &str) -> Result<Self, ClassTableError> {
        let file: ClassTableFile = toml::from_str(text)?;

        let mut names = BTreeMap::new();
        for (key, name) in file.names {
            let id = key
                .trim()
                .parse::<u32>()
                .map_err(|_| ClassTableError::InvalidId(key.clone()))?;
            names.insert(id, name);
        }

        if let Some(declared) = file.nc {
            if declared != names.len() {
                return Err(ClassTableError::CountMismatch { declared, found: names.len() });
            }
        }

        Ok(Self { names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .enumerate()
                .map(|(id, name)| (id as u32, name.into()))
                .collect(),
        }
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Display name, or `Class {id}` when the id is unknown
    pub fn label_for(&self, class_id: u32) -> String {
        match self.get(class_id) {
            Some(name) => name.to_string(),
            None => format!("Class {}", class_id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
