use crate::model::Dataset;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Collaborateur de persistance: lecture de l'instantané, écriture en un seul lot.
pub trait Storage {
    /// Charge le jeu de données.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, data: &Dataset) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl Storage for JsonStorage {
    /// Un fichier absent vaut un jeu de données vide; un fichier illisible est une erreur.
    fn load(&self) -> anyhow::Result<Dataset> {
        if !self.path.exists() {
            return Ok(Dataset::default());
        }
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let dataset: Dataset = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(dataset)
    }

    fn save(&self, data: &Dataset) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
