// src/system/storage.rs

use crate::constants::{SAVED_FILE_EXTENSION, SAVED_FILE_PREFIX};
use crate::models::{SavedCommand, new_id};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Error de archivo: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear los comandos guardados de '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Error al serializar los comandos guardados: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("'{0}' no sirve como id de herramienta para guardar.")]
    InvalidToolId(String),
}

type StorageResult<T> = Result<T, StorageError>;

/// Invocaciones guardadas, un archivo JSON por herramienta (`saved-<toolId>.json`).
#[derive(Debug, Clone)]
pub struct SavedCommandStore {
    dir: PathBuf,
}

impl SavedCommandStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, tool_id: &str) -> StorageResult<PathBuf> {
        let valid = !tool_id.is_empty()
            && !tool_id.contains(['/', '\\'])
            && tool_id != "."
            && tool_id != "..";
        if !valid {
            return Err(StorageError::InvalidToolId(tool_id.to_string()));
        }
        Ok(self.dir.join(format!(
            "{}{}.{}",
            SAVED_FILE_PREFIX, tool_id, SAVED_FILE_EXTENSION
        )))
    }

    /// Comandos guardados de una herramienta, del más antiguo al más nuevo. Sin archivo no hay ninguno.
    pub fn list(&self, tool_id: &str) -> StorageResult<Vec<SavedCommand>> {
        let path = self.file_for(tool_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| StorageError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Añade `command` a la lista de la herramienta y devuelve la entrada guardada.
    pub fn save(&self, tool_id: &str, command: &str) -> StorageResult<SavedCommand> {
        let mut saved = self.list(tool_id)?;
        let entry = SavedCommand {
            id: new_id(),
            command: command.to_string(),
        };
        saved.push(entry.clone());
        self.write(tool_id, &saved)?;
        log::info!("Comando {} guardado para la herramienta '{}'", entry.id, tool_id);
        Ok(entry)
    }

    /// Elimina el comando guardado con `id`. Devuelve si se eliminó algo.
    pub fn remove(&self, tool_id: &str, id: &str) -> StorageResult<bool> {
        let mut saved = self.list(tool_id)?;
        let before = saved.len();
        saved.retain(|c| c.id != id);
        if saved.len() == before {
            log::debug!("No hay comando guardado {} para la herramienta '{}'", id, tool_id);
            return Ok(false);
        }
        self.write(tool_id, &saved)?;
        Ok(true)
    }

    fn write(&self, tool_id: &str, saved: &[SavedCommand]) -> StorageResult<()> {
        let path = self.file_for(tool_id)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, serde_json::to_string_pretty(saved)?)?;
        Ok(())
    }
}
