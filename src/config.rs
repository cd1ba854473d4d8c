// src/config.rs

use crate::constants::{APP_DIR, SAVED_DIR, SETTINGS_FILENAME};
use crate::core::document::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No se pudo determinar el directorio '{0}' del sistema.")]
    NoSystemDir(&'static str),
    #[error("Error de archivo: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear el TOML de '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

type ConfigResult<T> = Result<T, ConfigError>;

/// Ajustes del usuario, leídos de `<config_dir>/cliforge/config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Negarse a generar un comando mientras haya restricciones incumplidas.
    pub strict_constraints: bool,
    /// Formato de destino de `convert` cuando no se pasa `--to`.
    pub export_format: ExportFormat,
    /// Exportar el JSON con sangría.
    pub pretty: bool,
    /// Sustituye el directorio de los comandos guardados.
    pub saved_dir: Option<PathBuf>,
}

impl Settings {
    /// Carga los ajustes de `path`. Si el archivo no existe se usan los valores por defecto.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No hay archivo de ajustes en {:?}; se usan los valores por defecto.", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&get_settings_path()?)
    }

    /// Dónde viven los comandos guardados: el directorio configurado, o si no el de datos.
    pub fn saved_commands_dir(&self) -> ConfigResult<PathBuf> {
        match &self.saved_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_data_dir()?.join(SAVED_DIR)),
        }
    }
}

/// Devuelve el directorio de configuración de la aplicación, creándolo si hace falta.
pub fn get_config_dir() -> ConfigResult<PathBuf> {
    let path = dirs::config_dir()
        .ok_or(ConfigError::NoSystemDir("config"))?
        .join(APP_DIR);
    ensure_dir(path)
}

/// Devuelve el directorio de datos de la aplicación, creándolo si hace falta.
pub fn get_data_dir() -> ConfigResult<PathBuf> {
    let path = dirs::data_dir()
        .ok_or(ConfigError::NoSystemDir("data"))?
        .join(APP_DIR);
    ensure_dir(path)
}

pub fn get_settings_path() -> ConfigResult<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

fn ensure_dir(path: PathBuf) -> ConfigResult<PathBuf> {
    if !path.exists() {
        log::info!("Creando el directorio {:?}", path);
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}
