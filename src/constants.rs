// src/constants.rs

/// Nombre del directorio de la aplicación dentro de los de configuración y datos del sistema.
pub const APP_DIR: &str = "cliforge";

/// Archivo de ajustes (en `<config_dir>/cliforge/`).
pub const SETTINGS_FILENAME: &str = "config.toml";

/// Los archivos de comandos guardados se llaman `saved-<toolId>.json`.
pub const SAVED_FILE_PREFIX: &str = "saved-";
pub const SAVED_FILE_EXTENSION: &str = "json";

/// Subdirectorio del de datos con los archivos de comandos guardados.
pub const SAVED_DIR: &str = "saved";
