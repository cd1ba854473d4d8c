// src/cli.rs

use crate::core::document::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "cliforge: describe herramientas de línea de comandos como datos y genera sus invocaciones.", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Muestra el árbol de comandos de un documento de herramienta.
    Tree {
        file: PathBuf,
    },

    /// Genera una invocación a partir de valores pasados por línea de comandos.
    Generate {
        file: PathBuf,
        /// Ruta del comando, p. ej. "remote add". Por defecto, el comando por defecto de la herramienta.
        #[arg(short, long)]
        command: Option<String>,
        /// Un valor como KEY=VALUE. KEY es el id, nombre, flag largo o flag corto de un parámetro.
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE", allow_hyphen_values = true)]
        values: Vec<String>,
        /// Falla en lugar de avisar cuando se incumplen restricciones.
        #[arg(long)]
        strict: bool,
        /// Guarda el resultado como comando guardado.
        #[arg(long)]
        save: bool,
    },

    /// Elige un comando y rellena sus parámetros de forma interactiva.
    Build {
        file: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        save: bool,
    },

    /// Convierte un documento de herramienta entre las formas anidada y plana.
    Convert {
        file: PathBuf,
        #[arg(long, value_enum)]
        to: Option<ExportFormat>,
        /// Escribe en este archivo en lugar de stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Informa de problemas estructurales, valores por defecto inválidos y referencias sin resolver.
    Check {
        file: PathBuf,
    },

    /// Lista las plantillas integradas.
    Templates,

    /// Escribe una plantilla integrada como nuevo documento de herramienta.
    New {
        template: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Gestiona los comandos guardados.
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SavedAction {
    /// Lista los comandos guardados de una herramienta.
    List { tool_id: String },
    /// Elimina un comando guardado.
    Remove { tool_id: String, id: String },
}
