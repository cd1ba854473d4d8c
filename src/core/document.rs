// src/core/document.rs

//! Lectura y escritura de documentos de herramienta. Al importar se aceptan
//! ambas representaciones; el resto del crate trabaja con la plana.

use super::converter;
use super::hierarchy::{self, HierarchyError};
use crate::models::{NestedTool, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON mal formado: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Falta el campo obligatorio '{0}' o está vacío.")]
    MissingField(&'static str),
    #[error("Forma de documento no válida: {0}")]
    InvalidShape(String),
    #[error("Id de {kind} duplicado: '{id}'.")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{owner} apunta a un comando inexistente '{missing_id}'.")]
    DanglingReference { owner: String, missing_id: String },
    #[error("Error de jerarquía: {0}")]
    Hierarchy(#[from] HierarchyError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Nested,
    Flat,
}

/// Parsea un documento de herramienta detectando si es plano o anidado.
///
/// Un documento es plano si tiene un array `parameters` en el nivel superior o
/// si alguno de sus comandos lleva `id`. Los documentos planos deben cumplir
/// los invariantes que comprueba [`check_structure`].
pub fn import_tool(json: &str) -> DocumentResult<Tool> {
    let value: Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(DocumentError::InvalidShape(
            "se esperaba un objeto JSON en el nivel superior".to_string(),
        ));
    };
    match object.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => {}
        _ => return Err(DocumentError::MissingField("name")),
    }

    let mut tool = if is_flat(&value) {
        log::debug!("Importando un documento plano.");
        let tool: Tool = serde_json::from_value(value)
            .map_err(|e| DocumentError::InvalidShape(e.to_string()))?;
        check_structure(&tool)?;
        tool
    } else {
        log::debug!("Importando un documento anidado.");
        let nested: NestedTool = serde_json::from_value(value)
            .map_err(|e| DocumentError::InvalidShape(e.to_string()))?;
        converter::to_flat(&nested)
    };

    ensure_default_command(&mut tool);
    log::info!(
        "Herramienta '{}' importada: {} comando(s), {} parámetro(s).",
        tool.name,
        tool.commands.len(),
        tool.parameters.len()
    );
    Ok(tool)
}

fn is_flat(value: &Value) -> bool {
    if value.get("parameters").is_some_and(Value::is_array) {
        return true;
    }
    value
        .get("commands")
        .and_then(Value::as_array)
        .is_some_and(|commands| commands.iter().any(|c| c.get("id").is_some()))
}

/// Comprueba los invariantes a nivel de ids de una herramienta plana.
pub fn check_structure(tool: &Tool) -> DocumentResult<()> {
    let mut command_ids = HashSet::new();
    for command in &tool.commands {
        if !command_ids.insert(command.id.as_str()) {
            return Err(DocumentError::DuplicateId {
                kind: "comando",
                id: command.id.clone(),
            });
        }
        // En la forma anidada un nombre vacío marca el grupo de parámetros globales.
        if command.name.trim().is_empty() {
            return Err(DocumentError::InvalidShape(format!(
                "el comando '{}' no tiene nombre",
                command.id
            )));
        }
    }

    let mut parameter_ids = HashSet::new();
    for parameter in &tool.parameters {
        if !parameter_ids.insert(parameter.id.as_str()) {
            return Err(DocumentError::DuplicateId {
                kind: "parámetro",
                id: parameter.id.clone(),
            });
        }
        match (parameter.is_global, parameter.command_id.as_deref()) {
            (true, Some(_)) => {
                return Err(DocumentError::InvalidShape(format!(
                    "el parámetro global '{}' no puede llevar commandId",
                    parameter.name
                )));
            }
            (false, None) => {
                return Err(DocumentError::InvalidShape(format!(
                    "el parámetro '{}' no es global ni pertenece a un comando",
                    parameter.name
                )));
            }
            (false, Some(id)) if !command_ids.contains(id) => {
                return Err(DocumentError::DanglingReference {
                    owner: format!("El parámetro '{}'", parameter.name),
                    missing_id: id.to_string(),
                });
            }
            _ => {}
        }
    }

    for (i, group) in tool.exclusion_groups.iter().enumerate() {
        if let Some(id) = group.command_id.as_deref() {
            if !command_ids.contains(id) {
                return Err(DocumentError::DanglingReference {
                    owner: format!("El grupo de exclusión #{}", i + 1),
                    missing_id: id.to_string(),
                });
            }
        }
    }

    hierarchy::build_tree(&tool.commands)?;
    Ok(())
}

/// Deja como mucho un comando por defecto en cada grupo de hermanos (gana el
/// de menor `sortOrder`) y, si la herramienta no tiene ninguno, marca la
/// primera raíz.
pub fn ensure_default_command(tool: &mut Tool) {
    let mut keep: HashMap<Option<String>, (i64, usize)> = HashMap::new();
    for (i, command) in tool.commands.iter().enumerate().filter(|(_, c)| c.is_default) {
        let candidate = (command.sort_order, i);
        keep.entry(command.parent_command_id.clone())
            .and_modify(|best| *best = (*best).min(candidate))
            .or_insert(candidate);
    }
    for (i, command) in tool.commands.iter_mut().enumerate() {
        let kept = keep
            .get(&command.parent_command_id)
            .is_some_and(|&(_, index)| index == i);
        if command.is_default && !kept {
            log::warn!(
                "El comando '{}' comparte la marca por defecto con un hermano. Se le retira.",
                command.name
            );
            command.is_default = false;
        }
    }

    if !keep.is_empty() {
        return;
    }
    let first_root = tool
        .commands
        .iter_mut()
        .filter(|c| c.parent_command_id.is_none())
        .min_by_key(|c| c.sort_order);
    if let Some(command) = first_root {
        log::warn!(
            "La herramienta '{}' no tiene comando por defecto. Se usará '{}'.",
            tool.name,
            command.name
        );
        command.is_default = true;
    }
}

// --- EXPORTACIÓN ---

pub fn export_flat(tool: &Tool, pretty: bool) -> DocumentResult<String> {
    Ok(to_json(tool, pretty)?)
}

pub fn export_nested(tool: &Tool, pretty: bool) -> DocumentResult<String> {
    let nested = converter::to_nested(tool)?;
    Ok(to_json(&nested, pretty)?)
}

pub fn export(tool: &Tool, format: ExportFormat, pretty: bool) -> DocumentResult<String> {
    match format {
        ExportFormat::Flat => export_flat(tool, pretty),
        ExportFormat::Nested => export_nested(tool, pretty),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
