// src/core/path_resolver.rs

use super::hierarchy::{HierarchyError, HierarchyResult};
use crate::models::{Command, Tool};
use std::collections::HashSet;

/// Indica si `command` representa a la propia herramienta: el comando por defecto con su nombre.
pub fn is_tool_root(command: &Command, tool: &Tool) -> bool {
    command.is_default && command.name == tool.name
}

/// Calcula la ruta de invocación de `command` (separada por espacios) subiendo por sus padres.
///
/// El comando raíz de la herramienta nunca se escribe: se resuelve al nombre
/// de la herramienta y se omite en las rutas de sus descendientes. Si la cadena
/// de padres está rota se usa el nombre a secas. Una cadena cíclica es un error.
pub fn resolve_path(command: &Command, tool: &Tool) -> HierarchyResult<String> {
    if is_tool_root(command, tool) {
        return Ok(tool.name.clone());
    }

    let mut names = vec![command.name.as_str()];
    let mut visited = HashSet::from([command.id.as_str()]);
    let mut current = command;

    while let Some(parent_id) = current.parent_command_id.as_deref() {
        let Some(parent) = tool.command(parent_id) else {
            log::warn!(
                "El comando '{}' apunta a un padre inexistente '{}'. Se usa su nombre a secas.",
                command.name,
                parent_id
            );
            return Ok(command.name.clone());
        };
        if !visited.insert(parent.id.as_str()) {
            return Err(HierarchyError::CyclicHierarchy {
                command_id: parent.id.clone(),
            });
        }
        if !(parent.parent_command_id.is_none() && is_tool_root(parent, tool)) {
            names.push(parent.name.as_str());
        }
        current = parent;
    }

    names.reverse();
    Ok(names.join(" "))
}

/// El inicio de un comando generado: el nombre de la herramienta seguido de la
/// ruta del comando, salvo que la ruta sea la propia herramienta.
pub fn invocation_prefix(command: &Command, tool: &Tool) -> HierarchyResult<String> {
    let path = resolve_path(command, tool)?;
    if path == tool.name {
        Ok(path)
    } else {
        Ok(format!("{} {}", tool.name, path))
    }
}

/// Busca un comando por su ruta de invocación (`"remote add"`, `"git remote add"`).
/// Una ruta vacía, o el nombre de la herramienta, selecciona el comando por defecto.
pub fn find_command_by_path<'a>(tool: &'a Tool, path: &str) -> Option<&'a Command> {
    let wanted = path.split_whitespace().collect::<Vec<_>>().join(" ");
    if wanted.is_empty() || wanted == tool.name {
        if let Some(default) = tool.default_command() {
            return Some(default);
        }
    }

    tool.commands.iter().find(|command| {
        let Ok(prefix) = invocation_prefix(command, tool) else {
            return false;
        };
        let Ok(path) = resolve_path(command, tool) else {
            return false;
        };
        prefix == wanted || path == wanted
    })
}
