// src/core/editor.rs

//! Ediciones copy-on-write de un `Tool`. Cada función recibe la instantánea
//! actual y devuelve una nueva; la sincronización es cosa del llamador.

use super::hierarchy::{self, HierarchyError};
use crate::models::{Command, ExclusionGroup, Parameter, Tool};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("El comando '{0}' no existe.")]
    CommandNotFound(String),
    #[error("El parámetro '{0}' no existe.")]
    ParameterNotFound(String),
    #[error("Ya hay un parámetro llamado '{0}' visible para este comando.")]
    DuplicateName(String),
    #[error("El flag largo '{0}' ya lo usa un parámetro visible.")]
    DuplicateLongFlag(String),
    #[error("El flag corto '{0}' ya lo usa un parámetro visible.")]
    DuplicateShortFlag(String),
    #[error("El parámetro global '{0}' no puede pertenecer a un comando.")]
    GlobalWithCommand(String),
    #[error("El parámetro '{0}' debe ser global o pertenecer a un comando.")]
    MissingScope(String),
    #[error("Error de jerarquía: {0}")]
    Hierarchy(#[from] HierarchyError),
}

pub type EditResult<T> = Result<T, EditError>;

// --- COMANDOS ---

/// Añade un comando provisional bajo `parent_id` (o en la raíz), tras su último hermano.
/// Devuelve la nueva instantánea y el id del comando creado.
pub fn add_command(tool: &Tool, parent_id: Option<&str>) -> EditResult<(Tool, String)> {
    if let Some(id) = parent_id {
        require_command(tool, id)?;
    }
    let mut command = Command::placeholder();
    command.parent_command_id = parent_id.map(str::to_string);
    command.sort_order = tool
        .children_of(parent_id)
        .map(|c| c.sort_order + 1)
        .max()
        .unwrap_or(0);

    log::debug!("Añadiendo comando '{}' ({})", command.name, command.id);
    let id = command.id.clone();
    let mut next = tool.clone();
    next.commands.push(command);
    Ok((next, id))
}

/// Elimina un comando, sus descendientes y todo lo que cuelga de ellos.
pub fn delete_command(tool: &Tool, id: &str) -> EditResult<Tool> {
    require_command(tool, id)?;
    let removed = hierarchy::descendant_ids(id, &tool.commands);
    log::debug!("Eliminando {} comando(s) a partir de '{}'", removed.len(), id);

    let is_removed = |scope: &Option<String>| scope.as_ref().is_some_and(|s| removed.contains(s));

    let mut next = tool.clone();
    next.commands.retain(|c| !removed.contains(&c.id));
    next.parameters.retain(|p| !is_removed(&p.command_id));
    next.exclusion_groups.retain(|g| !is_removed(&g.command_id));
    Ok(prune_parameter_references(next))
}

/// Marca `id` como comando por defecto y se lo quita a sus hermanos.
pub fn set_default_command(tool: &Tool, id: &str) -> EditResult<Tool> {
    let parent = require_command(tool, id)?.parent_command_id.clone();
    let mut next = tool.clone();
    for command in next.commands.iter_mut() {
        if command.id == id {
            command.is_default = true;
        } else if command.parent_command_id == parent {
            command.is_default = false;
        }
    }
    Ok(next)
}

/// Mueve un comando bajo otro padre (o a la raíz). Rechaza los movimientos que crearían un ciclo.
pub fn move_command(tool: &Tool, id: &str, new_parent: Option<&str>) -> EditResult<Tool> {
    require_command(tool, id)?;
    if let Some(parent) = new_parent {
        require_command(tool, parent)?;
        if hierarchy::descendant_ids(id, &tool.commands).contains(parent) {
            return Err(HierarchyError::CyclicHierarchy {
                command_id: id.to_string(),
            }
            .into());
        }
    }

    let mut next = tool.clone();
    let sort_order = next
        .children_of(new_parent)
        .filter(|c| c.id != id)
        .map(|c| c.sort_order + 1)
        .max()
        .unwrap_or(0);
    if let Some(command) = next.commands.iter_mut().find(|c| c.id == id) {
        command.parent_command_id = new_parent.map(str::to_string);
        command.sort_order = sort_order;
    }
    Ok(next)
}

// --- PARÁMETROS ---

/// Inserta `parameter`, o reemplaza el que tenga el mismo id.
///
/// Dentro del conjunto de parámetros visibles para un comando, los nombres y
/// los flags largos y cortos deben ser únicos.
pub fn upsert_parameter(tool: &Tool, parameter: Parameter) -> EditResult<Tool> {
    match (parameter.is_global, parameter.command_id.as_deref()) {
        (true, Some(_)) => return Err(EditError::GlobalWithCommand(parameter.name)),
        (false, None) => return Err(EditError::MissingScope(parameter.name)),
        (false, Some(id)) => {
            require_command(tool, id)?;
        }
        (true, None) => {}
    }

    for other in tool.parameters.iter().filter(|p| p.id != parameter.id) {
        let overlaps = parameter.is_global || other.is_global || other.command_id == parameter.command_id;
        if !overlaps {
            continue;
        }
        if other.name == parameter.name {
            return Err(EditError::DuplicateName(parameter.name));
        }
        if let Some(flag) = clash(&other.long_flag, &parameter.long_flag) {
            return Err(EditError::DuplicateLongFlag(flag));
        }
        if let Some(flag) = clash(&other.short_flag, &parameter.short_flag) {
            return Err(EditError::DuplicateShortFlag(flag));
        }
    }

    let mut next = tool.clone();
    match next.parameters.iter_mut().find(|p| p.id == parameter.id) {
        Some(existing) => *existing = parameter,
        None => next.parameters.push(parameter),
    }
    Ok(next)
}

fn clash(a: &Option<String>, b: &Option<String>) -> Option<String> {
    match (a.as_deref(), b.as_deref()) {
        (Some(x), Some(y)) if !x.is_empty() && x == y => Some(x.to_string()),
        _ => None,
    }
}

/// Elimina un parámetro y las dependencias o pertenencias a grupos que lo nombran.
pub fn delete_parameter(tool: &Tool, id: &str) -> EditResult<Tool> {
    if tool.parameter(id).is_none() {
        return Err(EditError::ParameterNotFound(id.to_string()));
    }
    let mut next = tool.clone();
    next.parameters.retain(|p| p.id != id);
    Ok(prune_parameter_references(next))
}

// --- GRUPOS DE EXCLUSIÓN ---

pub fn add_exclusion_group(tool: &Tool, group: ExclusionGroup) -> EditResult<Tool> {
    if let Some(id) = group.command_id.as_deref() {
        require_command(tool, id)?;
    }
    if let Some(missing) = group.parameter_ids.iter().find(|id| tool.parameter(id).is_none()) {
        return Err(EditError::ParameterNotFound(missing.clone()));
    }
    let mut next = tool.clone();
    next.exclusion_groups.push(group);
    Ok(next)
}

// --- AUXILIARES ---

fn require_command<'a>(tool: &'a Tool, id: &str) -> EditResult<&'a Command> {
    tool.command(id)
        .ok_or_else(|| EditError::CommandNotFound(id.to_string()))
}

/// Quita las dependencias y miembros de grupo cuyo parámetro ya no existe,
/// y después los grupos que quedan vacíos.
fn prune_parameter_references(mut tool: Tool) -> Tool {
    let known: HashSet<String> = tool.parameters.iter().map(|p| p.id.clone()).collect();
    for parameter in tool.parameters.iter_mut() {
        parameter
            .dependencies
            .retain(|d| known.contains(&d.depends_on_parameter_id));
    }
    for group in tool.exclusion_groups.iter_mut() {
        group.parameter_ids.retain(|id| known.contains(id));
    }
    tool.exclusion_groups.retain(|g| !g.parameter_ids.is_empty());
    tool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DependencyType, ExclusionType, ParameterDependency, ParameterType};

    fn cmd(id: &str, parent: Option<&str>) -> Command {
        Command {
            id: id.to_string(),
            name: id.to_string(),
            parent_command_id: parent.map(str::to_string),
            ..Default::default()
        }
    }

    fn scoped(id: &str, command: &str) -> Parameter {
        let mut p = Parameter::new(id, ParameterType::Flag);
        p.id = id.to_string();
        p.command_id = Some(command.to_string());
        p
    }

    fn tool() -> Tool {
        Tool {
            name: "app".to_string(),
            commands: vec![
                cmd("root", None),
                cmd("a", Some("root")),
                cmd("a1", Some("a")),
                cmd("a2", Some("a1")),
                cmd("b", Some("root")),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_delete_command_cascades() {
        let mut t = tool();
        t.parameters = vec![scoped("pa", "a"), scoped("pa2", "a2"), scoped("pb", "b")];
        t.parameters[2].dependencies.push(ParameterDependency {
            dependency_type: DependencyType::Requires,
            depends_on_parameter_id: "pa".to_string(),
            condition_value: None,
        });
        t.exclusion_groups = vec![
            ExclusionGroup {
                exclusion_type: ExclusionType::MutualExclusive,
                parameter_ids: vec!["pa2".to_string()],
                command_id: Some("a1".to_string()),
            },
            ExclusionGroup {
                exclusion_type: ExclusionType::MutualExclusive,
                parameter_ids: vec!["pb".to_string(), "pa".to_string()],
                command_id: None,
            },
        ];

        let next = delete_command(&t, "a").unwrap();
        let ids: Vec<_> = next.commands.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "b"]);
        assert_eq!(next.parameters.len(), 1);
        assert_eq!(next.parameters[0].id, "pb");
        assert!(next.parameters[0].dependencies.is_empty());
        assert_eq!(next.exclusion_groups.len(), 1);
        assert_eq!(next.exclusion_groups[0].parameter_ids, vec!["pb"]);

        // La instantánea original no cambia.
        assert_eq!(t.commands.len(), 5);
    }

    #[test]
    fn test_delete_unknown_command() {
        assert_eq!(
            delete_command(&tool(), "zzz"),
            Err(EditError::CommandNotFound("zzz".to_string()))
        );
    }

    #[test]
    fn test_add_command_appends_after_siblings() {
        let mut t = tool();
        t.commands[4].sort_order = 7;
        let (next, id) = add_command(&t, Some("root")).unwrap();
        let added = next.command(&id).unwrap();
        assert_eq!(added.parent_command_id.as_deref(), Some("root"));
        assert_eq!(added.sort_order, 8);
        assert!(added.name.starts_with("command-"));
        assert!(add_command(&t, Some("nope")).is_err());
    }

    #[test]
    fn test_set_default_clears_siblings_only() {
        let mut t = tool();
        t.commands[0].is_default = true;
        t.commands[1].is_default = true;
        let next = set_default_command(&t, "b").unwrap();
        let defaults: Vec<_> = next
            .commands
            .iter()
            .filter(|c| c.is_default)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(defaults, vec!["root", "b"]);
    }

    #[test]
    fn test_move_command_rejects_cycles() {
        let t = tool();
        assert!(matches!(
            move_command(&t, "a", Some("a2")),
            Err(EditError::Hierarchy(HierarchyError::CyclicHierarchy { .. }))
        ));
        let next = move_command(&t, "a2", Some("b")).unwrap();
        assert_eq!(next.command("a2").unwrap().parent_command_id.as_deref(), Some("b"));
        let next = move_command(&next, "a2", None).unwrap();
        assert_eq!(next.command("a2").unwrap().parent_command_id, None);
    }

    #[test]
    fn test_upsert_enforces_uniqueness_within_visible_set() {
        let mut t = tool();
        let mut verbose = scoped("v", "a");
        verbose.long_flag = Some("--verbose".to_string());
        t = upsert_parameter(&t, verbose).unwrap();

        // El mismo flag en un comando ajeno no choca.
        let mut other = scoped("v2", "b");
        other.long_flag = Some("--verbose".to_string());
        t = upsert_parameter(&t, other).unwrap();

        // Un parámetro global es visible en todas partes y no puede chocar.
        let mut global = Parameter::new("global verbose", ParameterType::Flag);
        global.is_global = true;
        global.long_flag = Some("--verbose".to_string());
        assert_eq!(
            upsert_parameter(&t, global),
            Err(EditError::DuplicateLongFlag("--verbose".to_string()))
        );

        // El mismo nombre en el mismo comando choca.
        let dup = scoped("v3", "a");
        let mut dup = Parameter { name: "v".to_string(), ..dup };
        dup.short_flag = Some("-x".to_string());
        assert_eq!(
            upsert_parameter(&t, dup),
            Err(EditError::DuplicateName("v".to_string()))
        );
    }

    #[test]
    fn test_upsert_replaces_existing_and_checks_scope() {
        let t = upsert_parameter(&tool(), scoped("p", "a")).unwrap();
        let mut renamed = scoped("p", "a");
        renamed.name = "renamed".to_string();
        let t = upsert_parameter(&t, renamed).unwrap();
        assert_eq!(t.parameters.len(), 1);
        assert_eq!(t.parameters[0].name, "renamed");

        let mut bad = scoped("g", "a");
        bad.is_global = true;
        assert!(matches!(upsert_parameter(&t, bad), Err(EditError::GlobalWithCommand(_))));

        let mut orphan = scoped("o", "a");
        orphan.command_id = None;
        assert!(matches!(upsert_parameter(&t, orphan), Err(EditError::MissingScope(_))));

        assert!(matches!(
            upsert_parameter(&t, scoped("x", "ghost")),
            Err(EditError::CommandNotFound(_))
        ));
    }

    #[test]
    fn test_delete_parameter_prunes_references() {
        let mut t = tool();
        t.parameters = vec![scoped("p1", "a"), scoped("p2", "a")];
        t.parameters[1].dependencies.push(ParameterDependency {
            dependency_type: DependencyType::ConflictsWith,
            depends_on_parameter_id: "p1".to_string(),
            condition_value: None,
        });
        t = add_exclusion_group(
            &t,
            ExclusionGroup {
                exclusion_type: ExclusionType::RequiredOneOf,
                parameter_ids: vec!["p1".to_string()],
                command_id: Some("a".to_string()),
            },
        )
        .unwrap();

        let next = delete_parameter(&t, "p1").unwrap();
        assert_eq!(next.parameters.len(), 1);
        assert!(next.parameters[0].dependencies.is_empty());
        assert!(next.exclusion_groups.is_empty());
        assert!(delete_parameter(&next, "p1").is_err());
    }
}
