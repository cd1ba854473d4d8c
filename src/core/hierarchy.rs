// src/core/hierarchy.rs

use crate::models::Command;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Jerarquía de comandos cíclica: el comando '{command_id}' es su propio ancestro.")]
    CyclicHierarchy { command_id: String },
    #[error("Enlace de padre roto: el comando '{child_id}' apunta a un padre inexistente '{missing_parent_id}'.")]
    BrokenParentLink {
        child_id: String,
        missing_parent_id: String,
    },
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Un comando junto con sus subcomandos (ordenados).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode<'a> {
    pub command: &'a Command,
    pub subcommands: Vec<CommandNode<'a>>,
}

impl<'a> CommandNode<'a> {
    /// Recorrido en profundidad de este nodo y todos sus descendientes.
    pub fn walk(&self) -> Vec<&CommandNode<'a>> {
        let mut out = vec![self];
        for child in &self.subcommands {
            out.extend(child.walk());
        }
        out
    }
}

/// Construye el bosque de comandos. Cada lista de hermanos se ordena por `sort_order`;
/// a igual clave se conserva el orden de declaración.
pub fn build_tree(commands: &[Command]) -> HierarchyResult<Vec<CommandNode<'_>>> {
    // 1. Mapa padre -> hijos, respetando el orden de declaración.
    let mut children_map: HashMap<Option<&str>, Vec<&Command>> = HashMap::new();
    for command in commands {
        children_map
            .entry(command.parent_command_id.as_deref())
            .or_default()
            .push(command);
    }
    for children in children_map.values_mut() {
        children.sort_by_key(|c| c.sort_order);
    }

    // 2. Colgar los hijos empezando por las raíces.
    let mut visited = HashSet::new();
    let roots = attach_children(None, &children_map, &mut visited)?;

    // 3. Lo que quede sin visitar está en un ciclo o cuelga de un padre inexistente.
    if visited.len() < commands.len() {
        for command in commands {
            if !visited.contains(command.id.as_str()) {
                find_cycle_from(command, commands)?;
            }
        }
    }

    Ok(roots)
}

fn attach_children<'a>(
    parent: Option<&'a str>,
    children_map: &HashMap<Option<&'a str>, Vec<&'a Command>>,
    visited: &mut HashSet<&'a str>,
) -> HierarchyResult<Vec<CommandNode<'a>>> {
    let Some(children) = children_map.get(&parent) else {
        return Ok(Vec::new());
    };

    let mut nodes = Vec::with_capacity(children.len());
    for &command in children {
        if !visited.insert(command.id.as_str()) {
            return Err(HierarchyError::CyclicHierarchy {
                command_id: command.id.clone(),
            });
        }
        let subcommands = attach_children(Some(command.id.as_str()), children_map, visited)?;
        nodes.push(CommandNode {
            command,
            subcommands,
        });
    }
    Ok(nodes)
}

/// Sube por la cadena de padres de `start` hasta llegar a una raíz.
/// Falla si un comando aparece dos veces o un padre no existe.
pub fn find_cycle_from(start: &Command, commands: &[Command]) -> HierarchyResult<()> {
    let by_id: HashMap<&str, &Command> = commands.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut visited = HashSet::new();
    let mut current = start;

    loop {
        // Si el id ya estaba en el conjunto, hay un ciclo.
        if !visited.insert(current.id.as_str()) {
            return Err(HierarchyError::CyclicHierarchy {
                command_id: current.id.clone(),
            });
        }
        let Some(parent_id) = current.parent_command_id.as_deref() else {
            return Ok(());
        };
        match by_id.get(parent_id) {
            Some(parent) => current = *parent,
            None => {
                return Err(HierarchyError::BrokenParentLink {
                    child_id: current.id.clone(),
                    missing_parent_id: parent_id.to_string(),
                });
            }
        }
    }
}

/// Ids de `root_id` y de todos sus descendientes. Tolera ciclos.
pub fn descendant_ids(root_id: &str, commands: &[Command]) -> HashSet<String> {
    let mut collected = HashSet::new();
    let mut stack = vec![root_id.to_string()];
    while let Some(id) = stack.pop() {
        if !collected.insert(id.clone()) {
            continue;
        }
        stack.extend(
            commands
                .iter()
                .filter(|c| c.parent_command_id.as_deref() == Some(id.as_str()))
                .map(|c| c.id.clone()),
        );
    }
    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(id: &str, parent: Option<&str>, sort_order: i64) -> Command {
        Command {
            id: id.to_string(),
            name: id.to_string(),
            sort_order,
            parent_command_id: parent.map(str::to_string),
            ..Default::default()
        }
    }

    fn ids(nodes: &[CommandNode<'_>]) -> Vec<String> {
        nodes.iter().map(|n| n.command.id.clone()).collect()
    }

    #[test]
    fn test_build_tree_groups_and_sorts() {
        let commands = vec![
            cmd("git", None, 0),
            cmd("push", Some("git"), 2),
            cmd("commit", Some("git"), 1),
            cmd("remote", Some("git"), 3),
            cmd("add", Some("remote"), 0),
        ];
        let tree = build_tree(&commands).unwrap();
        assert_eq!(ids(&tree), vec!["git"]);
        assert_eq!(ids(&tree[0].subcommands), vec!["commit", "push", "remote"]);
        assert_eq!(ids(&tree[0].subcommands[2].subcommands), vec!["add"]);
        assert_eq!(tree[0].walk().len(), 5);
    }

    #[test]
    fn test_build_tree_is_stable_for_equal_sort_order() {
        let commands = vec![cmd("b", None, 0), cmd("a", None, 0), cmd("c", None, -1)];
        let tree = build_tree(&commands).unwrap();
        assert_eq!(ids(&tree), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_build_tree_detects_cycle() {
        let commands = vec![cmd("root", None, 0), cmd("a", Some("b"), 0), cmd("b", Some("a"), 0)];
        assert!(matches!(
            build_tree(&commands),
            Err(HierarchyError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_build_tree_detects_self_parent() {
        let commands = vec![cmd("a", Some("a"), 0)];
        assert_eq!(
            build_tree(&commands),
            Err(HierarchyError::CyclicHierarchy {
                command_id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_build_tree_detects_broken_parent() {
        let commands = vec![cmd("a", Some("ghost"), 0)];
        assert_eq!(
            build_tree(&commands),
            Err(HierarchyError::BrokenParentLink {
                child_id: "a".to_string(),
                missing_parent_id: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_descendant_ids_terminates_on_cycles() {
        let commands = vec![cmd("a", Some("b"), 0), cmd("b", Some("a"), 0), cmd("c", None, 0)];
        let found = descendant_ids("a", &commands);
        assert_eq!(found.len(), 2);
        assert!(!found.contains("c"));
    }
}
