// src/core/converter.rs

//! Conversión entre la representación plana (`Tool`, referencias por id) y la
//! anidada (`NestedTool`, árbol sin ids).
//!
//! Los documentos anidados nombran los parámetros por su token de flag en vez
//! de por su id: el flag largo, si no el corto, si no el nombre. Al pasar de
//! anidado a plano se generan ids nuevos, así que el viaje de ida y vuelta
//! conserva los comandos generados pero no la identidad.

use super::hierarchy::{self, CommandNode, HierarchyResult};
use crate::models::{
    Command, ExclusionGroup, NestedCommand, NestedDependency, NestedExclusionGroup,
    NestedParameter, NestedTool, Parameter, ParameterDependency, Tool, new_id, non_empty,
};
use std::collections::{HashMap, HashSet};

/// El token con el que un documento anidado se refiere a `parameter`.
pub fn reference_token(parameter: &Parameter) -> String {
    non_empty(parameter.long_flag.as_deref())
        .or_else(|| non_empty(parameter.short_flag.as_deref()))
        .unwrap_or(&parameter.name)
        .to_string()
}

// --- PLANO -> ANIDADO ---

/// Convierte una herramienta plana a su forma anidada. Solo falla si la jerarquía es cíclica o está rota.
pub fn to_nested(tool: &Tool) -> HierarchyResult<NestedTool> {
    let tree = hierarchy::build_tree(&tool.commands)?;
    let tokens: HashMap<&str, String> = tool
        .parameters
        .iter()
        .map(|p| (p.id.as_str(), reference_token(p)))
        .collect();

    let known_commands: HashSet<&str> = tool.commands.iter().map(|c| c.id.as_str()).collect();
    for command in tool.commands.iter().filter(|c| c.name.trim().is_empty()) {
        log::warn!(
            "El comando '{}' no tiene nombre; al reimportarlo se leerá como el grupo de parámetros globales.",
            command.id
        );
    }
    for parameter in &tool.parameters {
        let attached = parameter
            .command_id
            .as_deref()
            .is_some_and(|id| known_commands.contains(id));
        if !parameter.is_global && !attached {
            log::warn!(
                "El parámetro '{}' no es global ni pertenece a un comando existente; se omite.",
                parameter.name
            );
        }
    }

    let global_parameters = tool
        .parameters
        .iter()
        .filter(|p| p.is_global)
        .map(|p| nest_parameter(p, &tokens))
        .collect();

    let mut exclusion_groups = Vec::new();
    for group in &tool.exclusion_groups {
        match group.command_id.as_deref() {
            None => exclusion_groups.push(nest_group(group, &tokens)),
            Some(id) if !known_commands.contains(id) => log::warn!(
                "Se omite un grupo de exclusión ligado al comando inexistente '{}'.",
                id
            ),
            Some(_) => {}
        }
    }

    Ok(NestedTool {
        name: tool.name.clone(),
        display_name: tool.display_name.clone(),
        description: tool.description.clone(),
        version: tool.version.clone(),
        category: tool.category.clone(),
        tags: tool.tags.clone(),
        supported_input: tool.supported_input.clone(),
        supported_output: tool.supported_output.clone(),
        global_parameters,
        commands: tree.iter().map(|n| nest_command(n, tool, &tokens)).collect(),
        exclusion_groups,
    })
}

fn nest_command(node: &CommandNode<'_>, tool: &Tool, tokens: &HashMap<&str, String>) -> NestedCommand {
    let command = node.command;
    NestedCommand {
        name: command.name.clone(),
        description: command.description.clone(),
        is_default: command.is_default,
        sort_order: command.sort_order,
        parameters: tool
            .parameters
            .iter()
            .filter(|p| !p.is_global && p.command_id.as_deref() == Some(command.id.as_str()))
            .map(|p| nest_parameter(p, tokens))
            .collect(),
        subcommands: node
            .subcommands
            .iter()
            .map(|n| nest_command(n, tool, tokens))
            .collect(),
        exclusion_groups: tool
            .exclusion_groups
            .iter()
            .filter(|g| g.command_id.as_deref() == Some(command.id.as_str()))
            .map(|g| nest_group(g, tokens))
            .collect(),
    }
}

fn nest_parameter(parameter: &Parameter, tokens: &HashMap<&str, String>) -> NestedParameter {
    NestedParameter {
        name: parameter.name.clone(),
        description: parameter.description.clone(),
        parameter_type: parameter.parameter_type,
        data_type: parameter.data_type,
        is_required: parameter.is_required,
        is_repeatable: parameter.is_repeatable,
        default_value: parameter.default_value.clone(),
        short_flag: parameter.short_flag.clone(),
        long_flag: parameter.long_flag.clone(),
        position: parameter.position,
        sort_order: parameter.sort_order,
        array_separator: parameter.array_separator.clone(),
        key_value_separator: parameter.key_value_separator.clone(),
        enum_values: parameter.enum_values.clone(),
        validations: parameter.validations.clone(),
        dependencies: parameter
            .dependencies
            .iter()
            .map(|d| NestedDependency {
                dependency_type: d.dependency_type,
                depends_on: token_for(&d.depends_on_parameter_id, tokens),
                condition_value: d.condition_value.clone(),
            })
            .collect(),
    }
}

fn nest_group(group: &ExclusionGroup, tokens: &HashMap<&str, String>) -> NestedExclusionGroup {
    NestedExclusionGroup {
        exclusion_type: group.exclusion_type,
        parameters: group
            .parameter_ids
            .iter()
            .map(|id| token_for(id, tokens))
            .collect(),
    }
}

fn token_for(id: &str, tokens: &HashMap<&str, String>) -> String {
    tokens.get(id).cloned().unwrap_or_else(|| {
        log::warn!("Referencia al parámetro desconocido '{}'; se deja vacía.", id);
        String::new()
    })
}

// --- ANIDADO -> PLANO ---

/// Una dependencia a la espera de que todos los parámetros tengan su id nuevo.
struct PendingDependency {
    parameter_index: usize,
    scope: Option<String>,
    dependency: NestedDependency,
}

struct PendingGroup {
    scope: Option<String>,
    group: NestedExclusionGroup,
}

#[derive(Default)]
struct Flattener {
    commands: Vec<Command>,
    parameters: Vec<Parameter>,
    dependencies: Vec<PendingDependency>,
    groups: Vec<PendingGroup>,
    resolved_groups: Vec<ExclusionGroup>,
}

/// Convierte un documento anidado en una herramienta plana con ids nuevos.
///
/// Los parámetros de `globalParameters`, o de un comando sin nombre, pasan a
/// ser globales. Las referencias que no coinciden con ningún parámetro se
/// descartan con un aviso.
pub fn to_flat(nested: &NestedTool) -> Tool {
    let mut flattener = Flattener::default();

    for parameter in &nested.global_parameters {
        flattener.push_parameter(parameter, None);
    }
    for group in &nested.exclusion_groups {
        flattener.groups.push(PendingGroup {
            scope: None,
            group: group.clone(),
        });
    }
    for command in &nested.commands {
        flattener.flatten_command(command, None);
    }

    flattener.resolve_references();

    Tool {
        id: None,
        name: nested.name.clone(),
        display_name: nested.display_name.clone(),
        description: nested.description.clone(),
        version: nested.version.clone(),
        category: nested.category.clone(),
        tags: nested.tags.clone(),
        commands: flattener.commands,
        parameters: flattener.parameters,
        exclusion_groups: flattener.resolved_groups,
        supported_input: nested.supported_input.clone(),
        supported_output: nested.supported_output.clone(),
    }
}

impl Flattener {
    fn flatten_command(&mut self, nested: &NestedCommand, parent_id: Option<&str>) {
        // Un comando sin nombre es el grupo global, no un comando propio.
        let scope = if nested.name.is_empty() {
            None
        } else {
            let command = Command {
                id: new_id(),
                name: nested.name.clone(),
                description: nested.description.clone(),
                is_default: nested.is_default,
                sort_order: nested.sort_order,
                parent_command_id: parent_id.map(str::to_string),
            };
            let id = command.id.clone();
            self.commands.push(command);
            Some(id)
        };

        for parameter in &nested.parameters {
            self.push_parameter(parameter, scope.as_deref());
        }
        for group in &nested.exclusion_groups {
            self.groups.push(PendingGroup {
                scope: scope.clone(),
                group: group.clone(),
            });
        }
        let child_parent = scope.as_deref().or(parent_id);
        for subcommand in &nested.subcommands {
            self.flatten_command(subcommand, child_parent);
        }
    }

    fn push_parameter(&mut self, nested: &NestedParameter, command_id: Option<&str>) {
        let index = self.parameters.len();
        for dependency in &nested.dependencies {
            self.dependencies.push(PendingDependency {
                parameter_index: index,
                scope: command_id.map(str::to_string),
                dependency: dependency.clone(),
            });
        }
        self.parameters.push(Parameter {
            id: new_id(),
            name: nested.name.clone(),
            description: nested.description.clone(),
            parameter_type: nested.parameter_type,
            data_type: nested.data_type,
            is_required: nested.is_required,
            is_repeatable: nested.is_repeatable,
            is_global: command_id.is_none(),
            command_id: command_id.map(str::to_string),
            default_value: nested.default_value.clone(),
            short_flag: nested.short_flag.clone(),
            long_flag: nested.long_flag.clone(),
            position: nested.position,
            sort_order: nested.sort_order,
            array_separator: nested.array_separator.clone(),
            key_value_separator: nested.key_value_separator.clone(),
            enum_values: nested.enum_values.clone(),
            validations: nested.validations.clone(),
            dependencies: Vec::new(),
        });
    }

    /// Busca el id del parámetro al que se refiere `token` desde `scope`.
    /// Los parámetros visibles en el ámbito tienen prioridad sobre el resto.
    fn lookup(&self, token: &str, scope: Option<&str>) -> Option<String> {
        if token.is_empty() {
            return None;
        }
        let in_scope = |p: &&Parameter| match scope {
            Some(id) => p.is_visible_to(id),
            None => p.is_global,
        };
        let matchers: [fn(&Parameter, &str) -> bool; 3] = [
            |p, t| p.long_flag.as_deref() == Some(t),
            |p, t| p.short_flag.as_deref() == Some(t),
            |p, t| p.name == t,
        ];

        for matcher in matchers {
            let found = self
                .parameters
                .iter()
                .filter(in_scope)
                .find(|p| matcher(*p, token))
                .or_else(|| self.parameters.iter().find(|p| matcher(*p, token)));
            if let Some(p) = found {
                return Some(p.id.clone());
            }
        }
        None
    }

    fn resolve_references(&mut self) {
        let pending = std::mem::take(&mut self.dependencies);
        for item in pending {
            match self.lookup(&item.dependency.depends_on, item.scope.as_deref()) {
                Some(target) => self.parameters[item.parameter_index]
                    .dependencies
                    .push(ParameterDependency {
                        dependency_type: item.dependency.dependency_type,
                        depends_on_parameter_id: target,
                        condition_value: item.dependency.condition_value,
                    }),
                None => log::warn!(
                    "Se descarta la dependencia de '{}' sobre el parámetro desconocido '{}'.",
                    self.parameters[item.parameter_index].name,
                    item.dependency.depends_on
                ),
            }
        }

        let pending = std::mem::take(&mut self.groups);
        for item in pending {
            let mut parameter_ids = Vec::with_capacity(item.group.parameters.len());
            for token in &item.group.parameters {
                match self.lookup(token, item.scope.as_deref()) {
                    Some(id) => parameter_ids.push(id),
                    None => log::warn!("Miembro de grupo de exclusión '{}' no encontrado; se omite.", token),
                }
            }
            self.resolved_groups.push(ExclusionGroup {
                exclusion_type: item.group.exclusion_type,
                parameter_ids,
                command_id: item.scope,
            });
        }
    }
}
