// src/core/constraints.rs

//! Evaluación de las restricciones declarativas de una herramienta: parámetros
//! obligatorios, dependencias `requires`/`conflicts_with` y grupos de exclusión.
//!
//! Un parámetro está *activo* cuando su valor elegido aparecería en el comando
//! generado. Solo cuentan los parámetros visibles para el comando elegido; los
//! grupos de otro comando se ignoran.

use crate::models::{
    Command, DependencyType, ExclusionType, Parameter, ParameterValues, Tool,
};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    MissingRequired {
        parameter: String,
    },
    MissingDependency {
        parameter: String,
        requires: String,
    },
    Conflict {
        parameter: String,
        conflicts_with: String,
    },
    MutuallyExclusive {
        parameters: Vec<String>,
    },
    NoneOfRequired {
        parameters: Vec<String>,
    },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired { parameter } => {
                write!(f, "'{}' es obligatorio.", parameter)
            }
            Self::MissingDependency {
                parameter,
                requires,
            } => write!(f, "'{}' requiere '{}'.", parameter, requires),
            Self::Conflict {
                parameter,
                conflicts_with,
            } => write!(f, "'{}' no se puede usar junto a '{}'.", parameter, conflicts_with),
            Self::MutuallyExclusive { parameters } => {
                write!(f, "Solo se puede usar uno de {}.", parameters.join(", "))
            }
            Self::NoneOfRequired { parameters } => {
                write!(f, "Se requiere uno de {}.", parameters.join(", "))
            }
        }
    }
}

/// Una dependencia o miembro de grupo de exclusión que apunta a un parámetro inexistente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Dónde vive la referencia (`Dependencia del parámetro 'x'`, `Grupo de exclusión #2`).
    pub origin: String,
    pub missing_id: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} apunta al parámetro desconocido '{}'.", self.origin, self.missing_id)
    }
}

/// Comprueba los valores elegidos para `command` contra todas las restricciones aplicables.
pub fn check(tool: &Tool, command: &Command, values: &ParameterValues) -> Vec<ConstraintViolation> {
    let visible: Vec<&Parameter> = tool.visible_parameters(&command.id).collect();
    let visible_ids: HashSet<&str> = visible.iter().map(|p| p.id.as_str()).collect();
    let is_active = |id: &str| values.get(id).is_some_and(|v| !v.is_empty());
    let label = |id: &str| {
        tool.parameter(id)
            .map(|p| display_label(p))
            .unwrap_or_else(|| id.to_string())
    };

    let mut violations = Vec::new();

    for parameter in &visible {
        if parameter.is_required && !is_active(&parameter.id) {
            violations.push(ConstraintViolation::MissingRequired {
                parameter: display_label(parameter),
            });
        }
    }

    for parameter in visible.iter().filter(|p| is_active(&p.id)) {
        let current = values.get(&parameter.id).map(|v| v.to_string());
        for dependency in &parameter.dependencies {
            // Una condición limita la dependencia a un valor concreto del parámetro dependiente.
            if let Some(condition) = dependency.condition_value.as_deref() {
                if current.as_deref() != Some(condition) {
                    continue;
                }
            }
            let target = dependency.depends_on_parameter_id.as_str();
            match dependency.dependency_type {
                DependencyType::Requires if !is_active(target) => {
                    violations.push(ConstraintViolation::MissingDependency {
                        parameter: display_label(parameter),
                        requires: label(target),
                    });
                }
                DependencyType::ConflictsWith if is_active(target) => {
                    violations.push(ConstraintViolation::Conflict {
                        parameter: display_label(parameter),
                        conflicts_with: label(target),
                    });
                }
                _ => {}
            }
        }
    }

    for group in &tool.exclusion_groups {
        if group
            .command_id
            .as_deref()
            .is_some_and(|id| id != command.id)
        {
            continue;
        }
        let members: Vec<&str> = group
            .parameter_ids
            .iter()
            .map(String::as_str)
            .filter(|id| visible_ids.contains(id))
            .collect();
        if members.is_empty() {
            continue;
        }
        let active: Vec<&str> = members.iter().copied().filter(|id| is_active(id)).collect();
        match group.exclusion_type {
            ExclusionType::MutualExclusive if active.len() > 1 => {
                violations.push(ConstraintViolation::MutuallyExclusive {
                    parameters: active.iter().map(|id| label(id)).collect(),
                });
            }
            ExclusionType::RequiredOneOf if active.is_empty() => {
                violations.push(ConstraintViolation::NoneOfRequired {
                    parameters: members.iter().map(|id| label(id)).collect(),
                });
            }
            _ => {}
        }
    }

    violations
}

/// Lista las dependencias y miembros de grupos que apuntan a un parámetro inexistente.
pub fn unresolved_references(tool: &Tool) -> Vec<UnresolvedReference> {
    let known: HashSet<&str> = tool.parameters.iter().map(|p| p.id.as_str()).collect();
    let mut unresolved = Vec::new();

    for parameter in &tool.parameters {
        for dependency in &parameter.dependencies {
            if !known.contains(dependency.depends_on_parameter_id.as_str()) {
                unresolved.push(UnresolvedReference {
                    origin: format!("Dependencia del parámetro '{}'", parameter.name),
                    missing_id: dependency.depends_on_parameter_id.clone(),
                });
            }
        }
    }

    for (i, group) in tool.exclusion_groups.iter().enumerate() {
        for id in &group.parameter_ids {
            if !known.contains(id.as_str()) {
                unresolved.push(UnresolvedReference {
                    origin: format!("Grupo de exclusión #{}", i + 1),
                    missing_id: id.clone(),
                });
            }
        }
    }

    unresolved
}

/// Cómo se nombra un parámetro en los mensajes: su flag, o si no su nombre.
fn display_label(parameter: &Parameter) -> String {
    parameter
        .flag_token()
        .map(str::to_string)
        .unwrap_or_else(|| parameter.name.clone())
}
