// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

// --- ENUMERACIONES ---

/// Cómo puede recibir su entrada una herramienta.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCapability {
    StandardInput,
    Parameter,
}

/// Dónde puede escribir su salida una herramienta.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputCapability {
    StandardOutput,
    File,
    Directory,
}

/// El papel sintáctico de un parámetro en la línea de comandos.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// Un interruptor booleano (`-v`).
    Flag,
    /// Un par clave-valor (`--name value`, `--name=value`).
    Option,
    /// Un token posicional suelto.
    Argument,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    Enum,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    MinLength,
    MaxLength,
    MinValue,
    MaxValue,
    Regex,
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength => write!(f, "min_length"),
            Self::MaxLength => write!(f, "max_length"),
            Self::MinValue => write!(f, "min_value"),
            Self::MaxValue => write!(f, "max_value"),
            Self::Regex => write!(f, "regex"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    Requires,
    ConflictsWith,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionType {
    MutualExclusive,
    RequiredOneOf,
}

// --- MODELOS PLANOS (la representación canónica, enlazada por ids) ---

/// Agregado raíz que describe un programa de línea de comandos.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub exclusion_groups: Vec<ExclusionGroup>,
    #[serde(default)]
    pub supported_input: Vec<InputCapability>,
    #[serde(default)]
    pub supported_output: Vec<OutputCapability>,
}

/// Un nodo del bosque de comandos. Los hijos se deducen de `parent_command_id`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_command_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value_separator: Option<String>,
    #[serde(default)]
    pub enum_values: Vec<EnumValue>,
    #[serde(default)]
    pub validations: Vec<ParameterValidation>,
    #[serde(default)]
    pub dependencies: Vec<ParameterDependency>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub value: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
}

/// Una regla que se comprueba contra el valor por defecto de un parámetro.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValidation {
    pub validation_type: ValidationType,
    pub validation_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDependency {
    pub dependency_type: DependencyType,
    pub depends_on_parameter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionGroup {
    pub exclusion_type: ExclusionType,
    #[serde(default)]
    pub parameter_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

/// Una invocación generada que guarda la capa de persistencia, fuera del agregado `Tool`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedCommand {
    pub id: String,
    pub command: String,
}

// --- MODELOS ANIDADOS (sin ids, en forma de árbol; para editar a mano y mostrar) ---

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedTool {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub supported_input: Vec<InputCapability>,
    #[serde(default)]
    pub supported_output: Vec<OutputCapability>,
    #[serde(default)]
    pub global_parameters: Vec<NestedParameter>,
    #[serde(default)]
    pub commands: Vec<NestedCommand>,
    /// Grupos que no pertenecen a ningún comando concreto.
    #[serde(default)]
    pub exclusion_groups: Vec<NestedExclusionGroup>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedCommand {
    /// Un nombre vacío marca el grupo de parámetros globales al importar.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub parameters: Vec<NestedParameter>,
    #[serde(default)]
    pub subcommands: Vec<NestedCommand>,
    #[serde(default)]
    pub exclusion_groups: Vec<NestedExclusionGroup>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedParameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value_separator: Option<String>,
    #[serde(default)]
    pub enum_values: Vec<EnumValue>,
    #[serde(default)]
    pub validations: Vec<ParameterValidation>,
    #[serde(default)]
    pub dependencies: Vec<NestedDependency>,
}

/// Una dependencia cuyo destino se nombra por su flag en lugar de por su id.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedDependency {
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub depends_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NestedExclusionGroup {
    pub exclusion_type: ExclusionType,
    #[serde(default)]
    pub parameters: Vec<String>,
}

// --- VALORES DE PARÁMETROS (entrada del generador de comandos) ---

/// Un valor concreto elegido para un parámetro. Se deserializa desde JSON simple
/// (`true`, `3`, `"text"`, `["a", "b"]`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
}

/// Valores elegidos, indexados por id de parámetro.
pub type ParameterValues = HashMap<String, ParameterValue>;

impl ParameterValue {
    /// `false`, `""` y `[]` no aportan nada al comando generado.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Number(_) => false,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Interpreta la entrada del usuario para `parameter`: los flags aceptan `true/false/1/0`
    /// (cualquier otra cosa es false) y un `Number` entero se convierte en número.
    pub fn from_input(parameter: &Parameter, raw: &str) -> Self {
        let raw = raw.trim();
        if parameter.parameter_type == ParameterType::Flag {
            return Self::Bool(matches!(raw.to_ascii_lowercase().as_str(), "true" | "1"));
        }
        match (parameter.data_type, raw.parse::<i64>()) {
            (DataType::Number, Ok(n)) => n.into(),
            _ => raw.into(),
        }
    }

    /// Añade otro elemento, convirtiendo un escalar en lista.
    pub fn push(self, item: String) -> Self {
        match self {
            Self::List(mut items) => {
                items.push(item);
                Self::List(items)
            }
            other => Self::List(vec![other.to_string(), item]),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

// --- CONSTRUCTORES Y ACCESORES ---

/// Genera un identificador nuevo y estable.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Un comando con id nuevo y un nombre provisional aleatorio (`command-1a2b3c`).
    pub fn placeholder() -> Self {
        let id = new_id();
        let name = format!("command-{}", &id.replace('-', "")[..6]);
        Self {
            id,
            name,
            ..Default::default()
        }
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            parameter_type,
            data_type: match parameter_type {
                ParameterType::Flag => DataType::Boolean,
                _ => DataType::String,
            },
            is_required: false,
            is_repeatable: false,
            is_global: false,
            command_id: None,
            default_value: None,
            short_flag: None,
            long_flag: None,
            position: None,
            sort_order: 0,
            array_separator: None,
            key_value_separator: None,
            enum_values: Vec::new(),
            validations: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// El token que se usa en la línea de comandos: mejor el flag corto, ignorando cadenas vacías.
    pub fn flag_token(&self) -> Option<&str> {
        non_empty(self.short_flag.as_deref()).or_else(|| non_empty(self.long_flag.as_deref()))
    }

    /// Si este parámetro lo ofrece el comando con ese id.
    pub fn is_visible_to(&self, command_id: &str) -> bool {
        self.is_global || self.command_id.as_deref() == Some(command_id)
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl Tool {
    pub fn command(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Hijos directos de `parent` (`None` para los comandos raíz), en orden de declaración.
    pub fn children_of<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a Command> {
        self.commands
            .iter()
            .filter(move |c| c.parent_command_id.as_deref() == parent)
    }

    pub fn default_command(&self) -> Option<&Command> {
        self.commands
            .iter()
            .find(|c| c.is_default && c.parent_command_id.is_none())
            .or_else(|| self.commands.iter().find(|c| c.is_default))
    }

    /// Los parámetros globales seguidos de los de `command_id`, cada grupo en orden de declaración.
    pub fn visible_parameters<'a>(&'a self, command_id: &'a str) -> impl Iterator<Item = &'a Parameter> {
        let globals = self.parameters.iter().filter(|p| p.is_global);
        let scoped = self
            .parameters
            .iter()
            .filter(move |p| !p.is_global && p.command_id.as_deref() == Some(command_id));
        globals.chain(scoped)
    }

    /// Un parámetro visible para `command_id` cuyo id, nombre, flag largo o flag corto es `key`.
    pub fn find_visible_parameter<'a>(&'a self, command_id: &'a str, key: &str) -> Option<&'a Parameter> {
        let matches = |p: &&Parameter| {
            p.id == key
                || p.name == key
                || p.long_flag.as_deref() == Some(key)
                || p.short_flag.as_deref() == Some(key)
        };
        self.visible_parameters(command_id).find(matches)
    }
}
