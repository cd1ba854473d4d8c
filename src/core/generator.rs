// src/core/generator.rs

use super::path_resolver;
use crate::models::{
    Command, Parameter, ParameterType, ParameterValue, ParameterValues, Tool, non_empty,
};

/// Genera la línea de invocación de los comandos de una herramienta a partir de los valores elegidos.
///
/// Se asume que los valores ya están validados; solo se descartan los vacíos
/// (`false`, `""`, `[]` o ausentes). No se entrecomilla ni se escapa nada.
pub struct CommandGenerator<'a> {
    tool: &'a Tool,
    values: &'a ParameterValues,
}

impl<'a> CommandGenerator<'a> {
    pub fn new(tool: &'a Tool, values: &'a ParameterValues) -> Self {
        Self { tool, values }
    }

    /// Genera la línea completa para `command`.
    pub fn render(&self, command: &Command) -> String {
        let mut line = self.render_prefix(command);

        let active: Vec<(&Parameter, &ParameterValue)> = self
            .tool
            .visible_parameters(&command.id)
            .filter_map(|p| self.value_of(p).map(|v| (p, v)))
            .collect();

        // Flags y opciones, en orden de declaración (primero los globales).
        for (parameter, value) in &active {
            match parameter.parameter_type {
                ParameterType::Flag => self.render_flag(&mut line, parameter, value),
                ParameterType::Option => self.render_option(&mut line, parameter, value),
                // Los argumentos posicionales van siempre al final.
                ParameterType::Argument => {}
            }
        }

        // Argumentos posicionales, ordenados por posición.
        let mut arguments: Vec<_> = active
            .iter()
            .filter(|(p, _)| p.parameter_type == ParameterType::Argument)
            .collect();
        arguments.sort_by_key(|(p, _)| p.position.unwrap_or(0));
        for (parameter, value) in arguments {
            self.render_argument(&mut line, parameter, value);
        }

        line
    }

    fn render_prefix(&self, command: &Command) -> String {
        path_resolver::invocation_prefix(command, self.tool).unwrap_or_else(|e| {
            log::warn!("{} Se usa solo el nombre del comando.", e);
            format!("{} {}", self.tool.name, command.name)
        })
    }

    /// El valor elegido para `parameter`, salvo que no aporte nada.
    fn value_of(&self, parameter: &Parameter) -> Option<&'a ParameterValue> {
        self.values.get(&parameter.id).filter(|v| !v.is_empty())
    }

    fn render_flag(&self, line: &mut String, parameter: &Parameter, value: &ParameterValue) {
        if !value.is_true() {
            return;
        }
        match parameter.flag_token() {
            Some(token) => {
                line.push(' ');
                line.push_str(token);
            }
            None => log::warn!("El flag '{}' no tiene forma corta ni larga.", parameter.name),
        }
    }

    fn render_option(&self, line: &mut String, parameter: &Parameter, value: &ParameterValue) {
        let separator = non_empty(parameter.key_value_separator.as_deref()).unwrap_or(" ");
        let token = parameter.flag_token();
        if token.is_none() {
            log::warn!(
                "La opción '{}' no tiene forma corta ni larga. Se emite solo su valor.",
                parameter.name
            );
        }

        let mut emit = |rendered: &str| {
            line.push(' ');
            if let Some(token) = token {
                line.push_str(token);
                line.push_str(separator);
            }
            line.push_str(rendered);
        };

        match value {
            ParameterValue::List(items) => match non_empty(parameter.array_separator.as_deref()) {
                Some(joiner) => emit(items.join(joiner).as_str()),
                None => items.iter().for_each(|item| emit(item.as_str())),
            },
            other => emit(other.to_string().as_str()),
        }
    }

    fn render_argument(&self, line: &mut String, parameter: &Parameter, value: &ParameterValue) {
        let rendered = match value {
            ParameterValue::List(items) => {
                items.join(non_empty(parameter.array_separator.as_deref()).unwrap_or(" "))
            }
            other => other.to_string(),
        };
        line.push(' ');
        line.push_str(&rendered);
    }
}

/// Produce la línea de invocación literal de `command` en `tool`.
pub fn generate(tool: &Tool, command: &Command, values: &ParameterValues) -> String {
    CommandGenerator::new(tool, values).render(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_with(parameters: Vec<Parameter>) -> Tool {
        Tool {
            name: "grep".to_string(),
            commands: vec![Command {
                id: "c1".to_string(),
                name: "grep".to_string(),
                is_default: true,
                ..Default::default()
            }],
            parameters,
            ..Default::default()
        }
    }

    fn param(id: &str, parameter_type: ParameterType) -> Parameter {
        let mut p = Parameter::new(id, parameter_type);
        p.id = id.to_string();
        p.command_id = Some("c1".to_string());
        p
    }

    fn values(pairs: &[(&str, ParameterValue)]) -> ParameterValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_global_flag_scenario() {
        let mut p1 = param("p1", ParameterType::Flag);
        p1.command_id = None;
        p1.is_global = true;
        p1.short_flag = Some("-i".to_string());
        p1.long_flag = Some("--ignore-case".to_string());
        let tool = tool_with(vec![p1]);

        let v = values(&[("p1", true.into())]);
        assert_eq!(generate(&tool, &tool.commands[0], &v), "grep -i");
    }

    #[test]
    fn test_flag_prefers_short_flag_and_skips_false() {
        let mut v = param("v", ParameterType::Flag);
        v.short_flag = Some("-v".to_string());
        v.long_flag = Some("--verbose".to_string());
        let mut q = param("q", ParameterType::Flag);
        q.long_flag = Some("--quiet".to_string());
        let tool = tool_with(vec![v, q]);

        let selected = values(&[("v", true.into()), ("q", false.into())]);
        assert_eq!(generate(&tool, &tool.commands[0], &selected), "grep -v");
    }

    #[test]
    fn test_flag_with_non_boolean_value_contributes_nothing() {
        let mut v = param("v", ParameterType::Flag);
        v.short_flag = Some("-v".to_string());
        let tool = tool_with(vec![v]);

        let selected = values(&[("v", "true".into())]);
        assert_eq!(generate(&tool, &tool.commands[0], &selected), "grep");
    }

    #[test]
    fn test_option_separator() {
        let mut name = param("name", ParameterType::Option);
        name.long_flag = Some("--name".to_string());
        name.key_value_separator = Some("=".to_string());
        let mut count = param("count", ParameterType::Option);
        count.short_flag = Some("-m".to_string());
        count.long_flag = Some("--max-count".to_string());
        let tool = tool_with(vec![name, count]);

        let selected = values(&[("name", "x".into()), ("count", 5i64.into())]);
        assert_eq!(
            generate(&tool, &tool.commands[0], &selected),
            "grep --name=x -m 5"
        );
    }

    #[test]
    fn test_empty_values_are_filtered() {
        let mut name = param("name", ParameterType::Option);
        name.long_flag = Some("--name".to_string());
        let file = param("file", ParameterType::Argument);
        let tool = tool_with(vec![name, file]);

        let selected = values(&[("name", "".into()), ("file", ParameterValue::List(vec![]))]);
        assert_eq!(generate(&tool, &tool.commands[0], &selected), "grep");
    }

    #[test]
    fn test_arguments_are_sorted_and_trail() {
        let mut b = param("b", ParameterType::Argument);
        b.position = Some(1);
        let mut a = param("a", ParameterType::Argument);
        a.position = Some(0);
        let mut flag = param("n", ParameterType::Flag);
        flag.short_flag = Some("-n".to_string());
        let tool = tool_with(vec![b, a, flag]);

        let selected = values(&[("b", "b".into()), ("a", "a".into()), ("n", true.into())]);
        assert_eq!(generate(&tool, &tool.commands[0], &selected), "grep -n a b");
    }

    #[test]
    fn test_globals_render_before_command_parameters() {
        let mut scoped = param("color", ParameterType::Option);
        scoped.long_flag = Some("--color".to_string());
        let mut global = param("verbose", ParameterType::Flag);
        global.command_id = None;
        global.is_global = true;
        global.long_flag = Some("--verbose".to_string());
        let tool = tool_with(vec![scoped, global]);

        let selected = values(&[("color", "auto".into()), ("verbose", true.into())]);
        assert_eq!(
            generate(&tool, &tool.commands[0], &selected),
            "grep --verbose --color auto"
        );
    }

    #[test]
    fn test_parameters_of_other_commands_are_ignored() {
        let mut other = param("x", ParameterType::Flag);
        other.command_id = Some("elsewhere".to_string());
        other.short_flag = Some("-x".to_string());
        let tool = tool_with(vec![other]);

        let selected = values(&[("x", true.into())]);
        assert_eq!(generate(&tool, &tool.commands[0], &selected), "grep");
    }

    #[test]
    fn test_list_values() {
        let mut include = param("include", ParameterType::Option);
        include.long_flag = Some("--include".to_string());
        include.is_repeatable = true;
        let mut exclude = param("exclude", ParameterType::Option);
        exclude.long_flag = Some("--exclude".to_string());
        exclude.key_value_separator = Some("=".to_string());
        exclude.array_separator = Some(",".to_string());
        let files = param("files", ParameterType::Argument);
        let tool = tool_with(vec![include, exclude, files]);

        let list = |items: &[&str]| ParameterValue::List(items.iter().map(|s| s.to_string()).collect());
        let selected = values(&[
            ("include", list(&["*.rs", "*.toml"])),
            ("exclude", list(&["target", "dist"])),
            ("files", list(&["a.txt", "b.txt"])),
        ]);
        assert_eq!(
            generate(&tool, &tool.commands[0], &selected),
            "grep --include *.rs --include *.toml --exclude=target,dist a.txt b.txt"
        );
    }

    #[test]
    fn test_subcommand_prefix_and_idempotence() {
        let mut tool = tool_with(vec![]);
        tool.name = "git".to_string();
        tool.commands[0].name = "git".to_string();
        tool.commands.push(Command {
            id: "c2".to_string(),
            name: "commit".to_string(),
            parent_command_id: Some("c1".to_string()),
            ..Default::default()
        });
        let mut msg = param("m", ParameterType::Option);
        msg.command_id = Some("c2".to_string());
        msg.short_flag = Some("-m".to_string());
        tool.parameters.push(msg);

        let selected = values(&[("m", "fix".into())]);
        let generator = CommandGenerator::new(&tool, &selected);
        let first = generator.render(&tool.commands[1]);
        assert_eq!(first, "git commit -m fix");
        assert_eq!(generator.render(&tool.commands[1]), first);
    }
}
