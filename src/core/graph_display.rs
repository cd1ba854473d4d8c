// src/core/graph_display.rs

use super::hierarchy::{self, CommandNode, HierarchyResult};
use crate::models::Tool;

/// Dibuja un árbol ASCII con la jerarquía de comandos de `tool`.
///
/// La cabecera lleva el total de comandos y de parámetros globales. El comando
/// por defecto se marca con `(*)` y cada línea indica cuántos parámetros tiene.
pub fn render_command_tree(tool: &Tool) -> HierarchyResult<String> {
    let roots = hierarchy::build_tree(&tool.commands)?;
    let total: usize = roots.iter().map(|root| root.walk().len()).sum();
    let globals = tool.parameters.iter().filter(|p| p.is_global).count();

    let mut out = format!("{} [{} comando{}", tool.name, total, plural(total));
    if globals > 0 {
        out.push_str(&format!(", {} global{}", globals, if globals == 1 { "" } else { "es" }));
    }
    out.push_str("]\n");

    if roots.is_empty() {
        out.push_str("└─ (sin comandos)\n");
        return Ok(out);
    }
    for (i, root) in roots.iter().enumerate() {
        let is_last = i == roots.len() - 1;
        render_node(&mut out, root, tool, "", is_last);
    }
    Ok(out)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn render_node(out: &mut String, node: &CommandNode<'_>, tool: &Tool, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let default_marker = if node.command.is_default { " (*)" } else { "" };
    let scoped = tool
        .parameters
        .iter()
        .filter(|p| !p.is_global && p.command_id.as_deref() == Some(node.command.id.as_str()))
        .count();

    out.push_str(&format!(
        "{}{} {}{} [{} parámetro{}]\n",
        prefix,
        connector,
        node.command.name,
        default_marker,
        scoped,
        plural(scoped)
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    for (i, child) in node.subcommands.iter().enumerate() {
        let is_last_child = i == node.subcommands.len() - 1;
        render_node(out, child, tool, &child_prefix, is_last_child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hierarchy::HierarchyError;
    use crate::models::{Command, Parameter, ParameterType};

    fn cmd(id: &str, parent: Option<&str>, sort_order: i64) -> Command {
        Command {
            id: id.to_string(),
            name: id.to_string(),
            sort_order,
            parent_command_id: parent.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_command_tree() {
        let mut root = cmd("git", None, 0);
        root.is_default = true;
        let mut message = Parameter::new("message", ParameterType::Option);
        message.command_id = Some("commit".to_string());
        let mut verbose = Parameter::new("verbose", ParameterType::Flag);
        verbose.is_global = true;

        let tool = Tool {
            name: "git".to_string(),
            commands: vec![
                root,
                cmd("remote", Some("git"), 2),
                cmd("commit", Some("git"), 1),
                cmd("add", Some("remote"), 0),
            ],
            parameters: vec![message, verbose],
            ..Default::default()
        };

        let expected = "\
git [4 comandos, 1 global]
└─ git (*) [0 parámetros]
   ├─ commit [1 parámetro]
   └─ remote [0 parámetros]
      └─ add [0 parámetros]
";
        assert_eq!(render_command_tree(&tool).unwrap(), expected);
    }

    #[test]
    fn test_render_empty_and_cyclic() {
        let tool = Tool {
            name: "t".to_string(),
            ..Default::default()
        };
        assert_eq!(render_command_tree(&tool).unwrap(), "t [0 comandos]\n└─ (sin comandos)\n");

        let cyclic = Tool {
            name: "t".to_string(),
            commands: vec![cmd("a", Some("a"), 0)],
            ..Default::default()
        };
        assert!(matches!(
            render_command_tree(&cyclic),
            Err(HierarchyError::CyclicHierarchy { .. })
        ));
    }
}
