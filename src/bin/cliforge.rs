// src/bin/cliforge.rs

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use cliforge::cli::{Cli, Commands, SavedAction};
use cliforge::config::Settings;
use cliforge::core::document::{self, ExportFormat};
use cliforge::core::{constraints, generator, graph_display, path_resolver, templates, validation};
use cliforge::models::{Command, DataType, Parameter, ParameterType, ParameterValue, ParameterValues, Tool};
use cliforge::system::storage::SavedCommandStore;

fn main() {
    // Ejecuta con `RUST_LOG=debug cliforge ...` para ver la traza.
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("Argumentos de CLI: {:?}", cli);
    let settings = Settings::load().context("No se pudieron cargar los ajustes.")?;

    match cli.command {
        Commands::Tree { file } => handle_tree(&file),
        Commands::Generate {
            file,
            command,
            values,
            strict,
            save,
        } => handle_generate(&file, command.as_deref(), &values, strict, save, &settings),
        Commands::Build { file, strict, save } => handle_build(&file, strict, save, &settings),
        Commands::Convert { file, to, output } => {
            handle_convert(&file, to.unwrap_or(settings.export_format), output.as_deref(), &settings)
        }
        Commands::Check { file } => handle_check(&file),
        Commands::Templates => handle_templates(),
        Commands::New { template, output } => handle_new(&template, output),
        Commands::Saved { action } => handle_saved(action, &settings),
    }
}

fn load_tool(file: &Path) -> Result<Tool> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("No se pudo leer el documento de herramienta {:?}", file))?;
    document::import_tool(&json).with_context(|| format!("No se pudo importar {:?}", file))
}

// --- MANEJADORES ---

fn handle_tree(file: &Path) -> Result<()> {
    let tool = load_tool(file)?;
    print!("{}", graph_display::render_command_tree(&tool)?);
    Ok(())
}

fn handle_generate(
    file: &Path,
    command_path: Option<&str>,
    raw_values: &[String],
    strict: bool,
    save: bool,
    settings: &Settings,
) -> Result<()> {
    let tool = load_tool(file)?;
    let command = path_resolver::find_command_by_path(&tool, command_path.unwrap_or(""))
        .ok_or_else(|| anyhow!("Ningún comando coincide con '{}'.", command_path.unwrap_or("")))?;

    let mut values = ParameterValues::new();
    for raw in raw_values {
        // Una clave sin valor activa un flag.
        let (key, value) = raw.split_once('=').unwrap_or((raw.as_str(), "true"));
        let parameter = tool
            .find_visible_parameter(&command.id, key)
            .ok_or_else(|| anyhow!("'{}' no es un parámetro de '{}'.", key, command.name))?;
        insert_value(&mut values, parameter, value);
    }

    finish(&tool, command, &values, strict || settings.strict_constraints, save, settings)
}

fn insert_value(values: &mut ParameterValues, parameter: &Parameter, raw: &str) {
    let value = match values.remove(&parameter.id) {
        Some(existing) if parameter.is_repeatable => existing.push(raw.to_string()),
        _ => ParameterValue::from_input(parameter, raw),
    };
    values.insert(parameter.id.clone(), value);
}

fn handle_build(file: &Path, strict: bool, save: bool, settings: &Settings) -> Result<()> {
    let tool = load_tool(file)?;
    let theme = ColorfulTheme::default();

    let paths: Vec<String> = tool
        .commands
        .iter()
        .map(|c| path_resolver::invocation_prefix(c, &tool))
        .collect::<Result<_, _>>()?;
    let default_index = tool
        .default_command()
        .and_then(|d| tool.commands.iter().position(|c| c.id == d.id))
        .unwrap_or(0);
    if paths.is_empty() {
        bail!("La herramienta '{}' no tiene comandos.", tool.name);
    }
    let selection = Select::with_theme(&theme)
        .with_prompt("Comando")
        .items(&paths)
        .default(default_index)
        .interact_opt()?
        .ok_or_else(|| anyhow!("Cancelado."))?;
    let command = &tool.commands[selection];

    let mut values = ParameterValues::new();
    for parameter in tool.visible_parameters(&command.id) {
        if let Some(value) = prompt_value(&theme, parameter)? {
            values.insert(parameter.id.clone(), value);
        }
    }

    finish(&tool, command, &values, strict || settings.strict_constraints, save, settings)
}

fn prompt_value(theme: &ColorfulTheme, parameter: &Parameter) -> Result<Option<ParameterValue>> {
    let label = match parameter.flag_token() {
        Some(token) => format!("{} ({})", parameter.name, token),
        None => parameter.name.clone(),
    };

    if parameter.parameter_type == ParameterType::Flag {
        let default = parameter
            .default_value
            .as_deref()
            .is_some_and(|v| ParameterValue::from_input(parameter, v).is_true());
        let on = Confirm::with_theme(theme)
            .with_prompt(label)
            .default(default)
            .interact()?;
        return Ok(Some(on.into()));
    }

    if parameter.data_type == DataType::Enum && !parameter.enum_values.is_empty() {
        let mut choices: Vec<&str> = Vec::new();
        if !parameter.is_required {
            choices.push("(ninguno)");
        }
        choices.extend(parameter.enum_values.iter().map(|e| e.value.as_str()));
        let default = parameter
            .enum_values
            .iter()
            .position(|e| e.is_default || parameter.default_value.as_deref() == Some(e.value.as_str()))
            .map(|i| if parameter.is_required { i } else { i + 1 })
            .unwrap_or(0);
        let index = Select::with_theme(theme)
            .with_prompt(label)
            .items(&choices)
            .default(default)
            .interact()?;
        return Ok(match choices[index] {
            "(ninguno)" if !parameter.is_required => None,
            value => Some(value.into()),
        });
    }

    let prompt = if parameter.is_repeatable {
        format!("{} (separado por comas)", label)
    } else {
        label
    };
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(!parameter.is_required);
    if let Some(default) = parameter.default_value.clone() {
        input = input.default(default);
    }
    let checked = parameter.clone();
    let raw = input
        .validate_with(move |value: &String| -> Result<(), String> {
            if value.is_empty() {
                return Ok(());
            }
            let candidate = Parameter {
                default_value: Some(value.clone()),
                ..checked.clone()
            };
            validation::validate(&candidate).map_err(|e| e.to_string())
        })
        .interact_text()?;

    if raw.is_empty() {
        return Ok(None);
    }
    if parameter.is_repeatable {
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return Ok(Some(items.into()));
    }
    Ok(Some(ParameterValue::from_input(parameter, &raw)))
}

/// Comprueba las restricciones, imprime el comando generado y opcionalmente lo guarda.
fn finish(
    tool: &Tool,
    command: &Command,
    values: &ParameterValues,
    strict: bool,
    save: bool,
    settings: &Settings,
) -> Result<()> {
    let violations = constraints::check(tool, command, values);
    for violation in &violations {
        eprintln!("Aviso: {}", violation);
    }
    if strict && !violations.is_empty() {
        bail!("{} restricción(es) incumplida(s); no se genera nada.", violations.len());
    }

    let line = generator::generate(tool, command, values);
    println!("{}", line);

    if save {
        let store = SavedCommandStore::new(settings.saved_commands_dir()?);
        let saved = store.save(&tool_key(tool), &line)?;
        eprintln!("Guardado como {}.", saved.id);
    }
    Ok(())
}

/// Clave con la que se guardan los comandos: el id de la herramienta, o si no su nombre.
fn tool_key(tool: &Tool) -> String {
    tool.id.clone().unwrap_or_else(|| tool.name.clone())
}

fn handle_convert(
    file: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let tool = load_tool(file)?;
    let json = document::export(&tool, format, settings.pretty)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("No se pudo escribir {:?}", path))?;
            println!("Escrito {:?} ({:?}).", path, format);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn handle_check(file: &Path) -> Result<()> {
    let tool = load_tool(file)?;
    let mut problems = 0;

    for (id, error) in validation::validate_tool(&tool) {
        let name = tool.parameter(&id).map_or(id.as_str(), |p| p.name.as_str());
        println!("Parámetro '{}': {}", name, error);
        problems += 1;
    }
    for reference in constraints::unresolved_references(&tool) {
        println!("{}", reference);
        problems += 1;
    }

    if problems > 0 {
        bail!("{} problema(s) encontrado(s) en {:?}.", problems, file);
    }
    println!("Sin problemas en '{}'.", tool.name);
    Ok(())
}

fn handle_templates() -> Result<()> {
    for name in templates::list_templates() {
        let tool = templates::load_template(&name)?;
        println!(
            "{:<12} {}",
            name,
            tool.description.as_deref().unwrap_or(&tool.display_name)
        );
    }
    Ok(())
}

fn handle_new(template: &str, output: Option<PathBuf>) -> Result<()> {
    let source = templates::template_source(template)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.json", template)));
    if path.exists() {
        bail!("{:?} ya existe.", path);
    }
    fs::write(&path, source).with_context(|| format!("No se pudo escribir {:?}", path))?;
    println!("Creado {:?} a partir de la plantilla '{}'.", path, template);
    Ok(())
}

fn handle_saved(action: SavedAction, settings: &Settings) -> Result<()> {
    let store = SavedCommandStore::new(settings.saved_commands_dir()?);
    match action {
        SavedAction::List { tool_id } => {
            let saved = store.list(&tool_id)?;
            if saved.is_empty() {
                println!("No hay comandos guardados para '{}'.", tool_id);
            }
            for entry in saved {
                println!("{}  {}", entry.id, entry.command);
            }
        }
        SavedAction::Remove { tool_id, id } => {
            if !store.remove(&tool_id, &id)? {
                bail!("No hay comando guardado '{}' para '{}'.", id, tool_id);
            }
            println!("Eliminado {}.", id);
        }
    }
    Ok(())
}
