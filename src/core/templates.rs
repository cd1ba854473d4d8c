// src/core/templates.rs

use super::document::{self, DocumentError};
use crate::models::Tool;
use include_dir::{Dir, include_dir};
use thiserror::Error;

static TEMPLATES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No hay ninguna plantilla integrada llamada '{0}'.")]
    NotFound(String),
    #[error("La plantilla '{0}' no es UTF-8 válido.")]
    NotUtf8(String),
    #[error("La plantilla '{name}' no es un documento de herramienta válido: {source}")]
    Invalid {
        name: String,
        #[source]
        source: DocumentError,
    },
}

/// Nombres de los documentos integrados, ordenados.
pub fn list_templates() -> Vec<String> {
    let mut names: Vec<String> = TEMPLATES_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|f| f.path().file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}

/// JSON en bruto de la plantilla `name`.
pub fn template_source(name: &str) -> Result<&'static str, TemplateError> {
    let file = TEMPLATES_DIR
        .get_file(format!("{}.json", name))
        .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
    file.contents_utf8()
        .ok_or_else(|| TemplateError::NotUtf8(name.to_string()))
}

/// Importa la plantilla `name`.
pub fn load_template(name: &str) -> Result<Tool, TemplateError> {
    log::debug!("Cargando la plantilla integrada '{}'", name);
    let source = template_source(name)?;
    document::import_tool(source).map_err(|source| TemplateError::Invalid {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_loads() {
        let names = list_templates();
        assert!(names.contains(&"git".to_string()));
        assert!(names.contains(&"grep".to_string()));
        for name in names {
            let tool = load_template(&name).unwrap();
            assert_eq!(tool.name, name);
            assert!(tool.default_command().is_some());
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(load_template("nope"), Err(TemplateError::NotFound(_))));
    }
}
