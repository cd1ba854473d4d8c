// src/core/validation.rs

//! Comprueba el valor por defecto de un parámetro contra su tipo de dato y sus reglas.
//!
//! Se hace en dos pasadas. La de tipo rechaza un valor `Number` que no sea
//! entero y un `Boolean` fuera de `true/false/1/0` (sin distinguir mayúsculas).
//! La de reglas convierte el valor a número en los parámetros `Number` (a texto
//! en el resto) y aplica las reglas en orden; gana la primera que falla. Una
//! regla que no corresponde al tipo convertido se salta: `min_length`,
//! `max_length` y `regex` solo ven texto, `min_value` y `max_value` solo números.

use crate::models::{DataType, Parameter, ParameterValidation, Tool, ValidationType};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("El valor por defecto '{value}' no es un entero válido.")]
    NotAnInteger { value: String },
    #[error("El valor por defecto '{value}' no es un booleano válido (se esperaba true, false, 1 o 0).")]
    NotABoolean { value: String },
    #[error("{message}")]
    RuleViolated {
        rule: ValidationType,
        message: String,
    },
    #[error("Expresión regular no válida '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type ValidationResult = Result<(), ValidationError>;

/// El valor por defecto tras convertirlo al tipo del parámetro.
enum Coerced<'a> {
    Number(f64),
    Text(&'a str),
}

/// Valida el valor por defecto de `parameter`.
/// Sin valor por defecto, o sin reglas ni restricciones de tipo, es válido.
pub fn validate(parameter: &Parameter) -> ValidationResult {
    let Some(value) = parameter.default_value.as_deref() else {
        return Ok(());
    };

    check_type(parameter.data_type, value)?;

    let coerced = match parameter.data_type {
        DataType::Number => match value.trim().parse::<f64>() {
            Ok(n) => Coerced::Number(n),
            Err(_) => Coerced::Text(value),
        },
        _ => Coerced::Text(value),
    };

    for rule in &parameter.validations {
        check_rule(rule, &coerced)?;
    }

    Ok(())
}

/// Valida todos los parámetros de la herramienta y devuelve los fallos junto al id del parámetro.
pub fn validate_tool(tool: &Tool) -> Vec<(String, ValidationError)> {
    tool.parameters
        .iter()
        .filter_map(|p| validate(p).err().map(|e| (p.id.clone(), e)))
        .collect()
}

fn check_type(data_type: DataType, value: &str) -> ValidationResult {
    match data_type {
        DataType::Number if !is_integer(value) => Err(ValidationError::NotAnInteger {
            value: value.to_string(),
        }),
        DataType::Boolean if !is_boolean(value) => Err(ValidationError::NotABoolean {
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_boolean(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "false" | "1" | "0"
    )
}

fn check_rule(rule: &ParameterValidation, value: &Coerced<'_>) -> ValidationResult {
    let passed = match (rule.validation_type, value) {
        (ValidationType::MinLength, Coerced::Text(s)) => match operand(rule) {
            Some(min) => s.chars().count() as f64 >= min,
            None => true,
        },
        (ValidationType::MaxLength, Coerced::Text(s)) => match operand(rule) {
            Some(max) => s.chars().count() as f64 <= max,
            None => true,
        },
        (ValidationType::MinValue, Coerced::Number(n)) => match operand(rule) {
            Some(min) => *n >= min,
            None => true,
        },
        (ValidationType::MaxValue, Coerced::Number(n)) => match operand(rule) {
            Some(max) => *n <= max,
            None => true,
        },
        (ValidationType::Regex, Coerced::Text(s)) => {
            let pattern = Regex::new(&rule.validation_value).map_err(|e| {
                ValidationError::InvalidPattern {
                    pattern: rule.validation_value.clone(),
                    reason: e.to_string(),
                }
            })?;
            pattern.is_match(s)
        }
        // La regla no aplica a este tipo de valor.
        _ => true,
    };

    if passed {
        return Ok(());
    }

    let message = rule
        .error_message
        .clone()
        .unwrap_or_else(|| generic_message(rule));
    Err(ValidationError::RuleViolated {
        rule: rule.validation_type,
        message,
    })
}

fn operand(rule: &ParameterValidation) -> Option<f64> {
    match rule.validation_value.trim().parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!(
                "Se salta la regla {} con operando no numérico '{}'.",
                rule.validation_type,
                rule.validation_value
            );
            None
        }
    }
}

fn generic_message(rule: &ParameterValidation) -> String {
    let v = &rule.validation_value;
    match rule.validation_type {
        ValidationType::MinLength => format!("Debe tener al menos {} caracteres.", v),
        ValidationType::MaxLength => format!("Debe tener como máximo {} caracteres.", v),
        ValidationType::MinValue => format!("Debe ser mayor o igual que {}.", v),
        ValidationType::MaxValue => format!("Debe ser menor o igual que {}.", v),
        ValidationType::Regex => format!("Debe cumplir el patrón {}.", v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParameterType;

    fn param(data_type: DataType, default: Option<&str>) -> Parameter {
        let mut p = Parameter::new("p", ParameterType::Option);
        p.data_type = data_type;
        p.default_value = default.map(str::to_string);
        p
    }

    fn rule(validation_type: ValidationType, value: &str, message: Option<&str>) -> ParameterValidation {
        ParameterValidation {
            validation_type,
            validation_value: value.to_string(),
            error_message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_absent_default_is_valid() {
        let mut p = param(DataType::Number, None);
        p.validations.push(rule(ValidationType::MinValue, "10", None));
        assert_eq!(validate(&p), Ok(()));
    }

    #[test]
    fn test_number_requires_integer() {
        for bad in ["1.5", "abc", "", "-", "1e3", " 4"] {
            let p = param(DataType::Number, Some(bad));
            assert!(
                matches!(validate(&p), Err(ValidationError::NotAnInteger { .. })),
                "{bad:?} should be rejected"
            );
        }
        for good in ["0", "-12", "42"] {
            assert_eq!(validate(&param(DataType::Number, Some(good))), Ok(()));
        }
    }

    #[test]
    fn test_boolean_accepts_case_insensitive_literals() {
        for good in ["true", "FALSE", "True", "1", "0"] {
            assert_eq!(validate(&param(DataType::Boolean, Some(good))), Ok(()));
        }
        for bad in ["yes", "2", "on", ""] {
            assert!(matches!(
                validate(&param(DataType::Boolean, Some(bad))),
                Err(ValidationError::NotABoolean { .. })
            ));
        }
    }

    #[test]
    fn test_string_and_enum_have_no_type_check() {
        assert_eq!(validate(&param(DataType::String, Some("anything"))), Ok(()));
        assert_eq!(validate(&param(DataType::Enum, Some("unlisted"))), Ok(()));
    }

    #[test]
    fn test_length_rules() {
        let mut p = param(DataType::String, Some("abc"));
        p.validations.push(rule(ValidationType::MinLength, "2", None));
        p.validations.push(rule(ValidationType::MaxLength, "3", None));
        assert_eq!(validate(&p), Ok(()));

        p.default_value = Some("abcd".to_string());
        assert_eq!(
            validate(&p),
            Err(ValidationError::RuleViolated {
                rule: ValidationType::MaxLength,
                message: "Debe tener como máximo 3 caracteres.".to_string(),
            })
        );
    }

    #[test]
    fn test_value_rules_use_custom_message() {
        let mut p = param(DataType::Number, Some("70000"));
        p.validations.push(rule(ValidationType::MinValue, "1", None));
        p.validations.push(rule(ValidationType::MaxValue, "65535", Some("Port out of range")));
        let err = validate(&p).unwrap_err();
        assert_eq!(err.to_string(), "Port out of range");
    }

    #[test]
    fn test_empty_custom_message_is_kept() {
        let mut p = param(DataType::String, Some("x"));
        p.validations.push(rule(ValidationType::MinLength, "3", Some("")));
        assert_eq!(
            validate(&p),
            Err(ValidationError::RuleViolated {
                rule: ValidationType::MinLength,
                message: String::new(),
            })
        );
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let mut p = param(DataType::String, Some("x"));
        p.validations.push(rule(ValidationType::MinLength, "5", Some("first")));
        p.validations.push(rule(ValidationType::Regex, "^y$", Some("second")));
        assert_eq!(validate(&p).unwrap_err().to_string(), "first");
    }

    #[test]
    fn test_mismatched_rules_are_skipped() {
        // Las reglas de longitud y patrón nunca saltan con un número.
        let mut p = param(DataType::Number, Some("123456"));
        p.validations.push(rule(ValidationType::MaxLength, "2", None));
        p.validations.push(rule(ValidationType::Regex, "^a$", None));
        assert_eq!(validate(&p), Ok(()));

        // Las reglas de valor nunca saltan con texto.
        let mut p = param(DataType::String, Some("5"));
        p.validations.push(rule(ValidationType::MinValue, "10", None));
        assert_eq!(validate(&p), Ok(()));
    }

    #[test]
    fn test_regex_rule() {
        let mut p = param(DataType::String, Some("main"));
        p.validations.push(rule(ValidationType::Regex, "^[a-z]+$", None));
        assert_eq!(validate(&p), Ok(()));

        p.default_value = Some("Main".to_string());
        assert!(matches!(
            validate(&p),
            Err(ValidationError::RuleViolated { rule: ValidationType::Regex, .. })
        ));
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let mut p = param(DataType::String, Some("x"));
        p.validations.push(rule(ValidationType::Regex, "([", None));
        assert!(matches!(validate(&p), Err(ValidationError::InvalidPattern { .. })));
    }

    #[test]
    fn test_non_numeric_operand_is_skipped() {
        let mut p = param(DataType::String, Some("x"));
        p.validations.push(rule(ValidationType::MinLength, "many", None));
        assert_eq!(validate(&p), Ok(()));
    }

    #[test]
    fn test_validate_tool_collects_failures() {
        let mut tool = Tool::default();
        let mut bad = param(DataType::Number, Some("x"));
        bad.id = "bad".to_string();
        tool.parameters = vec![param(DataType::String, Some("ok")), bad];
        let failures = validate_tool(&tool);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "bad");
    }
}
