//! Persona loader for YAML persona definitions.

use crate::types::PersonaDefinition;
use lumina_core::{AppError, AppResult};
use std::path::Path;

/// Built-in persona, used when the workspace does not provide one.
const DEFAULT_PERSONA_YAML: &str = include_str!("../personas/default.yaml");

/// Load a persona definition from a YAML file.
///
/// # Example
/// ```no_run
/// use lumina_prompt::load_persona;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let persona = load_persona(Path::new(".lumina/persona.yaml"))?;
/// println!("Loaded persona: {}", persona.name);
/// # Ok(())
/// # }
/// ```
pub fn load_persona(path: &Path) -> AppResult<PersonaDefinition> {
    tracing::debug!("Loading persona from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!(
            "Persona file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read persona file {:?}: {}", path, e))
    })?;

    let definition = parse_persona(&contents)
        .map_err(|e| AppError::Prompt(format!("Invalid persona file {:?}: {}", path, e)))?;

    tracing::info!("Loaded persona: {} ({})", definition.id, definition.name);

    Ok(definition)
}

/// The built-in persona.
pub fn default_persona() -> AppResult<PersonaDefinition> {
    parse_persona(DEFAULT_PERSONA_YAML)
}

/// Load the persona at `path` if given, else the built-in one.
pub fn load_persona_or_default(path: Option<&Path>) -> AppResult<PersonaDefinition> {
    match path {
        Some(path) => load_persona(path),
        None => default_persona(),
    }
}

fn parse_persona(contents: &str) -> AppResult<PersonaDefinition> {
    let definition: PersonaDefinition = serde_yaml::from_str(contents)?;
    validate_persona(&definition)?;
    Ok(definition)
}

/// Validate a persona definition.
fn validate_persona(def: &PersonaDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Persona ID cannot be empty".to_string()));
    }

    if def.persona.trim().is_empty() {
        return Err(AppError::Prompt("Persona text cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
