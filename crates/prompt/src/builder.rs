//! One-off prompt builders for single-turn provider calls.

use handlebars::Handlebars;
use lumina_core::{AppError, AppResult};
use serde::Serialize;

const SYNTHESIS_TEMPLATE: &str = "Using ONLY this {{source}} context, answer: '{{query}}'.\nCONTEXT:\n{{context}}";

const TITLE_TEMPLATE: &str = "Generate a short, simple title (3-5 words) for this user query. PLAIN TEXT ONLY. NO markdown, NO bold (**), NO punctuation, NO quotes.\nQuery: {{query}}";

/// Build the prompt that asks the provider to answer from gathered context only.
///
/// # Example
/// ```
/// use lumina_prompt::synthesis_prompt;
///
/// let prompt = synthesis_prompt("Wikipedia", "Who wrote Dune?", "--- TITLE: Dune ---").unwrap();
/// assert!(prompt.starts_with("Using ONLY this Wikipedia context"));
/// ```
pub fn synthesis_prompt(source: &str, query: &str, context: &str) -> AppResult<String> {
    #[derive(Serialize)]
    struct Vars<'a> {
        source: &'a str,
        query: &'a str,
        context: &'a str,
    }

    render_template(
        SYNTHESIS_TEMPLATE,
        &Vars {
            source,
            query,
            context,
        },
    )
}

/// Build the conversation-title prompt for a first user message.
pub fn title_prompt(query: &str) -> AppResult<String> {
    #[derive(Serialize)]
    struct Vars<'a> {
        query: &'a str,
    }

    render_template(TITLE_TEMPLATE, &Vars { query })
}

/// Render a Handlebars template with variables, without HTML escaping.
pub(crate) fn render_template<T: Serialize>(template: &str, data: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_does_not_escape_html() {
        let mut vars = HashMap::new();
        vars.insert("text", "<b>a & b</b>");
        let rendered = render_template("Q: {{text}}", &vars).unwrap();
        assert_eq!(rendered, "Q: <b>a & b</b>");
    }

    #[test]
    fn test_render_missing_variable_is_empty() {
        let vars: HashMap<&str, &str> = HashMap::new();
        assert_eq!(render_template("Q: {{missing}}", &vars).unwrap(), "Q: ");
    }

    #[test]
    fn test_render_invalid_template() {
        let vars: HashMap<&str, &str> = HashMap::new();
        let result = render_template("{{#if}}", &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_synthesis_prompt() {
        let prompt = synthesis_prompt("Wikipedia", "What is Rust?", "Rust is a language.").unwrap();
        assert_eq!(
            prompt,
            "Using ONLY this Wikipedia context, answer: 'What is Rust?'.\nCONTEXT:\nRust is a language."
        );
    }

    #[test]
    fn test_title_prompt_keeps_query_verbatim() {
        let prompt = title_prompt("explain \"borrowing\" & lifetimes").unwrap();
        assert!(prompt.ends_with("Query: explain \"borrowing\" & lifetimes"));
        assert!(prompt.contains("3-5 words"));
    }
}
