//! Directive composition.
//!
//! A directive is the instruction payload sent ahead of the conversation:
//! persona, then an optional quoted link, then the rules of the current mode.

use crate::types::{LinkContext, PersonaDefinition, RetrievalMode};
use handlebars::Handlebars;
use lumina_core::{AppError, AppResult};
use serde_json::json;

const PERSONA_TEMPLATE: &str = "{{persona}}\
{{#if rules}}\n\n🛑 **IDENTITY & BEHAVIOR RULES:**\n{{rules}}{{/if}}\
{{#if formatting}}\n\n🎨 **FORMATTING RULES (STRICT):**\n{{formatting}}{{/if}}";

const LINK_TEMPLATE: &str = "\n\n📄 **CONTEXT FROM LINK ({{url}}):**\n\
--- BEGIN LINKED CONTENT ---\n{{text}}\n--- END LINKED CONTENT ---\
{{#if truncated}}\n(The linked content was truncated.){{/if}}\n\n(User asked about this link.)";

const SEARCH_TEMPLATE: &str = "\n\n🌍 **WEB SEARCH ACTIVE**\n\
- Use the search tool to look up the entities mentioned before answering.\n\
- If names are similar or ambiguous, VERIFY which entity is meant before answering.\n\
- Prefer recent, reputable sources and say so when results disagree.";

const MEMORY_TEMPLATE: &str = "\n\n🧠 **MEMORY MODE**\n\
- Answer only from this conversation and your built-in knowledge.\n\
- Do NOT search the web or consult any external source.\n\
- Be humble if you don't know.";

/// Builds directive text from an immutable persona.
///
/// Composition is pure: the same mode and link always give the same text.
pub struct InstructionComposer {
    persona: PersonaDefinition,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for InstructionComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionComposer")
            .field("persona", &self.persona.id)
            .finish()
    }
}

impl InstructionComposer {
    /// Create a composer for a persona, compiling all block templates.
    pub fn new(persona: PersonaDefinition) -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("persona", PERSONA_TEMPLATE),
            ("link", LINK_TEMPLATE),
            ("search", SEARCH_TEMPLATE),
            ("memory", MEMORY_TEMPLATE),
        ] {
            registry
                .register_template_string(name, template)
                .map_err(|e| {
                    AppError::Prompt(format!("Failed to register {} template: {}", name, e))
                })?;
        }

        Ok(Self { persona, registry })
    }

    pub fn persona(&self) -> &PersonaDefinition {
        &self.persona
    }

    /// Compose the directive for one request.
    pub fn compose(&self, mode: RetrievalMode, link: Option<LinkContext<'_>>) -> AppResult<String> {
        let mut directive = self.render(
            "persona",
            &json!({
                "persona": self.persona.persona.trim_end(),
                "rules": numbered(&self.persona.rules),
                "formatting": numbered(&self.persona.formatting),
            }),
        )?;

        if let Some(link) = link {
            directive.push_str(&self.render(
                "link",
                &json!({
                    "url": link.url,
                    "text": link.text,
                    "truncated": link.truncated,
                }),
            )?);
        }

        let mode_block = match mode {
            RetrievalMode::Search => "search",
            RetrievalMode::Memory => "memory",
        };
        directive.push_str(&self.render(mode_block, &json!({}))?);

        tracing::debug!(
            mode = mode.as_str(),
            with_link = link.is_some(),
            chars = directive.chars().count(),
            "Composed directive"
        );

        Ok(directive)
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> AppResult<String> {
        self.registry
            .render(name, data)
            .map_err(|e| AppError::Prompt(format!("Failed to render {} block: {}", name, e)))
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
