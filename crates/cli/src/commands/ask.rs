//! Ask command handler.
//!
//! Resolves one answer for a conversation, optionally loaded from a file.

use clap::Args;
use lumina_core::{config::AppConfig, AppError, AppResult};
use lumina_retrieval::{resolve_answer, AnswerResponse, Message, RetrievalMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Separator between an answer and its suggested follow-up questions.
const FOLLOW_UP_MARKER: &str = "|||";

/// Answer a question with optional conversation history
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask (appended to the history as a user message)
    pub prompt: Option<String>,

    /// JSON file with prior messages: an array, or an object with a "history" array
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Enable web search (grounded answer with search fallbacks)
    #[arg(short, long)]
    pub search: bool,

    /// Output as JSON ({"answer", "sources"})
    #[arg(long)]
    pub json: bool,
}

/// Accepted layouts of a history file.
#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Messages(Vec<Message>),
    Wrapped { history: Vec<Message> },
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let history = self.build_history()?;
        let mode = RetrievalMode::from_search_flag(self.search);

        let response = resolve_answer(config, &history, mode).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_answer(&response);
        }

        Ok(())
    }

    fn build_history(&self) -> AppResult<Vec<Message>> {
        let mut history = match &self.history {
            Some(path) => load_history(path)?,
            None => Vec::new(),
        };

        if let Some(prompt) = &self.prompt {
            history.push(Message::user(prompt.clone()));
        }

        if history.is_empty() {
            return Err(AppError::Config(
                "No prompt provided (pass a question or --history)".to_string(),
            ));
        }

        tracing::debug!("Conversation has {} messages", history.len());
        Ok(history)
    }
}

/// Read a conversation file.
fn load_history(path: &Path) -> AppResult<Vec<Message>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read history file {:?}: {}", path, e))
    })?;

    let parsed: HistoryFile = serde_json::from_str(&contents).map_err(|e| {
        AppError::Config(format!("Failed to parse history file {:?}: {}", path, e))
    })?;

    Ok(match parsed {
        HistoryFile::Messages(messages) => messages,
        HistoryFile::Wrapped { history } => history,
    })
}

/// Split an answer into its body and the follow-up questions after `|||`.
fn split_follow_ups(answer: &str) -> (&str, Vec<&str>) {
    match answer.split_once(FOLLOW_UP_MARKER) {
        Some((body, rest)) => {
            let questions = rest
                .split('|')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .collect();
            (body.trim_end(), questions)
        }
        None => (answer, Vec::new()),
    }
}

fn print_answer(response: &AnswerResponse) {
    let (body, follow_ups) = split_follow_ups(&response.answer);
    println!("{}", body);

    if !response.sources.is_empty() {
        println!("\nSources:");
        for (i, source) in response.sources.iter().enumerate() {
            println!("  [{}] {} - {}", i + 1, source.title, source.uri);
        }
    }

    if !follow_ups.is_empty() {
        println!("\nYou could also ask:");
        for question in follow_ups {
            println!("  - {}", question);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_retrieval::Role;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn command(prompt: Option<&str>, history: Option<PathBuf>) -> AskCommand {
        AskCommand {
            prompt: prompt.map(str::to_string),
            history,
            search: false,
            json: false,
        }
    }

    fn history_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_prompt_only() {
        let history = command(Some("hi"), None).build_history().unwrap();
        assert_eq!(history, vec![Message::user("hi")]);
    }

    #[test]
    fn test_history_array_with_prompt_appended() {
        let file = history_file(
            r#"[{"role": "user", "content": "hello"}, {"role": "assistant", "content": "hey!"}]"#,
        );
        let history = command(Some("and now?"), Some(file.path().to_path_buf()))
            .build_history()
            .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2], Message::user("and now?"));
    }

    #[test]
    fn test_wrapped_history() {
        let file = history_file(
            r#"{"history": [{"role": "user", "content": "q"}], "useWebSearch": true}"#,
        );
        let history = command(None, Some(file.path().to_path_buf()))
            .build_history()
            .unwrap();
        assert_eq!(history, vec![Message::user("q")]);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(
            command(None, None).build_history(),
            Err(AppError::Config(_))
        ));

        let file = history_file("not json");
        assert!(command(Some("x"), Some(file.path().to_path_buf()))
            .build_history()
            .is_err());
    }

    #[test]
    fn test_split_follow_ups() {
        let (body, questions) =
            split_follow_ups("Rust is great! 🦀\n\n|||What is ownership?|Is it fast?| Who uses it? ");
        assert_eq!(body, "Rust is great! 🦀");
        assert_eq!(
            questions,
            vec!["What is ownership?", "Is it fast?", "Who uses it?"]
        );

        let (body, questions) = split_follow_ups("Plain answer | with a pipe");
        assert_eq!(body, "Plain answer | with a pipe");
        assert!(questions.is_empty());
    }
}
