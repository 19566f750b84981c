//! The per-turn contract between the conversation core and the transport.
//!
//! Each turn the core receives one structured input and answers with a
//! prompt descriptor (text plus the set of offered options) or a terminal
//! outcome. Rendering is entirely the transport's concern.

use serde::{Deserialize, Serialize};

/// One turn of user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TurnInput {
    /// A raw text line.
    Text(String),
    /// A selected option token, as previously offered in a prompt.
    Choice(String),
}

/// An option offered to the user for the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOption {
    /// Token the transport sends back as a `Choice`.
    pub token: String,
    /// Human-readable label.
    pub label: String,
}

impl PromptOption {
    /// Creates an option.
    #[must_use]
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
        }
    }
}

/// A prompt descriptor for the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Prompt text.
    pub text: String,
    /// Offered options; empty when free text is expected.
    pub options: Vec<PromptOption>,
}

impl Prompt {
    /// Creates a free-text prompt.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// Creates a prompt offering options.
    #[must_use]
    pub fn with_options(text: impl Into<String>, options: Vec<PromptOption>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    /// Returns true if the prompt offers the given token.
    #[must_use]
    pub fn offers(&self, token: &str) -> bool {
        self.options.iter().any(|o| o.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_input_serde_shape() {
        let input = TurnInput::Choice("manual".to_string());
        let value = serde_json::to_value(&input).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"kind": "choice", "value": "manual"})
        );

        let parsed: TurnInput = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, input);
    }

    #[test]
    fn prompt_offers() {
        let prompt = Prompt::with_options(
            "Quand ce workflow doit-il s'exécuter ?",
            vec![
                PromptOption::new("manual", "Manuellement"),
                PromptOption::new("schedule", "À heure fixe"),
            ],
        );

        assert!(prompt.offers("manual"));
        assert!(!prompt.offers("webhook"));
    }
}
