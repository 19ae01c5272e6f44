// src/pipeline/placeholder.rs
// =============================================================================
// The placeholder an embed renders into, and what it looks like once filled.
//
// A Placeholder is created before any network work starts and is consumed by
// `fill`, so it can be filled exactly once. Every embed therefore ends in one
// of the two terminal states, never both and never neither.
//
//   Created -> Loading -> RenderedSuccess | RenderedError
// =============================================================================

use rand::Rng;
use serde::Serialize;

use crate::error::EmbedError;

const ID_LEN: usize = 11;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedState {
    Created,
    Loading,
    RenderedSuccess,
    RenderedError,
}

#[derive(Debug)]
pub struct Placeholder {
    id: String,
    state: EmbedState,
}

impl Placeholder {
    // A fresh placeholder with a random base-36 id
    //
    // The first character is always a letter so the id also works as a CSS
    // selector (#id).
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..ID_LEN)
            .map(|i| {
                let idx = if i == 0 {
                    rng.gen_range(10..BASE36.len())
                } else {
                    rng.gen_range(0..BASE36.len())
                };
                BASE36[idx] as char
            })
            .collect();

        Self {
            id,
            state: EmbedState::Created,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    pub fn start_loading(&mut self) {
        if self.state == EmbedState::Created {
            self.state = EmbedState::Loading;
        }
    }

    // Puts the rendered content in, ending the placeholder's life
    pub fn fill(self, input: &str, raw_file_url: Option<&str>, content: String, error: Option<&EmbedError>) -> RenderedEmbed {
        let state = match error {
            None => EmbedState::RenderedSuccess,
            Some(_) => EmbedState::RenderedError,
        };

        RenderedEmbed {
            placeholder_id: self.id,
            input: input.to_string(),
            raw_file_url: raw_file_url.map(str::to_string),
            state,
            error: error.map(|e| ErrorReport {
                kind: e.kind(),
                message: e.to_string(),
            }),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

// A filled placeholder
#[derive(Debug, Clone, Serialize)]
pub struct RenderedEmbed {
    pub placeholder_id: String,
    /// What the user asked to embed
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_file_url: Option<String>,
    pub state: EmbedState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    /// The markup that replaced the placeholder's contents
    pub content: String,
}

impl RenderedEmbed {
    pub fn is_ok(&self) -> bool {
        self.state == EmbedState::RenderedSuccess
    }

    // The placeholder element with its content in place
    pub fn to_html(&self) -> String {
        format!("<div id=\"{}\">{}</div>", self.placeholder_id, self.content)
    }
}
