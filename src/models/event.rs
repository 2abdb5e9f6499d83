use serde::{Deserialize, Serialize};

/// Inbound event delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: i64,
    #[serde(flatten)]
    pub input: Input,
}

impl Event {
    pub fn text(user_id: i64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            input: Input::Text(text.into()),
        }
    }

    pub fn choice(user_id: i64, command: Command) -> Self {
        Self {
            user_id,
            input: Input::Choice(command),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Input {
    Text(String),
    Choice(Command),
}

/// Callback attached to a choice button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    StartWorkout,
    ViewHistory,
    AddAnother,
    Finish,
    ShowWorkout { workout_id: String },
    BackToMenu,
    BackToHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub id: Command,
}

impl Choice {
    pub fn new(label: impl Into<String>, id: Command) -> Self {
        Self {
            label: label.into(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub choices: Option<Vec<Choice>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: None,
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            choices: Some(choices),
        }
    }

    pub fn choice_ids(&self) -> Vec<&Command> {
        self.choices
            .iter()
            .flatten()
            .map(|choice| &choice.id)
            .collect()
    }
}
