//! Deterministic in-process language model.
//!
//! Replies are served from a queue in order. Once the queue is drained the
//! default reply is returned, or an error when none is set. Backs the `fake`
//! provider and the tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::llm::{ChatMessage, LanguageModel, LlmError};

enum Scripted {
    Reply(String),
    Failure(String),
}

pub struct ScriptedModel {
    queue: Mutex<VecDeque<Scripted>>,
    default_reply: Option<String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

/// A well-formed recipe reply, handy for demos without a model server.
pub const SAMPLE_REPLY: &str = r#"{
  "title": "Pantry Fried Rice",
  "description": "A quick skillet dinner built from whatever is on hand.",
  "ingredients": ["2 cups cooked rice", "2 eggs", "1 tbsp oil", "salt and pepper"],
  "instructions": ["Heat the oil in a skillet.", "Scramble the eggs.", "Add the rice and season."],
  "prep_time": "20 minutes"
}"#;

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text
    pub fn always(reply: &str) -> Self {
        Self::new().with_default_reply(reply)
    }

    pub fn with_default_reply(mut self, reply: &str) -> Self {
        self.default_reply = Some(reply.to_string());
        self
    }

    pub fn push_reply(self, reply: &str) -> Self {
        lock(&self.queue).push_back(Scripted::Reply(reply.to_string()));
        self
    }

    pub fn push_failure(self, message: &str) -> Self {
        lock(&self.queue).push_back(Scripted::Failure(message.to_string()));
        self
    }

    /// Every message list the model has been asked to complete.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::always(SAMPLE_REPLY)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        lock(&self.calls).push(messages.to_vec());

        let next = lock(&self.queue).pop_front();
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Failure(message)) => Err(LlmError::Request(message)),
            None => self
                .default_reply
                .clone()
                .ok_or_else(|| LlmError::Request("no scripted reply left".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let model = ScriptedModel::always("default")
            .push_reply("first")
            .push_failure("boom");
        let messages = vec![ChatMessage::user("hi")];

        assert_eq!(model.complete(&messages).await.unwrap(), "first");
        assert!(model.complete(&messages).await.is_err());
        assert_eq!(model.complete(&messages).await.unwrap(), "default");
        assert_eq!(model.call_count(), 3);
        assert_eq!(model.calls()[0], messages);
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let model = ScriptedModel::new();
        assert!(model.complete(&[]).await.is_err());
    }
}
