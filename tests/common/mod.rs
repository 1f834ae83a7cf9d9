//! Test doubles for the chat backend and the SQL runner.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use weather_nlq::{ChatBackend, ChatMessage, NlqError, Result, ResultSet, SqlRunner};

/// Chat backend that replays scripted replies in order and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies for synthesize, detect and explain, in pipeline order.
    pub fn answering(sql: &str, language: &str, explanation: &str) -> Self {
        Self::new(vec![
            Ok(sql.to_string()),
            Ok(language.to_string()),
            Ok(explanation.to_string()),
        ])
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// All message contents of the n-th request joined together.
    pub fn request_text(&self, n: usize) -> String {
        self.requests()[n]
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ChatBackend for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NlqError::llm("no scripted reply left")))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// SQL runner returning a fixed result set and recording the SQL it was given.
pub struct StubDatabase {
    result: ResultSet,
    executed: Mutex<Vec<String>>,
}

impl StubDatabase {
    pub fn returning(result: ResultSet) -> Self {
        Self {
            result,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlRunner for StubDatabase {
    async fn run(&self, sql: &str) -> Result<ResultSet> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.result.clone())
    }
}

/// SQL runner that always fails with the given message.
pub struct FailingDatabase {
    message: String,
}

impl FailingDatabase {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

#[async_trait]
impl SqlRunner for FailingDatabase {
    async fn run(&self, _sql: &str) -> Result<ResultSet> {
        Err(NlqError::query(self.message.clone()))
    }
}
