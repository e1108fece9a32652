//! Scripted mock provider for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply, consumed in call order.
pub enum MockReply {
    /// Respond with the given text.
    Text(String),
    /// Respond successfully with no text at all.
    NoText,
    /// Fail with the given error.
    Error(ProviderError),
    /// Wait, then produce the inner reply.
    Delayed(Duration, Box<MockReply>),
    /// Never resolve.
    Hang,
    /// Panic inside the provider call.
    Panic(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn api_error(message: impl Into<String>) -> Self {
        MockReply::Error(ProviderError::ApiError {
            status: 400,
            message: message.into(),
        })
    }
}

/// A recorded call to the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub params: GenerationParams,
}

/// Mock text provider that replays a script of replies.
pub struct MockTextProvider {
    script: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<MockCall>>,
    healthy: bool,
}

impl MockTextProvider {
    pub fn new(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    /// A provider whose health check fails.
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new(Vec::new())
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }
}

async fn resolve(reply: MockReply) -> Result<ProviderResponse, ProviderError> {
    let mut reply = reply;
    loop {
        match reply {
            MockReply::Text(text) => {
                return Ok(ProviderResponse {
                    output_tokens: text.len() as i32 / 4,
                    text: Some(text),
                    input_tokens: 0,
                    finish_reason: FinishReason::Complete,
                })
            }
            MockReply::NoText => {
                return Ok(ProviderResponse {
                    text: None,
                    input_tokens: 0,
                    output_tokens: 0,
                    finish_reason: FinishReason::Complete,
                })
            }
            MockReply::Error(err) => return Err(err),
            MockReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            MockReply::Hang => return std::future::pending().await,
            MockReply::Panic(message) => panic!("{}", message),
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall {
                prompt: prompt.to_string(),
                params: params.clone(),
            });

        match self.next_reply() {
            Some(reply) => resolve(reply).await,
            None => Err(ProviderError::NotConfigured(
                "Mock script exhausted".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
