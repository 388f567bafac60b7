//! Completion gateway.
//!
//! [`CompletionGateway::query`] turns a viewpoint and a conversation into one
//! chat-completion call. The transport sits behind [`ChatCompletion`] so a
//! session can be driven by a scripted client.

use aivi_core::context::{ContextDocument, ConversationContext};
use aivi_core::viewpoint::Viewpoint;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Why a completion call failed. The gateway never retries; the
/// retryability flags are reported for the caller to log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or timeout failure before any HTTP status arrived.
    #[error("Completion request failed: {message}")]
    Transport { message: String, is_retryable: bool },

    /// Non-success HTTP status.
    #[error("Completion service returned {status}: {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The body could not be decoded.
    #[error("Malformed completion response: {0}")]
    Malformed(String),

    /// The first choice carried no content, or only whitespace.
    #[error("Completion service returned no content")]
    EmptyResponse,

    /// No API key could be found.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport { is_retryable, .. }
            | GatewayError::Http { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A chat-completion transport.
///
/// Implementations send `request` as-is and return the first choice's
/// message content.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ContextDocument) -> Result<String, GatewayError>;
}

/// Sends conversations to a [`ChatCompletion`] transport.
#[derive(Clone)]
pub struct CompletionGateway {
    client: Arc<dyn ChatCompletion>,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn ChatCompletion>) -> Self {
        Self { client }
    }

    /// Queries the service with `context` under `viewpoint`'s model and
    /// token budget.
    ///
    /// On success the pending lines are folded in, the reply is appended as
    /// an assistant message and returned. A whitespace-only reply is an
    /// [`GatewayError::EmptyResponse`]. On failure `context` is left exactly
    /// as it was.
    pub async fn query(
        &self,
        viewpoint: &Viewpoint,
        context: &mut ConversationContext,
    ) -> Result<String, GatewayError> {
        let request = context.to_document(viewpoint);
        info!(
            "[Gateway] Querying {} ({}, {} messages, max_tokens={})",
            viewpoint.name,
            request.model,
            request.messages.len(),
            request.max_tokens
        );

        let result = self.client.complete(&request).await.and_then(|reply| {
            if reply.trim().is_empty() {
                Err(GatewayError::EmptyResponse)
            } else {
                Ok(reply)
            }
        });
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "[Gateway] {} failed (retryable: {}): {}",
                    viewpoint.name,
                    e.is_retryable(),
                    e
                );
                return Err(e);
            }
        };

        context.fold_pending();
        context.append_assistant(reply.as_str());
        info!("[Gateway] {} replied with {} bytes", viewpoint.name, reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedCompletion;
    use aivi_core::context::MessageRole;
    use aivi_core::viewpoint::get_default_presets;

    fn spelling() -> Viewpoint {
        get_default_presets().into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_success_appends_assistant() {
        let script = Arc::new(ScriptedCompletion::new([Ok("The cat".to_string())]));
        let gateway = CompletionGateway::new(script.clone());
        let viewpoint = spelling();
        let mut context = ConversationContext::for_viewpoint(&viewpoint);
        context.append_user("Teh cat");

        let reply = gateway.query(&viewpoint, &mut context).await.unwrap();
        assert_eq!(reply, "The cat");
        let last = context.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::Assistant);
        assert_eq!(last.content, "The cat");

        let requests = script.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, viewpoint.model);
        assert_eq!(requests[0].max_tokens, viewpoint.max_tokens);
        assert_eq!(requests[0].messages.last().unwrap().content, "Teh cat");
    }

    #[tokio::test]
    async fn test_failure_leaves_context_untouched() {
        let script = Arc::new(ScriptedCompletion::new([Err(GatewayError::Http {
            status: 503,
            message: "overloaded".into(),
            is_retryable: true,
            retry_after: None,
        })]));
        let gateway = CompletionGateway::new(script);
        let viewpoint = spelling();
        let mut context = ConversationContext::for_viewpoint(&viewpoint);
        context.push_pending("a typed line");
        let before = context.clone();

        let err = gateway.query(&viewpoint, &mut context).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(context, before);
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_response() {
        let script = Arc::new(ScriptedCompletion::new([Ok("   \n\t\n".to_string())]));
        let gateway = CompletionGateway::new(script);
        let viewpoint = spelling();
        let mut context = ConversationContext::for_viewpoint(&viewpoint);
        context.push_pending("keep me pending");
        let before = context.clone();

        let err = gateway.query(&viewpoint, &mut context).await.unwrap_err();
        assert_eq!(err, GatewayError::EmptyResponse);
        assert_eq!(context, before);
    }

    #[tokio::test]
    async fn test_pending_lines_precede_reply() {
        let script = Arc::new(ScriptedCompletion::new([Ok("noted".to_string())]));
        let gateway = CompletionGateway::new(script);
        let viewpoint = spelling();
        let mut context = ConversationContext::new();
        context.push_pending("line one");

        gateway.query(&viewpoint, &mut context).await.unwrap();
        let contents: Vec<_> = context.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["line one", "noted"]);
        assert!(context.pending().is_empty());
    }

    #[test]
    fn test_retryability() {
        assert!(!GatewayError::EmptyResponse.is_retryable());
        let timeout = GatewayError::Transport {
            message: "timed out".into(),
            is_retryable: true,
        };
        assert!(timeout.is_retryable());
        assert_eq!(timeout.retry_after(), None);
    }
}
