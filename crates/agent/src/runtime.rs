use std::sync::Arc;

use tableside_core::cart::Cart;
use tableside_core::catalog::{CatalogUnavailable, MenuSnapshot};
use tracing::{info, warn};

use crate::llm::{LlmClient, LlmError};
use crate::ordering::{apply_response, ApplyOutcome};
use crate::prompt::{self, RATE_LIMITED_REPLY, UNAVAILABLE_REPLY};
use crate::session::ChatSession;

/// Where the reply text of a turn came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Assistant,
    Offline,
    RateLimited,
    Unavailable,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Offline => "offline",
            Self::RateLimited => "rate_limited",
            Self::Unavailable => "unavailable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerTurn {
    /// Text to show the customer, with every order tag removed.
    pub reply: String,
    pub outcomes: Vec<ApplyOutcome>,
    /// Present only when this turn put something in the cart.
    pub confirmation: Option<String>,
    pub source: ReplySource,
}

/// Runs one customer message through chat, extraction and the cart.
#[derive(Clone, Default)]
pub struct AgentRuntime {
    client: Option<Arc<dyn LlmClient>>,
    currency: String,
}

impl AgentRuntime {
    pub fn new(client: Option<Arc<dyn LlmClient>>, currency: impl Into<String>) -> Self {
        Self { client, currency: currency.into() }
    }

    pub fn offline(currency: impl Into<String>) -> Self {
        Self::new(None, currency)
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    pub fn welcome(&self, session: &ChatSession, snapshot: &MenuSnapshot) -> String {
        prompt::welcome(session.table_id(), snapshot)
    }

    pub async fn handle_customer_message(
        &self,
        session: &mut ChatSession,
        cart: &mut Cart,
        snapshot: &MenuSnapshot,
        text: &str,
    ) -> Result<CustomerTurn, CatalogUnavailable> {
        let table_id = session.table_id();
        let (raw_reply, source) = match &self.client {
            None => (prompt::offline_reply(text, table_id, snapshot), ReplySource::Offline),
            Some(client) => {
                let system_prompt = prompt::system_prompt(table_id, snapshot, &self.currency)?;
                session.push_user(text);
                match client.chat(&system_prompt, session.history()).await {
                    Ok(reply) => {
                        session.push_assistant(reply.clone());
                        (reply, ReplySource::Assistant)
                    }
                    Err(error) => {
                        session.discard_unanswered();
                        warn!(
                            event_name = "agent.chat.failed",
                            table_id = table_id.0,
                            error = %error,
                            "chat service call failed, using fallback reply"
                        );
                        fallback_reply(&error)
                    }
                }
            }
        };

        let turn = apply_response(&raw_reply, snapshot, snapshot, cart)?;
        let confirmation = turn.added_summary().map(|summary| {
            format!(
                "Added to cart: {summary}. Please review your order and confirm it to send it \
                 to the kitchen."
            )
        });

        let added = turn.outcomes.iter().filter(|outcome| outcome.is_added()).count();
        info!(
            event_name = "agent.turn.completed",
            table_id = table_id.0,
            source = source.as_str(),
            instructions = turn.outcomes.len(),
            added,
            malformed_tags = turn.malformed_tags,
            cart_version = cart.version(),
            "customer message handled"
        );

        Ok(CustomerTurn { reply: turn.cleaned_text, outcomes: turn.outcomes, confirmation, source })
    }
}

fn fallback_reply(error: &LlmError) -> (String, ReplySource) {
    match error {
        LlmError::RateLimited => (RATE_LIMITED_REPLY.to_string(), ReplySource::RateLimited),
        LlmError::Request(_) | LlmError::Api { .. } | LlmError::EmptyResponse => {
            (UNAVAILABLE_REPLY.to_string(), ReplySource::Unavailable)
        }
    }
}
