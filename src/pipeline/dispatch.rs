//! Delivery of a cycle's messages.
//!
//! Batched delivery joins every message into one body and makes a single
//! call. Per-event delivery makes one call per message. Bodies never exceed
//! the configured length, and shortened HTML bodies stay well-formed.

use std::borrow::Cow;

use crate::error::{AppError, Result};
use crate::models::{Config, DeliveryPolicy, Markup};
use crate::services::Notifier;
use crate::utils::text::{escape_html, truncate_graphemes, truncate_html};

/// Visible separator between messages in a batched body.
pub const BATCH_SEPARATOR: &str = "\n\n";

/// Turns formatted messages into outbound calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    policy: DeliveryPolicy,
    markup: Markup,
    max_chars: usize,
    more_label: String,
}

impl Dispatcher {
    pub fn new(policy: DeliveryPolicy, max_chars: usize, more_label: impl Into<String>) -> Self {
        Self {
            policy,
            markup: Markup::default(),
            max_chars,
            more_label: more_label.into(),
        }
    }

    /// Markup the bodies are written in; decides how they are shortened.
    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.telegram.delivery,
            config.telegram.max_message_chars,
            config.messages.more.clone(),
        )
        .with_markup(config.telegram.markup)
    }

    /// Build the bodies to send. No messages means no bodies.
    pub fn compose(&self, messages: &[String]) -> Vec<String> {
        if messages.is_empty() {
            return Vec::new();
        }

        match self.policy {
            DeliveryPolicy::Batched => vec![self.batch(messages)],
            DeliveryPolicy::PerEvent => messages
                .iter()
                .map(|m| self.shorten(m).into_owned())
                .collect(),
        }
    }

    /// Send the bodies for one cycle.
    ///
    /// Every body is attempted once. Returns the number sent, or the first
    /// failure if any body was rejected.
    pub async fn deliver(&self, notifier: &dyn Notifier, messages: &[String]) -> Result<usize> {
        let mut sent = 0;
        let mut first_error: Option<AppError> = None;

        for body in self.compose(messages) {
            match notifier.send(&body).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    log::warn!("Notification delivery failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(sent),
        }
    }

    /// Join messages, dropping whole messages from the end when the body
    /// would be too long.
    fn batch(&self, messages: &[String]) -> String {
        let joined = messages.join(BATCH_SEPARATOR);
        if fits(&joined, self.max_chars) {
            return joined;
        }

        for keep in (1..messages.len()).rev() {
            let omitted = messages.len() - keep;
            let more = self.more_label.replace("{count}", &omitted.to_string());
            let candidate = format!(
                "{}{}{}",
                messages[..keep].join(BATCH_SEPARATOR),
                BATCH_SEPARATOR,
                self.escape(&more)
            );
            if fits(&candidate, self.max_chars) {
                log::warn!(
                    "Batched message too long; sending {} of {} changes",
                    keep,
                    messages.len()
                );
                return candidate;
            }
        }

        self.shorten(&messages[0]).into_owned()
    }

    fn shorten<'a>(&self, body: &'a str) -> Cow<'a, str> {
        match self.markup {
            Markup::Html => truncate_html(body, self.max_chars),
            Markup::Plain => truncate_graphemes(body, self.max_chars),
        }
    }

    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.markup {
            Markup::Html => escape_html(text),
            Markup::Plain => Cow::Borrowed(text),
        }
    }
}

fn fits(text: &str, max_chars: usize) -> bool {
    text.chars().count() <= max_chars
}
