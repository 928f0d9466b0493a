//! Notification message formatting.

use std::borrow::Cow;

use crate::error::AppError;
use crate::models::{ChangeEvent, Config, Markup, MessageConfig, TaskFields};
use crate::utils::text::escape_html;

/// Renders change events as message bodies.
#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    labels: MessageConfig,
    markup: Markup,
}

impl MessageFormatter {
    pub fn new(labels: MessageConfig, markup: Markup) -> Self {
        Self { labels, markup }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.messages.clone(), config.telegram.markup)
    }

    /// Format one event.
    ///
    /// The first line names the kind of change; one labelled line per field
    /// follows.
    pub fn format(&self, event: &ChangeEvent) -> String {
        let heading = match event {
            ChangeEvent::Created { .. } => &self.labels.created,
            ChangeEvent::Updated { .. } => &self.labels.updated,
        };
        self.render(heading, &event.record().fields)
    }

    /// Format a cycle failure for the diagnostic message.
    pub fn format_error(&self, error: &AppError) -> String {
        format!(
            "{}\n{}",
            self.bold(&self.labels.error),
            self.escape(&error.to_string())
        )
    }

    fn render(&self, heading: &str, fields: &TaskFields) -> String {
        let labels = &self.labels;
        [
            self.bold(heading),
            format!("{} {}", self.bold(&format!("{}:", labels.title)), self.bold(&fields.title)),
            self.line(&labels.status, &fields.status),
            self.line(&labels.owner, &fields.owner),
            self.line(&labels.due, &fields.due),
        ]
        .join("\n")
    }

    fn line(&self, label: &str, value: &str) -> String {
        format!("{}: {}", self.escape(label), self.escape(value))
    }

    fn bold(&self, text: &str) -> String {
        match self.markup {
            Markup::Html => format!("<b>{}</b>", escape_html(text)),
            Markup::Plain => text.to_string(),
        }
    }

    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.markup {
            Markup::Html => escape_html(text),
            Markup::Plain => Cow::Borrowed(text),
        }
    }
}
