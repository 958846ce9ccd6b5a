//! Handlebars rendering of notification text.

use handlebars::Handlebars;
use serde::Serialize;

use super::{ChangeEvent, ChannelError};
use crate::history::timestamp;

/// A notification text template.
///
/// Available variables:
/// - `ip`: the new value
/// - `previous_ip`: the value it replaced (empty on the first observation)
/// - `timestamp`: when the change was recorded, canonical text
///
/// Output is plain text; nothing is HTML-escaped.
///
/// # Example
///
/// ```
/// use ipwatch::notify::MessageTemplate;
///
/// let template = MessageTemplate::validated("New IP: {{ip}}").unwrap();
/// assert_eq!(template.source(), "New IP: {{ip}}");
/// assert!(MessageTemplate::validated("{{#if}}").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
}

#[derive(Serialize)]
struct MessageData<'a> {
    ip: &'a str,
    previous_ip: Option<&'a str>,
    timestamp: String,
}

impl<'a> From<&'a ChangeEvent> for MessageData<'a> {
    fn from(event: &'a ChangeEvent) -> Self {
        Self {
            ip: &event.value,
            previous_ip: event.previous.as_deref(),
            timestamp: timestamp::format(&event.observed_at),
        }
    }
}

impl MessageTemplate {
    /// Wraps a template source without checking it.
    ///
    /// Syntax errors surface as [`ChannelError::Template`] at render time.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Wraps a template source after checking its syntax.
    ///
    /// # Errors
    ///
    /// Returns the Handlebars error if the template does not compile.
    pub fn validated(source: impl Into<String>) -> Result<Self, handlebars::RenderError> {
        let template = Self::new(source);
        renderer().render_template(&template.source, &serde_json::json!({}))?;
        Ok(template)
    }

    /// Returns the template source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Template`] if rendering fails.
    pub fn render(&self, event: &ChangeEvent) -> Result<String, ChannelError> {
        renderer()
            .render_template(&self.source, &MessageData::from(event))
            .map_err(|e| ChannelError::Template(e.to_string()))
    }
}

fn renderer() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}
