//! Platform-neutral interactive messages.
//!
//! Executors answer with a [`Message`]; platform adapters turn it into their
//! own markup. [`Message::render_plain`] is the lowest common denominator used
//! for size checks and file attachments.

use serde::{Deserialize, Serialize};

/// How the message should be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Default,
    /// Rendered as a modal when the interaction provides a trigger handle.
    Popup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    pub code_block: String,
    pub plaintext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionItem {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    #[default]
    Default,
    Primary,
    Danger,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Button {
    pub name: String,
    pub description: String,
    /// Command sent back when clicked. Empty for link buttons.
    pub command: String,
    /// Link target. Link buttons are never resolved into commands.
    pub url: Option<String>,
    pub style: ButtonStyle,
}

impl Button {
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Default::default()
        }
    }
}

/// Single-choice dropdown. `command` doubles as the action identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Select {
    pub name: String,
    pub command: String,
    pub options: Vec<OptionItem>,
    pub initial_option: Option<OptionItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSelect {
    pub name: String,
    pub description: String,
    pub command: String,
    pub options: Vec<OptionItem>,
    pub initial_options: Vec<OptionItem>,
}

/// Free-text input. `command` is used as the block identifier so the typed
/// value can be appended to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelInput {
    pub command: String,
    pub text: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub header: String,
    pub text: String,
    pub buttons: Vec<Button>,
    pub selects: Vec<Select>,
    pub multi_select: Option<MultiSelect>,
    pub context: Vec<String>,
}

impl Section {
    fn has_controls(&self) -> bool {
        !self.buttons.is_empty() || !self.selects.is_empty() || self.multi_select.is_some()
    }
}

/// A response or notification ready for delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub header: String,
    pub description: String,
    pub body: Body,
    pub sections: Vec<Section>,
    pub plaintext_inputs: Vec<LabelInput>,
    /// Deliver ephemerally to the requesting user only.
    pub only_visible_for_you: bool,
    /// Replace the message the interaction came from instead of posting anew.
    pub replace_original: bool,
}

impl Message {
    /// Message with a single plain-text body.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            body: Body {
                plaintext: text.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Message wrapping `text` in a code block.
    pub fn code(text: impl Into<String>) -> Self {
        Self {
            body: Body {
                code_block: text.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn has_interactive_elements(&self) -> bool {
        !self.plaintext_inputs.is_empty() || self.sections.iter().any(Section::has_controls)
    }

    /// The message left behind once the content has moved into a file.
    ///
    /// Only plain-text inputs survive; every other control refers to content
    /// that is no longer inline.
    #[must_use]
    pub fn file_fallback(&self) -> Self {
        Self {
            plaintext_inputs: self.plaintext_inputs.clone(),
            ..Default::default()
        }
    }

    /// Render without any platform markup.
    pub fn render_plain(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();

        if !self.header.is_empty() {
            blocks.push(self.header.clone());
        }
        if !self.description.is_empty() {
            blocks.push(self.description.clone());
        }
        if !self.body.code_block.is_empty() {
            blocks.push(format!("```\n{}\n```", self.body.code_block.trim_end()));
        }
        if !self.body.plaintext.is_empty() {
            blocks.push(self.body.plaintext.clone());
        }
        for section in &self.sections {
            let mut lines: Vec<&str> = Vec::new();
            if !section.header.is_empty() {
                lines.push(&section.header);
            }
            if !section.text.is_empty() {
                lines.push(&section.text);
            }
            lines.extend(section.context.iter().map(String::as_str));
            if !lines.is_empty() {
                blocks.push(lines.join("\n"));
            }
        }
        for input in &self.plaintext_inputs {
            if !input.text.is_empty() {
                blocks.push(input.text.clone());
            }
        }

        blocks.join("\n\n")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn rich_message() -> Message {
        Message {
            message_type: MessageType::Popup,
            header: "Pods".into(),
            body: Body {
                code_block: "NAME  READY\nnginx 1/1".into(),
                ..Default::default()
            },
            sections: vec![Section {
                text: "Pick a namespace".into(),
                buttons: vec![Button::command("Describe", "@herald kubectl describe pod nginx")],
                selects: vec![Select {
                    name: "ns".into(),
                    command: "@herald kc --ns".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            plaintext_inputs: vec![LabelInput {
                command: "@herald kubectl logs nginx --filter=".into(),
                text: "Filter output".into(),
                placeholder: "regex".into(),
            }],
            only_visible_for_you: true,
            replace_original: true,
            ..Default::default()
        }
    }

    #[test]
    fn file_fallback_keeps_only_plaintext_inputs() {
        let msg = rich_message();
        let fallback = msg.file_fallback();
        assert!(fallback.sections.is_empty());
        assert!(fallback.body.code_block.is_empty());
        assert_eq!(fallback.plaintext_inputs, msg.plaintext_inputs);
        assert_eq!(fallback.message_type, MessageType::Default);
        assert!(!fallback.only_visible_for_you);
    }

    #[test]
    fn render_plain_includes_code_block_and_sections() {
        let rendered = rich_message().render_plain();
        assert!(rendered.starts_with("Pods\n\n```\nNAME  READY"));
        assert!(rendered.contains("Pick a namespace"));
        assert!(rendered.ends_with("Filter output"));
    }

    #[test]
    fn interactive_detection() {
        assert!(!Message::plain("hi").has_interactive_elements());
        assert!(rich_message().has_interactive_elements());
        assert!(rich_message().file_fallback().has_interactive_elements());
    }

    #[test]
    fn empty_message_renders_empty() {
        assert!(Message::default().render_plain().is_empty());
    }
}
