//! Translation of interactive callbacks (button clicks, select changes, text
//! inputs, modal submissions) into generic commands.

use {
    herald_common::{GenericCommand, Origin},
    serde::{Deserialize, Serialize},
};

use crate::delivery::ReplyContext;

/// Action IDs of link buttons carry this prefix. Clicking one only opens the
/// URL; there is no command behind it.
pub const URL_BUTTON_ACTION_ID_PREFIX: &str = "url:";

/// A single interactive element's state, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionPayload {
    Button {
        action_id: String,
        block_id: String,
        value: String,
    },
    StaticSelect {
        action_id: String,
        block_id: String,
        selected: String,
    },
    MultiStaticSelect {
        action_id: String,
        block_id: String,
        selected: Vec<String>,
    },
    PlainTextInput {
        action_id: String,
        block_id: String,
        value: String,
    },
    /// Element kinds the resolver does not know; the raw value is forwarded.
    Other {
        kind: String,
        action_id: String,
        block_id: String,
        value: String,
    },
}

impl InteractionPayload {
    pub fn action_id(&self) -> &str {
        match self {
            Self::Button { action_id, .. }
            | Self::StaticSelect { action_id, .. }
            | Self::MultiStaticSelect { action_id, .. }
            | Self::PlainTextInput { action_id, .. }
            | Self::Other { action_id, .. } => action_id,
        }
    }

    pub fn block_id(&self) -> &str {
        match self {
            Self::Button { block_id, .. }
            | Self::StaticSelect { block_id, .. }
            | Self::MultiStaticSelect { block_id, .. }
            | Self::PlainTextInput { block_id, .. }
            | Self::Other { block_id, .. } => block_id,
        }
    }

    /// Link buttons open a URL client-side and run nothing.
    pub fn is_link(&self) -> bool {
        self.action_id().starts_with(URL_BUTTON_ACTION_ID_PREFIX)
    }
}

/// Element state in the platform's wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub action_id: String,
    pub block_id: String,
    pub value: String,
    pub selected_option: Option<SelectedOption>,
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectedOption {
    pub value: String,
}

impl From<BlockAction> for InteractionPayload {
    fn from(a: BlockAction) -> Self {
        let BlockAction {
            kind,
            action_id,
            block_id,
            value,
            selected_option,
            selected_options,
        } = a;
        match kind.as_str() {
            "button" => Self::Button {
                action_id,
                block_id,
                value,
            },
            "static_select" => Self::StaticSelect {
                action_id,
                block_id,
                selected: selected_option.map(|o| o.value).unwrap_or_default(),
            },
            "multi_static_select" => Self::MultiStaticSelect {
                action_id,
                block_id,
                selected: selected_options.into_iter().map(|o| o.value).collect(),
            },
            "plain_text_input" => Self::PlainTextInput {
                action_id,
                block_id,
                value,
            },
            _ => Self::Other {
                kind,
                action_id,
                block_id,
                value,
            },
        }
    }
}

/// Map one element's state to the command it stands for.
pub fn resolve(payload: &InteractionPayload) -> GenericCommand {
    match payload {
        InteractionPayload::Button { value, .. } => {
            GenericCommand::new(value.clone(), Origin::ButtonClick)
        },
        InteractionPayload::StaticSelect {
            action_id,
            selected,
            ..
        } => GenericCommand::new(format!("{action_id} {selected}"), Origin::SelectChange),
        InteractionPayload::MultiStaticSelect {
            action_id,
            selected,
            ..
        } => GenericCommand::new(
            format!("{action_id} {}", selected.join(",")),
            Origin::MultiSelectChange,
        ),
        InteractionPayload::PlainTextInput {
            block_id, value, ..
        } => GenericCommand::new(
            format!("{block_id}{}", quote(value.trim())),
            Origin::PlainTextInput,
        ),
        InteractionPayload::Other { value, .. } => {
            GenericCommand::new(value.clone(), Origin::Unknown)
        },
    }
}

/// Double-quote `s`, escaping quotes, backslashes and control characters.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A block-actions callback: someone touched an element of a posted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockActionsCallback {
    /// Empty when the interaction happened inside a modal.
    pub channel_id: String,
    pub view_id: String,
    pub user_id: String,
    pub trigger_id: String,
    pub response_url: String,
    /// Timestamp of the message holding the element.
    pub message_ts: String,
    /// Set when that message lives inside a thread.
    pub thread_ts: String,
    pub actions: Vec<InteractionPayload>,
}

/// A modal submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSubmission {
    /// Channel the modal was opened for.
    pub private_metadata: String,
    pub user_id: String,
    /// Submitted element states, in block order.
    pub values: Vec<InteractionPayload>,
}

/// Command resolved from an interaction, and where to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInteraction {
    pub command: GenericCommand,
    pub reply: ReplyContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The callback must carry exactly one action.
    ActionCount(usize),
    /// Changes inside an open modal are collected on submission instead.
    ActiveModal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Skipped(SkipReason),
    /// A link button; report it, run nothing.
    Link { action_id: String },
    Command(ResolvedInteraction),
}

/// Classify a block-actions callback and resolve its command.
pub fn resolve_block_actions(callback: &BlockActionsCallback) -> Resolution {
    let [action] = callback.actions.as_slice() else {
        return Resolution::Skipped(SkipReason::ActionCount(callback.actions.len()));
    };

    if action.is_link() {
        return Resolution::Link {
            action_id: action.action_id().to_string(),
        };
    }

    if callback.channel_id.is_empty() && !callback.view_id.is_empty() {
        return Resolution::Skipped(SkipReason::ActiveModal);
    }

    let thread_ts = non_empty(&callback.thread_ts).or_else(|| non_empty(&callback.message_ts));
    Resolution::Command(ResolvedInteraction {
        command: resolve(action),
        reply: ReplyContext {
            channel: callback.channel_id.clone(),
            user: non_empty(&callback.user_id),
            thread_ts,
            trigger_id: non_empty(&callback.trigger_id),
            response_url: non_empty(&callback.response_url),
        },
    })
}

/// Resolve every submitted value; answers go to the modal's channel.
pub fn resolve_view_submission(submission: &ViewSubmission) -> Vec<ResolvedInteraction> {
    submission
        .values
        .iter()
        .map(|value| ResolvedInteraction {
            command: resolve(value),
            reply: ReplyContext {
                channel: submission.private_metadata.clone(),
                user: non_empty(&submission.user_id),
                ..Default::default()
            },
        })
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
