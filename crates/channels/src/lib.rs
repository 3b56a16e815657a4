//! Channel-side core of the bot.
//!
//! - [`registry`]: configured channels and their live notification flags.
//! - [`interaction`]: interactive callbacks resolved into generic commands.
//! - [`delivery`]: bounded fan-out through a [`DeliveryAdapter`].
//! - [`plugin`]: traits implemented by platform adapters and executors.

pub mod delivery;
pub mod error;
pub mod interaction;
pub mod plugin;
pub mod registry;

pub use {
    delivery::{DeliveryOrchestrator, ReplyContext},
    error::{DeliveryErrors, DeliveryFailure, Error, Result},
    interaction::{
        BlockActionsCallback, InteractionPayload, Resolution, ResolvedInteraction, ViewSubmission,
        resolve, resolve_block_actions, resolve_view_submission,
    },
    plugin::{
        AnalyticsReporter, Conversation, DeliveryAdapter, DeliveryId, Executor, FileRef,
        ModalView, NoopReporter, NotifierHandler, PostOptions,
    },
    registry::{ChannelConfig, ChannelMap, ChannelRegistry},
};
