use tracing::{debug, info};

use crate::config::SedConfig;
use crate::history::{ChannelKey, HistoryStore};
use crate::{parse_command, CommandKind, MessageEvent, Substituter};

/// One inbound chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub network: String,
    pub channel: String,
    pub sender: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(
        network: impl Into<String>,
        channel: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            network: network.into(),
            channel: channel.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }

    pub fn channel_key(&self) -> ChannelKey {
        ChannelKey::new(self.network.as_str(), self.channel.as_str())
    }
}

/// Events a host delivers to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Connect { network: String },
    Disconnect { network: String },
    Message(ChatMessage),
}

/// A line to send back to the channel the command came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub network: String,
    pub channel: String,
    pub text: String,
}

/// History and the substitution engine behind one entry point.
///
/// `Bot` is `Sync`; hosts may deliver messages from several threads at once.
#[derive(Debug)]
pub struct Bot {
    config: SedConfig,
    history: HistoryStore,
    engine: Substituter,
}

impl Bot {
    pub fn new(config: SedConfig) -> Self {
        Self {
            history: HistoryStore::new(config.history_capacity),
            engine: Substituter::new(config.max_output_length),
            config,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Store a message verbatim in its channel's history. Commands included.
    pub fn record(&self, message: &ChatMessage) -> MessageEvent {
        self.history
            .append(&message.channel_key(), &message.sender, &message.text)
    }

    /// Evaluate `message` as a command against the channel's history.
    ///
    /// `s` searches the author's own messages. `troll`, when meta-rewrite is
    /// enabled, searches everyone else's. `None` when the text is not a command,
    /// or the command failed silently.
    pub fn try_evaluate_command(&self, message: &ChatMessage) -> Option<String> {
        let command = parse_command(&message.text).ok()?;
        let channel = message.channel_key();
        let history = match command.kind {
            CommandKind::Substitute => self.history.recent_from_sender(&channel, &message.sender),
            CommandKind::Troll if self.config.meta_rewrite.enabled => {
                self.history.recent_from_others(&channel, &message.sender)
            }
            CommandKind::Troll => {
                debug!(sender = %message.sender, "troll command with meta-rewrite disabled");
                return None;
            }
        };
        self.engine.evaluate(&command.request, &history)
    }

    /// Record then evaluate; the reply, if any, goes to the message's channel.
    pub fn handle_message(&self, message: &ChatMessage) -> Option<Reply> {
        self.record(message);
        let text = self.try_evaluate_command(message)?;
        Some(Reply {
            network: message.network.clone(),
            channel: message.channel.clone(),
            text,
        })
    }

    pub fn handle_event(&self, event: &ChatEvent) -> Option<Reply> {
        match event {
            ChatEvent::Connect { network } => {
                info!(network = %network, "connected");
                None
            }
            ChatEvent::Disconnect { network } => {
                info!(network = %network, "disconnected");
                None
            }
            ChatEvent::Message(message) => self.handle_message(message),
        }
    }
}

impl Default for Bot {
    fn default() -> Self {
        Self::new(SedConfig::default())
    }
}
