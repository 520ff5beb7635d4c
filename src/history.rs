use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::MessageEvent;

/// Default number of messages retained per channel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// A channel's identity: channel names are only unique within a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub network: String,
    pub channel: String,
}

impl ChannelKey {
    pub fn new(network: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            channel: channel.into(),
        }
    }
}

#[derive(Debug, Default)]
struct ChannelLog {
    next_sequence: u64,
    entries: VecDeque<MessageEvent>,
}

/// Bounded per-channel log of recent messages.
///
/// Appends and reads may come from any thread. Each append is applied under the
/// write lock, so readers see either all of it or none of it.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    channels: RwLock<HashMap<ChannelKey, ChannelLog>>,
}

impl HistoryStore {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Append a message, assigning the channel's next sequence number and
    /// evicting the oldest entry once the window is full.
    pub fn append(&self, channel: &ChannelKey, sender: &str, text: &str) -> MessageEvent {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let log = channels.entry(channel.clone()).or_default();

        let event = MessageEvent::new(
            channel.network.as_str(),
            channel.channel.as_str(),
            sender,
            text,
            log.next_sequence,
        );
        log.next_sequence += 1;
        log.entries.push_back(event.clone());

        while log.entries.len() > self.capacity {
            if let Some(evicted) = log.entries.pop_front() {
                trace!(channel = %channel.channel, seq = evicted.sequence_number, "evicted history entry");
            }
        }
        trace!(channel = %channel.channel, seq = event.sequence_number, sender, "appended history entry");
        event
    }

    /// The retained window, oldest first.
    pub fn recent(&self, channel: &ChannelKey) -> Vec<MessageEvent> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(channel)
            .map(|log| log.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The retained window filtered to one author, oldest first.
    pub fn recent_from_sender(&self, channel: &ChannelKey, sender: &str) -> Vec<MessageEvent> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(channel)
            .map(|log| {
                log.entries
                    .iter()
                    .filter(|ev| ev.sender == sender)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The retained window without one author's messages, oldest first.
    pub fn recent_from_others(&self, channel: &ChannelKey, sender: &str) -> Vec<MessageEvent> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(channel)
            .map(|log| {
                log.entries
                    .iter()
                    .filter(|ev| ev.sender != sender)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self, channel: &ChannelKey) -> usize {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels.get(channel).map_or(0, |log| log.entries.len())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ChannelKey {
        ChannelKey::new("freenode", "#test")
    }

    #[test]
    fn append_assigns_increasing_sequence_numbers() {
        let store = HistoryStore::new(10);
        let a = store.append(&key(), "melwil", "one");
        let b = store.append(&key(), "melwil", "two");
        assert_eq!(a.sequence_number, 0);
        assert_eq!(b.sequence_number, 1);
        assert_eq!(b.channel_id, "#test");
        assert_eq!(b.network_id, "freenode");
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let store = HistoryStore::new(3);
        for i in 0..5 {
            store.append(&key(), "u", &format!("msg {i}"));
        }
        let texts: Vec<String> = store.recent(&key()).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["msg 2", "msg 3", "msg 4"]);
        let seqs: Vec<u64> = store.recent(&key()).iter().map(|e| e.sequence_number).collect();
        assert_eq!(seqs, vec![2, 3, 4]);
    }

    #[test]
    fn channels_and_networks_are_separate() {
        let store = HistoryStore::new(10);
        store.append(&key(), "u", "here");
        store.append(&ChannelKey::new("freenode", "#other"), "u", "there");
        store.append(&ChannelKey::new("efnet", "#test"), "u", "elsewhere");
        assert_eq!(store.len(&key()), 1);
        assert_eq!(store.recent(&key())[0].text, "here");
        assert_eq!(store.len(&ChannelKey::new("freenode", "#nobody")), 0);
    }

    #[test]
    fn sender_filter_preserves_order() {
        let store = HistoryStore::new(10);
        store.append(&key(), "a", "1");
        store.append(&key(), "b", "2");
        store.append(&key(), "a", "3");
        let texts: Vec<String> = store
            .recent_from_sender(&key(), "a")
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["1", "3"]);
    }

    #[test]
    fn others_filter_drops_one_author() {
        let store = HistoryStore::new(10);
        store.append(&key(), "a", "1");
        store.append(&key(), "b", "2");
        store.append(&key(), "a", "3");
        store.append(&key(), "c", "4");
        let texts: Vec<String> = store
            .recent_from_others(&key(), "a")
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["2", "4"]);
        assert!(store.recent_from_others(&ChannelKey::new("efnet", "#x"), "a").is_empty());
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let store = HistoryStore::new(0);
        store.append(&key(), "u", "a");
        store.append(&key(), "u", "b");
        assert_eq!(store.len(&key()), 1);
        assert_eq!(store.recent(&key())[0].text, "b");
    }
}
