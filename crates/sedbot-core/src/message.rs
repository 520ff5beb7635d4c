/// One chat line as retained in channel history.
///
/// Never mutated after the history store hands it out; `sequence_number` is
/// assigned at append time and strictly increases within a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub network_id: String,
    pub channel_id: String,
    pub sender: String,
    pub text: String,
    pub sequence_number: u64,
}

impl MessageEvent {
    pub fn new(
        network_id: impl Into<String>,
        channel_id: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        sequence_number: u64,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            channel_id: channel_id.into(),
            sender: sender.into(),
            text: text.into(),
            sequence_number,
        }
    }
}
