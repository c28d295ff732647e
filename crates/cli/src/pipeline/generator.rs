//! Synthetic message source for load runs.

use contracts::{Message, MessageType};

use crate::error::CliError;

/// Produces `count` messages cycling through `mix`
#[derive(Debug, Clone)]
pub struct MessageGenerator {
    count: u64,
    mix: Vec<MessageType>,
}

impl MessageGenerator {
    pub fn new(count: u64, mix: Vec<MessageType>) -> Self {
        let mix = if mix.is_empty() {
            vec![MessageType::Otp]
        } else {
            mix
        };
        Self { count, mix }
    }

    /// Parse `--mix` entries (`otp`, `new_matches`, `accept`)
    pub fn parse_mix(entries: &[String]) -> Result<Vec<MessageType>, CliError> {
        entries
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<MessageType>()
                    .map_err(|e| CliError::invalid_mix(s, e.to_string()))
            })
            .collect()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mix(&self) -> &[MessageType] {
        &self.mix
    }

    /// Message number `i`
    pub fn message(&self, i: u64) -> Message {
        let message_type = self.mix[(i % self.mix.len() as u64) as usize];
        Message::new(
            i,
            message_type,
            format!("{} have you gone nuts. this might work though.", i),
            i.to_string(),
        )
    }

    pub fn messages(&self) -> impl Iterator<Item = Message> + '_ {
        (0..self.count).map(|i| self.message(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_cycle_through_mix() {
        let generator = MessageGenerator::new(4, vec![MessageType::Otp, MessageType::Accept]);
        let types: Vec<_> = generator.messages().map(|m| m.message_type).collect();
        assert_eq!(
            types,
            vec![
                MessageType::Otp,
                MessageType::Accept,
                MessageType::Otp,
                MessageType::Accept
            ]
        );
    }

    #[test]
    fn test_message_payload() {
        let generator = MessageGenerator::new(10, vec![]);
        let msg = generator.message(7);
        assert_eq!(msg.id, 7);
        assert_eq!(msg.message_type, MessageType::Otp);
        assert_eq!(msg.recipient, "7");
        assert_eq!(msg.text, "7 have you gone nuts. this might work though.");
    }

    #[test]
    fn test_parse_mix() {
        let mix = MessageGenerator::parse_mix(&[
            "otp".to_string(),
            " new_matches ".to_string(),
            "".to_string(),
        ])
        .unwrap();
        assert_eq!(mix, vec![MessageType::Otp, MessageType::NewMatches]);

        let err = MessageGenerator::parse_mix(&["sms".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidMix { .. }));
    }
}
