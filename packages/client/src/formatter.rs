//! Message formatting utilities for client display.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::domain::ConnectionStatus;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the join acknowledgment
    ///
    /// # Arguments
    ///
    /// * `room_id` - The room that was joined
    /// * `participants` - Participant count including this client
    ///
    /// # Returns
    ///
    /// A formatted string with the room banner
    pub fn format_room_joined(room_id: &str, participants: usize) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Room: {}\n", room_id));
        output.push_str(&format!("Participants: {}\n", participants));
        output.push_str("============================================================\n");
        output
    }

    /// Format a user-joined notification
    ///
    /// # Arguments
    ///
    /// * `user_name` - Display name of the user who joined
    /// * `participants` - Participant count after the join
    /// * `received_at` - Local time the notification arrived
    pub fn format_user_joined(
        user_name: &str,
        participants: usize,
        received_at: DateTime<Local>,
    ) -> String {
        format!(
            "\n+ {} entered at {} ({} participant(s))\n",
            user_name,
            Self::format_time(received_at),
            participants
        )
    }

    /// Format a user-left notification
    ///
    /// # Arguments
    ///
    /// * `user_name` - Display name of the user who left
    /// * `participants` - Participant count after the leave
    /// * `received_at` - Local time the notification arrived
    pub fn format_user_left(
        user_name: &str,
        participants: usize,
        received_at: DateTime<Local>,
    ) -> String {
        format!(
            "\n- {} left at {} ({} participant(s))\n",
            user_name,
            Self::format_time(received_at),
            participants
        )
    }

    /// Format a relayed broadcast
    ///
    /// String payloads are shown as-is, any other JSON value in compact form.
    pub fn format_broadcast(from: &str, data: &Value, received_at: DateTime<Local>) -> String {
        let content = match data {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             received at {}\n\
             ------------------------------------------------------------\n",
            from,
            content,
            Self::format_time(received_at)
        )
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: DateTime<Local>) -> String {
        format!("sent at {}\n", Self::format_time(sent_at))
    }

    /// Format a notice for input dropped while disconnected
    pub fn format_not_connected() -> String {
        "(not connected, message dropped)\n".to_string()
    }

    /// Format a connection status change
    pub fn format_status(status: ConnectionStatus) -> String {
        match status {
            ConnectionStatus::Connecting => "\n… connecting\n".to_string(),
            ConnectionStatus::Connected => "\n● connected\n".to_string(),
            ConnectionStatus::Disconnected => "\n○ disconnected, reconnecting\n".to_string(),
        }
    }

    fn format_time(at: DateTime<Local>) -> String {
        at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
