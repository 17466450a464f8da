// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only chat logs, one per conversation.
//!
//! Messages are kept in the order they reached this process and stamped with
//! a local arrival sequence number. The server's timestamps are displayed but
//! never used to reorder. A message whose server id was already seen is
//! dropped.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;
use vetdesk_core::ChatMessage;

#[derive(Default)]
struct Logs {
    conversations: HashMap<String, Vec<ChatMessage>>,
    seen: HashSet<(String, String)>,
    next_seq: u64,
}

#[derive(Clone, Default)]
pub struct ChatLog {
    logs: Arc<Mutex<Logs>>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Logs> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a message and returns its arrival sequence number, or `None`
    /// if a message with the same server id is already in the conversation.
    pub fn append(&self, mut message: ChatMessage) -> Option<u64> {
        let mut logs = self.lock();
        if let Some(id) = &message.id {
            let seen_key = (message.conversation_id.clone(), id.clone());
            if !logs.seen.insert(seen_key) {
                trace!(conversation = %message.conversation_id, id, "duplicate chat message dropped");
                return None;
            }
        }

        logs.next_seq += 1;
        let seq = logs.next_seq;
        message.arrival_seq = seq;
        logs.conversations
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message);
        Some(seq)
    }

    /// Appends a page of REST history in the order given. Returns how many were new.
    pub fn extend(&self, messages: impl IntoIterator<Item = ChatMessage>) -> usize {
        messages
            .into_iter()
            .filter_map(|message| self.append(message))
            .count()
    }

    pub fn messages(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.lock()
            .conversations
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Messages that arrived after sequence number `after`.
    pub fn messages_since(&self, conversation_id: &str, after: u64) -> Vec<ChatMessage> {
        self.lock()
            .conversations
            .get(conversation_id)
            .map(|log| {
                log.iter()
                    .filter(|m| m.arrival_seq > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn conversations(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().conversations.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self, conversation_id: &str) -> usize {
        self.lock()
            .conversations
            .get(conversation_id)
            .map_or(0, Vec::len)
    }
}
