// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The notification center behind the badge.
//!
//! Holds notifications newest-first, caps how many are retained, and
//! publishes the unread count over a `watch` channel so the badge can
//! re-render without polling. A second channel carries a revision counter
//! bumped on every change to the list, including ones that leave the
//! unread count as it was.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;
use vetdesk_config::model::NotificationsConfig;
use vetdesk_core::Notification;

struct Inner {
    items: Mutex<VecDeque<Notification>>,
    max_retained: usize,
    unread: watch::Sender<usize>,
    revision: watch::Sender<u64>,
}

/// Process-wide notification list. Clones share state.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new(max_retained: usize) -> Self {
        let (unread, _) = watch::channel(0);
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::new()),
                max_retained: max_retained.max(1),
                unread,
                revision,
            }),
        }
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self::new(config.max_retained)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.inner.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bumps the revision, then recounts unread items and notifies badge
    /// subscribers if the count changed.
    fn publish(&self, items: &VecDeque<Notification>) {
        self.inner.revision.send_modify(|revision| *revision += 1);
        let unread = items.iter().filter(|n| !n.read).count();
        self.inner.unread.send_if_modified(|current| {
            let changed = *current != unread;
            *current = unread;
            changed
        });
    }

    fn trim(&self, items: &mut VecDeque<Notification>) {
        while items.len() > self.inner.max_retained {
            if let Some(dropped) = items.pop_back() {
                debug!(id = %dropped.id, "notification dropped by retention cap");
            }
        }
    }

    /// Adds a notification at the top. Returns `false` if one with the same id is already held.
    pub fn push(&self, notification: Notification) -> bool {
        let mut items = self.lock();
        if items.iter().any(|n| n.id == notification.id) {
            debug!(id = %notification.id, "duplicate notification ignored");
            return false;
        }
        items.push_front(notification);
        self.trim(&mut items);
        self.publish(&items);
        true
    }

    /// Merges a list fetched over REST. Server copies replace local ones with
    /// the same id; the result is re-sorted newest-first. Returns how many
    /// were new.
    pub fn sync(&self, fetched: Vec<Notification>) -> usize {
        let mut items = self.lock();
        let mut added = 0;
        for notification in fetched {
            match items.iter_mut().find(|n| n.id == notification.id) {
                Some(existing) => *existing = notification,
                None => {
                    items.push_back(notification);
                    added += 1;
                }
            }
        }
        items
            .make_contiguous()
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.trim(&mut items);
        self.publish(&items);
        added
    }

    /// Newest first.
    pub fn list(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.lock().iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        *self.inner.unread.borrow()
    }

    /// Receiver that changes whenever the unread count does.
    pub fn subscribe_unread(&self) -> watch::Receiver<usize> {
        self.inner.unread.subscribe()
    }

    /// Receiver that changes whenever the held list does: pushes, syncs,
    /// reads, dismissals and retention evictions.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Returns `false` for unknown ids and for notifications already read.
    pub fn mark_read(&self, id: &str) -> bool {
        let mut items = self.lock();
        let changed = match items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        };
        if changed {
            self.publish(&items);
        }
        changed
    }

    /// Returns how many were unread.
    pub fn mark_all_read(&self) -> usize {
        let mut items = self.lock();
        let mut changed = 0;
        for n in items.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.publish(&items);
        }
        changed
    }

    pub fn dismiss(&self, id: &str) -> Option<Notification> {
        let mut items = self.lock();
        let index = items.iter().position(|n| n.id == id)?;
        let removed = items.remove(index);
        self.publish(&items);
        removed
    }

    pub fn clear(&self) {
        let mut items = self.lock();
        items.clear();
        self.publish(&items);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn notification(id: &str, minute: u32) -> Notification {
        Notification {
            id: id.to_string(),
            title: format!("Notice {id}"),
            message: "Something happened".to_string(),
            read: false,
            appointment_id: None,
            entity_id: None,
            kind: "general".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn newest_first_with_duplicates_ignored() {
        let center = NotificationCenter::new(10);
        assert!(center.push(notification("a", 1)));
        assert!(center.push(notification("b", 2)));
        assert!(!center.push(notification("a", 1)));

        let ids: Vec<_> = center.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn retention_cap_drops_oldest() {
        let center = NotificationCenter::new(2);
        center.push(notification("a", 1));
        center.push(notification("b", 2));
        center.push(notification("c", 3));

        assert_eq!(center.len(), 2);
        assert!(center.get("a").is_none());
    }

    #[tokio::test]
    async fn badge_follows_unread_count() {
        let center = NotificationCenter::new(10);
        let mut badge = center.subscribe_unread();

        center.push(notification("a", 1));
        center.push(notification("b", 2));
        badge.changed().await.unwrap();
        assert_eq!(*badge.borrow_and_update(), 2);

        assert!(center.mark_read("a"));
        assert!(!center.mark_read("a"));
        assert!(!center.mark_read("missing"));
        badge.changed().await.unwrap();
        assert_eq!(*badge.borrow_and_update(), 1);

        assert_eq!(center.mark_all_read(), 1);
        assert_eq!(center.unread_count(), 0);
        assert!(center.dismiss("b").is_some());
        assert!(center.dismiss("b").is_none());
    }

    #[tokio::test]
    async fn push_at_capacity_signals_a_change_with_steady_unread_count() {
        let center = NotificationCenter::new(1);
        center.push(notification("a", 1));
        let mut changes = center.subscribe_changes();
        let badge = center.subscribe_unread();

        assert!(center.push(notification("b", 2)));

        assert!(changes.has_changed().unwrap());
        changes.changed().await.unwrap();
        assert!(!badge.has_changed().unwrap());
        assert_eq!(center.unread_count(), 1);
        let ids: Vec<_> = center.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn duplicate_push_does_not_signal_a_change() {
        let center = NotificationCenter::new(5);
        center.push(notification("a", 1));
        let changes = center.subscribe_changes();
        assert!(!center.push(notification("a", 1)));
        assert_eq!(center.mark_all_read(), 1);
        assert!(changes.has_changed().unwrap());

        let changes = center.subscribe_changes();
        assert_eq!(center.mark_all_read(), 0);
        assert!(!changes.has_changed().unwrap());
    }

    #[test]
    fn sync_merges_server_state() {
        let center = NotificationCenter::new(10);
        center.push(notification("a", 5));

        let mut read_a = notification("a", 5);
        read_a.read = true;
        let added = center.sync(vec![read_a, notification("z", 1), notification("m", 9)]);

        assert_eq!(added, 2);
        let ids: Vec<_> = center.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["m", "a", "z"]);
        assert_eq!(center.unread_count(), 2);
    }
}
