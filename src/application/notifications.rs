use std::collections::VecDeque;

/// Most notifications shown at once; the oldest is evicted beyond this.
pub const MAX_NOTIFICATIONS: usize = 3;

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Default)]
pub struct NotificationStack {
    items: VecDeque<Notification>,
    next_id: NotificationId,
}

impl NotificationStack {
    /// Returns the new id and, if the stack was full, the id that was evicted.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> (NotificationId, Option<NotificationId>) {
        let evicted = if self.items.len() >= MAX_NOTIFICATIONS {
            self.items.pop_front().map(|n| n.id)
        } else {
            None
        };

        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notification {
            id,
            message: message.into(),
            kind,
        });

        (id, evicted)
    }

    pub fn remove(&mut self, id: NotificationId) -> bool {
        match self.items.iter().position(|n| n.id == id) {
            Some(index) => self.items.remove(index).is_some(),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}
