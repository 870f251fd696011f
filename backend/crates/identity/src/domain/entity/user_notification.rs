//! User Notification Entity
//!
//! A per-user notice with viewed/dismissed markers. Content delivery is
//! outside the core; only the lifecycle markers live here.

use crate::domain::value_object::ids::NotificationId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotification {
    id: NotificationId,
    when_created: DateTime<Utc>,
    when_viewed: Option<DateTime<Utc>>,
    when_dismissed: Option<DateTime<Utc>>,
}

impl UserNotification {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            when_created: now,
            when_viewed: None,
            when_dismissed: None,
        }
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn is_viewed(&self) -> bool {
        self.when_viewed.is_some()
    }

    pub fn is_dismissed(&self) -> bool {
        self.when_dismissed.is_some()
    }

    /// Idempotent: the first view timestamp is kept
    pub(crate) fn mark_viewed(&mut self, now: DateTime<Utc>) {
        if self.when_viewed.is_none() {
            self.when_viewed = Some(now);
        }
    }

    pub(crate) fn dismiss(&mut self, now: DateTime<Utc>) {
        if self.when_dismissed.is_none() {
            self.when_dismissed = Some(now);
        }
    }
}
