//! Notification Use Cases
//!
//! Mark-viewed and dismiss for the acting user's notifications.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::NotificationId;
use crate::error::{IdentityError, IdentityResult};

pub struct MarkNotificationViewedUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> MarkNotificationViewedUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, session: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            session,
            clock,
        }
    }

    pub async fn execute(&self, notification_id: &NotificationId) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        user.mark_notification_viewed(notification_id, self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await
    }
}

pub struct DismissNotificationUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> DismissNotificationUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, session: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            session,
            clock,
        }
    }

    pub async fn execute(&self, notification_id: &NotificationId) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        user.dismiss_notification(notification_id, self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await
    }
}

// ============================================================================
// Tests
// ============================================================================
