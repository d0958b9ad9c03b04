//! Profile attribute editing with staged auto-save.
//!
//! The admin pages auto-save profile edits: changes are staged as the user
//! types, and a trailing debounce commits them once typing settles. The
//! editor here makes that explicit: [`ProfileEditor::stage`] records a
//! change, [`ProfileEditor::commit`] pushes staged attributes to the profile
//! collaborator, and [`Debouncer`] is the cancellable timer that callers
//! schedule commits on. Tests exercise `commit` directly instead of relying
//! on timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::services::{Notifier, ProfileService};

/// Fallback notification when the profile cannot be loaded.
const FAILED_LOAD_PROFILE: &str = "Failed to retrieve user's profile.";
/// Notification shown after a successful profile update.
const PROFILE_UPDATED: &str = "Profile successfully updated.";
/// Fallback notification when the profile update fails.
const FAILED_UPDATE_PROFILE: &str = "Profile update failed.";

/// Editable profile attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Country of residence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Employer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<String>,
    /// Job title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Staged attributes matched the saved snapshot; nothing was sent.
    Clean,
    /// Attributes were saved and the snapshot refreshed.
    Saved,
    /// The save failed; staged attributes were reverted to the snapshot and
    /// the error surfaced through the notifier.
    Reverted,
}

/// Stages profile edits and commits them through the profile collaborator.
#[derive(Debug)]
pub struct ProfileEditor<P, N> {
    user_id: String,
    service: P,
    notifier: N,
    saved: ProfileAttributes,
    staged: ProfileAttributes,
}

impl<P, N> ProfileEditor<P, N>
where
    P: ProfileService,
    N: Notifier,
{
    /// Creates an editor for the given user. Call [`load`](Self::load) to
    /// populate the snapshot.
    #[must_use]
    pub fn new(user_id: impl Into<String>, service: P, notifier: N) -> Self {
        Self {
            user_id: user_id.into(),
            service,
            notifier,
            saved: ProfileAttributes::default(),
            staged: ProfileAttributes::default(),
        }
    }

    /// Loads the saved attributes, resetting any staged edits.
    ///
    /// On failure the prior snapshot is kept and a notification surfaced.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn load(&mut self) {
        match self.service.fetch_attributes(&self.user_id).await {
            Ok(attributes) => {
                self.saved = attributes.clone();
                self.staged = attributes;
            }
            Err(error) => self.notifier.show_error(error.message_or(FAILED_LOAD_PROFILE)),
        }
    }

    /// Stages edited attributes without sending them.
    pub fn stage(&mut self, attributes: ProfileAttributes) {
        self.staged = attributes;
    }

    /// Returns the staged attributes.
    #[must_use]
    pub fn staged(&self) -> &ProfileAttributes {
        &self.staged
    }

    /// Returns the last saved snapshot.
    #[must_use]
    pub fn saved(&self) -> &ProfileAttributes {
        &self.saved
    }

    /// Returns true when staged attributes differ from the snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.staged != self.saved
    }

    /// Commits staged attributes.
    ///
    /// A clean editor commits nothing. On success the collaborator is
    /// re-read to refresh the snapshot and an info notification is shown; on
    /// failure the staged copy reverts to the snapshot and the error
    /// surfaces through the notifier.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn commit(&mut self) -> CommitOutcome {
        if !self.is_dirty() {
            return CommitOutcome::Clean;
        }

        match self.service.set_attributes(&self.user_id, &self.staged).await {
            Ok(()) => {
                self.notifier.show_info(PROFILE_UPDATED);
                self.load().await;
                CommitOutcome::Saved
            }
            Err(error) => {
                self.staged = self.saved.clone();
                self.notifier.show_error(error.message_or(FAILED_UPDATE_PROFILE));
                CommitOutcome::Reverted
            }
        }
    }
}

/// Trailing-debounce timer with a cancellable handle.
///
/// Scheduling new work aborts the previously scheduled run, so only the
/// last change within the debounce window is committed. Dropping the
/// debouncer cancels any pending run.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with the given trailing delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Schedules `work` to run after the delay, cancelling any previously
    /// scheduled run.
    pub fn schedule<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        }));
    }

    /// Cancels the pending run, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
