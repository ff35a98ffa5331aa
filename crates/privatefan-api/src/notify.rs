//! The notification emitter.
//!
//! Emission runs after the triggering write has succeeded and never fails
//! it: store errors are logged and dropped. Every write is followed by a
//! prune so each recipient keeps at most `notification_retention` entries.

use std::collections::BTreeSet;

use privatefan_core::{notification::NewNotification, store::PlatformStore};

use crate::ApiState;

/// Write `notifications`, then trim each recipient's list.
pub async fn emit<S>(state: &ApiState<S>, notifications: Vec<NewNotification>)
where
  S: PlatformStore,
{
  if notifications.is_empty() {
    return;
  }
  let recipients: BTreeSet<String> =
    notifications.iter().map(|n| n.recipient_email.clone()).collect();

  match state.store.add_notifications(notifications).await {
    Ok(written) => tracing::debug!(written, "notifications emitted"),
    Err(e) => {
      tracing::warn!(error = %e, "failed to write notifications");
      return;
    }
  }

  for recipient in &recipients {
    prune(state, recipient).await;
  }
}

/// Write `notification` unless an identical like notification already
/// exists.
pub async fn emit_once<S>(state: &ApiState<S>, notification: NewNotification)
where
  S: PlatformStore,
{
  let recipient = notification.recipient_email.clone();
  match state.store.add_notification_once(notification).await {
    Ok(true) => prune(state, &recipient).await,
    Ok(false) => tracing::debug!(%recipient, "duplicate notification suppressed"),
    Err(e) => tracing::warn!(error = %e, %recipient, "failed to write notification"),
  }
}

async fn prune<S>(state: &ApiState<S>, recipient: &str)
where
  S: PlatformStore,
{
  let keep = state.settings.notification_retention;
  if let Err(e) = state.store.prune_notifications(recipient, keep).await {
    tracing::warn!(error = %e, %recipient, "failed to prune notifications");
  }
}
