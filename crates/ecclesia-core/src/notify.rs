//! The user-notification collaborator.

use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
  Success,
  Error,
  Info,
}

/// Fire-and-forget user notification (a toast, a status line, a log line).
pub trait Notifier: Send + Sync {
  fn notify(&self, kind: NoticeKind, message: &str);
}

/// Sends notifications to the `tracing` log; for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, kind: NoticeKind, message: &str) {
    match kind {
      NoticeKind::Error => tracing::error!(target: "ecclesia::notice", "{message}"),
      NoticeKind::Success | NoticeKind::Info => {
        tracing::info!(target: "ecclesia::notice", %kind, "{message}")
      }
    }
  }
}
