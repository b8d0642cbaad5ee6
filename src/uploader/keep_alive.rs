use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::media::ChatId;

use super::transport::{ChatActivity, Transport};

/// Interval the Bot API keeps a chat action visible for
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Background task repeating a chat activity until stopped.
///
/// After `stop()` returns no further activity is sent. Dropping the handle
/// without stopping cancels the task but does not wait for it.
pub struct KeepAlive {
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
    chat: ChatId,
    activity: ChatActivity,
}

impl KeepAlive {
    /// Send `activity` right away, then every `every` until stopped
    pub fn start(
        transport: Arc<dyn Transport>,
        chat: ChatId,
        activity: ChatActivity,
        every: Duration,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let task = tokio::spawn(async move {
            send_activity(transport.as_ref(), chat, activity).await;

            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if token.is_cancelled() {
                            break;
                        }
                        send_activity(transport.as_ref(), chat, activity).await;
                    }
                }
            }
        });

        log::debug!("Keep-alive started for chat {} ({})", chat, activity.as_str());

        Self {
            cancel_token,
            task: Some(task),
            chat,
            activity,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }

    /// Stop the signaler and wait for an in-flight emission to finish.
    /// Safe to call any number of times.
    pub async fn stop(&mut self) {
        self.cancel_token.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Keep-alive task for chat {} ended abnormally: {}", self.chat, e);
            }
            log::debug!(
                "Keep-alive stopped for chat {} ({})",
                self.chat,
                self.activity.as_str()
            );
        }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn send_activity(transport: &dyn Transport, chat: ChatId, activity: ChatActivity) {
    if let Err(e) = transport.send_activity(chat, activity).await {
        log::debug!(
            "Activity {} for chat {} not delivered (non-critical): {}",
            activity.as_str(),
            chat,
            e
        );
    }
}
