// ── Supersedable delayed tasks ──
//
// Each `schedule` cancels the previously pending task before arming its own
// timer, so in a burst only the last request ever runs. The task receives
// its token: it may still be superseded after the quiet period, while it
// waits for a lock, and must check before mutating anything.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Supersede any pending task and run `task` after the quiet period.
    ///
    /// The handle resolves to `true` when the task ran, `false` when it was
    /// superseded during the delay.
    pub async fn schedule<F, Fut>(&self, task: F) -> JoinHandle<bool>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.supersede().await;
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    trace!("debounced task superseded");
                    false
                }
                () = tokio::time::sleep(delay) => {
                    task(token).await;
                    true
                }
            }
        })
    }

    /// Cancel the pending task, if any, and hand out a fresh token for the
    /// caller's own request.
    pub async fn supersede(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut pending = self.pending.lock().await;
        pending.cancel();
        *pending = token.clone();
        token
    }
}
