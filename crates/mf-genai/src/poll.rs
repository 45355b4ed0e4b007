//! Long-running operation poller.
//!
//! A fixed-interval loop with no timeout: video jobs legitimately run for
//! minutes, so the contract is instead that every iteration surfaces a
//! progress tick the caller can turn into a visible status message. The poll
//! future is a parameter, which keeps the timing testable under
//! `tokio::time::pause`.

use std::future::Future;
use std::time::Duration;

use mf_core::{Error, Result};

use crate::client::GenAiClient;
use crate::video::{OperationHandle, VideoOperation};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct VideoPoller {
    pub interval: Duration,
}

impl Default for VideoPoller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl VideoPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Repeatedly invoke `poll` until the operation reports done.
    ///
    /// `on_tick` fires once per waiting iteration (with the iteration count)
    /// before the next sleep, so callers can refresh their status message
    /// and the job never looks hung.
    pub async fn poll_until_done<P, Fut>(
        &self,
        mut poll: P,
        mut on_tick: impl FnMut(u32),
    ) -> Result<VideoOperation>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<VideoOperation>>,
    {
        let mut iteration = 0u32;
        loop {
            let operation = poll().await?;
            if operation.done {
                return Ok(operation);
            }
            iteration += 1;
            on_tick(iteration);
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Poll a submitted video job to completion and return the asset URI.
    pub async fn wait_for_video(
        &self,
        client: &GenAiClient,
        handle: &OperationHandle,
        mut on_status: impl FnMut(&str),
    ) -> Result<String> {
        on_status("Đang tạo video (có thể mất vài phút)...");
        let operation = self
            .poll_until_done(
                || client.get_video_operation(handle),
                |_| on_status("Đang tạo video (có thể mất vài phút)..."),
            )
            .await?;
        operation
            .uri
            .ok_or_else(|| Error::MalformedResponse("Không tìm thấy link tải video trong phản hồi.".into()))
    }
}
