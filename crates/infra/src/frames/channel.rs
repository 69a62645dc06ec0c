//! Channel-based `SilentFrameHost`
//!
//! Forwards frame operations to whatever owns the rendering surface (a
//! webview, a headless browser) as [`FrameRequest`] messages. Navigation
//! replies travel back on a oneshot channel carrying the frame's final URL.

use async_trait::async_trait;
use richchat_core::{FrameHandle, SilentFrameHost};
use richchat_domain::{Result, RichChatError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Operation the rendering side must perform
#[derive(Debug)]
pub enum FrameRequest {
    /// Create a hidden, off-screen frame
    Create { frame: FrameHandle },
    /// Load `url` and reply with the URL the frame ends up on
    Navigate { frame: FrameHandle, url: String, reply: oneshot::Sender<Result<String>> },
    /// Detach and drop the frame
    Remove { frame: FrameHandle },
}

#[derive(Debug, Clone)]
pub struct ChannelFrameHost {
    requests: mpsc::UnboundedSender<FrameRequest>,
}

impl ChannelFrameHost {
    /// Create the host and the receiver the rendering side drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FrameRequest>) {
        let (requests, receiver) = mpsc::unbounded_channel();
        (Self { requests }, receiver)
    }

    fn send(&self, request: FrameRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| RichChatError::InvalidState("frame host is no longer running".to_string()))
    }
}

#[async_trait]
impl SilentFrameHost for ChannelFrameHost {
    async fn create_frame(&self) -> Result<FrameHandle> {
        let frame = FrameHandle::new();
        self.send(FrameRequest::Create { frame })?;
        debug!(frame = %frame.0, "Hidden frame requested");
        Ok(frame)
    }

    async fn navigate(&self, frame: FrameHandle, url: &str) -> Result<String> {
        let (reply, response) = oneshot::channel();
        self.send(FrameRequest::Navigate { frame, url: url.to_string(), reply })?;
        response.await.map_err(|_| {
            RichChatError::InvalidState("frame was dropped before loading finished".to_string())
        })?
    }

    fn remove_frame(&self, frame: FrameHandle) {
        if self.send(FrameRequest::Remove { frame }).is_err() {
            warn!(frame = %frame.0, "Frame host gone, cannot remove frame");
        }
    }
}
