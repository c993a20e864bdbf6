//! Response capture.
//!
//! Wraps an outgoing response so the final status and the number of body
//! bytes actually handed to the connection can be reported once the
//! response is complete.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

/// What was sent for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub status: StatusCode,
    pub bytes: u64,
    /// False when the body errored or was dropped before its end.
    pub completed: bool,
}

type OnComplete = Box<dyn FnOnce(CaptureSummary) + Send + 'static>;

/// Body wrapper that counts bytes and reports exactly once.
pub struct CaptureBody {
    inner: Body,
    status: StatusCode,
    bytes: u64,
    on_complete: Option<OnComplete>,
}

impl CaptureBody {
    fn report(&mut self, completed: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(CaptureSummary {
                status: self.status,
                bytes: self.bytes,
                completed,
            });
        }
    }
}

/// Wrap `response` so that `on_complete` runs when its body finishes,
/// fails, or is dropped.
pub fn capture<F>(response: Response, on_complete: F) -> Response
where
    F: FnOnce(CaptureSummary) + Send + 'static,
{
    let (parts, inner) = response.into_parts();
    let body = CaptureBody {
        inner,
        status: parts.status,
        bytes: 0,
        on_complete: Some(Box::new(on_complete)),
    };
    Response::from_parts(parts, Body::new(body))
}

impl HttpBody for CaptureBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = ready!(Pin::new(&mut this.inner).poll_frame(cx));
        match &polled {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.len() as u64;
                }
            }
            Some(Err(_)) => this.report(false),
            None => this.report(true),
        }
        Poll::Ready(polled)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CaptureBody {
    fn drop(&mut self) {
        let completed = self.inner.is_end_stream();
        self.report(completed);
    }
}
