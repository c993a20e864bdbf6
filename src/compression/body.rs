//! Response body that streams through a pooled gzip encoder.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame};

use crate::compression::pool::PooledEncoder;

/// Wraps a response body and gzips each data frame as it passes.
///
/// The encoder is released as soon as the stream ends or fails, and in any
/// case when the body is dropped.
pub struct GzipBody {
    inner: Body,
    encoder: Option<PooledEncoder>,
}

impl GzipBody {
    pub fn new(inner: Body, encoder: PooledEncoder) -> Self {
        Self {
            inner,
            encoder: Some(encoder),
        }
    }
}

impl HttpBody for GzipBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        loop {
            let Some(encoder) = this.encoder.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
                Some(Ok(frame)) => {
                    // trailers cannot follow a gzip stream, so only data is kept
                    let Ok(data) = frame.into_data() else {
                        continue;
                    };
                    let mut out = Vec::new();
                    if let Err(e) = encoder.write(&data, &mut out) {
                        this.encoder = None;
                        return Poll::Ready(Some(Err(axum::Error::new(e))));
                    }
                    if !out.is_empty() {
                        return Poll::Ready(Some(Ok(Frame::data(Bytes::from(out)))));
                    }
                }
                Some(Err(e)) => {
                    this.encoder = None;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    let mut out = Vec::new();
                    let finished = encoder.finish(&mut out);
                    this.encoder = None;
                    return Poll::Ready(Some(match finished {
                        Ok(()) => Ok(Frame::data(Bytes::from(out))),
                        Err(e) => Err(axum::Error::new(e)),
                    }));
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.encoder.is_none()
    }
}
