use std::thread;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use futures_util::stream;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::capture::{Capture, CaptureFactory};
use crate::encoder::FrameEncoder;

/// Multipart boundary token; viewers key on this in the content type.
pub const BOUNDARY: &str = "frame";

/// Nap length while the rate gate holds the loop back.
const GATE_POLL: Duration = Duration::from_millis(1);

/// True when enough time has passed since the last emitted frame.
/// Equality counts as due; a session that has never emitted is always due.
fn should_emit(now: Instant, last_emit: Option<Instant>, interval: Duration) -> bool {
    match last_emit {
        Some(last) => now.duration_since(last) >= interval,
        None => true,
    }
}

/// Wraps one encoded frame in its self-delimiting multipart record.
fn frame_record(jpeg: &[u8]) -> Bytes {
    let mut record = Vec::with_capacity(jpeg.len() + 80);
    record.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    record.extend_from_slice(b"Content-Type: image/jpeg\r\n");
    record.extend_from_slice(format!("Content-Length: {}\r\n\r\n", jpeg.len()).as_bytes());
    record.extend_from_slice(jpeg);
    record.extend_from_slice(b"\r\n");
    Bytes::from(record)
}

/// Drives one viewer session on a dedicated capture thread and returns the
/// response body that streams its frame records. The channel doubles as
/// the liveness signal: the receiver is dropped when the viewer
/// disconnects, which the loop observes every iteration.
pub fn stream_body(factory: CaptureFactory, encoder: FrameEncoder, interval: Duration) -> Body {
    let (tx, rx) = mpsc::channel::<Bytes>(2);

    thread::spawn(move || {
        let mut source: Option<Box<dyn Capture>> = None;
        let mut last_emit: Option<Instant> = None;
        let mut reported_unavailable = false;

        loop {
            if tx.is_closed() {
                break;
            }

            let now = Instant::now();
            if !should_emit(now, last_emit, interval) {
                thread::sleep(GATE_POLL);
                continue;
            }
            last_emit = Some(now);

            // The backend is built lazily so a host that gains a display
            // later still starts producing frames on the same session
            if source.is_none() {
                match factory() {
                    Ok(capturer) => source = Some(capturer),
                    Err(e) => {
                        if !reported_unavailable {
                            warn!("Screen capture unavailable: {}", e);
                            reported_unavailable = true;
                        }
                        continue;
                    }
                }
            }
            let capturer = source.as_mut().unwrap();

            // A failed frame is skipped, never fatal to the session
            let frame = match capturer.capture() {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("Frame capture failed: {}", e);
                    continue;
                }
            };
            let jpeg = match encoder.encode(frame) {
                Ok(jpeg) => jpeg,
                Err(e) => {
                    debug!("Frame encode failed: {}", e);
                    continue;
                }
            };

            if tx.blocking_send(frame_record(&jpeg)).is_err() {
                break;
            }
        }

        info!("Viewer disconnected, streaming session ended");
    });

    let frames = stream::unfold(rx, |mut rx| async move {
        let chunk = rx.recv().await?;
        Some((Ok::<_, std::convert::Infallible>(chunk), rx))
    });
    Body::from_stream(frames)
}
