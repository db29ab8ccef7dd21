//! Frame acquisition: a background worker continuously pulls frames from
//! the camera and exposes only the most recent one (last-write-wins, no
//! queue). Readers never block and never mutate the shared frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use dartvision_core::GrayImage;
use parking_lot::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The camera delivered nothing at startup. Fatal for the session.
    #[error("camera produced no frame at startup")]
    NoInitialFrame,
}

/// The actual camera backend. Out of scope here; anything that yields
/// grayscale frames works.
pub trait FrameGrabber: Send + 'static {
    fn grab(&mut self) -> Option<GrayImage>;
}

/// Read side of a started capture worker. `read` always returns the most
/// recently captured frame and never blocks.
pub trait FrameSource {
    fn read(&self) -> GrayImage;
}

pub struct FrameStream {
    latest: Arc<Mutex<GrayImage>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl FrameStream {
    /// Start the capture worker. Blocks until the grabber has produced its
    /// first frame so that `read` is immediately meaningful.
    pub fn start<G: FrameGrabber>(mut grabber: G) -> Result<Self, SourceError> {
        let first = grabber.grab().ok_or(SourceError::NoInitialFrame)?;
        let latest = Arc::new(Mutex::new(first));
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let latest = Arc::clone(&latest);
            let running = Arc::clone(&running);
            std::thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    match grabber.grab() {
                        Some(frame) => *latest.lock() = frame,
                        // Keep serving the last good frame on a hiccup.
                        None => std::thread::yield_now(),
                    }
                }
            })
        };

        Ok(Self {
            latest,
            running,
            worker: Some(worker),
        })
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl FrameSource for FrameStream {
    fn read(&self) -> GrayImage {
        self.latest.lock().clone()
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingGrabber {
        produced: u8,
    }

    impl FrameGrabber for CountingGrabber {
        fn grab(&mut self) -> Option<GrayImage> {
            self.produced = self.produced.wrapping_add(1);
            let mut frame = GrayImage::new(4, 4);
            frame.data.fill(self.produced);
            Some(frame)
        }
    }

    struct DeadGrabber;

    impl FrameGrabber for DeadGrabber {
        fn grab(&mut self) -> Option<GrayImage> {
            None
        }
    }

    #[test]
    fn read_returns_a_captured_frame() {
        let mut stream = FrameStream::start(CountingGrabber { produced: 0 }).expect("started");
        let frame = stream.read();
        assert_eq!(frame.width, 4);
        assert!(frame.data[0] >= 1);
        stream.stop();
    }

    #[test]
    fn startup_without_frames_is_fatal() {
        assert!(matches!(
            FrameStream::start(DeadGrabber),
            Err(SourceError::NoInitialFrame)
        ));
    }

    #[test]
    fn stop_joins_the_worker() {
        let mut stream = FrameStream::start(CountingGrabber { produced: 0 }).expect("started");
        stream.stop();
        assert!(stream.worker.is_none());
    }
}
