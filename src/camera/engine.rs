use super::{CameraDevice, CaptureError, encode_jpeg};
use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tokio::sync::oneshot;

enum CaptureEngineRequest {
    Capture {
        id: u8,
        reply: oneshot::Sender<Result<CapturedImage, CaptureError>>,
    },
    /// Asks the worker whether the device is open right now.
    Check { reply: oneshot::Sender<bool> },
}

/// One encoded frame together with capture telemetry.
pub struct CapturedImage {
    /// Identifier of the request that produced this frame.
    pub id: u8,
    /// Time spent opening, reading and encoding.
    pub duration: Duration,
    pub jpeg: Vec<u8>,
}

/// Serializes access to a single camera device.
///
/// The device is moved to a background thread which opens it lazily, reopens
/// it when it is found closed, and handles queued requests strictly one after
/// another, so two captures never read the device at the same time.
pub struct CaptureEngine {
    req_tx: Option<mpsc::Sender<CaptureEngineRequest>>,
    capture_handle: Option<JoinHandle<()>>,
    id_counter: AtomicU8,
}

impl CaptureEngine {
    /// Creates the engine and makes one attempt to open the device.
    ///
    /// A failed first open is not fatal; the next capture tries again.
    pub fn new<C>(mut camera: C, jpeg_quality: u8) -> Self
    where
        C: CameraDevice + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<CaptureEngineRequest>();

        let capture_handle = std::thread::spawn(move || {
            if let Err(e) = ensure_open(&mut camera) {
                log::warn!("{e}; will retry on first capture");
            }

            while let Ok(req) = req_rx.recv() {
                match req {
                    CaptureEngineRequest::Capture { id, reply } => {
                        log::debug!("Capturing frame {id}");

                        let start_time = Instant::now();
                        let result = capture(&mut camera, jpeg_quality).map(|jpeg| CapturedImage {
                            id,
                            duration: start_time.elapsed(),
                            jpeg,
                        });

                        if let Err(e) = &result {
                            log::warn!("Capture {id} failed: {e}");
                        }
                        let _ = reply.send(result);
                    }
                    CaptureEngineRequest::Check { reply } => {
                        let _ = reply.send(camera.is_open());
                    }
                }
            }
            log::debug!("Capture loop finished");
        });

        Self {
            req_tx: Some(req_tx),
            capture_handle: Some(capture_handle),
            id_counter: AtomicU8::new(0),
        }
    }

    /// Whether the device is open, checked by the capture thread.
    ///
    /// Waits behind any queued captures. A stopped engine reports `false`.
    pub async fn camera_available(&self) -> bool {
        let Some(tx) = self.req_tx.as_ref() else {
            return false;
        };
        let (reply, rx) = oneshot::channel();
        if tx.send(CaptureEngineRequest::Check { reply }).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Queues a capture and waits for the encoded frame.
    pub async fn capture_one(&self) -> Result<CapturedImage, CaptureError> {
        let tx = self.req_tx.as_ref().ok_or(CaptureError::Stopped)?;
        let id = self.id_counter.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();

        tx.send(CaptureEngineRequest::Capture { id, reply })
            .map_err(|_| CaptureError::Stopped)?;

        rx.await.map_err(|_| CaptureError::Stopped)?
    }

    /// Stops the engine and waits for the capture thread to release the device.
    pub fn stop(&mut self) {
        self.req_tx.take();
        if let Some(handle) = self.capture_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ensure_open<C: CameraDevice>(camera: &mut C) -> Result<(), CaptureError> {
    if camera.is_open() {
        return Ok(());
    }

    log::info!("Opening camera");
    camera
        .open()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    // a device that closes straight after opening never delivers a frame
    if !camera.is_open() {
        return Err(CaptureError::DeviceUnavailable(
            "device closed right after opening".to_string(),
        ));
    }
    Ok(())
}

fn capture<C: CameraDevice>(camera: &mut C, jpeg_quality: u8) -> Result<Vec<u8>, CaptureError> {
    ensure_open(camera)?;

    let frame = camera
        .read_frame()
        .map_err(|e| CaptureError::Device(e.to_string()))?
        .ok_or(CaptureError::NoFrame)?;

    encode_jpeg(&frame, jpeg_quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct FakeError(&'static str);

    /// Scripted camera: each read pops the next outcome.
    struct FakeCamera {
        open: bool,
        opens: Arc<Mutex<u32>>,
        fail_open: bool,
        /// Opens successfully but is closed again by the time anyone looks.
        dies_on_open: bool,
        reads: Vec<Option<RgbImage>>,
    }

    impl FakeCamera {
        fn new(reads: Vec<Option<RgbImage>>) -> (Self, Arc<Mutex<u32>>) {
            let opens = Arc::new(Mutex::new(0));
            let camera = Self {
                open: false,
                opens: opens.clone(),
                fail_open: false,
                dies_on_open: false,
                reads,
            };
            (camera, opens)
        }
    }

    impl CameraDevice for FakeCamera {
        type Error = FakeError;

        fn open(&mut self) -> Result<(), FakeError> {
            if self.fail_open {
                return Err(FakeError("no such device"));
            }
            *self.opens.lock().unwrap() += 1;
            self.open = !self.dies_on_open;
            Ok(())
        }

        fn is_open(&mut self) -> bool {
            self.open
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>, FakeError> {
            if self.reads.is_empty() {
                return Err(FakeError("script exhausted"));
            }
            let frame = self.reads.remove(0);
            // an empty read closes the device, like a dropped stream
            self.open = frame.is_some();
            Ok(frame)
        }
    }

    fn frame() -> Option<RgbImage> {
        Some(RgbImage::from_pixel(16, 16, image::Rgb([0, 128, 255])))
    }

    #[tokio::test]
    async fn captures_jpeg_frames() {
        let (camera, opens) = FakeCamera::new(vec![frame(), frame()]);
        let engine = CaptureEngine::new(camera, 80);

        let first = engine.capture_one().await.unwrap();
        let second = engine.capture_one().await.unwrap();

        assert_eq!(&first.jpeg[..2], &[0xff, 0xd8]);
        assert_eq!((first.id, second.id), (0, 1));
        assert_eq!(*opens.lock().unwrap(), 1);
        assert!(engine.camera_available().await);
    }

    #[tokio::test]
    async fn empty_read_fails_and_device_is_reopened() {
        let (camera, opens) = FakeCamera::new(vec![None, frame()]);
        let engine = CaptureEngine::new(camera, 80);

        assert!(matches!(
            engine.capture_one().await,
            Err(CaptureError::NoFrame)
        ));
        assert!(!engine.camera_available().await);

        assert!(engine.capture_one().await.is_ok());
        assert_eq!(*opens.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn unopenable_device_is_reported() {
        let (mut camera, _) = FakeCamera::new(vec![frame()]);
        camera.fail_open = true;
        let engine = CaptureEngine::new(camera, 80);

        assert!(matches!(
            engine.capture_one().await,
            Err(CaptureError::DeviceUnavailable(_))
        ));
        assert!(!engine.camera_available().await);
    }

    #[tokio::test]
    async fn device_that_exits_after_open_is_unavailable() {
        let (mut camera, opens) = FakeCamera::new(vec![frame()]);
        camera.dies_on_open = true;
        let engine = CaptureEngine::new(camera, 80);

        assert!(!engine.camera_available().await);
        assert!(matches!(
            engine.capture_one().await,
            Err(CaptureError::DeviceUnavailable(_))
        ));
        // warm-up plus the capture attempt
        assert_eq!(*opens.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_captures_are_serialized() {
        let (camera, _) = FakeCamera::new((0..8).map(|_| frame()).collect());
        let engine = Arc::new(CaptureEngine::new(camera, 80));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.capture_one().await.map(|image| image.id) })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap());
        }
        ids.sort();
        assert_eq!(ids, (0..8).collect::<Vec<u8>>());
    }

    #[tokio::test]
    async fn stopped_engine_rejects_captures() {
        let (camera, _) = FakeCamera::new(vec![]);
        let mut engine = CaptureEngine::new(camera, 80);
        engine.stop();

        assert!(matches!(
            engine.capture_one().await,
            Err(CaptureError::Stopped)
        ));
        assert!(!engine.camera_available().await);
    }
}
