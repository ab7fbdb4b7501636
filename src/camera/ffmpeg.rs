use super::CameraDevice;
use image::RgbImage;
use std::{
    io::{self, Read},
    process::{Child, ChildStdout, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

const STARTUP_POLL: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
pub struct FfmpegCameraConfig {
    /// Path or name of the ffmpeg binary.
    pub ffmpeg: String,
    /// ffmpeg input format, `v4l2` on Linux, `avfoundation` on macOS.
    pub input_format: String,
    pub device: String,
    pub width: u32,
    pub height: u32,
    /// How long ffmpeg must stay up after spawning for the open to count.
    pub startup_grace: Duration,
}

impl Default for FfmpegCameraConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            input_format: "v4l2".to_string(),
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            startup_grace: Duration::from_millis(500),
        }
    }
}

/// A camera read through a long-lived ffmpeg process.
///
/// ffmpeg decodes the device stream to raw RGB24 on stdout, scaled to the
/// configured size, so every frame is exactly `width * height * 3` bytes even
/// when the driver picks another capture size. The process is the device
/// handle: it is open while ffmpeg is running.
pub struct FfmpegCamera {
    config: FfmpegCameraConfig,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl FfmpegCamera {
    pub fn new(config: FfmpegCameraConfig) -> Self {
        Self {
            config,
            child: None,
            stdout: None,
        }
    }

    fn args(&self) -> Vec<String> {
        let size = format!("{}x{}", self.config.width, self.config.height);
        [
            "-loglevel",
            "error",
            "-f",
            self.config.input_format.as_str(),
            "-video_size",
            size.as_str(),
            "-i",
            self.config.device.as_str(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            size.as_str(),
            "-",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }

    fn frame_len(&self) -> usize {
        self.config.width as usize * self.config.height as usize * 3
    }

    fn close(&mut self) {
        self.stdout.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl CameraDevice for FfmpegCamera {
    type Error = io::Error;

    fn open(&mut self) -> io::Result<()> {
        self.close();

        let mut child = Command::new(&self.config.ffmpeg)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        // a missing or busy device makes ffmpeg exit right away
        let started = Instant::now();
        while started.elapsed() < self.config.startup_grace {
            if let Some(status) = child.try_wait()? {
                return Err(io::Error::other(format!(
                    "{} exited during startup ({status})",
                    self.config.ffmpeg
                )));
            }
            thread::sleep(STARTUP_POLL);
        }

        self.stdout = child.stdout.take();
        self.child = Some(child);
        log::info!(
            "Opened {} ({}x{}) via {}",
            self.config.device,
            self.config.width,
            self.config.height,
            self.config.ffmpeg
        );
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        matches!(
            self.child.as_mut().map(|child| child.try_wait()),
            Some(Ok(None))
        )
    }

    fn read_frame(&mut self) -> io::Result<Option<RgbImage>> {
        let mut buffer = vec![0u8; self.frame_len()];
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        match stdout.read_exact(&mut buffer) {
            Ok(()) => Ok(RgbImage::from_raw(
                self.config.width,
                self.config.height,
                buffer,
            )),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                log::warn!("Camera stream ended");
                self.close();
                Ok(None)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.close();
    }
}
