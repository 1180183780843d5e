//! Main application module: the camera frame loop.
//!
//! Each iteration reads a frame, estimates hand landmarks, advances the
//! pointer state machine, injects the resulting commands and draws the
//! annotated frame. Whatever ends the loop, a held mouse button is
//! released before [`HandPointerApp::run`] returns.

use crate::{
    calibration::{margin_leaves_zone, CalibrationCapture, CalibrationMode, CaptureProgress},
    config::Config,
    constants::{CALIBRATION_CONFIRM_COOLDOWN_S, DRY_RUN_SCREEN_SIZE, QUIT_KEYS},
    detection::{HandLandmarkDetector, LandmarkEstimator},
    error::{Error, Result},
    input::{dispatch, InputSink, LoggingSink, X11InputSink},
    landmarks::{HandJoint, LandmarkFrame},
    pointer::{release_held, PointerController, PointerPhase, PointerState},
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Point, Scalar},
    highgui::{self, WINDOW_NORMAL},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

/// Set by the SIGINT/SIGTERM handlers; checked once per frame
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Install handlers so SIGINT and SIGTERM end the frame loop cleanly
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Ask a running frame loop to stop after the current frame
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Loaded configuration
    pub settings: Config,
    /// Pointer control or calibration capture
    pub run_mode: RunMode,
    /// Log commands instead of injecting them
    pub dry_run: bool,
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// What the frame loop does with detected hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Drive the pointer
    Control,
    /// Capture calibration corners and save them
    Calibrate,
}

/// Frames per second from successive frame timestamps
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    last: Option<Instant>,
    fps: f64,
}

impl FpsCounter {
    /// Record a frame and return the current rate
    ///
    /// A zero interval keeps the previous rate.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(last) = self.last {
            let delta = now.saturating_duration_since(last).as_secs_f64();
            if delta > 0.0 {
                self.fps = 1.0 / delta;
            }
        }
        self.last = Some(now);
        self.fps
    }

    pub const fn fps(&self) -> f64 {
        self.fps
    }
}

/// Source of camera frames for the loop
pub trait FrameSource {
    /// Next frame, or `None` when the source has ended
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Frames from an OpenCV camera or video file
pub struct CaptureSource {
    capture: VideoCapture,
    source: VideoSource,
    mirror: bool,
}

impl CaptureSource {
    /// Open a camera or video file
    pub fn open(source: &VideoSource, mirror: bool) -> Result<Self> {
        let capture = match source {
            VideoSource::Camera(index) => {
                info!("Opening camera {}", index);
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                if !cap.is_opened()? {
                    return Err(Error::VideoSource(format!("Cannot open camera {index}")));
                }

                // Reduce buffer size for lower latency (webcam only)
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {}", path);
                let cap = VideoCapture::from_file(path, videoio::CAP_ANY)?;
                if !cap.is_opened()? {
                    return Err(Error::VideoSource(format!("Cannot open video file {path}")));
                }
                cap
            }
        };

        Ok(Self {
            capture,
            source: source.clone(),
            mirror,
        })
    }
}

impl FrameSource for CaptureSource {
    /// Read the next frame, mirrored if configured
    ///
    /// Returns `None` at the end of a video file. A camera that stops
    /// producing frames is an error.
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return match &self.source {
                VideoSource::File(_) => {
                    info!("End of video file reached");
                    Ok(None)
                }
                VideoSource::Camera(index) => Err(Error::VideoSource(format!(
                    "Camera {index} stopped producing frames"
                ))),
            };
        }

        if self.mirror {
            let mut mirrored = Mat::default();
            opencv::core::flip(&frame, &mut mirrored, 1)?;
            frame = mirrored;
        }

        Ok(Some(frame))
    }
}

/// Advance the pointer by one frame and inject its commands
pub fn drive_frame<S: InputSink + ?Sized>(
    controller: &PointerController,
    state: &mut PointerState,
    sink: &mut S,
    landmarks: Option<&LandmarkFrame>,
    now: Instant,
) -> Result<PointerPhase> {
    let commands = controller.update(state, landmarks, now);
    if !commands.is_empty() {
        debug!("Frame commands: {:?}", commands);
    }
    dispatch(sink, &commands)?;
    Ok(state.phase())
}

/// Release any held button through the sink
pub fn release_pointer<S: InputSink + ?Sized>(state: &mut PointerState, sink: &mut S) -> Result<()> {
    let commands = release_held(state);
    if !commands.is_empty() {
        info!("Releasing held mouse button");
    }
    dispatch(sink, &commands)
}

/// Main application struct
pub struct HandPointerApp {
    config: AppConfig,
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkEstimator>,
    sink: Box<dyn InputSink>,
    pointer_state: PointerState,
    fps: FpsCounter,
}

impl HandPointerApp {
    /// Create a new hand pointer application
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing Hand Pointer application");

        let camera = &config.settings.camera;
        let source = CaptureSource::open(&config.video_source, camera.mirror)?;
        let detector = HandLandmarkDetector::new(&camera.model, camera.presence_threshold)?;

        let sink: Box<dyn InputSink> = if config.dry_run || config.run_mode == RunMode::Calibrate {
            info!("Input injection disabled");
            let (width, height) = DRY_RUN_SCREEN_SIZE;
            Box::new(LoggingSink::new(width, height))
        } else {
            Box::new(X11InputSink::new()?)
        };

        Self::with_parts(config, Box::new(source), Box::new(detector), sink)
    }

    /// Assemble the application from its frame source, estimator and sink
    pub fn with_parts(
        config: AppConfig,
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkEstimator>,
        sink: Box<dyn InputSink>,
    ) -> Result<Self> {
        let (screen_width, screen_height) = sink.screen_size();
        let pointer_state = PointerState::new(screen_width, screen_height);

        if config.settings.display.show_window {
            highgui::named_window(&config.settings.display.window_name, WINDOW_NORMAL)?;
        }

        Ok(Self {
            config,
            source,
            detector,
            sink,
            pointer_state,
            fps: FpsCounter::default(),
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        match self.config.run_mode {
            RunMode::Control => {
                let outcome = self.run_control();
                let released = release_pointer(&mut self.pointer_state, self.sink.as_mut());
                info!("Application shutting down");
                outcome.and(released)
            }
            RunMode::Calibrate => self.run_calibration(),
        }
    }

    fn run_control(&mut self) -> Result<()> {
        let (screen_width, screen_height) = self.sink.screen_size();
        let record = self.config.settings.load_calibration()?;
        let controller = self
            .config
            .settings
            .build_controller(record.as_ref(), screen_width, screen_height)?;
        info!(
            "Pointer control on {}x{} screen ({:?} mapping)",
            screen_width, screen_height, self.config.settings.calibration.mode
        );

        let mut zone_checked = false;
        while !shutdown_requested() {
            let Some(frame) = self.source.next_frame()? else {
                break;
            };
            if !zone_checked {
                self.warn_if_zone_empty(&frame);
                zone_checked = true;
            }

            let landmarks = self.detector.estimate(&frame)?;
            let now = Instant::now();
            let phase = drive_frame(
                &controller,
                &mut self.pointer_state,
                self.sink.as_mut(),
                landmarks.as_ref(),
                now,
            )?;
            let fps = self.fps.tick(now);

            let status = format!("{} | FPS {:.1}", phase.as_str(), fps);
            if self.show(frame, landmarks.as_ref(), &status)? {
                break;
            }
        }

        Ok(())
    }

    fn run_calibration(&mut self) -> Result<()> {
        let path = self.config.settings.calibration.file.clone();
        let mut capture = CalibrationCapture::new(
            self.config.settings.gestures.pinch_threshold_px,
            Duration::from_secs_f64(CALIBRATION_CONFIRM_COOLDOWN_S),
        );
        info!("Calibration: pinch at each screen corner in turn");

        while !shutdown_requested() {
            let Some(frame) = self.source.next_frame()? else {
                break;
            };

            let landmarks = self.detector.estimate(&frame)?;
            let status = match capture.update(landmarks.as_ref(), Instant::now()) {
                CaptureProgress::Complete(record) => {
                    record.to_file(&path)?;
                    info!("Calibration saved to {}", path.display());
                    return Ok(());
                }
                CaptureProgress::Captured(corner, _) => format!("{} captured", corner.name()),
                CaptureProgress::Rejected { axis } => {
                    format!("Corners span no {axis} distance, start again at Top-Left")
                }
                CaptureProgress::Waiting(corner) => format!("Pinch at {}", corner.name()),
            };

            if self.show(frame, landmarks.as_ref(), &status)? {
                break;
            }
        }

        warn!("Calibration aborted before all corners were captured");
        Ok(())
    }

    /// Warn when the active-zone margin leaves no zone in this frame size
    #[allow(clippy::cast_sign_loss)]
    fn warn_if_zone_empty(&self, frame: &Mat) {
        let calibration = &self.config.settings.calibration;
        if calibration.mode != CalibrationMode::ActiveZone {
            return;
        }
        let (width, height) = (frame.cols().max(0) as u32, frame.rows().max(0) as u32);
        if !margin_leaves_zone(calibration.margin_px, width) || !margin_leaves_zone(calibration.margin_px, height) {
            warn!(
                "Active zone margin {}px leaves no zone in a {}x{} frame, ignoring it on that axis",
                calibration.margin_px, width, height
            );
        }
    }

    /// Draw and display the frame; returns true when quit was requested
    fn show(&self, mut frame: Mat, landmarks: Option<&LandmarkFrame>, status: &str) -> Result<bool> {
        let display = &self.config.settings.display;
        if !display.show_window {
            return Ok(false);
        }

        if let Some(landmarks) = landmarks {
            draw_landmarks(&mut frame, landmarks)?;
        }
        imgproc::put_text(
            &mut frame,
            status,
            Point::new(10, 30),
            FONT_HERSHEY_SIMPLEX,
            0.8,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            LINE_8,
            false,
        )?;
        highgui::imshow(&display.window_name, &frame)?;

        let key = highgui::wait_key(1)?;
        if QUIT_KEYS.contains(&key) {
            info!("Exit requested by user");
            return Ok(true);
        }
        Ok(false)
    }
}

impl Drop for HandPointerApp {
    fn drop(&mut self) {
        if let Err(e) = release_pointer(&mut self.pointer_state, self.sink.as_mut()) {
            warn!("Failed to release mouse button on shutdown: {}", e);
        }
    }
}

/// Draw landmark dots, highlighting the thumb and index tips
#[allow(clippy::cast_possible_truncation)]
fn draw_landmarks(frame: &mut Mat, landmarks: &LandmarkFrame) -> Result<()> {
    for joint in HandJoint::ALL {
        let p = landmarks.pixel(joint);
        let (radius, color) = match joint {
            HandJoint::ThumbTip | HandJoint::IndexTip => (6, Scalar::new(0.0, 0.0, 255.0, 0.0)),
            _ => (3, Scalar::new(255.0, 0.0, 0.0, 0.0)),
        };
        imgproc::circle(
            frame,
            Point::new(p.x as i32, p.y as i32),
            radius,
            color,
            -1,
            LINE_8,
            0,
        )?;
    }
    Ok(())
}
