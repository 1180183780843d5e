//! A shutdown request ends the frame loop and releases a held button
//!
//! The shutdown flag is process-wide, so this file holds a single test.


use hand_pointer::{
    app::{request_shutdown, shutdown_requested, AppConfig, FrameSource, HandPointerApp, RunMode, VideoSource},
    config::Config,
    detection::LandmarkEstimator,
    landmarks::LandmarkFrame,
    pointer::MouseButton,
    Result,
};
use opencv::core::Mat;
use test_helpers::{fist, frame, SharedSink, SinkEvent};

/// Endless blank frames
struct BlankFrames;

impl FrameSource for BlankFrames {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        Ok(Some(Mat::default()))
    }
}

/// Reports a fist every frame and requests shutdown on the given call
struct FistThenShutdown {
    calls: usize,
    shutdown_on: usize,
}

impl LandmarkEstimator for FistThenShutdown {
    fn estimate(&mut self, _frame: &Mat) -> Result<Option<LandmarkFrame>> {
        self.calls += 1;
        if self.calls == self.shutdown_on {
            request_shutdown();
        }
        Ok(Some(frame(&fist())))
    }
}

#[test]
fn test_shutdown_request_ends_run_with_button_released() {
    let mut settings = Config::default();
    settings.display.show_window = false;
    let config = AppConfig {
        video_source: VideoSource::Camera(0),
        settings,
        run_mode: RunMode::Control,
        dry_run: true,
    };

    let sink = SharedSink::default();
    let estimator = FistThenShutdown { calls: 0, shutdown_on: 3 };
    let mut app =
        HandPointerApp::with_parts(config, Box::new(BlankFrames), Box::new(estimator), Box::new(sink.clone())).unwrap();

    app.run().unwrap();
    assert!(shutdown_requested());

    let recorded = sink.0.borrow();
    assert_eq!(recorded.held(MouseButton::Left), 0);
    let down = recorded.events.iter().position(|e| *e == SinkEvent::Down(MouseButton::Left));
    let up = recorded.events.iter().rposition(|e| *e == SinkEvent::Up(MouseButton::Left));
    assert!(matches!((down, up), (Some(d), Some(u)) if d < u));
}
