use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::config::CaptureLoopConfig;
use crate::models::error::CaptureError;
use crate::models::recording::{RawChunk, Recording};
use crate::models::recording_result::{CaptureOutcome, CaptureStats, StopReason};
use crate::models::state::LoopState;
use crate::processing::meter;
use crate::processing::visualizer::Visualizer;
use crate::session::stop_signal::StopSignal;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_session::{BufferPoll, CaptureSession};

/// Outcome of a single poll attempt.
enum PollStep {
    Captured,
    Empty,
    Failed(CaptureError),
}

/// Drives a [`CaptureSession`] from start to stop on the calling thread.
///
/// Each iteration checks the stop signal, polls the device once without
/// blocking, and redraws the level bar when its tick is due:
/// ```text
/// [StopSignal] ──check──┐
///                       ├→ [poll_buffer] → [RawChunk] → [Recording]
/// [CaptureSession] ─────┘                      └→ [meter] → [Visualizer] → delegate
/// ```
pub struct CaptureLoop<S: CaptureSession> {
    session: S,
    config: CaptureLoopConfig,
    state: LoopState,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl<S: CaptureSession> CaptureLoop<S> {
    pub fn new(session: S, config: CaptureLoopConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            session,
            config,
            state: LoopState::Idle,
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Report the negotiated format and run the operator's readiness gate.
    /// Transitions: idle → armed. A failed gate leaves the loop idle.
    pub fn arm<F>(&mut self, confirm: F) -> Result<(), CaptureError>
    where
        F: FnOnce() -> Result<(), CaptureError>,
    {
        if !self.state.is_idle() {
            return Err(CaptureError::InvalidState(format!(
                "can only arm from idle state, loop is {}",
                self.state
            )));
        }

        let format = self.session.format().clone();
        log::info!("Negotiated capture format: {} ({})", format, format.tag());
        self.report_status(&format!("Recording format: {format}"));

        confirm()?;
        self.set_state(LoopState::Armed);
        Ok(())
    }

    /// Start the device and capture until `stop` is triggered or the device
    /// keeps failing. Transitions: armed → capturing → draining → finished.
    ///
    /// A failed start leaves the loop armed and nothing is captured. Once
    /// capturing has begun, the recording is always returned.
    pub fn run(&mut self, stop: &StopSignal) -> Result<CaptureOutcome, CaptureError> {
        if self.state != LoopState::Armed {
            return Err(CaptureError::InvalidState(format!(
                "can only run from armed state, loop is {}",
                self.state
            )));
        }

        if let Err(e) = self.session.start() {
            let err = match e {
                CaptureError::DeviceStartFailure(_) => e,
                other => CaptureError::DeviceStartFailure(other.to_string()),
            };
            log::error!("Capture start failed: {}", err);
            return Err(err);
        }

        let format = self.session.format().clone();
        let mut recording = Recording::new(format);
        let mut stats = CaptureStats::default();
        let mut amplitude = 0.0f32;
        let mut visualizer = Visualizer::new(self.config.visualizer_interval);
        let mut consecutive_failures = 0u32;

        self.set_state(LoopState::Capturing);
        self.report_status("Recording started");

        let stop_reason = loop {
            if stop.is_triggered() {
                log::debug!("Stop signal observed after {} polls", stats.polls);
                break StopReason::Operator;
            }

            let delay = match self.poll_once(&mut recording, &mut amplitude, &mut stats) {
                PollStep::Captured => {
                    consecutive_failures = 0;
                    self.config.chunk_pause
                }
                PollStep::Empty => {
                    consecutive_failures = 0;
                    self.config.poll_backoff
                }
                PollStep::Failed(err) => {
                    consecutive_failures += 1;
                    stats.transient_failures += 1;
                    if consecutive_failures == 1 {
                        log::warn!("Poll failed, retrying: {}", err);
                        self.report_error(&err);
                    } else {
                        log::debug!("Poll failed ({} in a row): {}", consecutive_failures, err);
                    }

                    if let Some(max) = self.config.max_consecutive_failures {
                        if consecutive_failures >= max {
                            let err = CaptureError::DeviceUnresponsive {
                                consecutive_failures,
                            };
                            log::error!("{}", err);
                            break StopReason::PollFailures {
                                consecutive: consecutive_failures,
                            };
                        }
                    }
                    self.config.poll_backoff
                }
            };

            if let Some(line) = visualizer.tick(Instant::now(), amplitude) {
                stats.redraws += 1;
                self.report_meter(&line);
            }

            pause(delay);
        };

        self.set_state(LoopState::Draining);
        let stop_error = match self.session.stop() {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Capture stop failed, keeping {} captured bytes: {}", recording.len(), e);
                self.report_error(&e);
                Some(e)
            }
        };

        log::info!(
            "Capture finished: {} chunks, {} bytes, {} empty polls, {} transient failures",
            stats.chunks,
            stats.bytes_captured,
            stats.empty_polls,
            stats.transient_failures
        );
        self.report_status("Recording stopped");
        self.report_status(&format!(
            "Captured {} bytes ({:.1}s)",
            recording.len(),
            recording.duration_secs()
        ));
        self.set_state(LoopState::Finished);

        Ok(CaptureOutcome {
            recording,
            stop_reason,
            stats,
            stop_error,
        })
    }

    /// One poll: copy out, meter and append a chunk, then release whatever
    /// buffer the device handed out, even if the copy failed.
    fn poll_once(
        &mut self,
        recording: &mut Recording,
        amplitude: &mut f32,
        stats: &mut CaptureStats,
    ) -> PollStep {
        let block_align = recording.format().block_align();
        let bits_per_sample = recording.format().bits_per_sample();
        stats.polls += 1;

        let (step, held_frames) = match self.session.poll_buffer() {
            BufferPoll::Empty => (PollStep::Empty, Some(0)),
            BufferPoll::Chunk(buffer) if buffer.frames == 0 => (PollStep::Empty, Some(0)),
            BufferPoll::Chunk(buffer) => {
                let step = match RawChunk::copy_from(buffer.bytes, buffer.frames, block_align) {
                    Ok(chunk) => {
                        *amplitude = meter::peak_amplitude(chunk.bytes(), bits_per_sample);
                        stats.chunks += 1;
                        stats.bytes_captured += chunk.len() as u64;
                        recording.append(chunk);
                        PollStep::Captured
                    }
                    Err(e) => PollStep::Failed(e),
                };
                (step, Some(buffer.frames))
            }
            BufferPoll::Failed(e) => (PollStep::Failed(e), None),
        };

        if matches!(step, PollStep::Empty) {
            stats.empty_polls += 1;
        }

        let Some(frames) = held_frames else {
            return step;
        };
        stats.releases += 1;
        match (self.session.release_buffer(frames), step) {
            (Ok(()), step) => step,
            (Err(e), PollStep::Failed(first)) => {
                log::debug!("Release after failed copy also failed: {}", e);
                PollStep::Failed(first)
            }
            (Err(e), _) => PollStep::Failed(e),
        }
    }

    fn set_state(&mut self, state: LoopState) {
        self.state = state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn report_status(&self, message: &str) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_status(message);
        }
    }

    fn report_meter(&self, line: &str) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_meter(line);
        }
    }

    fn report_error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::models::audio_models::AudioSource;
    use crate::models::format::AudioFormatDescriptor;
    use crate::processing::visualizer;

    /// What the scripted device answers to each poll.
    #[derive(Debug, Clone)]
    enum Step {
        Empty,
        Chunk(Vec<u8>),
        /// Claims more frames than the bytes it delivers.
        Short(Vec<u8>, u32),
        Fail,
        /// Delivers a chunk and triggers the stop signal during the poll.
        ChunkThenStop(Vec<u8>),
    }

    #[derive(Debug, Default)]
    struct DeviceLog {
        starts: u32,
        stops: u32,
        polls: u32,
        releases: Vec<u32>,
    }

    struct ScriptedSession {
        format: AudioFormatDescriptor,
        source: AudioSource,
        script: VecDeque<Step>,
        stop: StopSignal,
        log: Arc<Mutex<DeviceLog>>,
        current: Vec<u8>,
        fail_start: bool,
        fail_stop: bool,
        fail_release: bool,
    }

    impl ScriptedSession {
        /// Stereo 16-bit; stops itself once the script runs out.
        fn new(script: Vec<Step>, stop: &StopSignal) -> (Self, Arc<Mutex<DeviceLog>>) {
            let log = Arc::new(Mutex::new(DeviceLog::default()));
            let session = Self {
                format: AudioFormatDescriptor::pcm(2, 44100, 16).unwrap(),
                source: AudioSource {
                    id: "scripted".into(),
                    name: "Scripted Input".into(),
                    is_default: true,
                },
                script: script.into(),
                stop: stop.clone(),
                log: Arc::clone(&log),
                current: Vec::new(),
                fail_start: false,
                fail_stop: false,
                fail_release: false,
            };
            (session, log)
        }
    }

    impl CaptureSession for ScriptedSession {
        fn format(&self) -> &AudioFormatDescriptor {
            &self.format
        }

        fn source(&self) -> &AudioSource {
            &self.source
        }

        fn start(&mut self) -> Result<(), CaptureError> {
            self.log.lock().starts += 1;
            if self.fail_start {
                return Err(CaptureError::Unknown("device busy".into()));
            }
            Ok(())
        }

        fn poll_buffer(&mut self) -> BufferPoll<'_> {
            self.log.lock().polls += 1;
            let block_align = self.format.block_align() as usize;
            let step = match self.script.pop_front() {
                Some(step) => step,
                None => {
                    self.stop.trigger();
                    Step::Empty
                }
            };
            match step {
                Step::Empty => BufferPoll::Empty,
                Step::Fail => BufferPoll::Failed(CaptureError::TransientPollFailure("glitch".into())),
                Step::Chunk(bytes) => {
                    let frames = (bytes.len() / block_align) as u32;
                    self.current = bytes;
                    BufferPoll::Chunk(crate::traits::capture_session::DeviceBuffer {
                        bytes: &self.current,
                        frames,
                    })
                }
                Step::Short(bytes, frames) => {
                    self.current = bytes;
                    BufferPoll::Chunk(crate::traits::capture_session::DeviceBuffer {
                        bytes: &self.current,
                        frames,
                    })
                }
                Step::ChunkThenStop(bytes) => {
                    self.stop.trigger();
                    let frames = (bytes.len() / block_align) as u32;
                    self.current = bytes;
                    BufferPoll::Chunk(crate::traits::capture_session::DeviceBuffer {
                        bytes: &self.current,
                        frames,
                    })
                }
            }
        }

        fn release_buffer(&mut self, frames: u32) -> Result<(), CaptureError> {
            self.log.lock().releases.push(frames);
            self.current.clear();
            if self.fail_release && frames > 0 {
                return Err(CaptureError::TransientPollFailure("release refused".into()));
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), CaptureError> {
            self.log.lock().stops += 1;
            if self.fail_stop {
                return Err(CaptureError::Unknown("device unplugged".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        State(LoopState),
        Status(String),
        Meter(String),
        Error(CaptureError),
    }

    #[derive(Default)]
    struct RecordingDelegate {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingDelegate {
        fn states(&self) -> Vec<LoopState> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::State(s) => Some(*s),
                    _ => None,
                })
                .collect()
        }

        fn meters(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::Meter(line) => Some(line.clone()),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<CaptureError> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::Error(err) => Some(err.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl CaptureDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: LoopState) {
            self.events.lock().push(Event::State(state));
        }

        fn on_status(&self, message: &str) {
            self.events.lock().push(Event::Status(message.to_string()));
        }

        fn on_meter(&self, line: &str) {
            self.events.lock().push(Event::Meter(line.to_string()));
        }

        fn on_error(&self, error: &CaptureError) {
            self.events.lock().push(Event::Error(error.clone()));
        }
    }

    fn fast_config() -> CaptureLoopConfig {
        CaptureLoopConfig {
            poll_backoff: Duration::ZERO,
            chunk_pause: Duration::ZERO,
            visualizer_interval: Duration::from_secs(3600),
            max_consecutive_failures: Some(3),
        }
    }

    fn armed(session: ScriptedSession, config: CaptureLoopConfig) -> CaptureLoop<ScriptedSession> {
        let mut capture = CaptureLoop::new(session, config).unwrap();
        capture.arm(|| Ok(())).unwrap();
        capture
    }

    fn frames(fill: u8, count: usize) -> Vec<u8> {
        vec![fill; count * 4]
    }

    #[test]
    fn chunks_between_empty_polls_accumulate_in_order() {
        let stop = StopSignal::new();
        let (a, b, c) = (frames(1, 3), frames(2, 1), frames(3, 5));
        let script = vec![
            Step::Empty,
            Step::Chunk(a.clone()),
            Step::Empty,
            Step::Empty,
            Step::Chunk(b.clone()),
            Step::Chunk(c.clone()),
            Step::Empty,
        ];
        let (session, log) = ScriptedSession::new(script, &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        let expected: Vec<u8> = [a, b, c].concat();
        assert_eq!(outcome.recording.data(), expected.as_slice());
        assert_eq!(outcome.stop_reason, StopReason::Operator);
        assert_eq!(outcome.stats.chunks, 3);
        assert_eq!(outcome.stats.bytes_captured, expected.len() as u64);

        let log = log.lock();
        // 7 scripted polls + the one that ran off the end and raised stop
        assert_eq!(log.polls, 8);
        assert_eq!(log.releases, vec![0, 3, 0, 0, 1, 5, 0, 0]);
        assert_eq!(log.starts, 1);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn release_count_matches_every_buffer_poll() {
        let stop = StopSignal::new();
        let mut script = Vec::new();
        for i in 0..40u8 {
            script.push(if i % 3 == 0 { Step::Chunk(frames(i, 2)) } else { Step::Empty });
        }
        let (session, log) = ScriptedSession::new(script, &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        let log = log.lock();
        assert_eq!(log.releases.len() as u32, log.polls);
        assert_eq!(outcome.stats.releases, u64::from(log.polls));
        assert_eq!(outcome.stats.chunks, 14);
        assert_eq!(outcome.recording.len(), 14 * 8);
    }

    #[test]
    fn pre_triggered_stop_never_polls() {
        let stop = StopSignal::new();
        stop.trigger();
        let (session, log) = ScriptedSession::new(vec![Step::Chunk(frames(9, 1))], &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert!(outcome.recording.is_empty());
        assert_eq!(capture.state(), LoopState::Finished);
        let log = log.lock();
        assert_eq!(log.polls, 0);
        assert_eq!(log.starts, 1);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn no_poll_after_stop_is_observed() {
        let stop = StopSignal::new();
        let script = vec![
            Step::Chunk(frames(1, 1)),
            Step::Empty,
            Step::ChunkThenStop(frames(2, 1)),
            Step::Chunk(frames(3, 1)),
            Step::Chunk(frames(4, 1)),
        ];
        let (session, log) = ScriptedSession::new(script, &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(log.lock().polls, 3);
        // the chunk delivered alongside the stop request is kept
        assert_eq!(outcome.recording.data(), [frames(1, 1), frames(2, 1)].concat().as_slice());
        assert_eq!(log.lock().stops, 1);
    }

    #[test]
    fn isolated_failures_are_absorbed() {
        let stop = StopSignal::new();
        let script = vec![
            Step::Fail,
            Step::Fail,
            Step::Chunk(frames(7, 2)),
            Step::Fail,
            Step::Empty,
        ];
        let (session, log) = ScriptedSession::new(script, &stop);
        let delegate = Arc::new(RecordingDelegate::default());
        let mut capture = armed(session, fast_config());
        capture.set_delegate(delegate.clone());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Operator);
        assert_eq!(outcome.stats.transient_failures, 3);
        assert_eq!(outcome.recording.data(), frames(7, 2).as_slice());
        // failed polls hold no buffer, so nothing is released for them
        assert_eq!(log.lock().releases, vec![2, 0, 0]);
        // one report per run of failures
        assert_eq!(delegate.errors().len(), 2);
    }

    #[test]
    fn consecutive_failures_end_capture_but_keep_data() {
        let stop = StopSignal::new();
        let script = vec![
            Step::Chunk(frames(5, 4)),
            Step::Fail,
            Step::Fail,
            Step::Fail,
            Step::Chunk(frames(6, 4)),
        ];
        let (session, log) = ScriptedSession::new(script, &stop);
        let delegate = Arc::new(RecordingDelegate::default());
        let mut capture = armed(session, fast_config());
        capture.set_delegate(delegate.clone());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::PollFailures { consecutive: 3 });
        assert_eq!(outcome.recording.data(), frames(5, 4).as_slice());
        assert_eq!(log.lock().polls, 4);
        assert_eq!(log.lock().stops, 1);
        // only the first absorbed failure; the escalation is the caller's to report
        assert_eq!(
            delegate.errors(),
            vec![CaptureError::TransientPollFailure("glitch".into())]
        );
        assert_eq!(capture.state(), LoopState::Finished);
    }

    #[test]
    fn successful_poll_resets_failure_count() {
        let stop = StopSignal::new();
        let script = vec![
            Step::Fail,
            Step::Fail,
            Step::Empty,
            Step::Fail,
            Step::Fail,
            Step::Chunk(frames(1, 1)),
            Step::Fail,
            Step::Fail,
        ];
        let (session, _log) = ScriptedSession::new(script, &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Operator);
        assert_eq!(outcome.stats.transient_failures, 6);
    }

    #[test]
    fn unbounded_retry_never_escalates() {
        let stop = StopSignal::new();
        let script = vec![Step::Fail; 50];
        let (session, _log) = ScriptedSession::new(script, &stop);
        let config = CaptureLoopConfig {
            max_consecutive_failures: None,
            ..fast_config()
        };
        let mut capture = armed(session, config);

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Operator);
        assert_eq!(outcome.stats.transient_failures, 50);
    }

    #[test]
    fn malformed_chunk_is_released_and_skipped() {
        let stop = StopSignal::new();
        let script = vec![
            Step::Short(vec![0xAA; 6], 4),
            Step::Chunk(frames(2, 1)),
        ];
        let (session, log) = ScriptedSession::new(script, &stop);
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(log.lock().releases, vec![4, 1, 0]);
        assert_eq!(outcome.recording.data(), frames(2, 1).as_slice());
        assert_eq!(outcome.stats.transient_failures, 1);
    }

    #[test]
    fn release_failure_counts_as_transient_and_keeps_chunk() {
        let stop = StopSignal::new();
        let script = vec![Step::Chunk(frames(3, 2)), Step::Empty];
        let (mut session, _log) = ScriptedSession::new(script, &stop);
        session.fail_release = true;
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.recording.data(), frames(3, 2).as_slice());
        assert_eq!(outcome.stats.transient_failures, 1);
    }

    #[test]
    fn start_failure_stays_armed() {
        let stop = StopSignal::new();
        let (mut session, log) = ScriptedSession::new(vec![Step::Chunk(frames(1, 1))], &stop);
        session.fail_start = true;
        let delegate = Arc::new(RecordingDelegate::default());
        let mut capture = armed(session, fast_config());
        capture.set_delegate(delegate.clone());

        let err = capture.run(&stop).unwrap_err();

        assert!(matches!(err, CaptureError::DeviceStartFailure(_)));
        assert_eq!(capture.state(), LoopState::Armed);
        assert!(delegate.errors().is_empty());
        let log = log.lock();
        assert_eq!(log.polls, 0);
        assert_eq!(log.stops, 0);
    }

    #[test]
    fn stop_failure_keeps_recording() {
        let stop = StopSignal::new();
        let (mut session, _log) = ScriptedSession::new(vec![Step::Chunk(frames(8, 3))], &stop);
        session.fail_stop = true;
        let mut capture = armed(session, fast_config());

        let outcome = capture.run(&stop).unwrap();

        assert_eq!(outcome.recording.data(), frames(8, 3).as_slice());
        assert_eq!(
            outcome.stop_error,
            Some(CaptureError::Unknown("device unplugged".into()))
        );
        assert_eq!(capture.state(), LoopState::Finished);
    }

    #[test]
    fn run_requires_armed_loop() {
        let stop = StopSignal::new();
        let (session, log) = ScriptedSession::new(vec![], &stop);
        let mut capture = CaptureLoop::new(session, fast_config()).unwrap();

        assert!(matches!(capture.run(&stop), Err(CaptureError::InvalidState(_))));
        assert_eq!(log.lock().starts, 0);
    }

    #[test]
    fn finished_loop_cannot_run_again() {
        let stop = StopSignal::new();
        let (session, _log) = ScriptedSession::new(vec![], &stop);
        let mut capture = armed(session, fast_config());
        capture.run(&stop).unwrap();
        assert!(capture.state().is_terminal());

        assert!(matches!(capture.run(&stop), Err(CaptureError::InvalidState(_))));
        assert!(matches!(capture.arm(|| Ok(())), Err(CaptureError::InvalidState(_))));
    }

    #[test]
    fn refused_gate_stays_idle() {
        let stop = StopSignal::new();
        let (session, _log) = ScriptedSession::new(vec![], &stop);
        let mut capture = CaptureLoop::new(session, fast_config()).unwrap();

        let err = capture
            .arm(|| Err(CaptureError::Unknown("stdin closed".into())))
            .unwrap_err();

        assert_eq!(err, CaptureError::Unknown("stdin closed".into()));
        assert_eq!(capture.state(), LoopState::Idle);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let stop = StopSignal::new();
        let (session, _log) = ScriptedSession::new(vec![], &stop);
        let config = CaptureLoopConfig {
            max_consecutive_failures: Some(0),
            ..fast_config()
        };
        assert!(matches!(
            CaptureLoop::new(session, config),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn states_are_reported_in_order() {
        let stop = StopSignal::new();
        let (session, _log) = ScriptedSession::new(vec![Step::Empty], &stop);
        let delegate = Arc::new(RecordingDelegate::default());
        let mut capture = CaptureLoop::new(session, fast_config()).unwrap();
        capture.set_delegate(delegate.clone());

        capture.arm(|| Ok(())).unwrap();
        capture.run(&stop).unwrap();

        assert_eq!(
            delegate.states(),
            vec![
                LoopState::Armed,
                LoopState::Capturing,
                LoopState::Draining,
                LoopState::Finished
            ]
        );
        let events = delegate.events.lock();
        assert!(events.contains(&Event::Status("Recording format: 44100 Hz, 2 channels, 16 bits".into())));
        assert!(events.contains(&Event::Status("Captured 0 bytes (0.0s)".into())));
    }

    #[test]
    fn meter_redraws_latest_chunk_amplitude() {
        let stop = StopSignal::new();
        // near full-scale left sample; later empty polls keep the last level
        let loud = vec![0xFF, 0x7F, 0x00, 0x00];
        let script = vec![Step::Chunk(loud), Step::Empty, Step::Empty];
        let (session, _log) = ScriptedSession::new(script, &stop);
        let delegate = Arc::new(RecordingDelegate::default());
        let config = CaptureLoopConfig {
            visualizer_interval: Duration::ZERO,
            ..fast_config()
        };
        let mut capture = armed(session, config);
        capture.set_delegate(delegate.clone());

        let outcome = capture.run(&stop).unwrap();

        let meters = delegate.meters();
        assert!(!meters.is_empty());
        assert_eq!(outcome.stats.redraws, meters.len() as u64);
        let expected = visualizer::redraw_line(32767.0 / 32768.0);
        assert!(meters.iter().all(|line| *line == expected));
    }
}
