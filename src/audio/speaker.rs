use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{Receiver, Sender};
use parking_lot::Mutex;

use super::{ToneEmitter, ToneError, Voice, Wave, duration_to_samples};

/// Slack on top of the tone length before giving up on the audio callback.
const COMPLETION_GRACE: Duration = Duration::from_secs(2);

/// Device buffers to wait out in `finish` so the last tone is not cut off.
const DRAIN_BUFFERS: u32 = 2;

/// Plays tones on the default output device.
///
/// The stream is opened once and renders silence between tones; `play`
/// hands a new tone to the callback and waits for it to report completion.
pub struct SpeakerEmitter {
    _stream: cpal::Stream,
    voice: Arc<Mutex<Voice>>,
    done_rx: Receiver<()>,
    error_rx: Receiver<String>,
    /// Frames in the most recent callback buffer.
    buffer_frames: Arc<AtomicUsize>,
    sample_rate: f32,
}

impl SpeakerEmitter {
    pub fn new(wave: Wave, volume: f32) -> Result<Self, ToneError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(ToneError::NoOutputDevice)?;
        let config = device.default_output_config()?;
        let stream_config: cpal::StreamConfig = config.into();

        let num_channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate as f32;
        tracing::info!("Audio output: {} channels, {} Hz", num_channels, sample_rate);

        let voice = Arc::new(Mutex::new(Voice::new(wave, volume)));
        let (done_tx, done_rx) = crossbeam::channel::bounded(1);
        let (error_tx, error_rx) = crossbeam::channel::unbounded();

        let buffer_frames = Arc::new(AtomicUsize::new(0));

        let voice_audio = voice.clone();
        let frames_audio = buffer_frames.clone();
        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                frames_audio.store(data.len() / num_channels.max(1), Ordering::Relaxed);
                audio_callback(data, num_channels, &voice_audio, &done_tx);
            },
            move |err| {
                tracing::error!("Audio error: {}", err);
                let _ = error_tx.send(err.to_string());
            },
            None,
        )?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            voice,
            done_rx,
            error_rx,
            buffer_frames,
            sample_rate,
        })
    }
}

fn drain_time(buffer_frames: usize, sample_rate: f32) -> Duration {
    let rate = sample_rate as u64;
    if rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(buffer_frames as u64 * 1_000_000_000 / rate) * DRAIN_BUFFERS
}

fn audio_callback(
    data: &mut [f32],
    num_channels: usize,
    voice: &Mutex<Voice>,
    done_tx: &Sender<()>,
) {
    let mut voice = voice.lock();
    let was_playing = !voice.is_finished();

    for frame in data.chunks_mut(num_channels.max(1)) {
        let sample = voice.render_sample();
        frame.fill(sample);
    }

    if was_playing && voice.is_finished() {
        let _ = done_tx.try_send(());
    }
}

impl ToneEmitter for SpeakerEmitter {
    fn play(&mut self, frequency: u32, duration: Duration) -> Result<(), ToneError> {
        let total_samples = duration_to_samples(duration, self.sample_rate);
        if total_samples == 0 {
            return Ok(());
        }

        // a tone that timed out earlier may still signal
        while self.done_rx.try_recv().is_ok() {}

        tracing::debug!("Speaker tone {} Hz for {:?}", frequency, duration);
        self.voice
            .lock()
            .start(frequency, total_samples, self.sample_rate);

        crossbeam::select! {
            recv(self.done_rx) -> done => {
                done.map_err(|_| ToneError::Stream("audio callback stopped".into()))
            }
            recv(self.error_rx) -> err => Err(ToneError::Stream(
                err.unwrap_or_else(|_| "error channel closed".into()),
            )),
            default(duration.saturating_add(COMPLETION_GRACE)) => {
                Err(ToneError::Timeout(duration))
            }
        }
    }

    /// Waits for the samples already handed to the device to be heard.
    fn finish(&mut self) -> Result<(), ToneError> {
        let frames = self.buffer_frames.load(Ordering::Relaxed);
        let drain = drain_time(frames, self.sample_rate);
        tracing::debug!("Draining output for {:?}", drain);
        std::thread::sleep(drain);

        match self.error_rx.try_recv() {
            Ok(err) => Err(ToneError::Stream(err)),
            Err(_) => Ok(()),
        }
    }
}
