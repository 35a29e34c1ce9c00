use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::capture::format::{Container, FfmpegCapabilities, FormatSupport, RecorderFormat};
use crate::capture::recorder::{Recorder, RecorderFactory, RecorderSettings, RecorderState};
use crate::foundation::core::Fps;
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Size of the chunks the finished container is split into.
const CHUNK_BYTES: usize = 1 << 20;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

type StderrDrain = std::thread::JoinHandle<std::io::Result<Vec<u8>>>;

/// Recorder that streams raw frames into the system `ffmpeg`.
///
/// Video is encoded while recording; audio is spooled to a raw `f32le` file and muxed in when the
/// recorder stops. The finished container is read back and returned as chunks.
pub struct FfmpegRecorder {
    format: RecorderFormat,
    settings: RecorderSettings,
    state: RecorderState,
    bg_rgba: [u8; 4],

    work_dir: PathBuf,
    stem: String,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,
    audio: Option<BufWriter<std::fs::File>>,
    audio_samples: u64,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for FfmpegRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegRecorder")
            .field("format", &self.format.mime)
            .field("state", &self.state)
            .field("stem", &self.stem)
            .finish()
    }
}

impl FfmpegRecorder {
    /// Validate `settings` for `format` and prepare temporary file names under `work_dir`.
    pub fn new(
        format: RecorderFormat,
        settings: RecorderSettings,
        work_dir: impl Into<PathBuf>,
    ) -> ScrollResult<Self> {
        if settings.fps.num == 0 || settings.fps.den == 0 {
            return Err(ScrollError::validation("fps must be non-zero"));
        }
        if settings.width == 0 || settings.height == 0 {
            return Err(ScrollError::validation("recorder width/height must be non-zero"));
        }
        if !settings.width.is_multiple_of(2) || !settings.height.is_multiple_of(2) {
            return Err(ScrollError::validation(
                "recorder width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(ScrollError::export(
                "ffmpeg is required for recording, but was not found on PATH",
            ));
        }
        let stem = format!(
            "scrollvision_rec_{}_{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        );
        Ok(Self {
            format,
            settings,
            state: RecorderState::Inactive,
            bg_rgba: [0, 0, 0, 255],
            work_dir: work_dir.into(),
            stem,
            child: None,
            stdin: None,
            stderr_drain: None,
            audio: None,
            audio_samples: 0,
            scratch: Vec::new(),
        })
    }

    fn temp_path(&self, suffix: &str) -> PathBuf {
        self.work_dir.join(format!("{}.{suffix}", self.stem))
    }

    fn video_path(&self) -> PathBuf {
        self.temp_path(&format!("video.{}", self.format.extension()))
    }

    fn audio_path(&self) -> PathBuf {
        self.temp_path("audio.f32le")
    }

    fn output_path(&self) -> PathBuf {
        self.temp_path(self.format.extension())
    }

    fn video_codec_args(&self) -> Vec<String> {
        let bitrate = self.settings.video_bits_per_second.to_string();
        let mut args = vec![
            "-an".to_owned(),
            "-c:v".to_owned(),
            self.format.video_encoder.to_owned(),
            "-b:v".to_owned(),
            bitrate,
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
        ];
        if self.format.container == Container::Mp4 {
            args.extend(["-movflags".to_owned(), "+faststart".to_owned()]);
        }
        args
    }

    fn finish_video(&mut self) -> ScrollResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| ScrollError::export(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = join_drain(self.stderr_drain.take())?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ScrollError::export(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn mux_audio(&self, video: &Path, audio: &Path, out: &Path) -> ScrollResult<()> {
        let rate = self.settings.sample_rate.to_string();
        let audio_bitrate = self.settings.audio_bits_per_second.to_string();
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(video)
            .args([
                "-f",
                "f32le",
                "-ar",
                rate.as_str(),
                "-ac",
                "2",
                "-i",
            ])
            .arg(audio)
            .args([
                "-c:v",
                "copy",
                "-c:a",
                self.format.audio_encoder,
                "-b:a",
                audio_bitrate.as_str(),
            ]);
        if self.format.container == Container::Mp4 {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(out);
        let output = cmd
            .output()
            .map_err(|e| ScrollError::export(format!("failed to spawn ffmpeg for muxing: {e}")))?;
        if !output.status.success() {
            return Err(ScrollError::export(format!(
                "ffmpeg mux exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    fn cleanup(&self) {
        for path in [self.video_path(), self.audio_path(), self.output_path()] {
            if path.exists()
                && let Err(e) = std::fs::remove_file(&path)
            {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to remove recorder temp file"
                );
            }
        }
    }
}

impl Recorder for FfmpegRecorder {
    fn format(&self) -> RecorderFormat {
        self.format
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn start(&mut self) -> ScrollResult<()> {
        if self.state != RecorderState::Inactive {
            return Err(ScrollError::export("recorder was already started"));
        }
        std::fs::create_dir_all(&self.work_dir).with_context(|| {
            format!("failed to create recorder work directory '{}'", self.work_dir.display())
        })?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // ffmpeg does not understand premultiplied input; frames are flattened in push_video.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", self.settings.width, self.settings.height),
        ]);
        push_input_fps(&mut cmd, self.settings.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args(self.video_codec_args());
        cmd.arg(self.video_path());

        let mut child = cmd.spawn().map_err(|e| {
            ScrollError::export(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScrollError::export("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ScrollError::export("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let audio_path = self.audio_path();
        let audio_file = std::fs::File::create(&audio_path)
            .with_context(|| format!("failed to create audio spool '{}'", audio_path.display()))?;

        self.scratch = vec![0u8; (self.settings.width * self.settings.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.audio = Some(BufWriter::new(audio_file));
        self.audio_samples = 0;
        self.state = RecorderState::Recording;
        tracing::debug!(mime = self.format.mime, stem = %self.stem, "ffmpeg recorder started");
        Ok(())
    }

    fn push_video(&mut self, frame: &FrameRGBA) -> ScrollResult<()> {
        if self.state != RecorderState::Recording {
            return Err(ScrollError::export("recorder is not recording"));
        }
        if frame.width != self.settings.width || frame.height != self.settings.height {
            return Err(ScrollError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.settings.width, self.settings.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ScrollError::validation("frame.data size mismatch with width*height*4"));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ScrollError::export("recorder is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| {
                ScrollError::export(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        Ok(())
    }

    fn push_audio(&mut self, interleaved: &[f32]) -> ScrollResult<()> {
        if self.state != RecorderState::Recording {
            return Err(ScrollError::export("recorder is not recording"));
        }
        let Some(audio) = self.audio.as_mut() else {
            return Err(ScrollError::export("recorder is already finalized"));
        };
        for s in interleaved {
            audio
                .write_all(&s.to_le_bytes())
                .context("failed to write audio spool")?;
        }
        self.audio_samples += interleaved.len() as u64;
        Ok(())
    }

    fn stop(&mut self) -> ScrollResult<Vec<Vec<u8>>> {
        if self.state != RecorderState::Recording {
            self.state = RecorderState::Stopped;
            return Ok(Vec::new());
        }
        self.state = RecorderState::Stopped;

        let result = (|| -> ScrollResult<Vec<Vec<u8>>> {
            if let Some(mut audio) = self.audio.take() {
                audio.flush().context("failed to flush audio spool")?;
            }
            self.finish_video()?;

            let video = self.video_path();
            let out = self.output_path();
            if self.audio_samples > 0 {
                self.mux_audio(&video, &self.audio_path(), &out)?;
            } else {
                std::fs::rename(&video, &out)
                    .with_context(|| format!("failed to move '{}' into place", video.display()))?;
            }
            let bytes = std::fs::read(&out)
                .with_context(|| format!("failed to read recording '{}'", out.display()))?;
            Ok(bytes.chunks(CHUNK_BYTES).map(<[u8]>::to_vec).collect())
        })();

        self.cleanup();
        if let Err(e) = &result {
            tracing::error!(error = %e, "ffmpeg recorder failed to finalize");
        }
        result
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        drop(self.audio.take());
        if self.state != RecorderState::Inactive {
            self.cleanup();
        }
    }
}

/// Factory for [`FfmpegRecorder`]s, probing encoders once.
#[derive(Debug)]
pub struct FfmpegRecorderFactory {
    caps: FfmpegCapabilities,
    work_dir: PathBuf,
}

impl FfmpegRecorderFactory {
    /// Probe `ffmpeg -encoders`; recorders spool into `work_dir`.
    pub fn probe(work_dir: impl Into<PathBuf>) -> ScrollResult<Self> {
        Ok(Self {
            caps: FfmpegCapabilities::probe()?,
            work_dir: work_dir.into(),
        })
    }

    /// Factory over already known capabilities.
    pub fn with_capabilities(caps: FfmpegCapabilities, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            caps,
            work_dir: work_dir.into(),
        }
    }
}

impl RecorderFactory for FfmpegRecorderFactory {
    fn support(&self) -> &dyn FormatSupport {
        &self.caps
    }

    fn create(
        &self,
        format: RecorderFormat,
        settings: &RecorderSettings,
    ) -> ScrollResult<Box<dyn Recorder>> {
        Ok(Box::new(FfmpegRecorder::new(format, *settings, self.work_dir.clone())?))
    }
}

fn join_drain(handle: Option<StderrDrain>) -> ScrollResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| ScrollError::export("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| ScrollError::export(format!("ffmpeg stderr read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ScrollResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ScrollError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    let bg = [u16::from(bg_rgba[0]), u16::from(bg_rgba[1]), u16::from(bg_rgba[2])];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
