use std::{
    collections::VecDeque,
    io::{BufRead as _, BufReader, Write as _},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    encode::sink::SinkConfig,
    foundation::error::{ShowError, ShowResult},
    render::{FrameRGBA, composite::over},
};

const STDERR_TAIL_LINES: usize = 20;

/// A child process fed raw frames on stdin.
///
/// stderr is drained on a thread that keeps only the last lines for error reports.
#[derive(Debug)]
pub(crate) struct FramePipe {
    tool: &'static str,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_tail: Option<JoinHandle<Vec<String>>>,
}

impl FramePipe {
    pub(crate) fn spawn(tool: &'static str, mut cmd: Command) -> ShowResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        tracing::debug!(tool, args = ?cmd.get_args().collect::<Vec<_>>(), "starting frame pipe");

        let mut child = cmd
            .spawn()
            .map_err(|e| ShowError::encode(format!("cannot start {tool} (is it on PATH?): {e}")))?;
        let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ShowError::encode(format!(
                "{tool} started without piped stdio"
            )));
        };

        let stderr_tail = std::thread::spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail)
        });

        Ok(Self {
            tool,
            child,
            stdin: Some(stdin),
            stderr_tail: Some(stderr_tail),
        })
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) -> ShowResult<()> {
        let tool = self.tool;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ShowError::encode(format!("{tool} input is already closed")))?;
        stdin
            .write_all(bytes)
            .map_err(|e| ShowError::encode(format!("{tool} stopped accepting frames: {e}")))
    }

    /// Close stdin and wait; a failing exit status is reported with the tool's last stderr lines.
    pub(crate) fn finish(mut self) -> ShowResult<()> {
        let tool = self.tool;
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| ShowError::encode(format!("waiting for {tool}: {e}")))?;
        let tail = self.take_tail();
        if status.success() {
            return Ok(());
        }
        Err(ShowError::encode(format!(
            "{tool} exited with {status}: {}",
            tail.join(" | ")
        )))
    }

    /// Stop the process without letting it drain buffered input.
    pub(crate) fn kill(mut self) {
        drop(self.stdin.take());
        if let Err(e) = self.child.kill() {
            tracing::debug!(tool = self.tool, error = %e, "process already exited");
        }
        let _ = self.child.wait();
        let _ = self.take_tail();
    }

    fn take_tail(&mut self) -> Vec<String> {
        match self.stderr_tail.take().map(JoinHandle::join) {
            Some(Ok(tail)) => tail,
            Some(Err(_)) => {
                tracing::warn!(tool = self.tool, "stderr reader panicked");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// Per-run frame bookkeeping for pipe-backed sinks: size and tick-order checks, then flattening
/// onto an opaque background (raw `rgba` input to ffmpeg/ffplay is read as straight alpha).
#[derive(Debug)]
pub(crate) struct OpaqueFrames {
    width: u32,
    height: u32,
    background: [u8; 4],
    last_tick: Option<u64>,
    buf: Vec<u8>,
}

impl OpaqueFrames {
    pub(crate) fn new(cfg: &SinkConfig, background: [u8; 3]) -> ShowResult<Self> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ShowError::validation("sink width/height must be non-zero"));
        }
        if cfg.fps.0 == 0 {
            return Err(ShowError::validation("sink fps must be non-zero"));
        }
        Ok(Self {
            width: cfg.width,
            height: cfg.height,
            background: [background[0], background[1], background[2], 255],
            last_tick: None,
            buf: vec![0; cfg.width as usize * cfg.height as usize * 4],
        })
    }

    pub(crate) fn flatten(&mut self, tick: u64, frame: &FrameRGBA) -> ShowResult<&[u8]> {
        if let Some(last) = self.last_tick
            && tick <= last
        {
            return Err(ShowError::encode(format!(
                "frame for tick {tick} arrived after tick {last}"
            )));
        }
        if frame.width != self.width || frame.height != self.height {
            return Err(ShowError::validation(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.buf.len() || !frame.premultiplied {
            return Err(ShowError::validation(
                "frame data must be premultiplied rgba8 of width*height*4 bytes",
            ));
        }

        for (d, s) in self.buf.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
            let px = over(self.background, [s[0], s[1], s[2], s[3]], 255);
            d.copy_from_slice(&px);
        }
        self.last_tick = Some(tick);
        Ok(&self.buf)
    }
}
