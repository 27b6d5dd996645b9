//! Renderer contract for consumers of [`FrameData`].
//!
//! A renderer is mounted once, receives every frame through `draw`, is told
//! about agent state changes and is disposed when the host shuts down. The
//! crate ships [`JsonLinesRenderer`], which serializes frames for other
//! processes to draw.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use crate::engine::FrameData;

/// Conversation state of the voice agent the waveform represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    #[default]
    Connecting,
    Initializing,
    Listening,
    Thinking,
    Speaking,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Connecting => "connecting",
            AgentState::Initializing => "initializing",
            AgentState::Listening => "listening",
            AgentState::Thinking => "thinking",
            AgentState::Speaking => "speaking",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait implemented by frame consumers.
pub trait Renderer {
    /// Prepare output resources. Called once before the first `draw`.
    fn mount(&mut self) -> io::Result<()>;

    /// Draw one frame.
    fn draw(&mut self, frame: &FrameData) -> io::Result<()>;

    fn on_state_change(&mut self, state: AgentState) -> io::Result<()>;

    /// Release output resources. Frames drawn afterwards are dropped.
    fn dispose(&mut self) -> io::Result<()>;
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Frame(&'a FrameData),
    State { state: AgentState },
}

/// Writes each frame and state change as one JSON object per line.
///
/// Frame lines carry `"type": "frame"` plus every [`FrameData`] field; state
/// lines are `{"type": "state", "state": "<state>"}`. Output is only
/// produced while mounted.
#[derive(Debug)]
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    mounted: bool,
    state: AgentState,
    frames_written: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            mounted: false,
            state: AgentState::default(),
            frames_written: 0,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Last state passed to `on_state_change`
    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &Line<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn mount(&mut self) -> io::Result<()> {
        self.mounted = true;
        tracing::debug!("json lines renderer mounted");
        Ok(())
    }

    fn draw(&mut self, frame: &FrameData) -> io::Result<()> {
        if !self.mounted {
            return Ok(());
        }
        self.write_line(&Line::Frame(frame))?;
        self.frames_written += 1;
        Ok(())
    }

    fn on_state_change(&mut self, state: AgentState) -> io::Result<()> {
        self.state = state;
        if self.mounted {
            self.write_line(&Line::State { state })?;
        }
        Ok(())
    }

    fn dispose(&mut self) -> io::Result<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        tracing::debug!(frames = self.frames_written, "json lines renderer disposed");
        self.writer.flush()
    }
}
