use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use emotive_waveform::audio::{CaptureSource, SpectrumAnalyser, WavCapture};
use emotive_waveform::config::AppConfig;
use emotive_waveform::engine::{EngineEvent, WaveformEngine};
use emotive_waveform::render::{AgentState, JsonLinesRenderer, Renderer};
use emotive_waveform::EmotionType;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "waveform_cli",
    about = "Run the emotive waveform pipeline over recorded audio"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Fall back to defaults (with a warning) when the config file is
    /// unreadable or invalid instead of failing
    #[arg(long, global = true, requires = "config")]
    lenient_config: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a WAV file frame by frame
    Analyze {
        wav: PathBuf,
        /// Frames per second (overrides the configured animation fps)
        #[arg(long)]
        fps: Option<u32>,
        /// Print a summary report instead of one JSON line per frame
        #[arg(long)]
        summary: bool,
        /// Force an emotion instead of detecting it
        #[arg(long)]
        emotion: Option<EmotionType>,
        /// Write output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Dump the preset registry as JSON
    Presets,
    /// Print the effective configuration as JSON
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.lenient_config)?;

    match cli.command {
        Commands::Analyze {
            wav,
            fps,
            summary,
            emotion,
            output,
        } => run_analyze(config, &wav, fps, summary, emotion, output),
        Commands::Presets => run_presets(config),
        Commands::Config => run_config(&config),
    }
}

fn load_config(path: Option<&Path>, lenient: bool) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    if lenient {
        return Ok(AppConfig::load_from_file(path));
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = AppConfig::from_json_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(config)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run_analyze(
    config: AppConfig,
    wav: &Path,
    fps: Option<u32>,
    summary: bool,
    emotion: Option<EmotionType>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let fps = fps.unwrap_or(config.animation.fps);
    if fps == 0 {
        bail!("fps must be greater than zero");
    }

    let mut capture =
        WavCapture::open(wav).with_context(|| format!("loading {}", wav.display()))?;
    let mut analyser = SpectrumAnalyser::new(capture.sample_rate(), &config.audio)
        .context("creating spectrum analyser")?;
    let mut engine = WaveformEngine::new(config).context("creating waveform engine")?;
    engine
        .connect_capture(analyser.sample_rate())
        .context("connecting capture")?;
    if let Some(emotion) = emotion {
        engine.set_manual_emotion(emotion);
    }

    let hop = (capture.sample_rate() / fps).max(1) as usize;
    let dt_ms = 1000.0 / fps as f64;
    let mut report = SummaryReport::new(wav, capture.sample_rate(), fps);

    let mut renderer = JsonLinesRenderer::new(open_output(output.as_deref())?);
    if !summary {
        renderer.mount().context("mounting renderer")?;
        renderer.on_state_change(AgentState::Listening)?;
    }

    let mut index = 0u64;
    while let Some(chunk) = capture.next_chunk(hop) {
        analyser.process(chunk);
        let timestamp_ms = index as f64 * dt_ms;
        let frame = engine.process_frame(Some(analyser.snapshot()), timestamp_ms, dt_ms);

        for event in engine.drain_events() {
            report.record_event(&event);
        }
        report.record_frame(frame.emotion.emotion, frame.shape.amplitude);
        renderer.draw(&frame).context("writing frame")?;
        index += 1;
    }

    tracing::info!(frames = index, "analysis finished");

    if summary {
        let mut writer = renderer.into_inner();
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
        writer.flush()?;
    } else {
        renderer.dispose().context("flushing output")?;
    }

    Ok(ExitCode::from(0))
}

fn run_presets(config: AppConfig) -> Result<ExitCode> {
    let engine = WaveformEngine::new(config).context("creating waveform engine")?;
    let json = serde_json::to_string_pretty(engine.presets().presets())?;
    println!("{json}");
    Ok(ExitCode::from(0))
}

fn run_config(config: &AppConfig) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct SummaryReport {
    file: String,
    sample_rate: u32,
    fps: u32,
    frame_count: u64,
    duration_ms: f64,
    mean_amplitude: f32,
    /// Frames spent in each emotion
    emotions: BTreeMap<EmotionType, u64>,
    transitions: Vec<Transition>,
    #[serde(skip)]
    amplitude_sum: f64,
}

#[derive(Serialize)]
struct Transition {
    frame: u64,
    from: EmotionType,
    to: EmotionType,
}

impl SummaryReport {
    fn new(path: &Path, sample_rate: u32, fps: u32) -> Self {
        Self {
            file: path.display().to_string(),
            sample_rate,
            fps,
            frame_count: 0,
            duration_ms: 0.0,
            mean_amplitude: 0.0,
            emotions: BTreeMap::new(),
            transitions: Vec::new(),
            amplitude_sum: 0.0,
        }
    }

    fn record_event(&mut self, event: &EngineEvent) {
        if let EngineEvent::EmotionChange { from, to } = event {
            self.transitions.push(Transition {
                frame: self.frame_count,
                from: *from,
                to: *to,
            });
        }
    }

    fn record_frame(&mut self, emotion: EmotionType, amplitude: f32) {
        *self.emotions.entry(emotion).or_insert(0) += 1;
        self.frame_count += 1;
        self.amplitude_sum += amplitude as f64;
        self.mean_amplitude = (self.amplitude_sum / self.frame_count as f64) as f32;
        self.duration_ms = self.frame_count as f64 * 1000.0 / self.fps as f64;
    }
}
