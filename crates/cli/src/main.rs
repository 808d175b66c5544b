#![deny(unsafe_code)]
//! CLI binary for the puddle ripple simulation.
//!
//! Subcommands:
//! - `run`: simulate one surface on a virtual (or real) clock, print frames
//! - `config`: print the effective configuration or its schema
//! - `rain on|off|toggle|status`: read or change the persisted rain preference

mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use puddle_core::{PointerEvent, PuddleConfig, SurfaceRect};
use puddle_runtime::frame::render_text;
use puddle_runtime::{
    read_rain_preference, write_rain_preference, JsonFileStore, MemoryStore, Runtime, Target,
    TickOutcome,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "puddle", about = "Text ripple puddle simulation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log filter, e.g. "debug" or "puddle_runtime=trace".
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// JSON configuration file; missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one surface and print the resulting frame.
    Run {
        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640.0)]
        width: f64,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360.0)]
        height: f64,

        /// Simulated time in milliseconds.
        #[arg(long, default_value_t = 5000.0)]
        duration_ms: f64,

        /// Frames offered per simulated second.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Sleep between frames and redraw in place.
        #[arg(long)]
        realtime: bool,

        /// Press at pixel X,Y at time T ms, e.g. "320,180@0". Repeatable.
        #[arg(long = "click", value_name = "X,Y@T")]
        clicks: Vec<String>,

        /// Sweep a hovering pointer across the surface.
        #[arg(long)]
        hover: bool,

        /// Start with rain enabled.
        #[arg(long)]
        rain: bool,

        /// PRNG seed for ambient events.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print every processed frame, not just the last.
        #[arg(long)]
        every_frame: bool,
    },
    /// Print the effective configuration.
    Config {
        /// Print the parameter schema instead.
        #[arg(long)]
        schema: bool,
    },
    /// Read or change the persisted rain preference.
    Rain {
        action: RainAction,

        /// Preference file.
        #[arg(long, default_value = "puddle-prefs.json")]
        prefs: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RainAction {
    On,
    Off,
    Toggle,
    Status,
}

/// A scripted press.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Click {
    x: f64,
    y: f64,
    at_ms: f64,
}

fn parse_click(text: &str) -> Result<Click, CliError> {
    let bad = || CliError::Input(format!("invalid --click '{text}': expected X,Y@T"));
    let (point, at) = text.split_once('@').ok_or_else(bad)?;
    let (x, y) = point.split_once(',').ok_or_else(bad)?;
    let number = |s: &str| s.trim().parse::<f64>().map_err(|_| bad());
    let click = Click {
        x: number(x)?,
        y: number(y)?,
        at_ms: number(at)?,
    };
    if !(click.x.is_finite() && click.y.is_finite() && click.at_ms.is_finite()) {
        return Err(bad());
    }
    Ok(click)
}

/// Hover position at `t_ms`: left to right over the run, swaying vertically.
fn hover_point(width: f64, height: f64, t_ms: f64, duration_ms: f64) -> (f64, f64) {
    let progress = if duration_ms > 0.0 { t_ms / duration_ms } else { 0.0 };
    let sway = (std::f64::consts::TAU * t_ms / 2000.0).sin();
    (width * progress, height * (0.5 + 0.3 * sway))
}

fn load_config(path: Option<&Path>) -> Result<PuddleConfig, CliError> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid config JSON: {e}")))?;
            PuddleConfig::from_json(&value)
        }
        None => PuddleConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Totals over a `run`.
#[derive(Debug, Default, PartialEq)]
struct RunStats {
    frames: usize,
    ticks: usize,
    active_ticks: usize,
    idle_ripples: usize,
    splashes: usize,
    rain_drops: usize,
    lightning_strikes: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &TickOutcome) {
        self.frames += 1;
        let Some(report) = outcome.report() else {
            return;
        };
        self.ticks += 1;
        if report.is_active() {
            self.active_ticks += 1;
        }
        self.idle_ripples += report.ambient.idle_ripples;
        self.splashes += report.ambient.splashes;
        self.rain_drops += report.ambient.rain_drops;
        if report.ambient.lightning.is_some() {
            self.lightning_strikes += 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    config: PuddleConfig,
    width: f64,
    height: f64,
    duration_ms: f64,
    fps: f64,
    realtime: bool,
    clicks: &[Click],
    hover: bool,
    rain: bool,
    seed: u64,
    every_frame: bool,
) -> Result<(RunStats, String, (usize, usize)), CliError> {
    if !(fps > 0.0 && fps.is_finite()) {
        return Err(CliError::Input(format!("--fps must be positive, got {fps}")));
    }
    if !(duration_ms >= 0.0 && duration_ms.is_finite()) {
        return Err(CliError::Input(format!(
            "--duration-ms must be non-negative, got {duration_ms}"
        )));
    }

    let mut runtime = Runtime::new(config, MemoryStore::new(), seed)?;
    let report = runtime.set_surfaces(vec![SurfaceRect::sized(width, height)], 0.0);
    if let Some((_, e)) = report.failures.into_iter().next() {
        return Err(e.into());
    }
    if rain {
        runtime.set_rain_enabled(true, 0.0);
    }

    let mut pending: Vec<Click> = clicks.to_vec();
    pending.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut pending = pending.into_iter().peekable();

    let frame_ms = 1000.0 / fps;
    let frames = (duration_ms / frame_ms).floor() as usize;
    let mut stats = RunStats::default();
    for frame in 0..=frames {
        let now = frame as f64 * frame_ms;
        while let Some(click) = pending.next_if(|c| c.at_ms <= now) {
            let hits = runtime.notify_pointer(Target::All, PointerEvent::press(click.x, click.y), now);
            debug!(x = click.x, y = click.y, now_ms = now, hits, "click");
        }
        if hover {
            let (x, y) = hover_point(width, height, now, duration_ms);
            runtime.notify_pointer(Target::All, PointerEvent::hover(x, y), now);
        }

        let outcomes = runtime.tick(now);
        let Some(outcome) = outcomes.first() else {
            break;
        };
        stats.record(outcome);

        if let Some(driver) = runtime.driver(0) {
            if realtime {
                print!("\x1b[H\x1b[2J{}", render_text(driver.field()));
                std::thread::sleep(Duration::from_secs_f64(frame_ms / 1000.0));
            } else if every_frame && outcome.report().is_some() {
                println!("{}\n", render_text(driver.field()));
            }
        }
    }

    let driver = runtime
        .driver(0)
        .ok_or_else(|| CliError::Input("surface was not bound".into()))?;
    let grid = (driver.geometry().cols, driver.geometry().rows);
    info!(ticks = stats.ticks, active = stats.active_ticks, "run finished");
    Ok((stats, render_text(driver.field()), grid))
}

fn rain_command(action: RainAction, prefs: &Path, json: bool) -> Result<(), CliError> {
    let mut store = JsonFileStore::new(prefs);
    let current = read_rain_preference(&store);
    let enabled = match action {
        RainAction::On => true,
        RainAction::Off => false,
        RainAction::Toggle => !current,
        RainAction::Status => current,
    };
    if !matches!(action, RainAction::Status) {
        write_rain_preference(&mut store, enabled)?;
    }
    if json {
        let info = serde_json::json!({
            "rain_enabled": enabled,
            "prefs": prefs.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("rain: {}", if enabled { "on" } else { "off" });
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config { schema } => {
            let value = if schema {
                PuddleConfig::schema()
            } else {
                serde_json::to_value(load_config(cli.config.as_deref())?)?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Rain { action, prefs } => rain_command(action, &prefs, cli.json)?,
        Command::Run {
            width,
            height,
            duration_ms,
            fps,
            realtime,
            clicks,
            hover,
            rain,
            seed,
            every_frame,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let clicks = clicks
                .iter()
                .map(|c| parse_click(c))
                .collect::<Result<Vec<_>, _>>()?;
            let (stats, frame, (cols, rows)) = simulate(
                config,
                width,
                height,
                duration_ms,
                fps,
                realtime,
                &clicks,
                hover,
                rain,
                seed,
                every_frame,
            )?;

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "cols": cols,
                    "rows": rows,
                    "duration_ms": duration_ms,
                    "seed": seed,
                    "frames": stats.frames,
                    "ticks": stats.ticks,
                    "active_ticks": stats.active_ticks,
                    "idle_ripples": stats.idle_ripples,
                    "splashes": stats.splashes,
                    "rain_drops": stats.rain_drops,
                    "lightning_strikes": stats.lightning_strikes,
                    "frame": frame.lines().collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if realtime {
                println!();
            } else {
                println!("{frame}");
                eprintln!(
                    "{cols}x{rows} cells, {} ticks ({} active), {} drops, {} strikes",
                    stats.ticks, stats.active_ticks, stats.rain_drops, stats.lightning_strikes
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> PuddleConfig {
        let mut cfg = PuddleConfig::default();
        cfg.idle.enabled = false;
        cfg.splash.enabled = false;
        cfg
    }

    // -- Click parsing --

    #[test]
    fn parse_click_reads_point_and_time() {
        assert_eq!(
            parse_click("320,180@250").unwrap(),
            Click {
                x: 320.0,
                y: 180.0,
                at_ms: 250.0
            }
        );
        assert_eq!(parse_click(" 1.5 , 2 @ 0 ").unwrap().x, 1.5);
    }

    #[test]
    fn parse_click_rejects_malformed_input() {
        for text in ["", "10,10", "10@5", "a,b@c", "1,2@inf"] {
            let err = parse_click(text).unwrap_err();
            assert_eq!(err.exit_code(), 12, "{text}");
        }
    }

    // -- Config loading --

    #[test]
    fn load_config_defaults_without_path() {
        assert_eq!(load_config(None).ok(), Some(PuddleConfig::default()));
    }

    #[test]
    fn load_config_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puddle.json");
        std::fs::write(&path, r#"{"pacing": {"frame_interval_ms": 50}}"#).unwrap();
        let cfg = load_config(Some(&path)).ok().unwrap();
        assert_eq!(cfg.pacing.frame_interval_ms, 50.0);
        assert_eq!(cfg.field, PuddleConfig::default().field);
    }

    #[test]
    fn load_config_error_codes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(load_config(Some(&missing)).err().map(|e| e.exit_code()), Some(11));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{").unwrap();
        assert_eq!(load_config(Some(&garbled)).err().map(|e| e.exit_code()), Some(12));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, r#"{"field": {"dampening_ratio": 2}}"#).unwrap();
        assert_eq!(load_config(Some(&invalid)).err().map(|e| e.exit_code()), Some(10));
    }

    // -- Simulation --

    #[test]
    fn click_ripples_and_settles() {
        let click = parse_click("100,100@0").ok().unwrap();
        let (stats, frame, grid) = simulate(
            quiet(), 200.0, 200.0, 30_000.0, 60.0, false, &[click], false, false, 1, false,
        )
        .ok()
        .unwrap();
        assert_eq!(grid, (20, 20));
        assert!(stats.active_ticks > 0);
        assert!(stats.ticks < stats.frames);
        assert!(frame.chars().all(|c| c == ' ' || c == '\n'), "frame not at rest:\n{frame}");
    }

    #[test]
    fn short_run_shows_the_ripple() {
        let click = parse_click("100,100@0").ok().unwrap();
        let (_, frame, _) = simulate(
            quiet(), 200.0, 200.0, 300.0, 60.0, false, &[click], false, false, 1, false,
        )
        .ok()
        .unwrap();
        assert!(frame.chars().any(|c| c != ' ' && c != '\n'));
    }

    #[test]
    fn rain_run_counts_drops() {
        let (stats, _, _) = simulate(
            quiet(), 400.0, 400.0, 10_000.0, 30.0, false, &[], false, true, 3, false,
        )
        .ok()
        .unwrap();
        assert!(stats.rain_drops > 0);
    }

    #[test]
    fn bad_surface_maps_to_simulation_error() {
        let err = simulate(
            quiet(), 0.0, 200.0, 100.0, 60.0, false, &[], false, false, 1, false,
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn bad_fps_is_an_input_error() {
        let err = simulate(
            quiet(), 100.0, 100.0, 100.0, 0.0, false, &[], false, false, 1, false,
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn hover_path_stays_on_surface() {
        for t in [0.0, 500.0, 2500.0, 4999.0] {
            let (x, y) = hover_point(640.0, 360.0, t, 5000.0);
            assert!((0.0..640.0).contains(&x) && (0.0..360.0).contains(&y));
        }
    }

    // -- Rain preference --

    #[test]
    fn rain_command_persists() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = dir.path().join("prefs.json");
        assert!(rain_command(RainAction::Toggle, &prefs, false).is_ok());
        assert!(read_rain_preference(&JsonFileStore::new(&prefs)));
        assert!(rain_command(RainAction::Off, &prefs, true).is_ok());
        assert!(!read_rain_preference(&JsonFileStore::new(&prefs)));
        assert!(rain_command(RainAction::Status, &prefs, false).is_ok());
    }
}
