//! Replays a JSON script of pointer and API events through a headless overlay
//! and prints the resulting layers as JSON.
//!
//! Every dragged arrow is accepted. A script looks like:
//!
//! ```json
//! { "events": [
//!     { "event": "drag", "from": "e2", "to": "e4" },
//!     { "event": "click", "square": "d5" },
//!     { "event": "api_arrow", "from": "g8", "to": "f6", "color": "#ff0000" },
//!     { "event": "clear_user" }
//! ] }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chess_overlay::config::OverlayConfig;
use chess_overlay::error::{ConfigError, ErrorCode, OverlayError};
use chess_overlay::geometry::{Orientation, Point};
use chess_overlay::input::Button;
use chess_overlay::layer::{Element, LayerKind};
use chess_overlay::overlay::{Action, Overlay};
use chess_overlay::square::Square;
use chess_overlay::style::{ArrowStylePatch, CircleStylePatch};
use chess_overlay::surface::{RecordingSurface, SurfaceOp};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot create overlay: {0}")]
    Overlay(#[from] OverlayError),
    #[error("event {index} failed ({code}): {source}")]
    Event { index: usize, code: &'static str, source: OverlayError },
    #[error("event {index}: unknown mouse button code {code}")]
    Button { index: usize, code: i16 },
    #[error("cannot write output: {0}")]
    Output(#[source] serde_json::Error),
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "overlay-replay", about = "Replay a chessboard annotation script headlessly")]
struct Cli {
    /// JSON script of events.
    #[arg(long)]
    script: PathBuf,

    /// JSON overlay config; environment variables are used when absent.
    #[arg(long, env = "OVERLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Backing-store board width (CSS width times the resolution factor),
    /// overriding the config.
    #[arg(long)]
    board_px: Option<f64>,

    /// Also print the paint operations left on the persistent surface.
    #[arg(long)]
    ops: bool,
}

#[derive(Debug, Deserialize)]
struct Script {
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event {
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: i16,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        button: i16,
    },
    Click {
        square: Square,
    },
    Drag {
        from: Square,
        to: Square,
    },
    ApiArrow {
        from: Square,
        to: Square,
        color: Option<String>,
    },
    ApiCircle {
        square: Square,
        color: Option<String>,
    },
    PiecePath {
        squares: Vec<Square>,
        color: String,
    },
    ArrowSettings(ArrowStylePatch),
    CircleSettings(CircleStylePatch),
    Orientation {
        orientation: Orientation,
    },
    ClearUser,
    ClearApi,
    ClearAll,
    Redraw,
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    committed: usize,
    rejected: usize,
    circles_added: usize,
    circles_removed: usize,
}

impl Tally {
    fn record(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::ArrowCommitted { .. } => self.committed += 1,
                Action::ArrowRejected { .. } => self.rejected += 1,
                Action::CircleAdded(_) => self.circles_added += 1,
                Action::CircleRemoved(_) => self.circles_removed += 1,
                Action::RenderNeeded => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    user: &'a [Element],
    api: &'a [Element],
    gestures: &'a Tally,
    #[serde(skip_serializing_if = "Option::is_none")]
    ops: Option<&'a [SurfaceOp]>,
}

type ReplayOverlay = Overlay<RecordingSurface>;

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let raw = fs::read_to_string(&cli.script).map_err(|source| CliError::Read { path: cli.script.clone(), source })?;
    let script: Script = serde_json::from_str(&raw)?;

    let mut overlay = Overlay::from_config(&config, RecordingSurface::new(), RecordingSurface::new())?;
    let mut tally = Tally::default();
    for (index, event) in script.events.into_iter().enumerate() {
        debug!(index, ?event, "replaying event");
        let actions = replay(&mut overlay, index, event)?;
        tally.record(&actions);
    }
    info!(
        user = overlay.layer(LayerKind::User).len(),
        api = overlay.layer(LayerKind::Api).len(),
        "replay finished"
    );

    let report = Report {
        user: overlay.layer(LayerKind::User).elements(),
        api: overlay.layer(LayerKind::Api).elements(),
        gestures: &tally,
        ops: cli.ops.then(|| overlay.persistent().ops()),
    };
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report).map_err(CliError::Output)?;
    writeln!(out)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<OverlayConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.clone(), source })?;
            OverlayConfig::from_json(&raw)?
        }
        None => OverlayConfig::from_env()?,
    };
    if let Some(px) = cli.board_px {
        config.board_px_width = px;
        config.validate()?;
    }
    Ok(config)
}

fn replay(overlay: &mut ReplayOverlay, index: usize, event: Event) -> Result<Vec<Action>, CliError> {
    let failed = |source: OverlayError| CliError::Event { index, code: source.error_code(), source };
    let button = |code: i16| Button::from_dom(code).ok_or(CliError::Button { index, code });
    let accept_all = |_: Square, _: Square| true;

    match event {
        Event::Down { x, y, button: code } => overlay.on_pointer_down(Point::new(x, y), button(code)?).map_err(failed),
        Event::Move { x, y } => overlay.on_pointer_move(Point::new(x, y)).map_err(failed),
        Event::Up { x, y, button: code } => {
            overlay.on_pointer_up(Point::new(x, y), button(code)?, &accept_all).map_err(failed)
        }
        Event::Click { square } => {
            let at = overlay.geometry().square_to_point(square);
            overlay.on_pointer_down(at, Button::Primary).map_err(failed)?;
            overlay.on_pointer_up(at, Button::Primary, &accept_all).map_err(failed)
        }
        Event::Drag { from, to } => {
            let start = overlay.geometry().square_to_point(from);
            let end = overlay.geometry().square_to_point(to);
            overlay.on_pointer_down(start, Button::Primary).map_err(failed)?;
            overlay.on_pointer_move(end).map_err(failed)?;
            overlay.on_pointer_up(end, Button::Primary, &accept_all).map_err(failed)
        }
        Event::ApiArrow { from, to, color } => {
            overlay.draw_arrow_from_to(from, to, color.as_deref()).map_err(failed).map(|()| Vec::new())
        }
        Event::ApiCircle { square, color } => {
            overlay.draw_circle_on(square, color.as_deref()).map_err(failed).map(|()| Vec::new())
        }
        Event::PiecePath { squares, color } => {
            overlay.draw_piece_path(&squares, &color).map_err(failed).map(|()| Vec::new())
        }
        Event::ArrowSettings(patch) => overlay.update_arrow_settings(&patch).map_err(failed).map(|()| Vec::new()),
        Event::CircleSettings(patch) => overlay.update_circle_settings(&patch).map_err(failed).map(|()| Vec::new()),
        Event::Orientation { orientation } => {
            overlay.set_orientation(orientation).map_err(failed).map(|()| Vec::new())
        }
        Event::ClearUser => overlay.clear_user_drawn().map_err(failed).map(|()| Vec::new()),
        Event::ClearApi => overlay.clear_api_drawn().map_err(failed).map(|()| Vec::new()),
        Event::ClearAll => {
            overlay.clear_all();
            Ok(Vec::new())
        }
        Event::Redraw => overlay.redraw().map_err(failed).map(|()| Vec::new()),
    }
}
