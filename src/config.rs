//! Overlay configuration from defaults, environment variables, or JSON.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_API_COLOUR, DEFAULT_BOARD_PX, DEFAULT_RES_FACTOR, DEFAULT_USER_COLOUR, OPAQUE};
use crate::error::ConfigError;
use crate::geometry::Orientation;
use crate::style::{ArrowStyle, CircleStyle};

pub const ENV_BOARD_PX: &str = "OVERLAY_BOARD_PX";
pub const ENV_RES_FACTOR: &str = "OVERLAY_RES_FACTOR";
pub const ENV_API_COLOUR: &str = "OVERLAY_API_COLOUR";
pub const ENV_USER_COLOUR: &str = "OVERLAY_USER_COLOUR";
pub const ENV_ORIENTATION: &str = "OVERLAY_ORIENTATION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Backing-store width of the board canvas: CSS width times `res_factor`.
    pub board_px_width: f64,
    /// Canvas backing-store multiplier.
    pub res_factor: f64,
    /// Colour for programmatic draws that do not name one.
    pub api_colour: String,
    /// Colour the default user styles are seeded with.
    pub user_colour: String,
    pub arrow: ArrowStyle,
    pub circle: CircleStyle,
    pub orientation: Orientation,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            board_px_width: DEFAULT_BOARD_PX,
            res_factor: DEFAULT_RES_FACTOR,
            api_colour: DEFAULT_API_COLOUR.to_owned(),
            user_colour: DEFAULT_USER_COLOUR.to_owned(),
            arrow: ArrowStyle::default(),
            circle: CircleStyle::default(),
            orientation: Orientation::White,
        }
    }
}

impl OverlayConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Optional:
    /// - `OVERLAY_BOARD_PX`: backing-store width (default 1440)
    /// - `OVERLAY_RES_FACTOR`: resolution multiplier (default 3)
    /// - `OVERLAY_API_COLOUR`: default `#007bff`
    /// - `OVERLAY_USER_COLOUR`: default `#ffeb3b`; also recolours both styles
    /// - `OVERLAY_ORIENTATION`: `white` (default) or `black`
    ///
    /// # Errors
    ///
    /// Returns `Parse` for a value that does not parse, or `Invalid` if the
    /// result fails [`OverlayConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`OverlayConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`OverlayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_BOARD_PX) {
            config.board_px_width = parse_f64(ENV_BOARD_PX, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RES_FACTOR) {
            config.res_factor = parse_f64(ENV_RES_FACTOR, &raw)?;
        }
        if let Some(raw) = lookup(ENV_API_COLOUR) {
            config.api_colour = raw.trim().to_owned();
        }
        if let Some(raw) = lookup(ENV_USER_COLOUR) {
            config = config.with_user_colour(raw.trim());
        }
        if let Some(raw) = lookup(ENV_ORIENTATION) {
            config.orientation = parse_orientation(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON object; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input, or `Invalid` if the result fails
    /// [`OverlayConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the user colour and recolour both user styles with it.
    #[must_use]
    pub fn with_user_colour(mut self, colour: &str) -> Self {
        colour.clone_into(&mut self.user_colour);
        colour.clone_into(&mut self.arrow.color);
        colour.clone_into(&mut self.circle.color);
        self
    }

    /// # Errors
    ///
    /// Returns `Invalid` for a non-positive or non-finite board width or
    /// resolution factor, negative stroke sizes, opacity above 100, or an
    /// empty colour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.board_px_width.is_finite() && self.board_px_width > 0.0) {
            return Err(invalid(format!("board_px_width must be positive, got {}", self.board_px_width)));
        }
        if !(self.res_factor.is_finite() && self.res_factor > 0.0) {
            return Err(invalid(format!("res_factor must be positive, got {}", self.res_factor)));
        }
        if self.arrow.width < 0.0 || self.arrow.head_size < 0.0 || self.circle.thickness < 0.0 {
            return Err(invalid("stroke sizes must not be negative".to_owned()));
        }
        if self.arrow.opacity > OPAQUE || self.circle.opacity > OPAQUE {
            return Err(invalid(format!("opacity must be at most {OPAQUE}")));
        }
        let colours = [&self.api_colour, &self.user_colour, &self.arrow.color, &self.circle.color];
        if colours.iter().any(|c| c.is_empty()) {
            return Err(invalid("colours must not be empty".to_owned()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

fn parse_f64(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim().parse::<f64>().map_err(|_| ConfigError::Parse { key, value: raw.to_owned() })
}

fn parse_orientation(raw: &str) -> Result<Orientation, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "white" => Ok(Orientation::White),
        "black" => Ok(Orientation::Black),
        _ => Err(ConfigError::Parse { key: ENV_ORIENTATION, value: raw.to_owned() }),
    }
}
