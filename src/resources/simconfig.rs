//! Simulation configuration resource.
//!
//! Holds every tunable of the simulation. Starts from safe defaults and can be
//! overlaid with values from an INI file. Missing keys keep their current
//! values; malformed ones are reported.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! dt = 0.05
//! max_frame_time = 0.1
//! time_scale = 1
//! gravity = 0.25
//! seed = 7
//!
//! [world]
//! min_y = -20
//! min_z = -25
//! max_z = 120
//!
//! [targets]
//! count = 20
//! columns = 30
//! rows = 20
//! origin = -15, 5, 45
//! depth_jitter = 20
//! respawn_interval = 50
//!
//! [debris]
//! target_fragments = 8
//! shards = 6
//! velocity = 0, 0, 1
//! spread = 3
//!
//! [session]
//! points_per_target = 12
//! shot_cost = 2
//! win_score = 100
//! max_shots = 3
//! shot_recharge = 8
//! time_limit = 300
//! projectile_speed = 4
//!
//! [player]
//! enabled = true
//! min = -1, -0.7, -1
//! max = 1, 1.8, 1
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec3;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

use crate::components::boundingbox::BoundingBox;

const DEFAULT_DT: f32 = 0.05;
const DEFAULT_MAX_FRAME_TIME: f32 = 0.1;
const DEFAULT_GRAVITY: f32 = 0.25;
const DEFAULT_SEED: u64 = 0x5eed;
const DEFAULT_TARGET_COUNT: usize = 20;
const DEFAULT_GRID_COLUMNS: usize = 30;
const DEFAULT_GRID_ROWS: usize = 20;
const DEFAULT_GRID_ORIGIN: Vec3 = Vec3::new(-15.0, 5.0, 45.0);
const DEFAULT_DEPTH_JITTER: u32 = 20;
const DEFAULT_RESPAWN_INTERVAL: f32 = 50.0;
const DEFAULT_CONFIG_PATH: &str = "./shatterbox.ini";

/// Despawn planes. A body is kept while `y > min_y` and `min_z < z < max_z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_y: -20.0,
            min_z: -25.0,
            max_z: 120.0,
        }
    }
}

impl WorldBounds {
    pub fn contains(&self, point: Vec3) -> bool {
        point.y > self.min_y && point.z > self.min_z && point.z < self.max_z
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path:?}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("failed to save config file {path:?}: {message}")]
    Save { path: PathBuf, message: String },
    #[error("invalid value for [{section}] {key}: {message}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        message: String,
    },
    #[error("fixed step must be positive and finite, got {0}")]
    InvalidStep(f32),
    #[error("frame time cap {cap} must be finite and at least one step ({dt})")]
    InvalidFrameCap { cap: f32, dt: f32 },
    #[error("time scale must be finite, got {0}")]
    InvalidTimeScale(f32),
    #[error("spawn grid must have at least one slot, got {columns}x{rows}")]
    EmptyGrid { columns: usize, rows: usize },
    #[error("world bounds are inverted or non-finite: {0:?}")]
    InvalidWorldBounds(WorldBounds),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("player zone is inverted: {0:?}")]
    InvalidPlayerZone(BoundingBox),
}

/// Simulation configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Fixed step length in seconds.
    pub dt: f32,
    /// Cap on scaled frame time accepted per `simulate` call.
    pub max_frame_time: f32,
    pub time_scale: f32,
    /// Downward acceleration (units/s²) for bodies with `gravity` set.
    pub gravity: f32,
    pub seed: u64,
    pub world_bounds: WorldBounds,
    /// Live targets the spawner keeps topping up to.
    pub target_count: usize,
    pub grid_columns: usize,
    pub grid_rows: usize,
    /// World position of grid slot (0, 0) at zero depth.
    pub grid_origin: Vec3,
    /// Targets are pushed back by a random integer in `[0, depth_jitter)`.
    pub depth_jitter: u32,
    pub respawn_interval: f32,
    pub target_fragments: usize,
    pub shards: usize,
    pub debris_velocity: Vec3,
    pub debris_spread: f32,
    pub points_per_target: u32,
    pub shot_cost: u32,
    pub win_score: u32,
    pub max_shots: u32,
    pub shot_recharge: f32,
    /// Round length in seconds. Zero disables the limit.
    pub time_limit: f32,
    pub projectile_speed: f32,
    /// World-space box around the player. `None` disables player hits.
    pub player_zone: Option<BoundingBox>,
    pub config_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            dt: DEFAULT_DT,
            max_frame_time: DEFAULT_MAX_FRAME_TIME,
            time_scale: 1.0,
            gravity: DEFAULT_GRAVITY,
            seed: DEFAULT_SEED,
            world_bounds: WorldBounds::default(),
            target_count: DEFAULT_TARGET_COUNT,
            grid_columns: DEFAULT_GRID_COLUMNS,
            grid_rows: DEFAULT_GRID_ROWS,
            grid_origin: DEFAULT_GRID_ORIGIN,
            depth_jitter: DEFAULT_DEPTH_JITTER,
            respawn_interval: DEFAULT_RESPAWN_INTERVAL,
            target_fragments: 8,
            shards: 6,
            debris_velocity: Vec3::Z,
            debris_spread: 3.0,
            points_per_target: 12,
            shot_cost: 2,
            win_score: 100,
            max_shots: 3,
            shot_recharge: 8.0,
            time_limit: 300.0,
            projectile_speed: 4.0,
            player_zone: Some(BoundingBox::new(
                Vec3::new(-1.0, -0.7, -1.0),
                Vec3::new(1.0, 1.8, 1.0),
            )),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.load(&self.config_path).map_err(|message| ConfigError::Load {
            path: self.config_path.clone(),
            message,
        })?;
        self.apply_ini(&ini)?;
        info!(
            "Loaded config from {:?}: dt={}, cap={}, targets={} on {}x{}, seed={}",
            self.config_path,
            self.dt,
            self.max_frame_time,
            self.target_count,
            self.grid_columns,
            self.grid_rows,
            self.seed
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(|message| ConfigError::Load {
            path: PathBuf::from("<string>"),
            message,
        })?;
        self.apply_ini(&ini)
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        // [simulation]
        if let Some(v) = float(ini, "simulation", "dt")? {
            self.dt = v;
        }
        if let Some(v) = float(ini, "simulation", "max_frame_time")? {
            self.max_frame_time = v;
        }
        if let Some(v) = float(ini, "simulation", "time_scale")? {
            self.time_scale = v;
        }
        if let Some(v) = float(ini, "simulation", "gravity")? {
            self.gravity = v;
        }
        if let Some(v) = uint(ini, "simulation", "seed")? {
            self.seed = v;
        }

        // [world]
        if let Some(v) = float(ini, "world", "min_y")? {
            self.world_bounds.min_y = v;
        }
        if let Some(v) = float(ini, "world", "min_z")? {
            self.world_bounds.min_z = v;
        }
        if let Some(v) = float(ini, "world", "max_z")? {
            self.world_bounds.max_z = v;
        }

        // [targets]
        if let Some(v) = uint(ini, "targets", "count")? {
            self.target_count = v;
        }
        if let Some(v) = uint(ini, "targets", "columns")? {
            self.grid_columns = v;
        }
        if let Some(v) = uint(ini, "targets", "rows")? {
            self.grid_rows = v;
        }
        if let Some(v) = vec3(ini, "targets", "origin")? {
            self.grid_origin = v;
        }
        if let Some(v) = uint(ini, "targets", "depth_jitter")? {
            self.depth_jitter = v;
        }
        if let Some(v) = float(ini, "targets", "respawn_interval")? {
            self.respawn_interval = v;
        }

        // [debris]
        if let Some(v) = uint(ini, "debris", "target_fragments")? {
            self.target_fragments = v;
        }
        if let Some(v) = uint(ini, "debris", "shards")? {
            self.shards = v;
        }
        if let Some(v) = vec3(ini, "debris", "velocity")? {
            self.debris_velocity = v;
        }
        if let Some(v) = float(ini, "debris", "spread")? {
            self.debris_spread = v;
        }

        // [session]
        if let Some(v) = uint(ini, "session", "points_per_target")? {
            self.points_per_target = v;
        }
        if let Some(v) = uint(ini, "session", "shot_cost")? {
            self.shot_cost = v;
        }
        if let Some(v) = uint(ini, "session", "win_score")? {
            self.win_score = v;
        }
        if let Some(v) = uint(ini, "session", "max_shots")? {
            self.max_shots = v;
        }
        if let Some(v) = float(ini, "session", "shot_recharge")? {
            self.shot_recharge = v;
        }
        if let Some(v) = float(ini, "session", "time_limit")? {
            self.time_limit = v;
        }
        if let Some(v) = float(ini, "session", "projectile_speed")? {
            self.projectile_speed = v;
        }

        // [player]
        let enabled = ini
            .getbool("player", "enabled")
            .map_err(|message| invalid("player", "enabled", message))?;
        let min = vec3(ini, "player", "min")?;
        let max = vec3(ini, "player", "max")?;
        if enabled == Some(false) {
            self.player_zone = None;
        } else if min.is_some() || max.is_some() || enabled == Some(true) {
            let current = self.player_zone.unwrap_or(BoundingBox {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            });
            // Corners are taken as given so that validate() can catch an
            // inverted zone instead of silently swapping it.
            self.player_zone = Some(BoundingBox {
                min: min.unwrap_or(current.min),
                max: max.unwrap_or(current.max),
            });
        }

        Ok(())
    }

    /// Save configuration to the INI file at `config_path`.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();

        // [simulation]
        ini.set("simulation", "dt", Some(self.dt.to_string()));
        ini.set("simulation", "max_frame_time", Some(self.max_frame_time.to_string()));
        ini.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        ini.set("simulation", "gravity", Some(self.gravity.to_string()));
        ini.set("simulation", "seed", Some(self.seed.to_string()));

        // [world]
        ini.set("world", "min_y", Some(self.world_bounds.min_y.to_string()));
        ini.set("world", "min_z", Some(self.world_bounds.min_z.to_string()));
        ini.set("world", "max_z", Some(self.world_bounds.max_z.to_string()));

        // [targets]
        ini.set("targets", "count", Some(self.target_count.to_string()));
        ini.set("targets", "columns", Some(self.grid_columns.to_string()));
        ini.set("targets", "rows", Some(self.grid_rows.to_string()));
        ini.set("targets", "origin", Some(format_vec3(self.grid_origin)));
        ini.set("targets", "depth_jitter", Some(self.depth_jitter.to_string()));
        ini.set("targets", "respawn_interval", Some(self.respawn_interval.to_string()));

        // [debris]
        ini.set("debris", "target_fragments", Some(self.target_fragments.to_string()));
        ini.set("debris", "shards", Some(self.shards.to_string()));
        ini.set("debris", "velocity", Some(format_vec3(self.debris_velocity)));
        ini.set("debris", "spread", Some(self.debris_spread.to_string()));

        // [session]
        ini.set("session", "points_per_target", Some(self.points_per_target.to_string()));
        ini.set("session", "shot_cost", Some(self.shot_cost.to_string()));
        ini.set("session", "win_score", Some(self.win_score.to_string()));
        ini.set("session", "max_shots", Some(self.max_shots.to_string()));
        ini.set("session", "shot_recharge", Some(self.shot_recharge.to_string()));
        ini.set("session", "time_limit", Some(self.time_limit.to_string()));
        ini.set("session", "projectile_speed", Some(self.projectile_speed.to_string()));

        // [player]
        ini.set("player", "enabled", Some(self.player_zone.is_some().to_string()));
        if let Some(zone) = self.player_zone {
            ini.set("player", "min", Some(format_vec3(zone.min)));
            ini.set("player", "max", Some(format_vec3(zone.max)));
        }

        ini.write(&self.config_path).map_err(|e| ConfigError::Save {
            path: self.config_path.clone(),
            message: e.to_string(),
        })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidStep(self.dt));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time >= self.dt) {
            return Err(ConfigError::InvalidFrameCap {
                cap: self.max_frame_time,
                dt: self.dt,
            });
        }
        if !self.time_scale.is_finite() {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.grid_columns,
                rows: self.grid_rows,
            });
        }
        let b = self.world_bounds;
        if !(b.min_y.is_finite() && b.min_z.is_finite() && b.max_z.is_finite())
            || b.min_z >= b.max_z
        {
            return Err(ConfigError::InvalidWorldBounds(b));
        }
        for (name, value) in [
            ("projectile_speed", self.projectile_speed),
            ("respawn_interval", self.respawn_interval),
            ("shot_recharge", self.shot_recharge),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("time_limit", self.time_limit),
            ("debris_spread", self.debris_spread),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        for (key, value) in [
            ("points_per_target", self.points_per_target),
            ("shot_cost", self.shot_cost),
            ("win_score", self.win_score),
        ] {
            if i32::try_from(value).is_err() {
                return Err(invalid("session", key, format!("{value} exceeds the score range")));
            }
        }
        if !self.grid_origin.is_finite() {
            return Err(invalid("targets", "origin", "must be finite".to_string()));
        }
        if !self.debris_velocity.is_finite() {
            return Err(invalid("debris", "velocity", "must be finite".to_string()));
        }
        if let Some(zone) = self.player_zone {
            if !(zone.min.is_finite() && zone.max.is_finite()) || zone.min.cmpgt(zone.max).any() {
                return Err(ConfigError::InvalidPlayerZone(zone));
            }
        }
        Ok(())
    }
}

fn invalid(section: &'static str, key: &'static str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        message,
    }
}

fn float(ini: &Ini, section: &'static str, key: &'static str) -> Result<Option<f32>, ConfigError> {
    ini.getfloat(section, key)
        .map(|v| v.map(|v| v as f32))
        .map_err(|message| invalid(section, key, message))
}

/// Unsigned integer narrowed to the field's type. Values that do not fit are
/// rejected rather than truncated.
fn uint<T: TryFrom<u64>>(ini: &Ini, section: &'static str, key: &'static str) -> Result<Option<T>, ConfigError> {
    let Some(v) = ini
        .getuint(section, key)
        .map_err(|message| invalid(section, key, message))?
    else {
        return Ok(None);
    };
    T::try_from(v)
        .map(Some)
        .map_err(|_| invalid(section, key, format!("{v} is out of range")))
}

/// Parse a `x, y, z` triple.
fn vec3(ini: &Ini, section: &'static str, key: &'static str) -> Result<Option<Vec3>, ConfigError> {
    let Some(raw) = ini.get(section, key) else {
        return Ok(None);
    };
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(section, key, format!("{raw:?}: {e}")))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Some(Vec3::new(*x, *y, *z))),
        _ => Err(invalid(
            section,
            key,
            format!("expected three comma-separated numbers, got {raw:?}"),
        )),
    }
}

fn format_vec3(v: Vec3) -> String {
    format!("{}, {}, {}", v.x, v.y, v.z)
}
