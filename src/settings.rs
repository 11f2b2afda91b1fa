use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

/// Names a JSON settings file; individual `SCANWARD_*` variables override it.
pub const CONFIG_ENV: &str = "SCANWARD_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StationSettings {
    pub camera_index: u32,
    /// Append logins and scans here as JSON lines.
    pub journal_path: Option<PathBuf>,
    pub udp_port: u16,
    /// Scripted capture in place of a camera.
    pub replay_path: Option<PathBuf>,
    pub replay_frame_interval_ms: u64,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            journal_path: None,
            udp_port: 5005,
            replay_path: None,
            replay_frame_interval_ms: 33,
        }
    }
}

impl StationSettings {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.udp_port)
    }

    pub fn replay_frame_interval(&self) -> Duration {
        Duration::from_millis(self.replay_frame_interval_ms)
    }

    fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        override_from(lookup, "SCANWARD_CAMERA", &mut self.camera_index)?;
        override_optional(lookup, "SCANWARD_JOURNAL", &mut self.journal_path)?;
        override_from(lookup, "SCANWARD_UDP_PORT", &mut self.udp_port)?;
        override_optional(lookup, "SCANWARD_REPLAY", &mut self.replay_path)?;
        override_from(lookup, "SCANWARD_REPLAY_INTERVAL_MS", &mut self.replay_frame_interval_ms)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorSettings {
    /// BCM numbering throughout.
    pub beam_pin: u8,
    pub dout_pin: u8,
    pub sck_pin: u8,
    /// Raw HX711 counts per gram.
    pub reference_unit: f64,
    pub threshold_grams: f64,
    /// Unicast destination; `None` broadcasts.
    pub host: Option<String>,
    pub port: u16,
    pub cooldown_secs: f64,
    pub poll_interval_ms: u64,
    /// Use the simulated beam and scale instead of GPIO.
    pub simulate: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            beam_pin: 17,
            dout_pin: 5,
            sck_pin: 6,
            reference_unit: 1.0,
            threshold_grams: 50.0,
            host: None,
            port: 5005,
            cooldown_secs: 3.0,
            poll_interval_ms: 50,
            simulate: false,
        }
    }
}

impl MonitorSettings {
    pub fn cooldown(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.cooldown_secs)
            .with_context(|| format!("cooldown_secs out of range: {}", self.cooldown_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        override_from(lookup, "SCANWARD_BEAM_PIN", &mut self.beam_pin)?;
        override_from(lookup, "SCANWARD_DOUT_PIN", &mut self.dout_pin)?;
        override_from(lookup, "SCANWARD_SCK_PIN", &mut self.sck_pin)?;
        override_from(lookup, "SCANWARD_REF_UNIT", &mut self.reference_unit)?;
        override_from(lookup, "SCANWARD_THRESHOLD_G", &mut self.threshold_grams)?;
        override_optional(lookup, "SCANWARD_HOST", &mut self.host)?;
        override_from(lookup, "SCANWARD_PORT", &mut self.port)?;
        override_from(lookup, "SCANWARD_COOLDOWN_SECS", &mut self.cooldown_secs)?;
        override_from(lookup, "SCANWARD_POLL_MS", &mut self.poll_interval_ms)?;
        if let Some(value) = lookup("SCANWARD_SIMULATE") {
            self.simulate = value == "1" || value.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.reference_unit.is_finite() || self.reference_unit == 0.0 {
            bail!("reference_unit must be a non-zero number");
        }
        if !self.threshold_grams.is_finite() {
            bail!("threshold_grams must be finite");
        }
        self.cooldown()?;
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct SettingsFile {
    station: StationSettings,
    monitor: MonitorSettings,
}

impl SettingsFile {
    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(CONFIG_ENV) {
            Some(path) => Self::read(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn override_from<T>(lookup: &dyn Fn(&str) -> Option<String>, name: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {value:?}"))?;
    }
    Ok(())
}

/// An empty value clears the option.
fn override_optional<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    target: &mut Option<T>,
) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(value) = lookup(name) {
        let value = value.trim();
        *target = if value.is_empty() {
            None
        } else {
            Some(
                value
                    .parse()
                    .with_context(|| format!("invalid value for {name}: {value:?}"))?,
            )
        };
    }
    Ok(())
}

pub fn load_station_settings() -> Result<StationSettings> {
    station_settings_from(&process_env)
}

pub fn load_monitor_settings() -> Result<MonitorSettings> {
    monitor_settings_from(&process_env)
}

fn station_settings_from(lookup: &dyn Fn(&str) -> Option<String>) -> Result<StationSettings> {
    let mut settings = SettingsFile::from_lookup(lookup)?.station;
    settings.apply_overrides(lookup)?;
    Ok(settings)
}

fn monitor_settings_from(lookup: &dyn Fn(&str) -> Option<String>) -> Result<MonitorSettings> {
    let mut settings = SettingsFile::from_lookup(lookup)?.monitor;
    settings.apply_overrides(lookup)?;
    settings.validate()?;
    Ok(settings)
}
