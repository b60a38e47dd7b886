use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::Color;
use crate::error::{Error, ErrorKind, Result};
use crate::format::DisplayMode;
use crate::locale::Locale;
use crate::picker::PickerOptions;
use crate::zone::Zone;

const CONFIG_PATH_ENV_VAR: &str = "DATEPICK_CONFIG_FILE";
const DEFAULT_TICK_RATE_MS: u64 = 500;

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("datepick").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".datepick.toml"));
    }

    locations
}

/// Loads the config at `path`, or the first one found in the default
/// locations. Without any config file the defaults are used.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path);
    }

    match find_configfile_locations()
        .into_iter()
        .find(|location| location.is_file())
    {
        Some(location) => Config::from_file(&location),
        None => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Settings of the `[picker]` table. Unset keys keep the picker's defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    pub locale: Option<Locale>,
    pub timezone: Option<Zone>,
    pub week_numbers: Option<bool>,
    pub today_visible: Option<bool>,
    pub display_mode: Option<DisplayMode>,
    pub text_color: Option<Color>,
    pub weekend_color: Option<Color>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    pub auto_close: Option<bool>,
}

impl PickerConfig {
    pub fn apply(&self, options: &mut PickerOptions) {
        if let Some(locale) = self.locale {
            options.locale = locale;
        }
        if let Some(zone) = &self.timezone {
            options.zone = zone.clone();
        }
        if let Some(week_numbers) = self.week_numbers {
            options.week_numbers = week_numbers;
        }
        if let Some(today_visible) = self.today_visible {
            options.today_visible = today_visible;
        }
        if let Some(mode) = self.display_mode {
            options.display_mode = mode;
        }
        if let Some(color) = self.text_color {
            options.text_color = color;
        }
        if let Some(color) = self.weekend_color {
            options.weekend_color = color;
        }
        if let Some(date_format) = &self.date_format {
            options.date_format = Some(date_format.clone());
        }
        if let Some(time_format) = &self.time_format {
            options.time_format = time_format.clone();
        }
        if let Some(auto_close) = self.auto_close {
            options.auto_close = auto_close;
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    tick_rate_ms: u64,
    pub picker: PickerConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            picker: PickerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        log::info!("Loading config from '{}'", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            Error::from(e).with_msg(&format!("Could not read config '{}'", path.display()))
        })?;

        content.parse()
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn picker_options(&self) -> PickerOptions {
        let mut options = PickerOptions::default();
        self.picker.apply(&mut options);
        options
    }
}

impl std::str::FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Config> {
        toml::from_str(s).map_err(|e: toml::de::Error| {
            Error::new(ErrorKind::ConfigParse, &e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tick_rate(), Duration::from_millis(500));
    }

    #[test]
    fn parse_picker_table() {
        let config = Config::from_str(
            r##"
            tick_rate_ms = 250

            [picker]
            locale = "de_DE"
            timezone = "Europe/Berlin"
            week_numbers = true
            display_mode = "date"
            weekend_color = "#aa0000"
            time_format = "%H:%M:%S"
            auto_close = false
            "##,
        )
        .unwrap();

        assert_eq!(config.tick_rate(), Duration::from_millis(250));

        let options = config.picker_options();
        assert_eq!(options.locale.tag(), "de_DE");
        assert_eq!(options.zone.id(), "Europe/Berlin");
        assert!(options.week_numbers);
        assert!(options.today_visible);
        assert_eq!(options.display_mode, DisplayMode::DateOnly);
        assert_eq!(options.text_color, Color::BLACK);
        assert_eq!(options.weekend_color, Color::rgb(0xaa, 0, 0));
        assert_eq!(options.date_format, None);
        assert_eq!(options.time_format, "%H:%M:%S");
        assert!(!options.auto_close);
    }

    #[test]
    fn reject_invalid_values() {
        let err = Config::from_str("[picker]\nlocale = \"xx_YY\"").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigParse));

        assert!(Config::from_str("[picker]\ndisplay_mode = \"week\"").is_err());
        assert!(Config::from_str("[picker]\nunknown = 1").is_err());
    }

    #[test]
    fn load_explicit_file() {
        let path = env::temp_dir().join(format!("datepick-test-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[picker]\nweek_numbers = true").unwrap();

        let config = load_suitable_config(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.picker.week_numbers, Some(true));

        let missing = env::temp_dir().join("datepick-test-missing.toml");
        let err = load_suitable_config(Some(&missing)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IOError(_)));
    }
}
