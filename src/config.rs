use chrono::Weekday;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use unsegen::input::Key;

use crate::cmds::Cmd;
use crate::date::{CalendarDate, RawDate};
use crate::dialog::DialogOptions;
use crate::error::{Error, ErrorKind, Result};
use crate::limiter::DefaultDateRangeLimiter;

pub type KeyMap = HashMap<Key, Cmd>;

const CONFIG_PATH_ENV_VAR: &str = "CALPICK_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("calpick").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".calpick.toml"));
    }

    locations
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|err| {
        Error::from(err).with_msg(&format!("Could not read '{}'", path.display()))
    })?;
    Config::from_str(&content)
}

/// Loads `path` if given, otherwise the first config file found in the
/// default locations. Falls back to the default config if there is none.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Using config file '{}'", path.display());
        return load_config(path);
    }

    for location in find_configfile_locations() {
        if location.is_file() {
            log::info!("Using config file '{}'", location.display());
            return load_config(&location);
        }
        log::debug!("No config file at '{}'", location.display());
    }

    log::info!("No config file found, using defaults");
    Ok(Config::default())
}

/// Parses a key name such as `j`, `enter`, `ctrl-c` or `pagedown`.
pub fn parse_key(name: &str) -> Result<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Key::Char(c));
    }

    let lower = name.to_lowercase();
    let modified = |prefix: &str| {
        let head = name.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let mut chars = name[prefix.len()..].chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };

    let key = match lower.as_str() {
        "enter" | "return" => Key::Char('\n'),
        "space" => Key::Char(' '),
        "tab" => Key::Char('\t'),
        "esc" | "escape" => Key::Esc,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        _ => {
            if let Some(c) = modified("ctrl-") {
                Key::Ctrl(c)
            } else if let Some(c) = modified("alt-") {
                Key::Alt(c)
            } else {
                return Err(Error::new(
                    ErrorKind::ConfigParse,
                    &format!("unknown key '{}'", name),
                ));
            }
        }
    };

    Ok(key)
}

fn default_host_keys() -> KeyMap {
    let mut key_map = HashMap::new();

    key_map.insert(Key::Char('\n'), Cmd::OpenDialog);
    key_map.insert(Key::Char(' '), Cmd::OpenDialog);
    key_map.insert(Key::Char('o'), Cmd::OpenDialog);
    key_map.insert(Key::Char('q'), Cmd::Exit);

    key_map
}

fn default_dialog_keys() -> KeyMap {
    let mut key_map = HashMap::new();

    key_map.insert(Key::Char('l'), Cmd::NextDay);
    key_map.insert(Key::Right, Cmd::NextDay);
    key_map.insert(Key::Char('h'), Cmd::PrevDay);
    key_map.insert(Key::Left, Cmd::PrevDay);
    key_map.insert(Key::Char('j'), Cmd::NextWeek);
    key_map.insert(Key::Down, Cmd::NextWeek);
    key_map.insert(Key::Char('k'), Cmd::PrevWeek);
    key_map.insert(Key::Up, Cmd::PrevWeek);
    key_map.insert(Key::Char('n'), Cmd::NextMonth);
    key_map.insert(Key::PageDown, Cmd::NextMonth);
    key_map.insert(Key::Char('p'), Cmd::PrevMonth);
    key_map.insert(Key::PageUp, Cmd::PrevMonth);
    key_map.insert(Key::Char('N'), Cmd::NextYear);
    key_map.insert(Key::Char('P'), Cmd::PrevYear);
    key_map.insert(Key::Char('t'), Cmd::Today);
    key_map.insert(Key::Char('y'), Cmd::ToggleYearView);
    key_map.insert(Key::Char('\n'), Cmd::Confirm);
    key_map.insert(Key::Esc, Cmd::Cancel);
    key_map.insert(Key::Char('q'), Cmd::Cancel);
    key_map.insert(Key::Char(':'), Cmd::CommandMode);

    key_map
}

fn merge_keys(mut key_map: KeyMap, overrides: &HashMap<String, Cmd>) -> Result<KeyMap> {
    for (name, cmd) in overrides {
        key_map.insert(parse_key(name)?, *cmd);
    }
    Ok(key_map)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialogConfig {
    pub initial: Option<RawDate>,
    pub title: Option<String>,
    pub ok_text: Option<String>,
    pub cancel_text: Option<String>,
    pub first_day_of_week: Option<String>,
    pub auto_dismiss: bool,
    pub show_year_picker_first: bool,
    pub year_range: Option<(i32, i32)>,
    pub min_date: Option<RawDate>,
    pub max_date: Option<RawDate>,
    pub selectable_days: Vec<RawDate>,
    pub disabled_days: Vec<RawDate>,
    pub highlighted_days: Vec<RawDate>,
}

fn config_date(raw: &RawDate, key: &str) -> Result<CalendarDate> {
    raw.to_date().map_err(|err| {
        Error::new(
            ErrorKind::ConfigParse,
            &format!("'{}' in [dialog]: {}", key, err),
        )
    })
}

fn config_dates(raw: &[RawDate], key: &str) -> Result<Vec<CalendarDate>> {
    raw.iter().map(|r| config_date(r, key)).collect()
}

impl DialogConfig {
    /// Builds the options of a new dialog. The initial date is not part of
    /// them and is only validated when a dialog is opened on it.
    pub fn to_options(&self) -> Result<DialogOptions> {
        let defaults = DialogOptions::default();

        let first_day_of_week = match &self.first_day_of_week {
            Some(name) => Weekday::from_str(name).map_err(|_| {
                Error::new(
                    ErrorKind::ConfigParse,
                    &format!("'{}' is not a weekday", name),
                )
            })?,
            None => defaults.first_day_of_week,
        };

        let mut limiter = DefaultDateRangeLimiter::default()
            .with_selectable_days(config_dates(&self.selectable_days, "selectable_days")?)
            .with_disabled_days(config_dates(&self.disabled_days, "disabled_days")?);
        if let Some((start, end)) = self.year_range {
            limiter = limiter.with_year_range(start, end)?;
        }
        if let Some(min_date) = &self.min_date {
            limiter = limiter.with_min_date(config_date(min_date, "min_date")?)?;
        }
        if let Some(max_date) = &self.max_date {
            limiter = limiter.with_max_date(config_date(max_date, "max_date")?)?;
        }

        Ok(DialogOptions {
            title: self.title.clone(),
            ok_text: self.ok_text.clone().unwrap_or(defaults.ok_text),
            cancel_text: self.cancel_text.clone().unwrap_or(defaults.cancel_text),
            first_day_of_week,
            auto_dismiss: self.auto_dismiss,
            show_year_picker_first: self.show_year_picker_first,
            highlighted_days: config_dates(&self.highlighted_days, "highlighted_days")?
                .into_iter()
                .collect(),
            limiter: Box::new(limiter),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct KeyConfig {
    host: HashMap<String, Cmd>,
    dialog: HashMap<String, Cmd>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    tick_rate_ms: u64,
    toast_duration_ms: u64,
    dialog: DialogConfig,
    keys: KeyConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            tick_rate_ms: 500,
            toast_duration_ms: 2000,
            dialog: DialogConfig::default(),
            keys: KeyConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tick_rate: Duration,
    pub toast_duration: Duration,
    pub dialog: DialogConfig,
    pub host_keys: KeyMap,
    pub dialog_keys: KeyMap,
}

impl Default for Config {
    fn default() -> Config {
        let file = ConfigFile::default();
        Config {
            tick_rate: Duration::from_millis(file.tick_rate_ms),
            toast_duration: Duration::from_millis(file.toast_duration_ms),
            dialog: file.dialog,
            host_keys: default_host_keys(),
            dialog_keys: default_dialog_keys(),
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(s)?;

        // catch broken dialog settings at startup instead of on first use
        file.dialog.to_options()?;

        Ok(Config {
            tick_rate: Duration::from_millis(file.tick_rate_ms.max(1)),
            toast_duration: Duration::from_millis(file.toast_duration_ms),
            host_keys: merge_keys(default_host_keys(), &file.keys.host)?,
            dialog_keys: merge_keys(default_dialog_keys(), &file.keys.dialog)?,
            dialog: file.dialog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.tick_rate, Duration::from_millis(500));
        assert_eq!(config.toast_duration, Duration::from_millis(2000));
        assert_eq!(config.dialog_keys.get(&Key::Char('j')), Some(&Cmd::NextWeek));
        assert_eq!(config.host_keys.get(&Key::Char('q')), Some(&Cmd::Exit));
        assert!(config.dialog.initial.is_none());
    }

    #[test]
    fn dialog_section_builds_options() {
        let config = Config::from_str(
            r#"
            toast_duration_ms = 1500

            [dialog]
            initial = { year = 2017, month = 11, day = 4 }
            title = "Departure"
            ok_text = "Done"
            first_day_of_week = "sunday"
            auto_dismiss = true
            year_range = [2000, 2030]
            disabled_days = [{ year = 2017, month = 11, day = 24 }]
            highlighted_days = [{ year = 2017, month = 11, day = 25 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.toast_duration, Duration::from_millis(1500));
        assert_eq!(config.dialog.initial, Some(RawDate::new(2017, 11, 4)));

        let options = config.dialog.to_options().unwrap();
        assert_eq!(options.title.as_deref(), Some("Departure"));
        assert_eq!(options.ok_text, "Done");
        assert_eq!(options.cancel_text, "Cancel");
        assert_eq!(options.first_day_of_week, Weekday::Sun);
        assert!(options.auto_dismiss);
        assert_eq!(options.limiter.min_year(), 2000);
        assert_eq!(options.limiter.max_year(), 2030);

        let christmas_eve = CalendarDate::new(2017, 11, 24).unwrap();
        assert!(options.limiter.is_out_of_range(&christmas_eve));
        assert!(options
            .highlighted_days
            .contains(&CalendarDate::new(2017, 11, 25).unwrap()));
    }

    #[test]
    fn invalid_initial_date_is_kept_raw() {
        let config = Config::from_str("[dialog]\ninitial = { year = 2017, month = 1, day = 30 }")
            .unwrap();
        assert!(config.dialog.initial.unwrap().to_date().is_err());
    }

    #[test]
    fn broken_settings_are_rejected() {
        for content in &[
            "tick_rate = 3",
            "[dialog]\nfirst_day_of_week = \"someday\"",
            "[dialog]\nyear_range = [2030, 2000]",
            "[dialog]\nyear_range = [2000, 2010]\nmin_date = { year = 2015, month = 0, day = 1 }",
            "[dialog]\ndisabled_days = [{ year = 2017, month = 1, day = 30 }]",
            "[keys.dialog]\nhyperspace = \"next_day\"",
            "[keys.dialog]\nx = \"fly\"",
        ] {
            assert!(Config::from_str(content).is_err(), "{} was accepted", content);
        }
    }

    #[test]
    fn key_overrides_merge_with_defaults() {
        let config = Config::from_str(
            r#"
            [keys.dialog]
            w = "next_week"
            ctrl-n = "next_month"
            enter = "toggle_year_view"

            [keys.host]
            esc = "exit"
            "#,
        )
        .unwrap();

        assert_eq!(config.dialog_keys.get(&Key::Char('w')), Some(&Cmd::NextWeek));
        assert_eq!(config.dialog_keys.get(&Key::Ctrl('n')), Some(&Cmd::NextMonth));
        assert_eq!(
            config.dialog_keys.get(&Key::Char('\n')),
            Some(&Cmd::ToggleYearView)
        );
        assert_eq!(config.dialog_keys.get(&Key::Char('j')), Some(&Cmd::NextWeek));
        assert_eq!(config.host_keys.get(&Key::Esc), Some(&Cmd::Exit));
    }

    #[test]
    fn key_names() {
        assert_eq!(parse_key("j").unwrap(), Key::Char('j'));
        assert_eq!(parse_key("J").unwrap(), Key::Char('J'));
        assert_eq!(parse_key("Enter").unwrap(), Key::Char('\n'));
        assert_eq!(parse_key("alt-x").unwrap(), Key::Alt('x'));
        assert_eq!(parse_key("alt-X").unwrap(), Key::Alt('X'));
        assert_eq!(parse_key("Ctrl-n").unwrap(), Key::Ctrl('n'));
        assert_eq!(parse_key("pagedown").unwrap(), Key::PageDown);
        assert!(parse_key("ctrl-").is_err());
        assert!(parse_key("hyper-x").is_err());
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let missing = env::temp_dir().join("calpick-missing-config.toml");
        let err = load_suitable_config(Some(&missing)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IOError(_)));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let path = env::temp_dir().join(format!("calpick-config-{}.toml", std::process::id()));
        fs::write(&path, "tick_rate_ms = 250\n").unwrap();

        let config = load_suitable_config(Some(&path)).unwrap();
        assert_eq!(config.tick_rate, Duration::from_millis(250));

        fs::remove_file(&path).unwrap();
    }
}
