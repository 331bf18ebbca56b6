use crate::render::Theme;
use crate::sampler::SamplerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tui::style::Color;

pub const DEFAULT_CONFIG_FILE: &str = "sysdash.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampler: SamplerSection,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerSection {
    pub period_ms: u64,
    /// Consecutive failed ticks before the source is reported as unavailable in the log.
    pub unavailable_after: u32,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            period_ms: 2000,
            unavailable_after: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub header_color: String,
    pub label_color: String,
    pub value_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "System Monitor".into(),
            header_color: "yellow".into(),
            label_color: "white".into(),
            value_color: "cyan".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub poll_interval_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log destination. The terminal belongs to the dashboard, so without a file logs are dropped.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}

impl AppConfig {
    /// `CONFIG_FILE` if set (must exist), else `sysdash.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
                Err(e) => Err(anyhow::anyhow!("reading config {}: {}", DEFAULT_CONFIG_FILE, e)),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampler.period_ms > 0,
            "sampler.period_ms must be > 0, got {}",
            self.sampler.period_ms
        );
        anyhow::ensure!(
            self.sampler.unavailable_after > 0,
            "sampler.unavailable_after must be > 0, got {}",
            self.sampler.unavailable_after
        );
        anyhow::ensure!(
            self.input.poll_interval_ms > 0,
            "input.poll_interval_ms must be > 0, got {}",
            self.input.poll_interval_ms
        );
        anyhow::ensure!(
            self.input.poll_interval_ms < self.sampler.period_ms,
            "input.poll_interval_ms must be below sampler.period_ms ({} >= {})",
            self.input.poll_interval_ms,
            self.sampler.period_ms
        );
        anyhow::ensure!(
            !self.display.title.is_empty(),
            "display.title must be non-empty"
        );
        self.theme()?;
        anyhow::ensure!(
            !self.logging.level.is_empty(),
            "logging.level must be non-empty"
        );
        Ok(())
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            period: Duration::from_millis(self.sampler.period_ms),
            unavailable_after: self.sampler.unavailable_after,
            ..SamplerConfig::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.input.poll_interval_ms)
    }

    pub fn theme(&self) -> anyhow::Result<Theme> {
        Ok(Theme {
            title: self.display.title.clone(),
            header_color: parse_color("display.header_color", &self.display.header_color)?,
            label_color: parse_color("display.label_color", &self.display.label_color)?,
            value_color: parse_color("display.value_color", &self.display.value_color)?,
        })
    }
}

fn parse_color(key: &str, name: &str) -> anyhow::Result<Color> {
    let color = match name.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
        "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => anyhow::bail!("{} has unknown color {:?}", key, name),
    };
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_names_are_case_and_separator_insensitive() {
        assert_eq!(parse_color("k", "Dark_Gray").unwrap(), Color::DarkGray);
        assert_eq!(parse_color("k", "light-blue").unwrap(), Color::LightBlue);
        assert_eq!(parse_color("k", "GREY").unwrap(), Color::Gray);
    }

    #[test]
    fn unknown_color_names_the_key() {
        let err = parse_color("display.value_color", "chartreuse").unwrap_err();
        assert!(err.to_string().contains("display.value_color"));
    }
}
