use std::collections::HashSet;
use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_path: "log/bms-dash.log".to_string(),
            log_level: LevelFilter::Info,
            log_to_stdout: false,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Server {
    pub base_url: String,
    pub status_path: String,
    pub connection_path: String,
    pub request_timeout_secs: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            status_path: "/status".to_string(),
            connection_path: "/connection_status".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Polling {
    pub status_interval_ms: u64,
    pub connection_interval_ms: u64,
    pub render_interval_ms: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            status_interval_ms: 5000,
            connection_interval_ms: 5000,
            render_interval_ms: 1000,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Screen {
    pub default_page: String,
    pub fail_on_missing_elements: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self { default_page: "home".to_string(), fail_on_missing_elements: true }
    }
}

/// Texts written into the document for flags, connection states and missing values
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Labels {
    pub yes: String,
    pub no: String,
    pub connected: String,
    pub disconnected: String,
    pub unknown: String,
    pub missing: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            yes: "Yes".to_string(),
            no: "No".to_string(),
            connected: "Connected".to_string(),
            disconnected: "Disconnected".to_string(),
            unknown: "Unknown".to_string(),
            missing: "-".to_string(),
        }
    }
}

/// A content page and the telemetry elements it shows, as (element id, label) pairs
#[derive(Deserialize, Clone, Debug)]
pub struct Page {
    pub name: String,
    pub title: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub display: Screen,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default = "default_pages")]
    pub pages: Vec<Page>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: General::default(),
            server: Server::default(),
            polling: Polling::default(),
            display: Screen::default(),
            labels: Labels::default(),
            pages: default_pages(),
        }
    }
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    validate(&config)?;

    Ok(config)
}

/// Checks configuration items that can't be expressed by the file format alone
///
/// # Arguments
///
/// * 'config' - the configuration to check
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let polling = &config.polling;
    if polling.status_interval_ms == 0 || polling.connection_interval_ms == 0 || polling.render_interval_ms == 0 {
        return Err(ConfigError::from("polling intervals must be greater than zero"));
    }

    let mut names = HashSet::new();
    for page in &config.pages {
        if !names.insert(page.name.as_str()) {
            return Err(ConfigError(format!("duplicate page name '{}'", page.name)));
        }
    }

    if !names.contains(config.display.default_page.as_str()) {
        return Err(ConfigError(format!("default page '{}' is not a configured page", config.display.default_page)));
    }

    Ok(())
}

/// The built-in layout, together the pages show all telemetry fields
///
fn default_pages() -> Vec<Page> {
    let page = |name: &str, title: &str, fields: &[(&str, &str)]| Page {
        name: name.to_string(),
        title: title.to_string(),
        fields: fields.iter().map(|(id, label)| (id.to_string(), label.to_string())).collect(),
    };

    vec![
        page("home", "Overview", &[
            ("soc", "State of charge [%]"),
            ("pack_voltage", "Pack voltage [V]"),
            ("pack_current", "Pack current [A]"),
            ("charge_current", "Charge current [A]"),
            ("discharge_current", "Discharge current [A]"),
            ("timestamp", "Updated"),
        ]),
        page("cells", "Cells", &[
            ("cell_count", "Cell count"),
            ("lowest_cell_voltage", "Lowest cell voltage [V]"),
            ("lowest_cell_voltage_num", "Lowest cell voltage #"),
            ("highest_cell_voltage", "Highest cell voltage [V]"),
            ("highest_cell_voltage_num", "Highest cell voltage #"),
            ("lowest_cell_temperature", "Lowest cell temperature [°C]"),
            ("lowest_cell_temperature_num", "Lowest cell temperature #"),
            ("highest_cell_temperature", "Highest cell temperature [°C]"),
            ("highest_cell_temperature_num", "Highest cell temperature #"),
        ]),
        page("protection", "Protection", &[
            ("cell_communication_error", "Cell communication error"),
            ("allowed_to_discharge", "Allowed to discharge"),
            ("allowed_to_charge", "Allowed to charge"),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::models::bms_status::FIELD_IDS;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = load_config(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.server.status_path, "/status");
        assert_eq!(config.server.connection_path, "/connection_status");
        assert_eq!(config.polling.status_interval_ms, 5000);
        assert_eq!(config.polling.connection_interval_ms, 5000);
        assert_eq!(config.display.default_page, "home");
        assert_eq!(config.labels.yes, "Yes");
        assert_eq!(config.general.log_level, LevelFilter::Info);
    }

    #[test]
    fn default_pages_cover_all_fields() {
        let pages = default_pages();
        for id in FIELD_IDS {
            let count = pages.iter().flat_map(|p| &p.fields).filter(|(f, _)| f == id).count();
            assert_eq!(count, 1, "field {} shown {} times", id, count);
        }
    }

    #[test]
    fn parses_sections() {
        let file = write_config(r#"
            [general]
            log_path = "/tmp/dash.log"
            log_level = "debug"
            log_to_stdout = true

            [server]
            base_url = "http://bms.local:8080"

            [labels]
            connected = "Připojeno"
            disconnected = "Odpojeno"
            unknown = "Neznámý"

            [display]
            default_page = "main"

            [[pages]]
            name = "main"
            title = "Main"
            fields = [["soc", "SoC"], ["pack_voltage", "Voltage"]]
        "#);
        let config = load_config(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert!(config.general.log_to_stdout);
        assert_eq!(config.server.base_url, "http://bms.local:8080");
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.labels.connected, "Připojeno");
        assert_eq!(config.labels.yes, "Yes");
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.pages[0].fields[1], ("pack_voltage".to_string(), "Voltage".to_string()));
    }

    #[test]
    fn rejects_unknown_default_page() {
        let file = write_config("[display]\ndefault_page = \"settings\"\n");
        let result = load_config(file.path().to_str().unwrap());

        assert!(result.unwrap_err().0.contains("settings"));
    }

    #[test]
    fn rejects_zero_interval() {
        let file = write_config("[polling]\nstatus_interval_ms = 0\n");

        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_duplicate_pages() {
        let mut config = Config::default();
        config.pages.push(config.pages[0].clone());

        assert!(validate(&config).is_err());
    }

    #[test]
    fn shipped_config_loads() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();

        assert_eq!(config.pages.len(), 3);
        assert_eq!(config.pages[0].name, "home");
    }

    #[test]
    fn missing_file_is_error() {
        assert!(load_config("/nonexistent/bms-dash.toml").is_err());
    }
}
