//! TOML configuration for a BadgePoint installation.

use serde::Deserialize;

use badgepoint_core::{Employee, EmployeeDirectory, RfidTag};
use badgepoint_device::{ControllerConfig, DeviceIdentity};
use badgepoint_mqtt::{MqttConfig, RetryPolicy};

/// Top-level configuration file layout.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub device: DeviceSection,
    pub mqtt: MqttSection,
    #[serde(default)]
    pub timing: TimingSection,
    #[serde(default)]
    pub employees: Vec<EmployeeEntry>,
}

/// `[device]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSection {
    pub id: String,
    pub location: String,
}

/// `[mqtt]` table. Missing fields fall back to the library defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttSection {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic_prefix: Option<String>,
    pub keep_alive_secs: Option<u64>,
}

/// `[timing]` table. Every knob is optional; unset ones keep the firmware
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingSection {
    pub scan_cooldown_ms: Option<u64>,
    pub heartbeat_interval_ms: Option<u64>,
    pub tick_delay_ms: Option<u64>,
    pub retry_interval_ms: Option<u64>,
}

/// One `[[employees]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeEntry {
    pub tag: String,
    pub name: String,
}

impl AppConfig {
    /// Parse a configuration file's contents.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            device_id: self.device.id.clone(),
            location: self.device.location.clone(),
        }
    }

    pub fn mqtt_config(&self) -> MqttConfig {
        let defaults = MqttConfig::default();
        MqttConfig {
            host: self.mqtt.host.clone(),
            port: self.mqtt.port.unwrap_or(defaults.port),
            client_id: self.device.id.clone(),
            username: self.mqtt.username.clone(),
            password: self.mqtt.password.clone(),
            keep_alive_secs: self.mqtt.keep_alive_secs.unwrap_or(defaults.keep_alive_secs),
            topic_prefix: self.mqtt.topic_prefix.clone(),
            retry: RetryPolicy {
                interval_ms: self
                    .timing
                    .retry_interval_ms
                    .unwrap_or(RetryPolicy::default().interval_ms),
            },
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        ControllerConfig {
            scan_cooldown_ms: self
                .timing
                .scan_cooldown_ms
                .unwrap_or(defaults.scan_cooldown_ms),
            heartbeat_interval_ms: self
                .timing
                .heartbeat_interval_ms
                .unwrap_or(defaults.heartbeat_interval_ms),
            tick_delay_ms: self.timing.tick_delay_ms.unwrap_or(defaults.tick_delay_ms),
            ..defaults
        }
    }

    /// Build the employee directory, rejecting malformed tag strings.
    pub fn directory(&self) -> anyhow::Result<EmployeeDirectory> {
        let mut employees = Vec::with_capacity(self.employees.len());
        for entry in &self.employees {
            let tag: RfidTag = entry.tag.parse()?;
            employees.push(Employee::new(tag, entry.name.clone()));
        }
        Ok(EmployeeDirectory::new(employees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [device]
        id = "ESP32_PONTO_01"
        location = "Entrada Principal"

        [mqtt]
        host = "broker.example.net"
        port = 1883
        username = "ponto"
        password = "secret"
        topic_prefix = "ponto"

        [timing]
        heartbeat_interval_ms = 60000

        [[employees]]
        tag = "04:52:F3:2A"
        name = "Joao Silva"

        [[employees]]
        tag = "04:A1:B2:3C"
        name = "Maria Santos"
    "#;

    #[test]
    fn test_parses_full_config() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.device.id, "ESP32_PONTO_01");
        assert_eq!(config.mqtt.host, "broker.example.net");
        assert_eq!(config.employees.len(), 2);
    }

    #[test]
    fn test_timing_overrides_apply_and_defaults_hold() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let controller = config.controller_config();
        assert_eq!(controller.heartbeat_interval_ms, 60_000);
        assert_eq!(controller.scan_cooldown_ms, 3000);
        assert_eq!(controller.tick_delay_ms, 100);
    }

    #[test]
    fn test_mqtt_config_uses_device_id_as_client_id() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let mqtt = config.mqtt_config();
        assert_eq!(mqtt.client_id, "ESP32_PONTO_01");
        assert_eq!(mqtt.topic_prefix.as_deref(), Some("ponto"));
        assert_eq!(mqtt.retry.interval_ms, 5000);
    }

    #[test]
    fn test_directory_resolves_configured_tags() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let directory = config.directory().unwrap();
        let tag: RfidTag = "04:52:f3:2a".parse().unwrap();
        assert_eq!(directory.resolve(&tag), Some("Joao Silva"));
    }

    #[test]
    fn test_rejects_malformed_employee_tag() {
        let config = AppConfig::from_toml(
            r#"
            [device]
            id = "BP"
            location = "L"

            [mqtt]
            host = "localhost"

            [[employees]]
            tag = "not hex"
            name = "Nobody"
        "#,
        )
        .unwrap();
        assert!(config.directory().is_err());
    }

    #[test]
    fn test_minimal_config_falls_back_to_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [device]
            id = "BP"
            location = "L"

            [mqtt]
            host = "localhost"
        "#,
        )
        .unwrap();
        assert!(config.employees.is_empty());
        assert_eq!(config.mqtt_config().port, 1883);
        assert_eq!(config.mqtt_config().keep_alive_secs, 5);
    }
}
