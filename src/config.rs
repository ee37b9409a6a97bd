use log::{debug, info, warn};
use std::collections::HashMap;
use std::env;

use crate::bluetooth::MINEW_SERVICE_UUID;

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub tags: HashMap<String, String>,
    pub service_uuid: String,
}

impl SensorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let service_uuid = parse_service_uuid(env::var("MINEW_SERVICE_UUID").ok().as_deref())?;

        let tags = match env::var("MINEW_TAGS") {
            Ok(minew_tags) => {
                info!("Found MINEW_TAGS: '{}'", minew_tags);
                parse_tags(&minew_tags)
            }
            Err(_) => {
                // Fallback to individual environment variables
                debug!("MINEW_TAGS environment variable not found, trying individual variables");
                tags_from_vars(env::vars())
            }
        };

        info!("Service UUID: {}", service_uuid);
        info!("Total tags loaded: {}", tags.len());
        for (mac, name) in &tags {
            debug!("Tag: {} -> {}", mac, name);
        }

        if tags.is_empty() {
            warn!("No beacon names configured, readings will be reported as Unknown");
        }

        Ok(SensorConfig { tags, service_uuid })
    }

    /// Friendly name of a beacon, by decoded MAC address
    pub fn name_for(&self, mac: &str) -> String {
        self.tags
            .get(&mac.to_lowercase())
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Normalize the configured service UUID, defaulting to `ffe1` when unset
pub fn parse_service_uuid(value: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match value {
        Some(uuid) if !uuid.trim().is_empty() => Ok(uuid.trim().to_lowercase()),
        Some(_) => Err("MINEW_SERVICE_UUID environment variable is empty".into()),
        None => Ok(MINEW_SERVICE_UUID.to_string()),
    }
}

/// Parse `mac=name,mac=name` pairs, lower-casing MACs to match decoded addresses
pub fn parse_tags(value: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((mac, name)) = pair.split_once('=') {
            let mac = mac.trim();
            let name = name.trim();
            if !mac.is_empty() && !name.is_empty() {
                tags.insert(mac.to_lowercase(), name.to_string());
            }
        } else {
            warn!("Failed to split pair: '{}'", pair);
        }
    }

    tags
}

/// Collect `MINEW_TAG_<N>_MAC` / `MINEW_TAG_<N>_NAME` pairs
pub fn tags_from_vars<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: HashMap<String, String> = vars.into_iter().collect();
    let mut tags = HashMap::new();

    for (key, value) in &vars {
        if let Some(index) = key
            .strip_prefix("MINEW_TAG_")
            .and_then(|s| s.strip_suffix("_MAC"))
        {
            let name_key = format!("MINEW_TAG_{}_NAME", index);
            if let Some(name) = vars.get(&name_key) {
                tags.insert(value.trim().to_lowercase(), name.trim().to_string());
            }
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_uuid() {
        assert_eq!(parse_service_uuid(None).unwrap(), "ffe1");
        assert_eq!(parse_service_uuid(Some(" FEAA ")).unwrap(), "feaa");
    }

    #[test]
    fn test_parse_service_uuid_empty() {
        let err = parse_service_uuid(Some("  ")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "MINEW_SERVICE_UUID environment variable is empty"
        );
        assert!(parse_service_uuid(Some("")).is_err());
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(" FF:EE:DD:CC:BB:AA = Fridge , 11:22:33:44:55:66=Door,,broken");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("ff:ee:dd:cc:bb:aa").map(String::as_str), Some("Fridge"));
        assert_eq!(tags.get("11:22:33:44:55:66").map(String::as_str), Some("Door"));
    }

    #[test]
    fn test_parse_tags_skips_empty_names() {
        assert!(parse_tags("aa:bb:cc:dd:ee:ff=").is_empty());
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_tags_from_vars() {
        let vars = vec![
            ("MINEW_TAG_1_MAC".to_string(), "AA:BB:CC:DD:EE:FF".to_string()),
            ("MINEW_TAG_1_NAME".to_string(), "Freezer".to_string()),
            ("MINEW_TAG_2_MAC".to_string(), "11:22:33:44:55:66".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];
        let tags = tags_from_vars(vars);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("aa:bb:cc:dd:ee:ff").map(String::as_str), Some("Freezer"));
    }

    #[test]
    fn test_name_for() {
        let config = SensorConfig {
            tags: parse_tags("aa:bb:cc:dd:ee:ff=Freezer"),
            service_uuid: MINEW_SERVICE_UUID.to_string(),
        };
        assert_eq!(config.name_for("AA:BB:CC:DD:EE:FF"), "Freezer");
        assert_eq!(config.name_for("11:22:33:44:55:66"), "Unknown");
    }
}
