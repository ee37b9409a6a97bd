/// Service data lookup for advertisements handed over by a scanner
use log::debug;

use crate::bluetooth::decoder::decode;
use crate::error::{DecodeError, ServiceDataError};
use crate::models::{MinewData, ServiceData};

impl ServiceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uuid: &str, data: Vec<u8>) {
        self.entries.push((uuid.to_lowercase(), data));
    }

    /// Find the payload advertised under `uuid` (case-insensitive)
    ///
    /// When an advertisement repeats a UUID the first entry wins.
    pub fn get(&self, uuid: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry_uuid, _)| entry_uuid.eq_ignore_ascii_case(uuid))
            .map(|(_, data)| data.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse one advertisement line of the form `uuid=hex;uuid=hex`
///
/// Whitespace around entries is ignored and empty entries are skipped.
///
/// # Arguments
/// * `line` - Text line as written by the scanning side
///
/// # Returns
/// ServiceData with one entry per `uuid=hex` pair, or an error for the first bad entry
pub fn parse_advertisement_line(line: &str) -> Result<ServiceData, ServiceDataError> {
    let mut service_data = ServiceData::new();

    for entry in line.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (uuid, payload) = match entry.split_once('=') {
            Some((uuid, payload)) if !uuid.trim().is_empty() => (uuid.trim(), payload.trim()),
            _ => return Err(ServiceDataError::MalformedEntry(entry.to_string())),
        };

        service_data.insert(uuid, parse_hex(payload)?);
    }

    Ok(service_data)
}

/// Parse a hex string such as `a1013200` into bytes
pub fn parse_hex(hex: &str) -> Result<Vec<u8>, ServiceDataError> {
    if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ServiceDataError::InvalidHex(hex.to_string()));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ServiceDataError::InvalidHex(hex.to_string()))
        })
        .collect()
}

/// Decode the payload advertised under `uuid`, if the advertisement carries one
pub fn decode_advertisement(
    service_data: &ServiceData,
    uuid: &str,
) -> Result<Option<MinewData>, DecodeError> {
    match service_data.get(uuid) {
        Some(data) => decode(data),
        None => {
            debug!("No service data for {}", uuid);
            Ok(None)
        }
    }
}
