/// Utility functions for aggregating decoded readings and formatting
use std::collections::HashMap;
use time::{format_description, OffsetDateTime};

use crate::config::SensorConfig;
use crate::models::{BeaconTotals, DecodedSample, ReadingSummary, RunningMean, SensorReading};

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    match format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]") {
        Ok(format) => dt.format(&format).unwrap_or_else(|_| dt.to_string()),
        Err(_) => dt.to_string(),
    }
}

impl RunningMean {
    pub fn push(&mut self, value: f32) {
        self.sum += value;
        self.count += 1;
    }

    /// Mean rounded to `1 / scale`, or None when nothing was pushed
    pub fn rounded(&self, scale: f32) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let mean = self.sum / self.count as f32;
        Some((mean * scale).round() / scale)
    }
}

/// Fold one decoded sample into the running totals of its beacon
///
/// Unknown frames carry no address, so they are not recorded.
///
/// # Returns
/// true if the sample was recorded
pub fn record_sample(totals: &mut HashMap<String, BeaconTotals>, sample: &DecodedSample) -> bool {
    let reading = &sample.data.reading;
    let (mac, battery_percent) = match (reading.mac_address(), reading.battery_percent()) {
        (Some(mac), Some(battery_percent)) => (mac, battery_percent),
        _ => return false,
    };

    let entry = totals
        .entry(mac.to_string())
        .or_insert_with(|| BeaconTotals {
            product_model: sample.data.product_model,
            battery_percent,
            temperature: RunningMean::default(),
            humidity: RunningMean::default(),
            acceleration_x: RunningMean::default(),
            acceleration_y: RunningMean::default(),
            acceleration_z: RunningMean::default(),
            visible_light_samples: 0,
            device_name: None,
            last_seen: sample.time,
            samples: 0,
        });

    match reading {
        SensorReading::Environment {
            temperature,
            humidity,
            ..
        } => {
            entry.temperature.push(*temperature);
            entry.humidity.push(*humidity);
        }
        SensorReading::Light { visible_light, .. } => {
            if *visible_light {
                entry.visible_light_samples += 1;
            }
        }
        SensorReading::Acceleration {
            acceleration_x,
            acceleration_y,
            acceleration_z,
            ..
        } => {
            entry.acceleration_x.push(*acceleration_x);
            entry.acceleration_y.push(*acceleration_y);
            entry.acceleration_z.push(*acceleration_z);
        }
        SensorReading::Info { name, .. } => entry.device_name = Some(name.clone()),
        SensorReading::Unknown { .. } => {}
    }

    entry.product_model = sample.data.product_model;
    entry.battery_percent = battery_percent;
    entry.last_seen = sample.time;
    entry.samples += 1;
    true
}

/// Summarize running totals per beacon
///
/// Produces one summary per beacon: latest battery level, averages for
/// whichever measurements the product model carries, and the number of
/// samples seen.
///
/// # Arguments
/// * `totals` - HashMap mapping beacon MAC addresses to running totals
/// * `config` - Configuration containing beacon name mappings
///
/// # Returns
/// HashMap mapping beacon MAC addresses to summaries
pub fn summarize_readings(
    totals: &HashMap<String, BeaconTotals>,
    config: &SensorConfig,
) -> HashMap<String, ReadingSummary> {
    let mut summaries = HashMap::new();

    for (mac, beacon) in totals {
        // Skip beacons with no data
        if beacon.samples == 0 {
            continue;
        }

        let summary = ReadingSummary {
            product_model: beacon.product_model,
            battery_percent: beacon.battery_percent,
            temperature: beacon.temperature.rounded(100.0), // 2 decimal places
            humidity: beacon.humidity.rounded(100.0),       // 2 decimal places
            acceleration_x: beacon.acceleration_x.rounded(1000.0), // 3 decimal places
            acceleration_y: beacon.acceleration_y.rounded(1000.0), // 3 decimal places
            acceleration_z: beacon.acceleration_z.rounded(1000.0), // 3 decimal places
            visible_light_samples: beacon.visible_light_samples,
            device_name: beacon.device_name.clone(),
            time: beacon.last_seen,
            name: config.name_for(mac),
            samples: beacon.samples,
        };

        summaries.insert(mac.clone(), summary);
    }

    summaries
}
