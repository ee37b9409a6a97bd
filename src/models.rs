use time::OffsetDateTime;

/// Sensor record carried by a Minew frame, one variant per product model
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading {
    /// Product model 1: temperature and humidity sensor
    Environment {
        battery_percent: u8,
        temperature: f32,
        humidity: f32,
        mac_address: String,
    },
    /// Product model 2: ambient light sensor
    Light {
        battery_percent: u8,
        visible_light: bool,
        mac_address: String,
    },
    /// Product model 3: three-axis accelerometer
    Acceleration {
        battery_percent: u8,
        acceleration_x: f32,
        acceleration_y: f32,
        acceleration_z: f32,
        mac_address: String,
    },
    /// Product model 8: identity beacon broadcasting its name
    Info {
        battery_percent: u8,
        mac_address: String,
        name: String,
    },
    /// Any other product model; hex of everything after the frame type
    Unknown { payload: String },
}

impl SensorReading {
    pub fn mac_address(&self) -> Option<&str> {
        match self {
            SensorReading::Environment { mac_address, .. }
            | SensorReading::Light { mac_address, .. }
            | SensorReading::Acceleration { mac_address, .. }
            | SensorReading::Info { mac_address, .. } => Some(mac_address),
            SensorReading::Unknown { .. } => None,
        }
    }

    pub fn battery_percent(&self) -> Option<u8> {
        match self {
            SensorReading::Environment {
                battery_percent, ..
            }
            | SensorReading::Light {
                battery_percent, ..
            }
            | SensorReading::Acceleration {
                battery_percent, ..
            }
            | SensorReading::Info {
                battery_percent, ..
            } => Some(*battery_percent),
            SensorReading::Unknown { .. } => None,
        }
    }
}

/// A decoded Minew sensor frame
#[derive(Debug, Clone, PartialEq)]
pub struct MinewData {
    pub frame_type: u8,
    pub product_model: u8,
    pub reading: SensorReading,
}

/// Service data entries of a single advertisement, keyed by service UUID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceData {
    pub entries: Vec<(String, Vec<u8>)>,
}

/// A decoded frame together with the time it was received
#[derive(Debug, Clone)]
pub struct DecodedSample {
    pub data: MinewData,
    pub time: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    pub sum: f32,
    pub count: u32,
}

/// Per-beacon running totals; memory stays constant however many samples arrive
#[derive(Debug, Clone)]
pub struct BeaconTotals {
    pub product_model: u8,
    pub battery_percent: u8,
    pub temperature: RunningMean,
    pub humidity: RunningMean,
    pub acceleration_x: RunningMean,
    pub acceleration_y: RunningMean,
    pub acceleration_z: RunningMean,
    pub visible_light_samples: u32,
    pub device_name: Option<String>,
    pub last_seen: OffsetDateTime,
    pub samples: i32,
}

#[derive(Debug, Clone)]
pub struct ReadingSummary {
    pub product_model: u8,
    pub battery_percent: u8,
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub acceleration_x: Option<f32>,
    pub acceleration_y: Option<f32>,
    pub acceleration_z: Option<f32>,
    pub visible_light_samples: u32,
    pub device_name: Option<String>,
    pub time: OffsetDateTime,
    pub name: String,
    pub samples: i32,
}
