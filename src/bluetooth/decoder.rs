/// Minew sensor frame decoding
use log::{debug, warn};

use crate::error::DecodeError;
use crate::models::{MinewData, SensorReading};

// Minew protocol constants
pub const MINEW_SERVICE_UUID: &str = "ffe1"; // 16-bit service UUID carrying sensor frames
const SENSOR_FRAME_TYPE: u8 = 0xA1;

const MODEL_ENVIRONMENT: u8 = 1;
const MODEL_LIGHT: u8 = 2;
const MODEL_ACCELERATION: u8 = 3;
const MODEL_INFO: u8 = 8;

/// Decode Minew service data into a structured sensor reading
///
/// Every sensor frame starts with the frame type (0xA1) and the product model.
/// The rest of the layout depends on the model:
/// - Model 1: battery, temperature (8.8), humidity (8.8), MAC (6 bytes, reversed)
/// - Model 2: battery, flags (bit 0 = visible light), MAC
/// - Model 3: battery, acceleration X/Y/Z (8.8 each), MAC
/// - Model 8: battery, MAC, device name (one character per byte)
///
/// Unrecognized models are kept as a hex payload instead of being dropped.
///
/// # Arguments
/// * `data` - Raw bytes of the `ffe1` service data entry
///
/// # Returns
/// Ok(Some(MinewData)) for sensor frames, Ok(None) for other frame types,
/// or an error if the buffer is shorter than its layout
pub fn decode(data: &[u8]) -> Result<Option<MinewData>, DecodeError> {
    let frame_type = match data.first() {
        Some(&frame_type) => frame_type,
        None => return Err(DecodeError::EmptyInput),
    };

    if frame_type != SENSOR_FRAME_TYPE {
        debug!("Ignoring frame type {:#04x}", frame_type);
        return Ok(None);
    }

    require_len(data, "frame header", 2)?;
    let product_model = data[1];

    let reading = match product_model {
        MODEL_ENVIRONMENT => {
            require_len(data, "environment", 13)?;
            SensorReading::Environment {
                battery_percent: data[2],
                temperature: to_decimal([data[3], data[4]]),
                humidity: to_decimal([data[5], data[6]]),
                mac_address: to_mac(&data[7..13]),
            }
        }
        MODEL_LIGHT => {
            require_len(data, "light", 10)?;
            SensorReading::Light {
                battery_percent: data[2],
                visible_light: data[3] & 0x01 == 0x01,
                mac_address: to_mac(&data[4..10]),
            }
        }
        MODEL_ACCELERATION => {
            require_len(data, "acceleration", 15)?;
            SensorReading::Acceleration {
                battery_percent: data[2],
                acceleration_x: to_decimal([data[3], data[4]]),
                acceleration_y: to_decimal([data[5], data[6]]),
                acceleration_z: to_decimal([data[7], data[8]]),
                mac_address: to_mac(&data[9..15]),
            }
        }
        MODEL_INFO => {
            require_len(data, "info", 9)?;
            SensorReading::Info {
                battery_percent: data[2],
                mac_address: to_mac(&data[3..9]),
                name: bytes_to_string(&data[9..]),
            }
        }
        _ => {
            debug!("Unknown Minew product model {}", product_model);
            SensorReading::Unknown {
                payload: to_hex(&data[1..]),
            }
        }
    };

    Ok(Some(MinewData {
        frame_type,
        product_model,
        reading,
    }))
}

fn require_len(data: &[u8], layout: &'static str, expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        warn!(
            "Truncated {} payload: len={}, expected={}",
            layout,
            data.len(),
            expected
        );
        return Err(DecodeError::TruncatedInput {
            layout,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Convert a signed 8.8 fixed-point word to a decimal value
///
/// The first byte is a two's-complement integer part, the second an unsigned
/// fraction in 1/256 steps. The fraction is always added, so `[0xFF, 0x80]`
/// is -0.5 and not -1.5.
pub fn to_decimal(word: [u8; 2]) -> f32 {
    f32::from(word[0] as i8) + f32::from(word[1]) / 256.0
}

/// Format a little-endian MAC field as `aa:bb:cc:dd:ee:ff`
pub fn to_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .rev()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Map each byte to the character with the same code point
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Render bytes as lowercase hex, two digits per byte
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        s.as_bytes()
            .chunks(2)
            .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
            .collect()
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal([26, 0x80]), 26.5);
        assert_eq!(to_decimal([0xE7, 0x00]), -25.0);
        assert_eq!(to_decimal([0x00, 0x00]), 0.0);
        assert_eq!(to_decimal([0x7F, 0x00]), 127.0);
        assert_eq!(to_decimal([0x80, 0x00]), -128.0);
    }

    #[test]
    fn test_to_decimal_fraction_not_sign_adjusted() {
        assert_eq!(to_decimal([0xFF, 0x80]), -0.5);
        assert_eq!(to_decimal([0xE7, 0x40]), -24.75);
    }

    #[test]
    fn test_to_mac() {
        assert_eq!(
            to_mac(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
            "ff:ee:dd:cc:bb:aa"
        );
        assert_eq!(
            to_mac(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x0a]),
            "0a:05:04:03:02:01"
        );
    }

    #[test]
    fn test_bytes_to_string() {
        assert_eq!(bytes_to_string(&[0x41, 0x42, 0x43]), "ABC");
        assert_eq!(bytes_to_string(&[]), "");
        assert_eq!(bytes_to_string(&[0xE9]), "\u{e9}");
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x01, 0xAB, 0x00, 0xFF]), "01ab00ff");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_decode_foreign_frame_type() {
        for frame_type in [0x00u8, 0x20, 0xA0, 0xA2, 0xFF] {
            let data = [frame_type, 0x01, 0x32];
            assert_eq!(decode(&data), Ok(None));
        }
        assert_eq!(decode(&[0x20]), Ok(None));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&[]), Err(DecodeError::EmptyInput));
    }

    #[test]
    fn test_decode_frame_type_only() {
        assert!(matches!(
            decode(&[0xA1]),
            Err(DecodeError::TruncatedInput {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_environment() {
        let data = hex("a101320d801234aabbccddeeff");
        let decoded = decode(&data).unwrap().unwrap();
        assert_eq!(decoded.frame_type, 0xA1);
        assert_eq!(decoded.product_model, 1);
        match decoded.reading {
            SensorReading::Environment {
                battery_percent,
                temperature,
                humidity,
                mac_address,
            } => {
                assert_eq!(battery_percent, 50);
                assert_eq!(temperature, 13.5);
                assert!((humidity - 18.203125).abs() < 1e-6);
                assert_eq!(mac_address, "ff:ee:dd:cc:bb:aa");
            }
            other => panic!("Expected Environment reading, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_environment_negative_temperature() {
        let data = hex("a10164e7003200aabbccddeeff");
        match decode(&data).unwrap().unwrap().reading {
            SensorReading::Environment {
                temperature,
                humidity,
                ..
            } => {
                assert_eq!(temperature, -25.0);
                assert_eq!(humidity, 50.0);
            }
            other => panic!("Expected Environment reading, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_light_flags() {
        let cases = [(0x01u8, true), (0x00, false), (0x02, false), (0x03, true)];
        for (flags, expected) in cases {
            let mut data = vec![0xA1, 0x02, 0x5A, flags];
            data.extend_from_slice(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
            match decode(&data).unwrap().unwrap().reading {
                SensorReading::Light {
                    battery_percent,
                    visible_light,
                    mac_address,
                } => {
                    assert_eq!(battery_percent, 90);
                    assert_eq!(visible_light, expected, "flags {:#04x}", flags);
                    assert_eq!(mac_address, "66:55:44:33:22:11");
                }
                other => panic!("Expected Light reading, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_acceleration() {
        let data = hex("a10363004000c0ff00aabbccddeeff");
        let decoded = decode(&data).unwrap().unwrap();
        assert_eq!(decoded.product_model, 3);
        match decoded.reading {
            SensorReading::Acceleration {
                battery_percent,
                acceleration_x,
                acceleration_y,
                acceleration_z,
                mac_address,
            } => {
                assert_eq!(battery_percent, 99);
                assert_eq!(acceleration_x, 0.25);
                assert_eq!(acceleration_y, 0.75);
                assert_eq!(acceleration_z, -1.0);
                assert_eq!(mac_address, "ff:ee:dd:cc:bb:aa");
            }
            other => panic!("Expected Acceleration reading, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_info() {
        let data = hex("a10864aabbccddeeff533120506c7573");
        match decode(&data).unwrap().unwrap().reading {
            SensorReading::Info {
                battery_percent,
                mac_address,
                name,
            } => {
                assert_eq!(battery_percent, 100);
                assert_eq!(mac_address, "ff:ee:dd:cc:bb:aa");
                assert_eq!(name, "S1 Plus");
            }
            other => panic!("Expected Info reading, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_info_without_name() {
        let data = hex("a10864aabbccddeeff");
        match decode(&data).unwrap().unwrap().reading {
            SensorReading::Info { name, .. } => assert_eq!(name, ""),
            other => panic!("Expected Info reading, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_model() {
        for model in [0x00u8, 0x04, 0x07, 0x09, 0xFF] {
            let data = [0xA1, model, 0xDE, 0xAD, 0xBE, 0xEF];
            let decoded = decode(&data).unwrap().unwrap();
            assert_eq!(decoded.frame_type, 0xA1);
            assert_eq!(decoded.product_model, model);
            assert_eq!(
                decoded.reading,
                SensorReading::Unknown {
                    payload: format!("{:02x}deadbeef", model)
                }
            );
        }
    }

    #[test]
    fn test_decode_unknown_model_without_body() {
        let decoded = decode(&[0xA1, 0x05]).unwrap().unwrap();
        assert_eq!(
            decoded.reading,
            SensorReading::Unknown {
                payload: "05".to_string()
            }
        );
    }

    #[test]
    fn test_decode_truncated() {
        let cases: [(&str, &'static str, usize); 4] = [
            ("a101320d801234aabbccddee", "environment", 13),
            ("a10232", "light", 10),
            ("a1036300400000", "acceleration", 15),
            ("a10864aabb", "info", 9),
        ];
        for (payload, layout, expected) in cases {
            let data = hex(payload);
            assert_eq!(
                decode(&data),
                Err(DecodeError::TruncatedInput {
                    layout,
                    expected,
                    actual: data.len(),
                })
            );
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        let data = hex("a10363004000c0ff00aabbccddeeff");
        assert_eq!(decode(&data), decode(&data));
    }
}
