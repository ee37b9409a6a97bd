mod bluetooth;
mod config;
mod error;
mod models;
mod utils;

use log::{debug, error, info, warn};
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

use bluetooth::{decode_advertisement, parse_advertisement_line};
use config::SensorConfig;
use models::{BeaconTotals, DecodedSample, MinewData, SensorReading};
use utils::{format_datetime, record_sample, summarize_readings};

fn log_reading(data: &MinewData, config: &SensorConfig) {
    match &data.reading {
        SensorReading::Environment {
            battery_percent,
            temperature,
            humidity,
            mac_address,
        } => info!(
            "{} ({}): temp={:.2}°C, humidity={:.2}%, battery={}%",
            config.name_for(mac_address),
            mac_address,
            temperature,
            humidity,
            battery_percent
        ),
        SensorReading::Light {
            battery_percent,
            visible_light,
            mac_address,
        } => info!(
            "{} ({}): visible light={}, battery={}%",
            config.name_for(mac_address),
            mac_address,
            visible_light,
            battery_percent
        ),
        SensorReading::Acceleration {
            battery_percent,
            acceleration_x,
            acceleration_y,
            acceleration_z,
            mac_address,
        } => info!(
            "{} ({}): acc=({:.3}, {:.3}, {:.3}) g, battery={}%",
            config.name_for(mac_address),
            mac_address,
            acceleration_x,
            acceleration_y,
            acceleration_z,
            battery_percent
        ),
        SensorReading::Info {
            battery_percent,
            mac_address,
            name,
        } => info!(
            "{} ({}): device name='{}', battery={}%",
            config.name_for(mac_address),
            mac_address,
            name,
            battery_percent
        ),
        SensorReading::Unknown { payload } => warn!(
            "Unknown product model {} in frame {:#04x}: payload={}",
            data.product_model, data.frame_type, payload
        ),
    }
}

/// Read advertisement lines until end of input or shutdown, folding each
/// decoded reading into per-beacon running totals
async fn collect_readings<R>(
    reader: R,
    config: &SensorConfig,
    shutdown: &mut oneshot::Receiver<()>,
) -> Result<HashMap<String, BeaconTotals>, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut totals: HashMap<String, BeaconTotals> = HashMap::new();
    let mut lines = reader.lines();

    loop {
        // next_line is cancel safe, so a pending partial line survives losing the race
        let line = tokio::select! {
            biased;
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => {
                    info!("End of input reached");
                    break;
                }
            },
            _ = &mut *shutdown => {
                info!("Program terminated by user. Summarizing collected readings.");
                break;
            }
        };

        let service_data = match parse_advertisement_line(&line) {
            Ok(service_data) if service_data.is_empty() => continue,
            Ok(service_data) => service_data,
            Err(e) => {
                error!("Skipping line: {}", e);
                continue;
            }
        };

        let data = match decode_advertisement(&service_data, &config.service_uuid) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("No Minew sensor frame in advertisement");
                continue;
            }
            Err(e) => {
                error!("Decoding failed: {}", e);
                continue;
            }
        };

        log_reading(&data, config);

        let sample = DecodedSample {
            data,
            time: OffsetDateTime::now_utc(),
        };
        if !record_sample(&mut totals, &sample) {
            debug!("Reading without beacon address not aggregated");
        }
    }

    Ok(totals)
}

async fn main_loop(
    config: SensorConfig,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Reading advertisements for service {} from stdin",
        config.service_uuid
    );

    let start_time = OffsetDateTime::now_utc();
    let reader = BufReader::new(tokio::io::stdin());
    let totals = collect_readings(reader, &config, &mut shutdown).await?;

    info!(
        "Collection complete at: {} (started {})",
        format_datetime(&OffsetDateTime::now_utc()),
        format_datetime(&start_time)
    );

    let summaries = summarize_readings(&totals, &config);

    // Print summary
    for (mac, summary) in summaries.iter() {
        info!("Summary for {} ({}):", summary.name, mac);
        info!("  Product model: {}", summary.product_model);
        info!("  Battery: {}%", summary.battery_percent);
        if let Some(temperature) = summary.temperature {
            info!("  Average temperature: {:.2}°C", temperature);
        }
        if let Some(humidity) = summary.humidity {
            info!("  Average humidity: {:.2}%", humidity);
        }
        if let (Some(x), Some(y), Some(z)) = (
            summary.acceleration_x,
            summary.acceleration_y,
            summary.acceleration_z,
        ) {
            info!("  Average acceleration: ({:.3}, {:.3}, {:.3}) g", x, y, z);
        }
        if summary.product_model == 2 {
            info!("  Visible light samples: {}", summary.visible_light_samples);
        }
        if let Some(device_name) = &summary.device_name {
            info!("  Device name: {}", device_name);
        }
        info!(
            "  Based on {} samples, last at {}",
            summary.samples,
            format_datetime(&summary.time)
        );
    }

    if summaries.is_empty() {
        warn!("No Minew readings decoded!");
    }

    Ok(())
}

/// Logger filtered by `RUST_LOG` when set, info level otherwise
fn logger_builder(filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filters.unwrap_or("info"));
    builder
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logger_builder(std::env::var("RUST_LOG").ok().as_deref())
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match SensorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        let _ = tx.send(());
    });

    match main_loop(config, rx).await {
        Ok(_) => info!("Program completed successfully"),
        Err(e) => error!("Fatal error: {}", e),
    }

    Ok(())
}
