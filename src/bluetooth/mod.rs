pub mod decoder;
pub mod service_data;

pub use decoder::MINEW_SERVICE_UUID;
pub use service_data::{decode_advertisement, parse_advertisement_line};
