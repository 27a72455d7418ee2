//! Remote service integrations for reelsmith.

pub mod veo_api_client;

pub use veo_api_client::VeoApiClient;
