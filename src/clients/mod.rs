pub mod mapbox_client;
pub mod printify_client;

pub use mapbox_client::GeocodingClient;
pub use printify_client::CatalogClient;
