pub mod catalog;
pub mod geocode;
pub mod itinerary;

pub use catalog::CatalogResource;
pub use geocode::{FeatureCollection, SuggestionRequest};
pub use itinerary::{ItineraryRequest, Location};
