pub mod inbound;
pub mod outbound;

pub use inbound::TerritoryClassifier;
pub use outbound::ReverseGeocoder;
