pub mod metadata;
pub mod network;
pub mod store;

pub use metadata::ModelMetadata;
pub use network::Network;
pub use store::ModelStore;
