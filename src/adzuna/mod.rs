pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod normalize;
pub mod request;
pub mod types;
