pub mod client;
pub mod endpoints;
pub mod interceptors;
pub mod models;
pub mod normalizer;
pub mod request;
pub mod status;
