pub mod configuration;
pub mod seed;
pub mod server;
