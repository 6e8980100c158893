//! Port traits between the domain and the outside world.

pub mod config_port;
pub mod price_store_port;
pub mod quote_port;
