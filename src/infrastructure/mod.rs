pub mod config;
pub mod highlight;
pub mod http_client;
pub mod logging;
pub mod output;
