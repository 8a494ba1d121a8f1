mod catalog_routes;
pub mod config;
mod guards;
mod http_layers;
mod liked_songs_routes;
pub mod server;
mod session;
pub mod state;
mod views;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::Session;
