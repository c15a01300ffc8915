//! Tech Racing - Race session engine
//!
//! The lane racing simulation lives in [`game_server`]. With the `desktop`
//! feature the engine is also served to the web front end as Tauri commands.

pub mod game_server;

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::run;
