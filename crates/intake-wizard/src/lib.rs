pub mod config;
pub mod error;
pub mod requirements;
pub mod telemetry;
pub mod timeline;
pub mod wizard;
