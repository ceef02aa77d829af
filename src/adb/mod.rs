// ADB module - drives the adb command-line bridge
// Process dispatch (bridge), per-device automation (session), and the
// configuration and binary lookup around them.

pub mod bridge;
pub mod config;
pub mod error;
pub mod locate;
pub mod runner;
pub mod session;
pub mod types;


// Re-export the main types and functions for easy access
pub use bridge::CommandBridge;
pub use config::BridgeConfig;
pub use error::{AdbError, AdbResult};
pub use locate::{BridgeLocator, DefaultLocator, FixedLocator};
pub use runner::{ProcessRunner, SystemRunner};
pub use session::{DeviceSession, FindOptions};
pub use types::{Device, ScreenSize};
