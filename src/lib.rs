pub mod adb;
pub mod template_matching;

pub use adb::{AdbError, AdbResult, BridgeConfig, CommandBridge, DeviceSession, FindOptions};
pub use template_matching::{MatchResult, Point, Rect, ScreenCut};
