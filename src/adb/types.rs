// Core bridge types
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of `adb devices` output.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Device {
    pub serial: String,
    pub state: String,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }
}

/// Landscape-normalized screen dimensions, `width >= height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    /// Build from either orientation; the larger side becomes the width.
    pub fn landscape(a: u32, b: u32) -> Self {
        Self {
            width: a.max(b),
            height: a.min(b),
        }
    }

    /// Parse `wm size` output such as `Physical size: 1080x2400`.
    ///
    /// Only the last whitespace-separated token is considered, so an
    /// `Override size:` line printed after the physical one wins.
    pub fn parse_wm_size(output: &str) -> Option<Self> {
        let token = output.split_whitespace().last()?;
        let (w, h) = token.split_once('x')?;
        let w = w.trim().parse::<u32>().ok()?;
        let h = h.trim().parse::<u32>().ok()?;
        Some(Self::landscape(w, h))
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
