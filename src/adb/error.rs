use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for bridge and detection operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all bridge, capture and matching operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        /// stdout followed by stderr of the failed process
        output: String,
    },

    #[error("Listing devices failed, the adb server port may be in use: {source}")]
    DeviceListing { source: Box<AdbError> },

    #[error("No devices attached")]
    NoDevices,

    #[error("adb binary not found. Set ADB_PATH or install Android Platform Tools.")]
    BinaryNotFound,

    #[error("adb binary at {path:?} does not exist")]
    BinaryMissing { path: PathBuf },

    #[error("Command bridge has been shut down")]
    ShutDown,

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Could not parse screen size from 'wm size' output: {output:?}")]
    ScreenSizeParse { output: String },

    #[error("Failed to decode image: {source}")]
    Decode { source: image::ImageError },

    #[error("Failed to encode image: {source}")]
    Encode { source: image::ImageError },

    #[error("Unsupported image input: {description}")]
    UnsupportedImage { description: String },

    #[error("Template '{template}' not found on screen")]
    NoMatch { template: String },
}

impl AdbError {
    /// True when the bridge ran but the process reported failure.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, AdbError::CommandFailed { .. })
    }

    /// Split image errors into the input-shape kind and real decode failures.
    pub fn from_image_error(source: image::ImageError) -> Self {
        match source {
            image::ImageError::Unsupported(e) => AdbError::UnsupportedImage {
                description: e.to_string(),
            },
            other => AdbError::Decode { source: other },
        }
    }
}
