/// Template matching module for locating UI elements in screenshots
///
/// This module provides:
/// - Decoding, grayscale conversion and cropping of captured screens
/// - Grid cuts of the screen for targeted searching
/// - Correlation-based matching with configurable thresholds
/// - Reduction of dense hit clusters to one point per occurrence
pub mod matcher;
pub mod pixels;
pub mod region;
pub mod types;

pub use matcher::{Clustering, MatchConfig, MatchMethod, TemplateMatcher};
pub use pixels::ImageInput;
pub use region::ScreenCut;
pub use types::{MatchBox, MatchResult, Point, Rect};
