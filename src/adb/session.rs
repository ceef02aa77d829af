use super::bridge::CommandBridge;
use super::error::{AdbError, AdbResult};
use super::types::ScreenSize;
use crate::template_matching::pixels::{self, ImageInput};
use crate::template_matching::{MatchConfig, MatchResult, Point, Rect, TemplateMatcher};
use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::time::Instant;

/// Where and how hard to look for a template.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Restrict the search to this part of the screen.
    pub region: Option<Rect>,
    /// Grayscale screen to search instead of capturing a fresh one.
    pub source_gray: Option<GrayImage>,
    pub config: MatchConfig,
}

impl FindOptions {
    pub fn within(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn on_screen(mut self, gray: GrayImage) -> Self {
        self.source_gray = Some(gray);
        self
    }
}

/// Automation surface for one attached device.
pub struct DeviceSession {
    bridge: CommandBridge,
    serial: String,
    screen_size: Option<ScreenSize>,
}

impl DeviceSession {
    /// Open a session and query the screen size once.
    pub fn open(bridge: CommandBridge, serial: impl Into<String>) -> AdbResult<Self> {
        let mut session = Self::lazy(bridge, serial);
        let size = session.screen_size()?;
        log::info!("Opened device {} ({size})", session.serial);
        Ok(session)
    }

    /// A session whose screen size will be queried on first use.
    pub fn lazy(bridge: CommandBridge, serial: impl Into<String>) -> Self {
        Self {
            bridge,
            serial: serial.into(),
            screen_size: None,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn bridge(&self) -> &CommandBridge {
        &self.bridge
    }

    pub fn execute(&self, args: &[&str]) -> AdbResult<Vec<u8>> {
        self.bridge.execute(&self.serial, args)
    }

    pub async fn execute_async(&self, args: &[&str]) -> AdbResult<Vec<u8>> {
        self.bridge.execute_async(&self.serial, args).await
    }

    fn execute_text(&self, args: &[&str]) -> AdbResult<String> {
        let out = self.execute(args)?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// Landscape-normalized size, from cache or `wm size`.
    pub fn screen_size(&mut self) -> AdbResult<ScreenSize> {
        if let Some(size) = self.screen_size {
            return Ok(size);
        }
        let output = self.execute_text(&["shell", "wm", "size"])?;
        let size = ScreenSize::parse_wm_size(&output).ok_or(AdbError::ScreenSizeParse { output })?;
        self.screen_size = Some(size);
        Ok(size)
    }

    pub fn cached_screen_size(&self) -> Option<ScreenSize> {
        self.screen_size
    }

    /// Forget the cached size, e.g. after `wm size` was overridden.
    pub fn clear_screen_size(&mut self) {
        self.screen_size = None;
    }

    pub fn capture(&self) -> AdbResult<DynamicImage> {
        let start = Instant::now();
        let bytes = self.execute(&["exec-out", "screencap", "-p"])?;
        let image = pixels::decode(&bytes)?;
        log::debug!(
            "Captured {}x{} from {} in {}ms",
            image.width(),
            image.height(),
            self.serial,
            start.elapsed().as_millis()
        );
        Ok(image)
    }

    /// Capture and decode on the worker pool.
    pub async fn capture_async(&self) -> AdbResult<DynamicImage> {
        let bytes = self.execute_async(&["exec-out", "screencap", "-p"]).await?;
        self.bridge
            .spawn_limited(move |_| pixels::decode(&bytes))
            .await
    }

    pub fn to_gray<'a>(&self, input: impl Into<ImageInput<'a>>) -> AdbResult<GrayImage> {
        pixels::to_gray(input)
    }

    pub fn crop(&self, image: &DynamicImage, region: Option<&Rect>) -> DynamicImage {
        pixels::crop_color(image, region)
    }

    /// Fresh capture, optionally cropped, in grayscale.
    pub fn gray_capture(&self, region: Option<&Rect>) -> AdbResult<GrayImage> {
        let screen = self.capture()?;
        Ok(pixels::crop_color(&screen, region).to_luma8())
    }

    pub fn to_base64_png(&self, image: &DynamicImage) -> AdbResult<String> {
        pixels::to_base64_png(image)
    }

    pub fn click(&self, x: u32, y: u32) -> AdbResult<()> {
        let (x, y) = (x.to_string(), y.to_string());
        self.execute(&["shell", "input", "tap", x.as_str(), y.as_str()])?;
        Ok(())
    }

    pub async fn click_async(&self, x: u32, y: u32) -> AdbResult<()> {
        let (x, y) = (x.to_string(), y.to_string());
        self.execute_async(&["shell", "input", "tap", x.as_str(), y.as_str()]).await?;
        Ok(())
    }

    /// Locate every occurrence of `template` on the screen.
    ///
    /// Finding nothing is not an error: check [`MatchResult::matched`].
    pub fn find_matches<'a>(
        &self,
        template: impl Into<ImageInput<'a>>,
        options: FindOptions,
    ) -> AdbResult<MatchResult> {
        let FindOptions {
            region,
            source_gray,
            config,
        } = options;
        let template = pixels::to_gray(template)?;
        let base = match source_gray {
            Some(gray) => gray,
            None => self.capture()?.to_luma8(),
        };
        Ok(TemplateMatcher::new(config).detect(base, region, &template))
    }

    pub async fn find_matches_async<'a>(
        &self,
        template: impl Into<ImageInput<'a>>,
        options: FindOptions,
    ) -> AdbResult<MatchResult> {
        let FindOptions {
            region,
            source_gray,
            config,
        } = options;
        let template = PendingTemplate::from(template.into());
        let base = match source_gray {
            Some(gray) => gray,
            None => self.capture_async().await?.to_luma8(),
        };
        self.bridge
            .spawn_limited(move |_| {
                let template = template.load()?;
                Ok(TemplateMatcher::new(config).detect(base, region, &template))
            })
            .await
    }

    /// Centers of every occurrence, or `None` when nothing matched.
    pub fn find_centers<'a>(
        &self,
        template: impl Into<ImageInput<'a>>,
        options: FindOptions,
    ) -> AdbResult<Option<Vec<Point>>> {
        let result = self.find_matches(template, options)?;
        Ok(result.matched().then(|| result.centers().to_vec()))
    }

    /// Tap the first occurrence of `template`; [`AdbError::NoMatch`] if absent.
    pub fn click_first_match<'a>(
        &self,
        template: impl Into<ImageInput<'a>>,
        options: FindOptions,
    ) -> AdbResult<Point> {
        let template = template.into();
        let result = self.find_matches(template, options)?;
        let center = result.first_center().ok_or_else(|| AdbError::NoMatch {
            template: template.describe(),
        })?;
        self.click(center.x, center.y)?;
        Ok(center)
    }

    pub async fn click_first_match_async<'a>(
        &self,
        template: impl Into<ImageInput<'a>>,
        options: FindOptions,
    ) -> AdbResult<Point> {
        let template = template.into();
        let label = template.describe();
        let result = self.find_matches_async(template, options).await?;
        let center = result
            .first_center()
            .ok_or(AdbError::NoMatch { template: label })?;
        self.click_async(center.x, center.y).await?;
        Ok(center)
    }

    /// `am start <activity>`, e.g. `-n com.example/.MainActivity`.
    pub fn launch(&self, activity: &str) -> AdbResult<String> {
        self.execute_text(&["shell", "am", "start", activity])
    }

    /// PID of a running package. A non-running app is `Ok(None)`: `pidof`
    /// exits non-zero in that case.
    pub fn pid(&self, package: &str) -> AdbResult<Option<String>> {
        match self.execute_text(&["shell", "pidof", package]) {
            Ok(pid) if pid.is_empty() => Ok(None),
            Ok(pid) => Ok(Some(pid)),
            Err(AdbError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Component of the package's activity record, from `dumpsys`.
    pub fn activity(&self, package: &str) -> AdbResult<Option<String>> {
        let dump = self.execute_text(&["shell", "dumpsys", "activity", "activities", package])?;
        Ok(parse_activity_component(&dump, package))
    }
}

/// Template owned by a worker job; files are read on the worker.
enum PendingTemplate {
    File(PathBuf),
    Gray(GrayImage),
}

impl PendingTemplate {
    fn load(self) -> AdbResult<GrayImage> {
        match self {
            PendingTemplate::File(path) => pixels::to_gray(&path),
            PendingTemplate::Gray(gray) => Ok(gray),
        }
    }
}

impl From<ImageInput<'_>> for PendingTemplate {
    fn from(input: ImageInput<'_>) -> Self {
        match input {
            ImageInput::Path(path) => PendingTemplate::File(path.to_path_buf()),
            ImageInput::Image(img) => PendingTemplate::Gray(img.to_luma8()),
            ImageInput::Gray(img) => PendingTemplate::Gray(img.clone()),
        }
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("serial", &self.serial)
            .field("screen_size", &self.screen_size)
            .finish()
    }
}

/// First `mActivityComponent=...` line mentioning `package`, value after the
/// last `=`.
pub fn parse_activity_component(dump: &str, package: &str) -> Option<String> {
    dump.lines()
        .filter(|line| line.contains(package))
        .map(str::trim)
        .find(|line| line.starts_with("mActivityComponent"))
        .and_then(|line| line.rsplit('=').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
