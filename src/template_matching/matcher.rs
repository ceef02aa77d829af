/// Template matching implementation
///
/// Correlation score surface, thresholding, and reduction of the dense hit
/// clusters around each occurrence to one representative point.
use super::pixels::crop_gray;
use super::types::{MatchBox, MatchResult, Point, Rect};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Score surface: one `f32` per placement of the template's top-left corner
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Default minimum score, exclusive
pub const DEFAULT_THRESHOLD: f32 = 0.9;
/// Hits closer than this (on both axes) to the last kept hit are merged into it
pub const DEFAULT_CLUSTER_DISTANCE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Zero-mean normalized cross-correlation, in [-1, 1]
    #[default]
    CorrelationCoefficient,
    /// Plain normalized cross-correlation (`imageproc`), in [0, 1]
    CrossCorrelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Clustering {
    /// Single pass in scan order against the last kept hit
    #[default]
    ScanOrder,
    /// Greedy by score against every kept hit
    NonMaxSuppression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Scores must be strictly greater than this to count as a hit
    pub threshold: f32,
    pub method: MatchMethod,
    pub clustering: Clustering,
    pub cluster_distance: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            method: MatchMethod::default(),
            clustering: Clustering::default(),
            cluster_distance: DEFAULT_CLUSTER_DISTANCE,
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// A score-surface coordinate above threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

/// Finds template occurrences in grayscale screens
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    config: MatchConfig,
}

impl TemplateMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Search `template` inside `base` (optionally restricted to `region`).
    ///
    /// Boxes and centers come back in screen coordinates: the region's
    /// top-left corner is added to every hit.
    pub fn detect(&self, base: GrayImage, region: Option<Rect>, template: &GrayImage) -> MatchResult {
        let search = crop_gray(&base, region.as_ref());
        let (ox, oy) = region.map(|r| (r.x0, r.y0)).unwrap_or((0, 0));
        let (tw, th) = template.dimensions();

        if tw == 0 || th == 0 || tw > search.width() || th > search.height() {
            log::warn!(
                "Template {}x{} does not fit search area {}x{}",
                tw,
                th,
                search.width(),
                search.height()
            );
            return MatchResult::new(base, search, (tw, th), Vec::new(), Vec::new());
        }

        let start = std::time::Instant::now();
        let scores = score_map(&search, template, self.config.method);
        let hits = collect_hits(&scores, self.config.threshold);
        let kept = match self.config.clustering {
            Clustering::ScanOrder => reduce_scan_order(&hits, self.config.cluster_distance),
            Clustering::NonMaxSuppression => suppress_non_max(&hits, self.config.cluster_distance),
        };
        log::debug!(
            "Template {}x{} in {}x{}: {} hits, {} kept ({}ms)",
            tw,
            th,
            search.width(),
            search.height(),
            hits.len(),
            kept.len(),
            start.elapsed().as_millis()
        );

        let boxes = kept
            .iter()
            .map(|h| MatchBox::new(h.x + ox, h.y + oy, tw, th))
            .collect();
        let centers = kept
            .iter()
            .map(|h| Point::new(h.x + ox + tw / 2, h.y + oy + th / 2))
            .collect();
        MatchResult::new(base, search, (tw, th), boxes, centers)
    }
}

/// Score every placement of `template` in `image`.
///
/// The template must fit inside the image.
pub fn score_map(image: &GrayImage, template: &GrayImage, method: MatchMethod) -> ScoreMap {
    match method {
        MatchMethod::CorrelationCoefficient => correlation_coefficient(image, template),
        MatchMethod::CrossCorrelation => {
            match_template(image, template, MatchTemplateMethod::CrossCorrelationNormalized)
        }
    }
}

/// Coordinates scoring strictly above `threshold`, row-major.
pub fn collect_hits(scores: &ScoreMap, threshold: f32) -> Vec<Hit> {
    scores
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > threshold)
        .map(|(x, y, p)| Hit { x, y, score: p[0] })
        .collect()
}

/// Keep the first hit, then every hit at least `distance` past the last kept
/// one on either axis.
///
/// Clusters nearer than `distance` on both axes collapse into one, and
/// because only the last kept hit is compared, interleaved clusters on the
/// same rows can be split or merged depending on scan order.
pub fn reduce_scan_order(hits: &[Hit], distance: u32) -> Vec<Hit> {
    let Some(first) = hits.first() else {
        return Vec::new();
    };
    let d = i64::from(distance);
    let mut kept = vec![*first];
    for hit in &hits[1..] {
        let last = kept[kept.len() - 1];
        if i64::from(hit.x) - d >= i64::from(last.x) || i64::from(hit.y) - d >= i64::from(last.y) {
            kept.push(*hit);
        }
    }
    kept
}

/// Greedy non-maximum suppression: best score first, a hit survives when it
/// is at least `distance` away on some axis from every survivor. Survivors are
/// returned in scan order.
pub fn suppress_non_max(hits: &[Hit], distance: u32) -> Vec<Hit> {
    let mut order: Vec<&Hit> = hits.iter().collect();
    order.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Hit> = Vec::new();
    for hit in order {
        let isolated = kept
            .iter()
            .all(|k| hit.x.abs_diff(k.x) >= distance || hit.y.abs_diff(k.y) >= distance);
        if isolated {
            kept.push(*hit);
        }
    }
    kept.sort_by_key(|h| (h.y, h.x));
    kept
}

/// Per-pixel running sums with a zero row and column in front
struct SummedArea {
    stride: usize,
    sum: Vec<u64>,
    sq: Vec<u64>,
}

impl SummedArea {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sq = vec![0u64; stride * (h + 1)];
        let raw = image.as_raw();
        for y in 0..h {
            let (mut row_sum, mut row_sq) = (0u64, 0u64);
            for x in 0..w {
                let v = u64::from(raw[y * w + x]);
                row_sum += v;
                row_sq += v * v;
                let i = (y + 1) * stride + x + 1;
                sum[i] = sum[i - stride] + row_sum;
                sq[i] = sq[i - stride] + row_sq;
            }
        }
        Self { stride, sum, sq }
    }

    /// (sum, sum of squares) over the `w` x `h` window at `(x, y)`
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let s = self.stride;
        let at = |t: &[u64]| t[(y + h) * s + x + w] + t[y * s + x] - t[y * s + x + w] - t[(y + h) * s + x];
        (at(&self.sum), at(&self.sq))
    }
}

fn correlation_coefficient(image: &GrayImage, template: &GrayImage) -> ScoreMap {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    let (out_w, out_h) = (iw - tw + 1, ih - th + 1);
    let (tw, th, stride) = (tw as usize, th as usize, iw as usize);
    let n = (tw * th) as f64;

    let tpl = template.as_raw();
    let t_sum = tpl.iter().map(|&v| u64::from(v)).sum::<u64>() as f64;
    let t_sq = tpl.iter().map(|&v| u64::from(v) * u64::from(v)).sum::<u64>() as f64;
    let t_var = t_sq - t_sum * t_sum / n;

    let mut scores = ScoreMap::new(out_w, out_h);
    if t_var <= 0.0 {
        // flat template: correlation undefined everywhere
        return scores;
    }

    let table = SummedArea::new(image);
    let raw = image.as_raw();

    // sum(I * (T - mean T)) == sum(I * T) - sum(I) * sum(T) / n, so only the
    // raw integer product has to be accumulated per placement
    scores
        .par_chunks_mut(out_w as usize)
        .enumerate()
        .for_each(|(y, out)| {
            for (x, score) in out.iter_mut().enumerate() {
                let (sum, sq) = table.window(x, y, tw, th);
                let (sum, sq) = (sum as f64, sq as f64);
                let w_var = sq - sum * sum / n;
                let denom = (t_var * w_var).sqrt();
                if w_var <= 1e-9 || !denom.is_finite() {
                    continue;
                }
                let cross: u64 = (0..th)
                    .map(|ty| {
                        let at = (y + ty) * stride + x;
                        u64::from(dot(&raw[at..at + tw], &tpl[ty * tw..(ty + 1) * tw]))
                    })
                    .sum();
                let num = cross as f64 - sum * t_sum / n;
                *score = (num / denom).clamp(-1.0, 1.0) as f32;
            }
        });
    scores
}

/// Integer dot product of one image row segment with one template row.
/// Fits `u32` for rows up to 66k pixels.
#[inline]
fn dot(row: &[u8], tpl: &[u8]) -> u32 {
    row.iter()
        .zip(tpl)
        .map(|(&a, &b)| u32::from(a) * u32::from(b))
        .sum()
}
