/// Template matching data types
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// A pixel coordinate in screen space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle between two corners, `x1 >= x0` and `y1 >= y0`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rect {
    /// Build from two opposite corners in any order
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x0 + self.width() / 2, self.y0 + self.height() / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }
}

/// Corners of one matched occurrence, in screen coordinates:
/// top-left, top-right, bottom-left, bottom-right
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBox {
    pub corners: [Point; 4],
}

impl MatchBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            corners: [
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x, y + height),
                Point::new(x + width, y + height),
            ],
        }
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[3]
    }

    /// The box as a (top-left, bottom-right) rectangle
    pub fn range(&self) -> Rect {
        let (tl, br) = (self.top_left(), self.bottom_right());
        Rect::from_corners((tl.x, tl.y), (br.x, br.y))
    }
}

/// Everything one detection call saw and found.
///
/// `boxes` and `centers` are parallel and ordered by the scan order of the
/// hit that represents each occurrence.
#[derive(Clone, Debug)]
pub struct MatchResult {
    base_image: GrayImage,
    search_image: GrayImage,
    template_size: (u32, u32),
    boxes: Vec<MatchBox>,
    centers: Vec<Point>,
}

impl MatchResult {
    pub fn new(
        base_image: GrayImage,
        search_image: GrayImage,
        template_size: (u32, u32),
        boxes: Vec<MatchBox>,
        centers: Vec<Point>,
    ) -> Self {
        debug_assert_eq!(boxes.len(), centers.len());
        Self {
            base_image,
            search_image,
            template_size,
            boxes,
            centers,
        }
    }

    /// Full grayscale screen before cropping
    pub fn base_image(&self) -> &GrayImage {
        &self.base_image
    }

    /// Grayscale region that was actually searched
    pub fn search_image(&self) -> &GrayImage {
        &self.search_image
    }

    /// (width, height) of the template
    pub fn template_size(&self) -> (u32, u32) {
        self.template_size
    }

    pub fn template_width(&self) -> u32 {
        self.template_size.0
    }

    pub fn template_height(&self) -> u32 {
        self.template_size.1
    }

    pub fn boxes(&self) -> &[MatchBox] {
        &self.boxes
    }

    pub fn centers(&self) -> &[Point] {
        &self.centers
    }

    pub fn ranges(&self) -> Vec<Rect> {
        self.boxes.iter().map(MatchBox::range).collect()
    }

    pub fn first_box(&self) -> Option<&MatchBox> {
        self.boxes.first()
    }

    pub fn first_center(&self) -> Option<Point> {
        self.centers.first().copied()
    }

    pub fn matched(&self) -> bool {
        !self.boxes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_orders_corners() {
        let r = Rect::from_corners((30, 40), (10, 20));
        assert_eq!(r, Rect { x0: 10, y0: 20, x1: 30, y1: 40 });
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 20);
        assert_eq!(r.center(), Point::new(20, 30));
        assert!(r.contains(Point::new(10, 20)));
        assert!(!r.contains(Point::new(30, 40)));
    }

    #[test]
    fn match_box_corners_and_range() {
        let b = MatchBox::new(100, 150, 50, 20);
        assert_eq!(
            b.corners,
            [
                Point::new(100, 150),
                Point::new(150, 150),
                Point::new(100, 170),
                Point::new(150, 170),
            ]
        );
        assert_eq!(b.range(), Rect::from_corners((100, 150), (150, 170)));
    }

    #[test]
    fn empty_result_is_not_matched() {
        let img = GrayImage::new(4, 4);
        let result = MatchResult::new(img.clone(), img, (2, 2), Vec::new(), Vec::new());
        assert!(!result.matched());
        assert!(result.first_center().is_none());
        assert!(result.ranges().is_empty());
    }
}
