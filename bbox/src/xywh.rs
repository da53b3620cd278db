use super::{Rect, HW, TLBR};
use crate::common::*;

/// Bounding box in the COCO layout: top-left corner, width and height.
///
/// Unlike [TLBR], the width and height are not checked. Annotation files
/// happily contain empty or inverted boxes and the caller decides what to
/// do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "with-serde",
    derive(Serialize, Deserialize),
    serde(from = "[T; 4]", into = "[T; 4]")
)]
pub struct XYWH<T>
where
    T: Copy,
{
    pub x: T,
    pub y: T,
    pub w: T,
    pub h: T,
}

impl<T> XYWH<T>
where
    T: Copy + Num + PartialOrd,
{
    pub fn x2(&self) -> T {
        self.x + self.w
    }

    pub fn y2(&self) -> T {
        self.y + self.h
    }

    /// Corners in (x1, y1, x2, y2) order, without clipping.
    pub fn xyxy(&self) -> [T; 4] {
        [self.x, self.y, self.x2(), self.y2()]
    }

    pub fn try_to_tlbr(&self) -> Result<TLBR<T>> {
        TLBR::try_from_tlhw([self.y, self.x, self.h, self.w])
    }
}

impl<T> XYWH<T>
where
    T: Float,
{
    /// Area of the part of the box lying inside an image of the given size.
    ///
    /// Inverted boxes have no overlap.
    pub fn overlap_area_within(&self, size: &HW<T>) -> T {
        let zero = T::zero();
        let inter_w = zero.max(self.x2().min(size.w()) - self.x.max(zero));
        let inter_h = zero.max(self.y2().min(size.h()) - self.y.max(zero));
        inter_w * inter_h
    }
}

impl<T> From<[T; 4]> for XYWH<T>
where
    T: Copy,
{
    fn from(from: [T; 4]) -> Self {
        let [x, y, w, h] = from;
        Self { x, y, w, h }
    }
}

impl<T> From<XYWH<T>> for [T; 4]
where
    T: Copy,
{
    fn from(from: XYWH<T>) -> Self {
        let XYWH { x, y, w, h } = from;
        [x, y, w, h]
    }
}
