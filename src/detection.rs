use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::PixelPoint;

/// Contains the (xmin,ymin) - (xmax,ymax) corners of the bbox in pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,
}

impl Detection {
    pub fn new(bbox: BBox<Ltrb>, confidence: f32, class: i32) -> Self {
        Self {
            xmin: bbox.left(),
            ymin: bbox.top(),
            xmax: bbox.right(),
            ymax: bbox.bottom(),
            confidence,
            class,
        }
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.xmin, self.ymin, self.xmax, self.ymax)
    }

    #[inline(always)]
    pub fn center(&self) -> PixelPoint {
        self.bbox().center()
    }
}
