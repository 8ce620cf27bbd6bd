use serde::{Deserialize, Serialize};

/// 单个 OCR 检测框
///
/// `cx`/`cy` 是左上角坐标（沿用上游 OCR 字段名），`w`/`h` 必须为正。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub cx: i32,
    pub cy: i32,
    pub w: i32,
    pub h: i32,
    pub text: String,
    #[serde(default)]
    pub degree: f32,
}

/// 一帧的全部检测结果，顺序无意义
pub type OcrFrame = Vec<TextBox>;

impl TextBox {
    pub fn new(cx: i32, cy: i32, w: i32, h: i32, text: impl Into<String>) -> Self {
        Self {
            cx,
            cy,
            w,
            h,
            text: text.into(),
            degree: 0.0,
        }
    }

    pub fn right(&self) -> i32 {
        self.cx + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.cy + self.h
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// 纵向重叠像素数
    pub fn y_overlap(&self, other: &TextBox) -> i32 {
        interval_overlap(self.cy, self.bottom(), other.cy, other.bottom())
    }

    /// 横向重叠像素数
    pub fn x_overlap(&self, other: &TextBox) -> i32 {
        interval_overlap(self.cx, self.right(), other.cx, other.right())
    }

    /// 左侧框右边缘到右侧框左边缘的距离，已重叠时为负
    pub fn x_gap(&self, other: &TextBox) -> i32 {
        let (left, right) = if self.cx > other.cx {
            (other, self)
        } else {
            (self, other)
        };
        right.cx - left.right()
    }

    /// 交集面积 / 较小框面积
    pub fn overlap_over_min_area(&self, other: &TextBox) -> f32 {
        let inter = self.x_overlap(other) as i64 * self.y_overlap(other) as i64;
        let min_area = self.area().min(other.area());
        if min_area <= 0 {
            return 0.0;
        }
        inter as f32 / min_area as f32
    }
}

fn interval_overlap(a1: i32, a2: i32, b1: i32, b2: i32) -> i32 {
    (a2.min(b2) - a1.max(b1)).max(0)
}
