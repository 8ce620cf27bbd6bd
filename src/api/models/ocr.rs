use serde::{Deserialize, Serialize};

use crate::core::tracking::{PipelineStats, Tracker};

/// 一条去重后的文字轨迹
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedText {
    /// 按时间顺序的不同文本
    pub lines: Vec<String>,
    /// 首次出现时的位置
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl From<&Tracker> for TrackedText {
    fn from(tracker: &Tracker) -> Self {
        let (left, top, width, height) = tracker
            .boxes()
            .first()
            .map(|b| (b.cx, b.cy, b.w, b.h))
            .unwrap_or_default();
        Self {
            lines: tracker.texts().map(str::to_string).collect(),
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingReport {
    pub regions: Vec<TrackedText>,
    pub stats: PipelineStats,
}
