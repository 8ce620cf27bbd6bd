//! OCR 文字跟踪 - 把逐帧的噪声检测结果整理为去重后的屏幕文字记录
//!
//! 处理顺序：
//! 1. 尺寸过滤 - 去掉过矮的框
//! 2. 同行合并 - 同一帧内同一行的碎片框合并
//! 3. 跨帧跟踪 - 按空间重叠把框串成轨迹
//! 4. 重复去重 - 轨迹内相邻的近似重复文本只保留第一条

pub mod collapser;
pub mod config;
pub mod error;
pub mod line_merger;
pub mod pipeline;
pub mod sequence_tracker;
pub mod shape_code;
pub mod similarity;
pub mod size_filter;
pub mod text_box;

pub use collapser::DuplicateCollapser;
pub use config::{DedupConfig, MatchPolicy, MergeConfig, TrackConfig, TrackingConfig};
pub use error::TrackingError;
pub use line_merger::LineMerger;
pub use pipeline::{PipelineStats, TextTrackingPipeline, TrackingOutput};
pub use sequence_tracker::{SequenceTracker, Tracker};
pub use shape_code::{FourCornerTable, ShapeCode, ShapeFeaturizer};
pub use similarity::{DuplicateJudge, Verdict};
pub use size_filter::filter_by_height;
pub use text_box::{OcrFrame, TextBox};
