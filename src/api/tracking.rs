//! OCR 文字跟踪对外接口

use log::info;
use serde::{Deserialize, Serialize};

use crate::api::models::ocr::{TrackedText, TrackingReport};
use crate::core::tracking::{OcrFrame, TextTrackingPipeline, TrackingConfig, TrackingError};

/// 可序列化的错误类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingApiError {
    pub error_type: String,
    pub message: String,
}

impl From<TrackingError> for TrackingApiError {
    fn from(err: TrackingError) -> Self {
        let error_type = match &err {
            TrackingError::Io(_) => "Io",
            TrackingError::Json(_) => "InvalidInput",
            TrackingError::Config(_) => "InvalidConfig",
            TrackingError::ShapeTable { .. } => "InvalidShapeTable",
        };
        Self {
            error_type: error_type.to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for TrackingApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}

impl std::error::Error for TrackingApiError {}

/// 视频 OCR 文字跟踪器
///
/// ```ignore
/// let tracker = OcrTextTracker::create();
/// let report = tracker.process(frames);
/// for region in &report.regions {
///     println!("{}", region.lines.join(" / "));
/// }
/// ```
pub struct OcrTextTracker {
    pipeline: TextTrackingPipeline,
}

impl OcrTextTracker {
    pub fn create() -> Self {
        info!("🎬 OcrTextTracker: created");
        Self {
            pipeline: TextTrackingPipeline::new(),
        }
    }

    /// 从 JSON5 配置创建
    pub fn with_config_json5(config: &str) -> Result<Self, TrackingApiError> {
        let config = TrackingConfig::from_json5_str(config)?;
        let pipeline = TextTrackingPipeline::with_config(&config)?;
        info!("🎬 OcrTextTracker: created with custom config");
        Ok(Self { pipeline })
    }

    /// 处理整段视频的逐帧 OCR 结果
    pub fn process(&self, frames: Vec<OcrFrame>) -> TrackingReport {
        let output = self.pipeline.run(frames);
        TrackingReport {
            regions: output.trackers.iter().map(TrackedText::from).collect(),
            stats: output.stats,
        }
    }

    /// 输入为 `[[{cx, cy, w, h, text, degree}, ...], ...]`
    pub fn process_json(&self, json: &str) -> Result<TrackingReport, TrackingApiError> {
        let frames: Vec<OcrFrame> = serde_json::from_str(json).map_err(TrackingError::from)?;
        Ok(self.process(frames))
    }
}

impl Default for OcrTextTracker {
    fn default() -> Self {
        Self::create()
    }
}

impl Drop for OcrTextTracker {
    fn drop(&mut self) {
        info!("🗑️ OcrTextTracker: released");
    }
}

/// 一次性处理 JSON 输入
pub fn track_ocr_json(json: &str, config: Option<&str>) -> Result<TrackingReport, TrackingApiError> {
    let tracker = match config {
        Some(cfg) => OcrTextTracker::with_config_json5(cfg)?,
        None => OcrTextTracker::create(),
    };
    tracker.process_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        [{"cx": 180, "cy": 656, "w": 357, "h": 41, "text": "E生平安医疗险", "degree": 0},
         {"cx": 540, "cy": 656, "w": 357, "h": 41, "text": "E生平安医疗险", "degree": 0},
         {"cx": 185, "cy": 53, "text": "PINUAN", "w": 184, "h": 26, "degree": 0}],
        [{"cx": 182, "cy": 657, "w": 715, "h": 41, "text": "E生平安医疗险E生平安医疗险"}],
        []
    ]"#;

    #[test]
    fn test_track_json_sample() {
        let report = track_ocr_json(SAMPLE, None).expect("sample should track");
        assert_eq!(report.regions.len(), 1);

        let region = &report.regions[0];
        assert_eq!(region.lines, vec!["E生平安医疗险E生平安医疗险"]);
        assert_eq!((region.left, region.top, region.width, region.height), (180, 656, 717, 41));
        assert_eq!(report.stats.frames, 3);
        assert_eq!(report.stats.collapsed_boxes, 1);
    }

    #[test]
    fn test_invalid_json_maps_to_invalid_input() {
        let err = track_ocr_json("[[{\"cx\": 1}]]", None).unwrap_err();
        assert_eq!(err.error_type, "InvalidInput");
    }

    #[test]
    fn test_invalid_config_maps_to_invalid_config() {
        let err = track_ocr_json(SAMPLE, Some("{ min_box_height: }")).unwrap_err();
        assert_eq!(err.error_type, "InvalidConfig");
    }

    #[test]
    fn test_config_can_disable_size_filter() {
        let report = track_ocr_json(SAMPLE, Some("{ min_box_height: 0 }")).expect("tracks");
        assert_eq!(report.regions.len(), 2);
        assert_eq!(report.stats.filtered_boxes, 4);
    }
}
