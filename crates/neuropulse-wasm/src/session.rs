//! 录制会话
//!
//! - `RecordingSession`：单项测试，页面按采样节拍推送 canvas 帧并记录点击反应
//! - `Screening`：三项测试结果槽位、综合 NeuroScore、洞察文本与本地历史

use std::sync::Arc;

use neuropulse::analysis::config::AnalysisConfig;
use neuropulse::analysis::frame::PixelBuffer;
use neuropulse::reaction::ReactionSample;
use neuropulse::screening::{
    ScreeningError, ScreeningSession, SessionHistory, TestKind, TestResult, TestRun,
};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// 页面使用的测试类型名
pub fn parse_kind(kind: &str) -> Option<TestKind> {
    match kind {
        "simple" => Some(TestKind::Simple),
        "dotgrid" | "dotGrid" => Some(TestKind::DotGrid),
        "flash" => Some(TestKind::Flash),
        _ => None,
    }
}

fn load_config(config_json: &str) -> Result<Arc<AnalysisConfig>, JsError> {
    AnalysisConfig::from_json(config_json)
        .map(Arc::new)
        .map_err(js_error)
}

/// 单项测试录制会话
#[wasm_bindgen]
pub struct RecordingSession {
    run: TestRun,
}

#[wasm_bindgen]
impl RecordingSession {
    /// `kind`: "simple" | "dotgrid" | "flash"
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str) -> Result<RecordingSession, JsError> {
        Self::build(kind, Arc::new(AnalysisConfig::default()))
    }

    /// 使用 JSON 形式的分析参数（camelCase，可只覆盖部分字段）
    #[wasm_bindgen(js_name = "withConfig")]
    pub fn with_config(kind: &str, config_json: &str) -> Result<RecordingSession, JsError> {
        Self::build(kind, load_config(config_json)?)
    }

    /// 开始录制
    ///
    /// # 参数
    /// - `timestamp`: 会话起点，应与 `pushFrame` 的帧时间戳使用同一时钟（如 `performance.now()`）；
    ///   省略时取 `Date.now()`
    pub fn start(&mut self, timestamp: Option<f64>) -> Result<(), JsError> {
        let at_ms = timestamp.unwrap_or_else(js_sys::Date::now);
        self.run.begin(at_ms).map_err(js_error)
    }

    /// 推送一帧 RGBA 数据
    ///
    /// # 返回
    /// 与上一帧的运动指数；首帧返回 -1
    #[wasm_bindgen(js_name = "pushFrame")]
    pub fn push_frame(
        &mut self,
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp: f64,
    ) -> Result<i32, JsError> {
        let frame = PixelBuffer::rgba(width, height, data, timestamp).map_err(js_error)?;
        let movement = self.run.on_frame(frame).map_err(js_error)?;
        Ok(movement.map_or(-1, i32::from))
    }

    /// 记录闪光灯触发时间
    #[wasm_bindgen(js_name = "markFlash")]
    pub fn mark_flash(&mut self, timestamp: f64) -> Result<(), JsError> {
        self.run.mark_flash(timestamp).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "recordHit")]
    pub fn record_hit(&mut self, reaction_ms: f64) -> Result<(), JsError> {
        self.record(ReactionSample::Hit { ms: reaction_ms })
    }

    #[wasm_bindgen(js_name = "recordMiss")]
    pub fn record_miss(&mut self) -> Result<(), JsError> {
        self.record(ReactionSample::Miss)
    }

    #[wasm_bindgen(js_name = "recordError")]
    pub fn record_error(&mut self) -> Result<(), JsError> {
        self.record(ReactionSample::Error)
    }

    /// 当前阶段："idle" | "recording" | "analyzing" | "completed"
    pub fn phase(&self) -> String {
        self.run.phase().to_string()
    }

    #[wasm_bindgen(js_name = "frameCount")]
    pub fn frame_count(&self) -> usize {
        self.run.video().frame_count()
    }

    /// 结束录制并返回测试结果；闪光测试未检测到人脸时抛出错误，会话回到 idle
    pub fn finish(&mut self) -> Result<JsValue, JsError> {
        let result = self.finish_result().map_err(js_error)?;
        to_js(&result)
    }
}

impl RecordingSession {
    fn build(kind: &str, config: Arc<AnalysisConfig>) -> Result<RecordingSession, JsError> {
        let kind = parse_kind(kind).ok_or_else(|| JsError::new(&format!("unknown test kind: {kind}")))?;
        Ok(Self {
            run: TestRun::new(kind, config),
        })
    }

    fn record(&mut self, sample: ReactionSample) -> Result<(), JsError> {
        self.run.record_reaction(sample).map_err(js_error)
    }

    pub fn kind(&self) -> TestKind {
        self.run.kind()
    }

    pub fn finish_result(&mut self) -> Result<TestResult, ScreeningError> {
        self.run.finish()
    }
}

/// 三项筛查会话
#[wasm_bindgen]
pub struct Screening {
    session: ScreeningSession,
    history: SessionHistory,
}

#[wasm_bindgen]
impl Screening {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Screening {
        Self {
            session: ScreeningSession::new(Arc::new(AnalysisConfig::default())),
            history: SessionHistory::new(),
        }
    }

    #[wasm_bindgen(js_name = "withConfig")]
    pub fn with_config(config_json: &str) -> Result<Screening, JsError> {
        Ok(Self {
            session: ScreeningSession::new(load_config(config_json)?),
            history: SessionHistory::new(),
        })
    }

    /// 创建一项测试，共享本会话的分析参数
    #[wasm_bindgen(js_name = "startTest")]
    pub fn start_test(&self, kind: &str) -> Result<RecordingSession, JsError> {
        RecordingSession::build(kind, Arc::clone(self.session.config()))
    }

    /// 结束测试并写入对应槽位（重测会覆盖旧结果）
    #[wasm_bindgen(js_name = "finishTest")]
    pub fn finish_test(&mut self, test: &mut RecordingSession) -> Result<JsValue, JsError> {
        let result = test.finish_result().map_err(js_error)?;
        let value = to_js(&result)?;
        self.session.record(result);
        Ok(value)
    }

    #[wasm_bindgen(js_name = "combinedScore")]
    pub fn combined_score(&self) -> u32 {
        self.session.combined_score()
    }

    #[wasm_bindgen(js_name = "alertLevel")]
    pub fn alert_level(&self) -> String {
        self.session.alert_level().to_string()
    }

    #[wasm_bindgen(js_name = "isComplete")]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// 尚未完成的测试类型
    pub fn missing(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.missing())
    }

    pub fn insights(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.insights())
    }

    /// 保存完整会话到历史并开始新会话
    pub fn complete(&mut self) -> Result<JsValue, JsError> {
        let record = self
            .session
            .complete_into(&mut self.history)
            .map_err(js_error)?;
        to_js(&record)
    }

    /// 最近 `count` 条历史记录（新的在前）
    pub fn history(&self, count: usize) -> Result<JsValue, JsError> {
        to_js(&self.history.recent(count))
    }

    /// 从 localStorage 中的 JSON 恢复历史
    #[wasm_bindgen(js_name = "loadHistory")]
    pub fn load_history(&mut self, json: &str) -> Result<(), JsError> {
        self.history = SessionHistory::from_json(json).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = "historyJson")]
    pub fn history_json(&self) -> Result<String, JsError> {
        self.history.to_json().map_err(js_error)
    }

    #[wasm_bindgen(js_name = "deleteRecord")]
    pub fn delete_record(&mut self, id: &str) -> bool {
        self.history.delete(id)
    }

    #[wasm_bindgen(js_name = "clearHistory")]
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for Screening {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(parse_kind("simple"), Some(TestKind::Simple));
        assert_eq!(parse_kind("dotGrid"), Some(TestKind::DotGrid));
        assert_eq!(parse_kind("flash"), Some(TestKind::Flash));
        assert_eq!(parse_kind("other"), None);
    }

    #[test]
    fn screening_shares_config_with_tests() {
        let screening = Screening::new();
        let Ok(test) = screening.start_test("dotgrid") else {
            panic!("dotgrid should be a known kind");
        };
        assert_eq!(test.kind(), TestKind::DotGrid);
        assert_eq!(test.phase(), "idle");
        assert_eq!(screening.combined_score(), 0);
    }

    fn skin_frame(shift: u8) -> Vec<u8> {
        [200 + shift, 150 + shift, 120 + shift, 255].repeat(16 * 16)
    }

    fn flash_micro_expressions(start_ms: f64) -> u32 {
        let Ok(mut session) = RecordingSession::new("flash") else {
            panic!("flash should be a known kind");
        };
        assert!(session.start(Some(start_ms)).is_ok());
        for i in 0..60 {
            // performance.now()-style frame clock
            let ts = 250.0 + i as f64 * 100.0;
            assert!(session.push_frame(skin_frame((i % 2) as u8 * 2), 16, 16, ts).is_ok());
        }
        let TestResult::Flash(result) = session.finish_result().expect("face in skin frames") else {
            panic!("flash run must yield a flash result");
        };
        result.video_analysis.expect("frames captured").micro_expression_count
    }

    #[test]
    fn epoch_start_matches_frame_clock_start() {
        assert_eq!(flash_micro_expressions(1.7e12), flash_micro_expressions(250.0));
    }
}
