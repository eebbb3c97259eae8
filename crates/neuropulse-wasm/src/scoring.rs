//! 评分函数
//!
//! 页面在不走完整录制会话时，也可以直接用这些函数计算反应时统计和各项分数。
//! 所有阈值取默认分析参数。

use neuropulse::analysis::config::AnalysisConfig;
use neuropulse::reaction;
use neuropulse::scoring as core;
use wasm_bindgen::prelude::*;

/// 反应时统计结果
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionStats {
    /// 平均反应时 (ms)
    #[wasm_bindgen(js_name = "averageReactionTime")]
    pub average_reaction_time: f64,
    /// 标准差 (ms)
    #[wasm_bindgen(js_name = "standardDeviation")]
    pub standard_deviation: f64,
    /// 超过 lapse 阈值的次数
    pub lapses: u32,
    /// 低于抢答阈值的次数
    #[wasm_bindgen(js_name = "falseStarts")]
    pub false_starts: u32,
    /// 错误率 (%)
    #[wasm_bindgen(js_name = "errorRate")]
    pub error_rate: f64,
}

/// 计算反应时统计
///
/// # 参数
/// - `samples`: 有效反应时 (ms)
/// - `misses`: 超时次数
/// - `total_attempts`: 总尝试次数
#[wasm_bindgen(js_name = "reactionStatistics")]
pub fn reaction_statistics(samples: &[f64], misses: u32, total_attempts: u32) -> ReactionStats {
    let metrics = reaction::compute(
        samples,
        misses,
        total_attempts,
        &AnalysisConfig::default().reaction,
    );
    ReactionStats {
        average_reaction_time: metrics.average_reaction_time,
        standard_deviation: metrics.standard_deviation,
        lapses: metrics.lapses,
        false_starts: metrics.false_starts,
        error_rate: metrics.error_rate,
    }
}

/// 反应时统计的文字解读，如 "High alertness"
#[wasm_bindgen(js_name = "interpretReactions")]
pub fn interpret_reactions(samples: &[f64], misses: u32, total_attempts: u32) -> String {
    reaction::compute(
        samples,
        misses,
        total_attempts,
        &AnalysisConfig::default().reaction,
    )
    .interpretation
    .to_string()
}

#[wasm_bindgen(js_name = "simpleScore")]
pub fn simple_score(reaction_ms: f64, movement: f64, face_present: bool) -> u32 {
    core::simple_score(
        reaction_ms,
        movement,
        face_present,
        &AnalysisConfig::default().scoring,
    )
}

#[wasm_bindgen(js_name = "dotScore")]
pub fn dot_score(average_reaction_ms: f64, hits: u32, misses: u32, errors: u32) -> u32 {
    core::dot_score(
        average_reaction_ms,
        hits,
        misses,
        errors,
        &AnalysisConfig::default().scoring,
    )
}

/// 三项分数的综合 NeuroScore；任一分数为负表示该项未完成
#[wasm_bindgen(js_name = "combinedScore")]
pub fn combined_score(simple: i32, dot_grid: i32, flash: i32) -> u32 {
    let slot = |score: i32| u32::try_from(score).ok();
    core::combined_score(
        slot(simple),
        slot(dot_grid),
        slot(flash),
        &AnalysisConfig::default().scoring,
    )
}

#[wasm_bindgen(js_name = "alertLevel")]
pub fn alert_level(score: u32) -> String {
    core::alert_level(score, &AnalysisConfig::default().scoring).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_count_lapses() {
        let stats = reaction_statistics(&[300.0, 320.0, 700.0], 1, 4);
        assert_eq!(stats.lapses, 1);
        assert!((stats.error_rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn negative_slot_means_missing() {
        assert_eq!(combined_score(90, 80, -1), 0);
        assert_eq!(combined_score(90, 80, 70), 80);
    }

    #[test]
    fn alert_labels() {
        assert_eq!(alert_level(95), "High Alertness");
        assert_eq!(alert_level(10), "Cognitive Fatigue Detected");
    }
}
