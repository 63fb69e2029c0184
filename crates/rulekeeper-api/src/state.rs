use rulekeeper_core::RuleService;
use std::sync::Arc;

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 规则服务
    pub rule_service: Arc<RuleService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(rule_service: Arc<RuleService>) -> Self {
        Self { rule_service }
    }
}
