use crate::{Result, RuleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 规则信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 规则 ID（由存储层分配，创建后不可变）
    pub id: i64,

    /// 规则类型（所属扫描器/规则集）
    #[serde(rename = "type")]
    pub rule_type: String,

    /// 规则内容（匹配模式文本）
    pub content: String,

    /// 规则状态
    pub status: RuleStatus,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

/// 规则状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// 启用
    #[default]
    Enabled,
    /// 禁用
    Disabled,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Enabled => "enabled",
            RuleStatus::Disabled => "disabled",
        }
    }

    /// 整数编码：1 = 启用，0 = 禁用
    pub fn code(&self) -> i32 {
        match self {
            RuleStatus::Enabled => 1,
            RuleStatus::Disabled => 0,
        }
    }

    /// 从整数编码解析，非法值返回校验错误
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(RuleStatus::Enabled),
            0 => Ok(RuleStatus::Disabled),
            other => Err(RuleError::validation(
                "status",
                format!("unknown status code {} (expected 0 or 1)", other),
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, RuleStatus::Enabled)
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enabled" => Ok(RuleStatus::Enabled),
            "disabled" => Ok(RuleStatus::Disabled),
            other => Err(RuleError::validation(
                "status",
                format!("unknown status `{}` (expected `enabled` or `disabled`)", other),
            )),
        }
    }
}

/// 待创建的规则（ID 由存储层分配）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub content: String,
    /// 未指定时默认为启用
    #[serde(default)]
    pub status: Option<RuleStatus>,
}

impl NewRule {
    pub fn new(rule_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            content: content.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: RuleStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// 规则更新内容，未提供的字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleChanges {
    #[serde(rename = "type", default)]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<RuleStatus>,
}

impl RuleChanges {
    /// 仅修改状态
    pub fn status(status: RuleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rule_type.is_none() && self.content.is_none() && self.status.is_none()
    }

    /// 将更新应用到已有规则上
    pub fn apply_to(&self, rule: &mut Rule) {
        if let Some(rule_type) = &self.rule_type {
            rule.rule_type = rule_type.clone();
        }
        if let Some(content) = &self.content {
            rule.content = content.clone();
        }
        if let Some(status) = self.status {
            rule.status = status;
        }
    }
}

/// 规则查询过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFilter {
    /// 类型过滤（精确匹配）
    pub rule_type: Option<String>,
    /// 状态过滤
    pub status: Option<RuleStatus>,
    /// 内容关键词（按字面、区分大小写的子串匹配）
    pub content: Option<String>,
}

impl RuleFilter {
    /// 判断规则是否满足过滤条件
    pub fn matches(&self, rule: &Rule) -> bool {
        if let Some(rule_type) = &self.rule_type {
            if &rule.rule_type != rule_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if rule.status != status {
                return false;
            }
        }
        if let Some(keyword) = &self.content {
            if !rule.content.contains(keyword.as_str()) {
                return false;
            }
        }
        true
    }
}

/// 分页查询结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePage {
    /// 当前页规则，按 ID 升序
    pub items: Vec<Rule>,
    /// 满足过滤条件的总数
    pub total: u64,
}

/// 计算分页偏移量；页码从 1 开始，0 视为第 1 页
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}
