use rulekeeper_core::{NewRule, RuleChanges, RuleError, RuleFilter, RuleStatus};
use serde::{Deserialize, Serialize};

/// 状态输入，兼容整数编码（1/0）和名称（enabled/disabled）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusInput {
    Code(i32),
    Name(String),
}

impl StatusInput {
    pub fn into_status(self) -> Result<RuleStatus, RuleError> {
        match self {
            StatusInput::Code(code) => RuleStatus::from_code(code),
            StatusInput::Name(name) => match name.parse::<i32>() {
                Ok(code) => RuleStatus::from_code(code),
                Err(_) => name.parse(),
            },
        }
    }
}

/// 规则创建请求
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default)]
    pub content: String,
    pub status: Option<StatusInput>,
}

impl TryFrom<CreateRuleRequest> for NewRule {
    type Error = RuleError;

    fn try_from(req: CreateRuleRequest) -> Result<Self, Self::Error> {
        Ok(NewRule {
            rule_type: req.rule_type,
            content: req.content,
            status: req.status.map(StatusInput::into_status).transpose()?,
        })
    }
}

/// 批量创建请求，`contents` 每行一条规则
#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default)]
    pub contents: String,
}

/// 批量创建响应
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    pub created: usize,
    pub ids: Vec<i64>,
}

/// 批量删除请求
#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// 批量删除响应
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    pub deleted: u64,
}

/// 规则更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
    pub content: Option<String>,
    pub status: Option<StatusInput>,
}

impl TryFrom<UpdateRuleRequest> for RuleChanges {
    type Error = RuleError;

    fn try_from(req: UpdateRuleRequest) -> Result<Self, Self::Error> {
        Ok(RuleChanges {
            rule_type: req.rule_type,
            content: req.content,
            status: req.status.map(StatusInput::into_status).transpose()?,
        })
    }
}

/// 状态切换请求
#[derive(Debug, Deserialize)]
pub struct SwitchStatusRequest {
    pub status: StatusInput,
}

/// 规则查询请求
#[derive(Debug, Deserialize)]
pub struct ListRulesQuery {
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
    pub status: Option<String>,
    pub content: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListRulesQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(20)
    }

    pub fn filter(&self) -> Result<RuleFilter, RuleError> {
        let status = self
            .status
            .clone()
            .map(|s| StatusInput::Name(s).into_status())
            .transpose()?;

        Ok(RuleFilter {
            rule_type: self.rule_type.clone(),
            status,
            content: self.content.clone(),
        })
    }
}

/// 分页响应
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}
