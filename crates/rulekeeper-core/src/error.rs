use thiserror::Error;

/// 规则管理错误类型
#[derive(Error, Debug)]
pub enum RuleError {
    /// 输入校验失败（字段缺失、为空或状态值非法）
    #[error("Validation error on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// 规则未找到
    #[error("Rule not found: {0}")]
    NotFound(i64),

    /// 存储层错误（连接、超时、约束冲突等）
    #[error("Store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    /// 批量创建在某一行中止，之前已创建的规则不会回滚
    #[error("Batch aborted at line {line} after {created} rule(s) were created: {source}")]
    BatchAborted {
        line: usize,
        created: usize,
        #[source]
        source: Box<RuleError>,
    },
}

/// 规则管理结果类型
pub type Result<T> = std::result::Result<T, RuleError>;

impl RuleError {
    /// 创建校验错误
    pub fn validation(field: &'static str, msg: impl Into<String>) -> Self {
        RuleError::Validation {
            field,
            message: msg.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RuleError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RuleError::NotFound(_))
    }

    /// 批量中止时返回导致中止的根错误，其余情况返回自身
    pub fn root_cause(&self) -> &RuleError {
        match self {
            RuleError::BatchAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
