//! 规则管理核心
//!
//! 提供规则的校验创建（单条与按行批量）、删除、更新、查询、分页过滤列表
//! 以及启用/禁用切换。存储通过 [`RuleStore`] 注入，内置 sea-orm 与内存两种实现。

pub mod db;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::{Result, RuleError};
pub use model::{NewRule, Rule, RuleChanges, RuleFilter, RulePage, RuleStatus};
pub use service::RuleService;
pub use store::{MemoryRuleStore, RuleStore, SeaOrmRuleStore};
