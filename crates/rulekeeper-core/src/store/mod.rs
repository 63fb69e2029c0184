mod database;
mod memory;

pub use database::SeaOrmRuleStore;
pub use memory::MemoryRuleStore;

use crate::{NewRule, Result, Rule, RuleChanges, RuleFilter};
use async_trait::async_trait;

/// 规则存储抽象
///
/// 只负责把规则操作翻译为存储查询并映射存储层错误，
/// 输入校验由 `RuleService` 完成
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// 插入规则，返回分配了 ID 的规则
    async fn insert(&self, rule: NewRule) -> Result<Rule>;

    /// 按 ID 删除规则
    ///
    /// # 错误
    /// * `NotFound` - 规则不存在
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// 批量删除，返回实际删除的数量；未知 ID 和重复 ID 被忽略
    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64>;

    /// 覆盖提供的字段，返回更新后的规则
    ///
    /// # 错误
    /// * `NotFound` - 规则不存在
    async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule>;

    /// 按 ID 查询规则
    async fn find_by_id(&self, id: i64) -> Result<Option<Rule>>;

    /// 分页查询，按 ID 升序，返回当前页和总数
    async fn find_page(
        &self,
        filter: &RuleFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Rule>, u64)>;
}
