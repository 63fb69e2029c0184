use crate::store::RuleStore;
use crate::{NewRule, Result, Rule, RuleChanges, RuleError, RuleFilter, RulePage, RuleStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 规则服务
///
/// 规则管理的统一入口：校验输入、解析批量文本、切换状态、组合分页查询。
/// 自身无状态，所有共享状态都在注入的存储中
#[derive(Clone)]
pub struct RuleService {
    /// 规则存储
    store: Arc<dyn RuleStore>,
}

impl RuleService {
    /// 创建新的规则服务
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// 创建规则
    ///
    /// # 参数
    /// * `rule` - 待创建的规则，状态未指定时默认启用
    ///
    /// # 返回
    /// 存储分配 ID 后的规则
    ///
    /// # 错误
    /// * `Validation` - 类型或内容为空，此时不会写入存储
    /// * `Store` - 存储操作失败
    pub async fn create(&self, rule: NewRule) -> Result<Rule> {
        validate_required("type", &rule.rule_type)?;
        validate_required("content", &rule.content)?;

        let rule = self.store.insert(rule).await?;
        info!(rule_id = rule.id, rule_type = %rule.rule_type, "Rule created");
        Ok(rule)
    }

    /// 批量创建规则
    ///
    /// 按换行符拆分 `contents`，每行（包括空行）作为一条启用状态的规则依次创建。
    /// 遇到第一个失败立即中止，之前已创建的规则保留，不做回滚。
    ///
    /// # 错误
    /// * `BatchAborted` - 携带失败行号（从 1 开始）、已创建数量和根错误
    pub async fn batch_create(&self, rule_type: &str, contents: &str) -> Result<Vec<Rule>> {
        let mut created = Vec::new();

        for (index, line) in contents.split('\n').enumerate() {
            let rule = NewRule::new(rule_type, line).with_status(RuleStatus::Enabled);

            match self.create(rule).await {
                Ok(rule) => created.push(rule),
                Err(err) => {
                    warn!(
                        rule_type = %rule_type,
                        line = index + 1,
                        created = created.len(),
                        error = %err,
                        "Batch rule creation aborted"
                    );
                    return Err(RuleError::BatchAborted {
                        line: index + 1,
                        created: created.len(),
                        source: Box::new(err),
                    });
                }
            }
        }

        info!(rule_type = %rule_type, count = created.len(), "Rules created in batch");
        Ok(created)
    }

    /// 删除规则
    ///
    /// # 错误
    /// * `NotFound` - 规则不存在
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_by_id(id).await
    }

    /// 按 ID 批量删除规则，返回实际删除的数量
    pub async fn batch_delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        self.store.delete_by_ids(ids).await
    }

    /// 更新规则，仅覆盖提供的字段
    ///
    /// # 错误
    /// * `Validation` - 提供的类型或内容为空
    /// * `NotFound` - 规则不存在
    pub async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
        if let Some(rule_type) = &changes.rule_type {
            validate_required("type", rule_type)?;
        }
        if let Some(content) = &changes.content {
            validate_required("content", content)?;
        }

        // 无字段可更新时不写存储
        if changes.is_empty() {
            return self.get(id).await;
        }

        self.store.update(id, changes).await
    }

    /// 获取规则
    ///
    /// # 错误
    /// * `NotFound` - 规则不存在
    pub async fn get(&self, id: i64) -> Result<Rule> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(RuleError::NotFound(id))
    }

    /// 分页列出规则
    ///
    /// 页码从 1 开始，按 ID 升序；超出范围的页返回空列表和正确的总数
    pub async fn list(&self, filter: RuleFilter, page: u64, page_size: u64) -> Result<RulePage> {
        let (items, total) = self.store.find_page(&filter, page, page_size).await?;

        debug!(count = items.len(), total, page, page_size, "Rules listed");
        Ok(RulePage { items, total })
    }

    /// 切换规则状态
    ///
    /// 无条件写入目标状态，重复设置相同状态是幂等的
    ///
    /// # 错误
    /// * `NotFound` - 规则不存在
    pub async fn switch_status(&self, id: i64, status: RuleStatus) -> Result<Rule> {
        let rule = self.store.update(id, RuleChanges::status(status)).await?;

        info!(rule_id = id, status = %status, "Rule status switched");
        Ok(rule)
    }
}

fn validate_required(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RuleError::validation(field, "cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRuleStore;
    use async_trait::async_trait;
    use sea_orm::DbErr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 第 `fail_at` 次插入返回存储错误
    struct FlakyStore {
        inner: MemoryRuleStore,
        inserts: AtomicUsize,
        fail_at: usize,
    }

    impl FlakyStore {
        fn new(fail_at: usize) -> Self {
            Self {
                inner: MemoryRuleStore::new(),
                inserts: AtomicUsize::new(0),
                fail_at,
            }
        }
    }

    #[async_trait]
    impl RuleStore for FlakyStore {
        async fn insert(&self, rule: NewRule) -> Result<Rule> {
            let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_at {
                return Err(DbErr::Custom("connection reset".to_string()).into());
            }
            self.inner.insert(rule).await
        }

        async fn delete_by_id(&self, id: i64) -> Result<()> {
            self.inner.delete_by_id(id).await
        }

        async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
            self.inner.delete_by_ids(ids).await
        }

        async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
            self.inner.update(id, changes).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Rule>> {
            self.inner.find_by_id(id).await
        }

        async fn find_page(
            &self,
            filter: &RuleFilter,
            page: u64,
            page_size: u64,
        ) -> Result<(Vec<Rule>, u64)> {
            self.inner.find_page(filter, page, page_size).await
        }
    }

    fn create_test_service() -> RuleService {
        RuleService::new(Arc::new(MemoryRuleStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = create_test_service();

        let created = service
            .create(NewRule::new("github", "AKIA[0-9A-Z]{16}"))
            .await
            .unwrap();
        assert_eq!(created.status, RuleStatus::Enabled);

        let found = service.get(created.id).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields_without_writing() {
        let store = Arc::new(FlakyStore::new(usize::MAX));
        let service = RuleService::new(store.clone());

        let err = service.create(NewRule::new("", "AKIA")).await.unwrap_err();
        assert!(matches!(err, RuleError::Validation { field: "type", .. }));

        let err = service.create(NewRule::new("github", "")).await.unwrap_err();
        assert!(matches!(err, RuleError::Validation { field: "content", .. }));

        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_create_in_order() {
        let service = create_test_service();

        let created = service.batch_create("t", "a\nb\nc").await.unwrap();
        let contents: Vec<_> = created.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
        assert!(created.iter().all(|r| r.rule_type == "t" && r.status.is_enabled()));
        assert!(created.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_batch_create_keeps_whitespace() {
        let service = create_test_service();

        let created = service.batch_create("t", " a \r\n\tb").await.unwrap();
        assert_eq!(created[0].content, " a \r");
        assert_eq!(created[1].content, "\tb");
    }

    #[tokio::test]
    async fn test_batch_create_blank_line_aborts() {
        let service = create_test_service();

        let err = service.batch_create("t", "a\n\nb").await.unwrap_err();
        match err {
            RuleError::BatchAborted { line, created, source } => {
                assert_eq!(line, 2);
                assert_eq!(created, 1);
                assert!(source.is_validation());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let page = service.list(RuleFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].content, "a");
    }

    #[tokio::test]
    async fn test_batch_create_store_failure_keeps_prior_rules() {
        let service = RuleService::new(Arc::new(FlakyStore::new(3)));

        let err = service.batch_create("t", "a\nb\nc\nd").await.unwrap_err();
        assert!(matches!(
            err,
            RuleError::BatchAborted { line: 3, created: 2, .. }
        ));
        assert!(matches!(err.root_cause(), RuleError::Store(_)));

        let page = service.list(RuleFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_update_validates_and_checks_existence() {
        let service = create_test_service();
        let rule = service.create(NewRule::new("github", "AKIA")).await.unwrap();

        let changes = RuleChanges {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(service.update(rule.id, changes).await.unwrap_err().is_validation());

        let changes = RuleChanges {
            rule_type: Some("aws".to_string()),
            ..Default::default()
        };
        let updated = service.update(rule.id, changes.clone()).await.unwrap();
        assert_eq!(updated.rule_type, "aws");
        assert_eq!(updated.content, "AKIA");

        assert!(service.update(999, changes).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_update_does_not_write() {
        let service = create_test_service();
        let rule = service.create(NewRule::new("github", "AKIA")).await.unwrap();

        let unchanged = service.update(rule.id, RuleChanges::default()).await.unwrap();
        assert_eq!(unchanged, rule);

        let err = service.update(999, RuleChanges::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_switch_status_is_idempotent() {
        let service = create_test_service();
        let rule = service.create(NewRule::new("github", "AKIA")).await.unwrap();

        service.switch_status(rule.id, RuleStatus::Disabled).await.unwrap();
        service.switch_status(rule.id, RuleStatus::Disabled).await.unwrap();
        assert_eq!(service.get(rule.id).await.unwrap().status, RuleStatus::Disabled);

        service.switch_status(rule.id, RuleStatus::Enabled).await.unwrap();
        assert_eq!(service.get(rule.id).await.unwrap().status, RuleStatus::Enabled);

        let err = service.switch_status(999, RuleStatus::Enabled).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = create_test_service();
        let rule = service.create(NewRule::new("github", "AKIA")).await.unwrap();

        service.delete(rule.id).await.unwrap();
        assert!(service.get(rule.id).await.unwrap_err().is_not_found());
        assert!(service.delete(rule.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_empty_match() {
        let service = create_test_service();
        service.batch_create("github", "a\nb").await.unwrap();

        let filter = RuleFilter {
            rule_type: Some("gitlab".to_string()),
            ..Default::default()
        };
        let page = service.list(filter, 1, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }
}
