use crate::{error::Result, models::*, state::AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use rulekeeper_core::{NewRule, Rule, RuleChanges};
use tracing::{debug, info};

// 提取失败交给 ApiError，保证错误体统一为 JSON
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;
type RuleIdPath = std::result::Result<Path<i64>, PathRejection>;
type ListQuery = std::result::Result<Query<ListRulesQuery>, QueryRejection>;

/// 创建规则
pub async fn create_rule(
    State(state): State<AppState>,
    payload: JsonBody<CreateRuleRequest>,
) -> Result<(StatusCode, Json<Rule>)> {
    let Json(req) = payload?;
    info!(rule_type = %req.rule_type, "Creating rule");

    let rule = NewRule::try_from(req)?;
    let rule = state.rule_service.create(rule).await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// 按行批量创建规则
pub async fn batch_create_rules(
    State(state): State<AppState>,
    payload: JsonBody<BatchCreateRequest>,
) -> Result<(StatusCode, Json<BatchCreateResponse>)> {
    let Json(req) = payload?;
    info!(rule_type = %req.rule_type, "Creating rules in batch");

    let rules = state
        .rule_service
        .batch_create(&req.rule_type, &req.contents)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BatchCreateResponse {
            created: rules.len(),
            ids: rules.iter().map(|r| r.id).collect(),
        }),
    ))
}

/// 获取规则
pub async fn get_rule(State(state): State<AppState>, path: RuleIdPath) -> Result<Json<Rule>> {
    let Path(rule_id) = path?;
    debug!(rule_id, "Getting rule");

    let rule = state.rule_service.get(rule_id).await?;
    Ok(Json(rule))
}

/// 列出规则
pub async fn list_rules(
    State(state): State<AppState>,
    query: ListQuery,
) -> Result<Json<PaginatedResponse<Rule>>> {
    let Query(query) = query?;
    debug!("Listing rules with filter");

    let page = query.page();
    let page_size = query.page_size();
    let filter = query.filter()?;

    let result = state.rule_service.list(filter, page, page_size).await?;

    Ok(Json(PaginatedResponse {
        data: result.items,
        total: result.total,
        page,
        page_size,
    }))
}

/// 更新规则
pub async fn update_rule(
    State(state): State<AppState>,
    path: RuleIdPath,
    payload: JsonBody<UpdateRuleRequest>,
) -> Result<Json<Rule>> {
    let Path(rule_id) = path?;
    let Json(req) = payload?;
    info!(rule_id, "Updating rule");

    let changes = RuleChanges::try_from(req)?;
    let rule = state.rule_service.update(rule_id, changes).await?;

    Ok(Json(rule))
}

/// 删除规则
pub async fn delete_rule(State(state): State<AppState>, path: RuleIdPath) -> Result<StatusCode> {
    let Path(rule_id) = path?;
    info!(rule_id, "Deleting rule");

    state.rule_service.delete(rule_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 按 ID 批量删除规则
pub async fn batch_delete_rules(
    State(state): State<AppState>,
    payload: JsonBody<BatchDeleteRequest>,
) -> Result<Json<BatchDeleteResponse>> {
    let Json(req) = payload?;
    info!(count = req.ids.len(), "Deleting rules in batch");

    let deleted = state.rule_service.batch_delete_by_ids(&req.ids).await?;

    Ok(Json(BatchDeleteResponse { deleted }))
}

/// 切换规则状态
pub async fn switch_rule_status(
    State(state): State<AppState>,
    path: RuleIdPath,
    payload: JsonBody<SwitchStatusRequest>,
) -> Result<Json<Rule>> {
    let Path(rule_id) = path?;
    let Json(req) = payload?;
    let status = req.status.into_status()?;
    info!(rule_id, status = %status, "Switching rule status");

    let rule = state.rule_service.switch_status(rule_id, status).await?;

    Ok(Json(rule))
}
