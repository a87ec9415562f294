use crate::{AppState, error::AppResult, routes::blog::UserSummary, utils::order_by_ids};

/// 两人共同关注的用户，按id升序
pub async fn common_follows(
    state: &AppState,
    viewer_id: i64,
    subject_id: i64,
) -> AppResult<Vec<UserSummary>> {
    let common = state
        .follow_sets()
        .common_connections(viewer_id, subject_id)
        .await?;
    if common.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<i64> = common.into_iter().collect();
    ids.sort_unstable();
    let users = state.users.find_by_ids(&ids).await?;
    Ok(order_by_ids(&ids, users, |u| u.id)
        .into_iter()
        .map(UserSummary::from)
        .collect())
}
