//! 首页聚合服务
//!
//! 三个只读端点。`placeholder-dashboard` 特性开启时，端点尚未部署
//! （404/501）会退化为演示数据，便于后端未就绪时的前端联调；
//! 默认关闭，缺失端点按正常错误处理。

use crate::api::{ApiClient, ApiError};
use tutti_shared::home::{ActivityEntry, HomeStats, UpcomingEvent};
use tutti_shared::protocol::{
    GetHomeStatsRequest, GetRecentActivityRequest, GetUpcomingEventsRequest,
};

#[cfg(feature = "placeholder-dashboard")]
fn endpoint_missing(error: &ApiError) -> bool {
    matches!(error, ApiError::Api { status: 404 | 501, .. })
}

pub async fn stats(api: &ApiClient) -> Result<HomeStats, ApiError> {
    match api.dispatch(&GetHomeStatsRequest).await {
        #[cfg(feature = "placeholder-dashboard")]
        Err(error) if endpoint_missing(&error) => Ok(placeholder::stats()),
        other => other,
    }
}

pub async fn upcoming_events(api: &ApiClient) -> Result<Vec<UpcomingEvent>, ApiError> {
    match api.dispatch(&GetUpcomingEventsRequest).await {
        #[cfg(feature = "placeholder-dashboard")]
        Err(error) if endpoint_missing(&error) => Ok(placeholder::upcoming_events()),
        other => other,
    }
}

pub async fn recent_activity(api: &ApiClient) -> Result<Vec<ActivityEntry>, ApiError> {
    match api.dispatch(&GetRecentActivityRequest).await {
        #[cfg(feature = "placeholder-dashboard")]
        Err(error) if endpoint_missing(&error) => Ok(placeholder::recent_activity()),
        other => other,
    }
}

#[cfg(feature = "placeholder-dashboard")]
mod placeholder {
    use tutti_shared::attendance::EventType;
    use tutti_shared::home::{ActivityEntry, HomeStats, UpcomingEvent};

    pub fn stats() -> HomeStats {
        HomeStats {
            active_members: 42,
            upcoming_concerts: 2,
            rehearsals_this_month: 4,
            average_attendance: 0.87,
        }
    }

    pub fn upcoming_events() -> Vec<UpcomingEvent> {
        vec![
            UpcomingEvent {
                id: 1,
                name: "周四排练".to_string(),
                date: "2025-05-08".to_string(),
                event_type: EventType::Rehearsal,
            },
            UpcomingEvent {
                id: 2,
                name: "春季音乐会".to_string(),
                date: "2025-05-17".to_string(),
                event_type: EventType::Concert,
            },
        ]
    }

    pub fn recent_activity() -> Vec<ActivityEntry> {
        vec![ActivityEntry {
            id: 1,
            message: "新乐手 Anna 加入了乐团".to_string(),
            created_at: "2025-05-01T18:30:00Z".to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{scripted_client, token_pair};

    #[tokio::test]
    async fn stats_parses_aggregate_payload() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(
            200,
            r#"{"active_members": 42, "upcoming_concerts": 2,
                "rehearsals_this_month": 4, "average_attendance": 0.87}"#,
        );

        let stats = stats(&client).await.unwrap();
        assert_eq!(stats.active_members, 42);
        assert!((stats.average_attendance - 0.87).abs() < f32::EPSILON);
    }

    #[cfg(not(feature = "placeholder-dashboard"))]
    #[tokio::test]
    async fn missing_endpoint_surfaces_as_error_by_default() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(404, r#"{"detail": "未找到"}"#);

        let error = stats(&client).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }

    #[cfg(feature = "placeholder-dashboard")]
    #[tokio::test]
    async fn missing_endpoint_falls_back_to_placeholder() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(404, r#"{"detail": "未找到"}"#);

        let stats = stats(&client).await.unwrap();
        assert_eq!(stats.active_members, 42);
    }
}
