//! 乐季与考勤资源服务

use crate::api::{ApiClient, ApiError};
use tutti_shared::attendance::{
    AttendanceRecord, EventInput, MarkAttendanceRequest, OrchestraEvent, Presence, Season,
    SeasonInput,
};
use tutti_shared::protocol::{ListAttendanceRequest, ListEventsRequest, ListSeasonsRequest};

pub async fn list_seasons(api: &ApiClient) -> Result<Vec<Season>, ApiError> {
    api.dispatch(&ListSeasonsRequest).await
}

pub async fn create_season(api: &ApiClient, input: SeasonInput) -> Result<Season, ApiError> {
    api.dispatch(&input).await
}

/// 某乐季下的活动列表
pub async fn list_events(api: &ApiClient, season: u64) -> Result<Vec<OrchestraEvent>, ApiError> {
    api.dispatch(&ListEventsRequest { season }).await
}

pub async fn create_event(api: &ApiClient, input: EventInput) -> Result<OrchestraEvent, ApiError> {
    api.dispatch(&input).await
}

/// 某活动的全部考勤记录
pub async fn list_attendance(
    api: &ApiClient,
    event: u64,
) -> Result<Vec<AttendanceRecord>, ApiError> {
    api.dispatch(&ListAttendanceRequest { event }).await
}

/// 标记或改写一条考勤；后端以 (event, user) 为幂等键
pub async fn mark_attendance(
    api: &ApiClient,
    event: u64,
    user: u64,
    value: Presence,
) -> Result<AttendanceRecord, ApiError> {
    api.dispatch(&MarkAttendanceRequest { event, user, value })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{scripted_client, token_pair};

    #[tokio::test]
    async fn events_are_scoped_to_a_season() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(
            200,
            r#"[{"id": 3, "season": 2, "name": "周四排练",
                 "date": "2025-05-08", "event_type": "rehearsal"}]"#,
        );

        let events = list_events(&client, 2).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].season, 2);
        assert_eq!(
            ctx.log.borrow()[0],
            "GET https://api.example.test/attendance/events?season=2"
        );
    }

    #[tokio::test]
    async fn marking_sends_numeric_presence() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(200, r#"{"id": 9, "event": 3, "user": 12, "value": 0.5}"#);

        let record = mark_attendance(&client, 3, 12, Presence::Half).await.unwrap();
        assert_eq!(record.value, Presence::Half);

        let request = &ctx.requests.borrow()[0];
        assert_eq!(request.url, "https://api.example.test/attendance/mark");
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"event":3,"user":12,"value":0.5}"#)
        );
    }
}
