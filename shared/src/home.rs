//! 首页聚合数据模型
//!
//! 三个只读聚合端点的响应形状；数据由后端汇总，客户端不做二次计算。

use crate::attendance::EventType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HomeStats {
    pub active_members: u32,
    pub upcoming_concerts: u32,
    pub rehearsals_this_month: u32,
    /// 当前乐季的平均出勤率，0.0..=1.0
    pub average_attendance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub id: u64,
    pub name: String,
    pub date: String,
    pub event_type: EventType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u64,
    pub message: String,
    pub created_at: String,
}
