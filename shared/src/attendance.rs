//! 乐季与考勤领域模型
//!
//! 出勤值是一个封闭枚举 [`Presence`]，序列化为精确的 0 / 0.5 / 1，
//! 非法数值在类型层面即不可表示；排练允许半勤（0.5），其余活动类型只有 0 / 1。

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

// =========================================================
// 乐季 (Season)
// =========================================================

/// 至多一个乐季为当前乐季（由后端保证，客户端只做假设）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub name: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonInput {
    pub name: String,
    pub is_current: bool,
}

// =========================================================
// 活动 (Event)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Rehearsal,
    Concert,
    Soundcheck,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Rehearsal => "排练",
            EventType::Concert => "音乐会",
            EventType::Soundcheck => "走台",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestraEvent {
    pub id: u64,
    /// 所属乐季 id
    pub season: u64,
    pub name: String,
    pub date: String,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInput {
    pub season: u64,
    pub name: String,
    pub date: String,
    pub event_type: EventType,
}

// =========================================================
// 出勤值 (Presence)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Absent,
    Half,
    Present,
}

impl Presence {
    pub fn as_value(&self) -> f32 {
        match self {
            Presence::Absent => 0.0,
            Presence::Half => 0.5,
            Presence::Present => 1.0,
        }
    }

    /// 该出勤值对指定活动类型是否合法：半勤仅限排练
    pub fn allowed_for(&self, event_type: EventType) -> bool {
        match self {
            Presence::Half => event_type == EventType::Rehearsal,
            Presence::Absent | Presence::Present => true,
        }
    }

    /// 指定活动类型可选的出勤值（供界面渲染选项）
    pub fn options_for(event_type: EventType) -> &'static [Presence] {
        match event_type {
            EventType::Rehearsal => &[Presence::Absent, Presence::Half, Presence::Present],
            _ => &[Presence::Absent, Presence::Present],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Presence::Absent => "缺席",
            Presence::Half => "半勤",
            Presence::Present => "出席",
        }
    }
}

impl Serialize for Presence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_value())
    }
}

impl<'de> Deserialize<'de> for Presence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if value == 0.0 {
            Ok(Presence::Absent)
        } else if value == 0.5 {
            Ok(Presence::Half)
        } else if value == 1.0 {
            Ok(Presence::Present)
        } else {
            Err(de::Error::custom(format!(
                "出勤值必须是 0、0.5 或 1，收到 {value}"
            )))
        }
    }
}

// =========================================================
// 考勤记录 (Attendance Record)
// =========================================================

/// 一条考勤：某用户在某活动上的出勤值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    pub event: u64,
    pub user: u64,
    pub value: Presence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub event: u64,
    pub user: u64,
    pub value: Presence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_serializes_to_exact_values() {
        assert_eq!(serde_json::to_string(&Presence::Absent).unwrap(), "0.0");
        assert_eq!(serde_json::to_string(&Presence::Half).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Presence::Present).unwrap(), "1.0");
    }

    #[test]
    fn presence_deserializes_from_integers_and_halves() {
        assert_eq!(serde_json::from_str::<Presence>("0").unwrap(), Presence::Absent);
        assert_eq!(serde_json::from_str::<Presence>("0.5").unwrap(), Presence::Half);
        assert_eq!(serde_json::from_str::<Presence>("1").unwrap(), Presence::Present);
    }

    #[test]
    fn presence_rejects_other_values() {
        assert!(serde_json::from_str::<Presence>("0.3").is_err());
        assert!(serde_json::from_str::<Presence>("2").is_err());
    }

    #[test]
    fn half_presence_is_rehearsal_only() {
        assert!(Presence::Half.allowed_for(EventType::Rehearsal));
        assert!(!Presence::Half.allowed_for(EventType::Concert));
        assert!(!Presence::Half.allowed_for(EventType::Soundcheck));
        assert!(Presence::Present.allowed_for(EventType::Soundcheck));
    }

    #[test]
    fn rehearsal_offers_three_options() {
        assert_eq!(Presence::options_for(EventType::Rehearsal).len(), 3);
        assert_eq!(Presence::options_for(EventType::Concert).len(), 2);
    }

    #[test]
    fn record_round_trips_half_presence() {
        let record = AttendanceRecord {
            id: 7,
            event: 3,
            user: 12,
            value: Presence::Half,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("0.5"));
        let back: AttendanceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
