use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 投递事件审核状态
///
/// SUBMITTED → IN_REVIEW → VERIFIED | REJECTED（也允许跳过IN_REVIEW直接终审）。
/// VERIFIED与REJECTED为终态。只有VERIFIED的事件计入榜单积分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Submitted,
    InReview,
    Verified,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Submitted => "SUBMITTED",
            EventStatus::InReview => "IN_REVIEW",
            EventStatus::Verified => "VERIFIED",
            EventStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Verified | EventStatus::Rejected)
    }

    /// 状态机校验：终态之后不允许任何迁移
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        match (self, next) {
            (EventStatus::Submitted, EventStatus::InReview)
            | (EventStatus::Submitted, EventStatus::Verified)
            | (EventStatus::Submitted, EventStatus::Rejected)
            | (EventStatus::InReview, EventStatus::Verified)
            | (EventStatus::InReview, EventStatus::Rejected) => true,
            _ => false,
        }
    }
}

/// 投递事件：榜单积分的活动来源
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisposalEvent {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 提交事件的用户
    pub user_id: String,
    /// 投递点所属机构（无机构的散点投递为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    /// 审核通过后记入的积分
    pub points: u64,
    /// 审核状态
    pub status: EventStatus,
    /// 投递发生时间戳。积分窗口按该时间过滤
    pub occurred_at: i64,
    /// 审核时间戳
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<i64>,
    /// 提交时间戳
    pub created_at: i64,
}

/// 窗口积分聚合结果：一个用户在某窗口内的得分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowScore {
    pub user_id: String,
    /// 窗口内VERIFIED事件积分之和
    pub score: u64,
    /// 达到该分数的时刻（最后一笔计入事件的occurred_at），用于同分排序
    pub reached_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&EventStatus::InReview).unwrap(), "\"IN_REVIEW\"");
        assert_eq!(serde_json::to_string(&EventStatus::Verified).unwrap(), "\"VERIFIED\"");
        let parsed: EventStatus = serde_json::from_str("\"SUBMITTED\"").unwrap();
        assert_eq!(parsed, EventStatus::Submitted);
    }

    #[test]
    fn test_transition_matrix() {
        use EventStatus::*;

        assert!(Submitted.can_transition_to(InReview));
        assert!(Submitted.can_transition_to(Verified));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(InReview.can_transition_to(Verified));
        assert!(InReview.can_transition_to(Rejected));

        // 终态之后不允许任何迁移
        assert!(!Verified.can_transition_to(Rejected));
        assert!(!Verified.can_transition_to(Submitted));
        assert!(!Rejected.can_transition_to(Verified));
        // 回退与自环也不允许
        assert!(!InReview.can_transition_to(Submitted));
        assert!(!Submitted.can_transition_to(Submitted));
    }

    #[test]
    fn test_terminal_states() {
        assert!(EventStatus::Verified.is_terminal());
        assert!(EventStatus::Rejected.is_terminal());
        assert!(!EventStatus::Submitted.is_terminal());
        assert!(!EventStatus::InReview.is_terminal());
    }
}
