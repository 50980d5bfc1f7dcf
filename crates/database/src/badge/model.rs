use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 徽章类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeType {
    Monthly,
    Lifetime,
    Campaign,
    Institution,
}

/// 徽章定义（运营后台维护的目录项）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BadgeDefinition {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 徽章稳定标识
    pub badge_id: String,
    /// 徽章名称
    pub name: String,
    /// 描述文案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 图标地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// 徽章类型
    pub badge_type: BadgeType,
    /// 发放条件配置。由外部发放流程解释，本服务只原样存取
    #[schema(value_type = Object)]
    pub threshold_config: Document,
    /// 软删除标记：false的定义对用户不可见
    pub active: bool,
    /// 创建时间戳
    pub created_at: i64,
}

/// 徽章发放记录（只追加，不修改）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBadge {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 获得徽章的用户
    pub user_id: String,
    /// 对应的徽章定义
    pub badge_id: String,
    /// 获得时间戳
    pub earned_at: i64,
    /// 发放上下文。由发放流程写入，本服务只原样存取
    #[schema(value_type = Object)]
    pub metadata: Document,
}

/// 发放记录与徽章定义的联查结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBadgeWithDefinition {
    #[serde(flatten)]
    pub award: UserBadge,
    /// 联查出的徽章定义
    pub badge: BadgeDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_type_wire_format() {
        assert_eq!(serde_json::to_string(&BadgeType::Monthly).unwrap(), "\"MONTHLY\"");
        assert_eq!(serde_json::to_string(&BadgeType::Lifetime).unwrap(), "\"LIFETIME\"");
        assert_eq!(serde_json::to_string(&BadgeType::Campaign).unwrap(), "\"CAMPAIGN\"");
        assert_eq!(serde_json::to_string(&BadgeType::Institution).unwrap(), "\"INSTITUTION\"");

        let parsed: BadgeType = serde_json::from_str("\"MONTHLY\"").unwrap();
        assert_eq!(parsed, BadgeType::Monthly);
    }
}
