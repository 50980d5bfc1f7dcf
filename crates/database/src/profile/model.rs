use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// 用户档案模型
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserProfile {
    /// MongoDB文档ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ObjectId>,
    /// 用户稳定标识（来自账户系统，创建后不变）
    pub user_id: String,
    /// 展示昵称（不保证全局唯一）
    pub username: String,
    /// JUNX代币余额
    pub junx_balance: f64,
    /// 总榜（GLOBAL/ALL_TIME）排名的冗余缓存，由重算任务回写
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// 绑定的设备ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// 隐私授权开关，默认关闭
    pub privacy_consent: bool,
    /// 创建时间戳
    pub created_at: i64,
    /// 最后更新时间戳
    pub updated_at: i64,
}

impl UserProfile {
    pub fn new(user_id: String, username: String, device_id: Option<String>, now: i64) -> Self {
        Self {
            id: None,
            user_id,
            username,
            junx_balance: 0.0,
            rank: None,
            device_id,
            privacy_consent: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 档案部分字段更新：未给出的字段保持原值
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub junx_balance: Option<f64>,
    pub device_id: Option<String>,
    pub privacy_consent: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.junx_balance.is_none()
            && self.device_id.is_none()
            && self.privacy_consent.is_none()
    }

    /// 转换为`$set`文档，总是同时刷新updated_at
    pub fn into_set_document(self, now: i64) -> Document {
        let mut set = doc! { "updated_at": now };
        if let Some(username) = self.username {
            set.insert("username", username);
        }
        if let Some(junx_balance) = self.junx_balance {
            set.insert("junx_balance", junx_balance);
        }
        if let Some(device_id) = self.device_id {
            set.insert("device_id", device_id);
        }
        if let Some(privacy_consent) = self.privacy_consent {
            set.insert("privacy_consent", privacy_consent);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new("u1".to_string(), "alice".to_string(), None, 1700000000);
        assert_eq!(profile.junx_balance, 0.0);
        assert!(!profile.privacy_consent);
        assert!(profile.rank.is_none());
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_update_set_document_only_contains_given_fields() {
        let update = ProfileUpdate {
            privacy_consent: Some(true),
            ..Default::default()
        };
        let set = update.into_set_document(1700000001);

        assert_eq!(set.get_bool("privacy_consent").unwrap(), true);
        assert_eq!(set.get_i64("updated_at").unwrap(), 1700000001);
        // 未给出的字段不能出现在$set中，否则会覆盖原值
        assert!(!set.contains_key("username"));
        assert!(!set.contains_key("junx_balance"));
        assert!(!set.contains_key("device_id"));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            username: Some("bob".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
