use database::profile::model::ProfileUpdate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Clone, Serialize, Deserialize, Debug, Validate, Default, ToSchema)]
pub struct CreateProfileDto {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub username: Option<String>,
    pub device_id: Option<String>,
}

/// 档案部分更新：只携带要改动的字段，其余字段保持原值。
/// rank由重算任务回写，不接受客户端写入。
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Default, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1))]
    pub username: Option<String>,
    #[validate(range(min = 0.0))]
    pub junx_balance: Option<f64>,
    pub device_id: Option<String>,
    pub privacy_consent: Option<bool>,
}

impl From<UpdateProfileDto> for ProfileUpdate {
    fn from(dto: UpdateProfileDto) -> Self {
        ProfileUpdate {
            username: dto.username,
            junx_balance: dto.junx_balance,
            device_id: dto.device_id,
            privacy_consent: dto.privacy_consent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_requires_user_id_and_username() {
        let empty = CreateProfileDto::default();
        assert!(empty.validate().is_err());

        let valid = CreateProfileDto {
            user_id: Some("u1".to_string()),
            username: Some("alice".to_string()),
            device_id: None,
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_update_dto_rejects_negative_balance() {
        let dto = UpdateProfileDto {
            junx_balance: Some(-1.0),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateProfileDto {
            junx_balance: Some(0.0),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_dto_maps_only_given_fields() {
        let update: ProfileUpdate = UpdateProfileDto {
            privacy_consent: Some(true),
            ..Default::default()
        }
        .into();

        assert_eq!(update.privacy_consent, Some(true));
        assert!(update.username.is_none());
        assert!(update.junx_balance.is_none());
        assert!(update.device_id.is_none());
    }
}
