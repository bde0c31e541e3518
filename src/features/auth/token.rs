/// JWTペイロードの読み取り
///
/// 署名の検証はAPIサーバーの責務のため行いません。
/// 有効期限（exp）とロール（roles）を読み取るためだけにペイロードをデコードします。
use crate::shared::errors::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWTのクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    /// サブジェクト（通常はメールアドレス）
    pub sub: String,
    /// 有効期限（UNIX秒）
    pub exp: i64,
    /// 発行日時（UNIX秒）
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl JwtClaims {
    /// 指定時刻の時点で期限切れかどうか（exp と同じ秒は期限切れ）
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// ロールを保持しているかどうか
    ///
    /// `ADMIN` と `ROLE_ADMIN` のどちらの表記でも一致する
    pub fn has_role(&self, role: &str) -> bool {
        let wanted = strip_role_prefix(role);
        self.roles
            .iter()
            .any(|r| strip_role_prefix(r).eq_ignore_ascii_case(wanted))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("ADMIN")
    }
}

fn strip_role_prefix(role: &str) -> &str {
    role.strip_prefix("ROLE_").unwrap_or(role)
}

/// トークンからクレームをデコードする
///
/// # 引数
/// * `token` - JWT文字列（header.payload.signature）
///
/// # 戻り値
/// デコードされたクレーム、または形式不正の場合はデコードエラー
pub fn decode_claims(token: &str) -> AppResult<JwtClaims> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(AppError::Decode(format!(
            "JWTの形式が正しくありません: segments={}",
            segments.len()
        )));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| AppError::Decode(format!("JWTペイロードのBase64デコードに失敗: {e}")))?;

    serde_json::from_slice(&payload)
        .map_err(|e| AppError::Decode(format!("JWTペイロードの解析に失敗: {e}")))
}

/// 指定時刻の時点でトークンが有効かどうか
///
/// デコードできないトークンは無効として扱う
pub fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => !claims.is_expired_at(now),
        Err(e) => {
            log::debug!("トークンのデコードに失敗したため無効として扱います: {e}");
            false
        }
    }
}

/// 現在時刻でトークンが有効かどうか
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, Utc::now())
}

/// 有効期限までの秒数（期限切れの場合は負数、デコード不可の場合はNone）
pub fn seconds_until_expiry(token: &str, now: DateTime<Utc>) -> Option<i64> {
    decode_claims(token)
        .ok()
        .map(|claims| claims.exp - now.timestamp())
}
