use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{validate_required_field, validate_text_length};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// パスワードの最小文字数
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// ユーザー情報を表す構造体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// 表示名
    pub name: String,
    /// メールアドレス
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// 作成日時
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// ログイン要求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// 入力値を検証する
    pub fn validate(&self) -> AppResult<()> {
        validate_email(&self.email)?;
        validate_required_field(&self.password, "パスワード")?;
        Ok(())
    }
}

/// ユーザー登録要求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// 入力値を検証する
    ///
    /// # バリデーション規則
    /// - 名前は必須、100文字以内
    /// - メールアドレスの形式
    /// - パスワードは6文字以上
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.name, "名前")?;
        validate_text_length(&self.name, 100, "名前")?;
        validate_email(&self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "パスワードは{MIN_PASSWORD_LENGTH}文字以上で入力してください"
            )));
        }
        Ok(())
    }
}

/// メールアドレスの簡易チェック（ローカル部と@とドメインがあること）
fn validate_email(email: &str) -> AppResult<()> {
    validate_required_field(email, "メールアドレス")?;

    let valid = email
        .trim()
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);

    if !valid {
        return Err(AppError::validation("メールアドレスの形式が正しくありません"));
    }
    Ok(())
}

/// ログイン・登録のレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// JWTアクセストークン
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// サーバーがユーザー情報を同梱する場合のみ
    #[serde(default)]
    pub user: Option<User>,
}
