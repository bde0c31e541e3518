/// APIサーバー経由の認証サービス
///
/// ログイン・登録・プロフィール取得をAPIサーバーに委譲し、
/// 取得したトークンをトークンストレージに保存します。
use crate::features::auth::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::features::auth::secure_storage::TokenStorage;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use std::sync::Arc;

/// 認証サービス
#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    storage: Arc<dyn TokenStorage>,
}

impl AuthService {
    /// 新しいAuthServiceを作成する
    ///
    /// # 引数
    /// * `api` - APIクライアント
    /// * `storage` - トークンストレージ
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn TokenStorage>) -> Self {
        log::info!("AuthServiceを初期化しました: api_base_url={}", api.base_url());
        Self { api, storage }
    }

    /// ログインする
    ///
    /// # 引数
    /// * `request` - ログイン要求
    ///
    /// # 戻り値
    /// 認証レスポンス（トークンは保存済み）
    pub async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let response: AuthResponse = self.api.post("/auth/login", request).await?;
        self.storage
            .save_tokens(&response.token, response.refresh_token.as_deref())?;

        log::info!("ログインしました: email={}", request.email);
        Ok(response)
    }

    /// ユーザー登録する
    ///
    /// # 引数
    /// * `request` - 登録要求
    ///
    /// # 戻り値
    /// 認証レスポンス（トークンは保存済み）
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let response: AuthResponse = self.api.post("/auth/register", request).await?;
        self.storage
            .save_tokens(&response.token, response.refresh_token.as_deref())?;

        log::info!("ユーザー登録しました: email={}", request.email);
        Ok(response)
    }

    /// ログイン中のユーザー情報を取得する
    pub async fn current_user(&self) -> AppResult<User> {
        let user: User = self.api.get("/users/me").await?;
        log::debug!("ユーザー情報を取得しました: user_id={}", user.id);
        Ok(user)
    }

    /// ログアウト処理
    pub fn logout(&self) -> AppResult<()> {
        self.storage.clear()?;
        log::info!("ログアウト処理が完了しました");
        Ok(())
    }

    /// 保存されているトークンを取得する
    pub fn stored_token(&self) -> Option<String> {
        self.storage.token()
    }
}
