/// 汎用APIクライアント
///
/// PlanWise APIサーバーとの通信を行う汎用的なクライアント。
/// ベースURLの結合、Bearerトークンの付与、クエリパラメータの組み立て、
/// タイムアウトを一元的に扱い、エラーは分類せずそのまま呼び出し側へ返す。
use crate::features::auth::secure_storage::TokenStorage;
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{classify_status, AppError, AppResult};
use crate::shared::pagination::{PageRequest, PaginatedResult};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl From<ApiConfig> for ApiClientConfig {
    fn from(api_config: ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
        }
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        ApiConfig::default().into()
    }
}

impl ApiClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> Self {
        ApiConfig::from_env().into()
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// ベースURLが空・http(s)以外、またはタイムアウトが0の場合は設定エラー
    pub fn validate(&self) -> AppResult<()> {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds,
        }
        .validate()
        .map_err(AppError::configuration)
    }
}

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// ログイン画面へのリダイレクトURLを作成する
///
/// # 引数
/// * `return_url` - ログイン後に戻る画面のパス
pub fn login_redirect_url(return_url: &str) -> String {
    format!("/login?returnUrl={}", urlencoding::encode(return_url))
}

/// 汎用APIクライアント
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
    storage: Arc<dyn TokenStorage>,
}

impl ApiClient {
    /// 新しいAPIクライアントを作成
    pub fn new(storage: Arc<dyn TokenStorage>) -> AppResult<Self> {
        Self::new_with_config(ApiClientConfig::from_env(), storage)
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(
        config: ApiClientConfig,
        storage: Arc<dyn TokenStorage>,
    ) -> AppResult<Self> {
        config.validate()?;
        Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("ベースURLが不正です: {}: {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self {
            client,
            config,
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// ベースURLとエンドポイント、クエリパラメータからURLを組み立てる
    pub fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> AppResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        };

        let mut url = Url::parse(&format!("{base}{path}"))
            .map_err(|e| AppError::configuration(format!("URLの組み立てに失敗: {path}: {e}")))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(endpoint, &[]).await
    }

    /// クエリパラメータ付きGETリクエストを送信
    pub async fn get_with_query<T>(&self, endpoint: &str, query: &[(String, String)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let url = self.build_url(endpoint, query)?;
        let request = self.client.get(url);
        self.send_json(request, "GET", endpoint).await
    }

    /// ページング付きGETリクエストを送信
    pub async fn get_pageable<T>(
        &self,
        endpoint: &str,
        page: &PageRequest,
    ) -> AppResult<PaginatedResult<T>>
    where
        T: DeserializeOwned,
    {
        self.get_with_query(endpoint, &page.to_query_params()).await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let url = self.build_url(endpoint, &[])?;
        let request = self.client.post(url).json(body);
        self.send_json(request, "POST", endpoint).await
    }

    /// PUTリクエストを送信
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("PUTリクエスト送信: endpoint={endpoint}");

        let url = self.build_url(endpoint, &[])?;
        let request = self.client.put(url).json(body);
        self.send_json(request, "PUT", endpoint).await
    }

    /// PATCHリクエストを送信
    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("PATCHリクエスト送信: endpoint={endpoint}");

        let url = self.build_url(endpoint, &[])?;
        let request = self.client.patch(url).json(body);
        self.send_json(request, "PATCH", endpoint).await
    }

    /// DELETEリクエストを送信
    pub async fn delete(&self, endpoint: &str) -> AppResult<()> {
        info!("DELETEリクエスト送信: endpoint={endpoint}");

        let url = self.build_url(endpoint, &[])?;
        let request = self.client.delete(url);

        // DELETEはレスポンスボディを使用しない
        self.send(request, "DELETE", endpoint).await?;
        info!("DELETEリクエスト成功: endpoint={endpoint}");
        Ok(())
    }

    /// 保存済みトークンがあればAuthorizationヘッダーを付与する
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T>(&self, request: RequestBuilder, method: &str, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request, method, endpoint).await?;
        let result: T = response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("レスポンス解析エラー: {e}")))?;

        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(result)
    }

    /// リクエストを送信し、2xx以外をエラーに変換する
    async fn send(&self, request: RequestBuilder, method: &str, endpoint: &str) -> AppResult<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            warn!("APIサーバーへの接続に失敗しました: method={method}, endpoint={endpoint}, {e}");
            AppError::Network(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = self.handle_error_response(response).await;

        if status == StatusCode::UNAUTHORIZED {
            // 認証切れ: 保存済みトークンを破棄し、ログイン画面への誘導は呼び出し側に任せる
            warn!("認証エラーを受信したためトークンを破棄します: endpoint={endpoint}");
            if let Err(e) = self.storage.clear() {
                warn!("トークンの破棄に失敗しました: {e}");
            }
            return Err(AppError::Unauthorized(message));
        }

        Err(AppError::Http {
            status: status.as_u16(),
            message,
        })
    }

    /// エラーレスポンスからメッセージを取り出す
    async fn handle_error_response(&self, response: Response) -> String {
        let status_code = response.status().as_u16();

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        // JSONエラーレスポンスの解析を試行
        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            if let Some(message) = error_response.message.or(error_response.error) {
                debug!("APIサーバーから構造化エラーレスポンスを受信: status={status_code}, message={message}");
                return message;
            }
        }

        warn!("APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}");
        classify_status(status_code).message.to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::features::auth::secure_storage::MemoryTokenStorage;

    /// 接続できないアドレスを向いたクライアント（通信失敗の再現用）
    pub fn unreachable_client() -> Arc<ApiClient> {
        let config = ApiClientConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            timeout_seconds: 2,
        };
        Arc::new(ApiClient::new_with_config(config, Arc::new(MemoryTokenStorage::new())).unwrap())
    }
}
