use crate::features::auth::models::{LoginRequest, RegisterRequest, User};
use crate::features::auth::secure_storage::TokenStorage;
use crate::features::auth::service::AuthService;
use crate::features::auth::token::{decode_claims, is_token_valid};
use crate::shared::errors::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// セッション状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 初期化前
    Unknown,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn current_user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// セッション管理を行う構造体
///
/// 認証状態はこの構造体だけが更新し、`subscribe` で購読できる。
/// 初期化は `initialize` を明示的に呼び出したときにのみ行う。
/// 初期化・ログイン・登録・再同期は同時に1つだけ実行される。
pub struct SessionManager {
    auth: AuthService,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionState>,
    transition: Mutex<()>,
}

impl SessionManager {
    /// 新しいSessionManagerを作成する（状態は Unknown）
    pub fn new(auth: AuthService, storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            auth,
            storage,
            state,
            transition: Mutex::new(()),
        }
    }

    /// 認証状態の変化を購読する
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// 現在の認証状態
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user().cloned()
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                log::debug!(
                    "セッション状態を更新: authenticated={}",
                    next.is_authenticated()
                );
                *current = next;
                true
            }
        });
    }

    /// 保存済みの有効なトークン（期限切れ・デコード不可はNone）
    fn valid_token(&self) -> Option<String> {
        self.storage.token().filter(|token| is_token_valid(token))
    }

    /// 保存済みトークンから認証状態を確定する
    ///
    /// # 処理内容
    /// 1. 有効なトークンがなければ未認証（無効なトークンは破棄）
    /// 2. プロフィール取得に成功すれば認証済み
    /// 3. プロフィール取得に失敗すればログアウトして未認証
    pub async fn initialize(&self) -> SessionState {
        let _transition = self.transition.lock().await;
        self.restore().await
    }

    async fn restore(&self) -> SessionState {
        let Some(_token) = self.valid_token() else {
            if self.storage.token().is_some() {
                log::info!("保存済みトークンが無効または期限切れのため破棄します");
                self.clear_storage();
            }
            self.set_state(SessionState::Unauthenticated);
            return self.state();
        };

        match self.auth.current_user().await {
            Ok(user) => {
                log::info!("セッションを復元しました: user_id={}", user.id);
                self.set_state(SessionState::Authenticated(user));
            }
            Err(e) => {
                log::warn!("ユーザー情報の取得に失敗したためログアウトします: {e}");
                self.clear_storage();
                self.set_state(SessionState::Unauthenticated);
            }
        }

        self.state()
    }

    /// ログインして認証済みにする
    ///
    /// トークン保存による変更通知で再同期が割り込まないよう、
    /// 認証状態の確定までを1つの遷移として扱う
    pub async fn login(&self, request: &LoginRequest) -> AppResult<User> {
        let _transition = self.transition.lock().await;
        let response = self.auth.login(request).await?;
        self.complete_sign_in(response.user).await
    }

    /// ユーザー登録して認証済みにする
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<User> {
        let _transition = self.transition.lock().await;
        let response = self.auth.register(request).await?;
        self.complete_sign_in(response.user).await
    }

    /// レスポンスにユーザー情報がなければ取得し、認証済みにする
    ///
    /// 取得に失敗した場合は保存したトークンを破棄する
    async fn complete_sign_in(&self, user: Option<User>) -> AppResult<User> {
        let user = match user {
            Some(user) => user,
            None => match self.auth.current_user().await {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("ログイン後のユーザー情報取得に失敗しました: {e}");
                    self.clear_storage();
                    self.set_state(SessionState::Unauthenticated);
                    return Err(e);
                }
            },
        };

        self.set_state(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// ログアウトする
    pub fn logout(&self) -> AppResult<()> {
        let result = self.auth.logout();
        // 削除に失敗しても画面上は未認証にする
        self.set_state(SessionState::Unauthenticated);
        result
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            log::warn!("トークンの破棄に失敗しました: {e}");
        }
    }

    /// トークンの有無と認証状態が食い違っていれば再同期する
    ///
    /// # 戻り値
    /// 再同期した場合はtrue
    pub async fn reconcile(&self) -> bool {
        let _transition = self.transition.lock().await;
        let token_present = self.valid_token().is_some();
        let authenticated = self.is_authenticated();

        if token_present == authenticated {
            return false;
        }

        log::info!(
            "トークン状態と認証状態の不一致を検出しました: token_present={token_present}, authenticated={authenticated}"
        );
        self.restore().await;
        true
    }

    /// 現在のトークンが指定ロールを持つかどうか
    pub fn has_role(&self, role: &str) -> bool {
        self.valid_token()
            .and_then(|token| decode_claims(&token).ok())
            .map(|claims| claims.has_role(role))
            .unwrap_or(false)
    }

    /// 認証済みユーザーを取得する（未認証ならエラー）
    pub fn require_user(&self) -> AppResult<User> {
        self.current_user()
            .ok_or_else(|| AppError::Unauthorized("ログインが必要です".to_string()))
    }

    /// トークンの外部変更を監視するタスクを起動する
    ///
    /// ストレージの変更通知を主な契機とし、通知されない変更（別プロセスによる
    /// ファイル書き換えなど）は `safety_interval` ごとの定期チェックで拾う。
    pub fn spawn_watcher(self: Arc<Self>, safety_interval: Duration) -> JoinHandle<()> {
        let mut changes = self.storage.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(safety_interval);
            // 初回の即時tickを消費する
            ticker.tick().await;

            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            log::debug!("トークンストレージが破棄されたため監視を終了します");
                            break;
                        }
                        log::debug!("トークンストレージの変更通知を受信しました");
                    }
                    _ = ticker.tick() => {}
                }

                self.reconcile().await;
            }
        })
    }
}
