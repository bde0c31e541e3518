use crate::features::auth::session::{SessionManager, SessionState};
use crate::shared::api_client::login_redirect_url;
use std::sync::Arc;

/// ログイン済みユーザーがゲスト専用画面を開いたときの遷移先
pub const HOME_PATH: &str = "/dashboard";

/// 画面遷移の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// 指定URLへ遷移させる
    Redirect { url: String },
    /// 認証済みだが権限がない
    Forbidden,
}

/// 画面遷移の認証ガード
///
/// 認証が必要な画面へのアクセスを判定し、未認証の場合は
/// 元の画面に戻れるよう `returnUrl` 付きでログイン画面へ誘導する
#[derive(Clone)]
pub struct AuthGuard {
    session: Arc<SessionManager>,
}

impl AuthGuard {
    /// 新しいAuthGuardを作成する
    ///
    /// # 引数
    /// * `session` - セッション管理
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// 未初期化なら初期化してから現在の状態を返す
    async fn resolved_state(&self) -> SessionState {
        match self.session.state() {
            SessionState::Unknown => self.session.initialize().await,
            state => state,
        }
    }

    /// 認証が必要な画面へのアクセスを判定する
    ///
    /// # 引数
    /// * `requested_path` - アクセスしようとしている画面のパス
    pub async fn check(&self, requested_path: &str) -> GuardDecision {
        if self.resolved_state().await.is_authenticated() {
            GuardDecision::Allow
        } else {
            log::debug!("未認証のためログイン画面へ誘導します: path={requested_path}");
            GuardDecision::Redirect {
                url: login_redirect_url(requested_path),
            }
        }
    }

    /// 特定ロールが必要な画面へのアクセスを判定する
    pub async fn check_role(&self, requested_path: &str, role: &str) -> GuardDecision {
        match self.check(requested_path).await {
            GuardDecision::Allow if self.session.has_role(role) => GuardDecision::Allow,
            GuardDecision::Allow => {
                log::warn!("権限がありません: path={requested_path}, role={role}");
                GuardDecision::Forbidden
            }
            other => other,
        }
    }

    /// ログイン・登録画面など未認証ユーザー専用画面へのアクセスを判定する
    pub async fn check_guest(&self) -> GuardDecision {
        if self.resolved_state().await.is_authenticated() {
            GuardDecision::Redirect {
                url: HOME_PATH.to_string(),
            }
        } else {
            GuardDecision::Allow
        }
    }
}
