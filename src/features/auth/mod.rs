/// 認証機能のモジュール
///
/// - APIサーバー経由のログイン・ユーザー登録・プロフィール取得
/// - JWTペイロードの読み取り（有効期限・ロール）
/// - トークンの保存と変更通知
/// - セッション状態の管理と画面遷移のガード
pub mod middleware;
pub mod models;
pub mod secure_storage;
pub mod service;
pub mod session;
pub mod token;

pub use middleware::{AuthGuard, GuardDecision};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, User};
pub use secure_storage::{FileTokenStorage, MemoryTokenStorage, StorageKeys, TokenStorage};
pub use service::AuthService;
pub use session::{SessionManager, SessionState};
pub use token::{decode_claims, is_token_valid, is_token_valid_at, JwtClaims};
