use serde::{Deserialize, Serialize};
use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 認証切れ・未認証（401）
    #[error("認証エラー: {0}")]
    Unauthorized(String),

    /// APIサーバーが2xx以外を返した場合のエラー
    #[error("APIサーバーエラー: status={status}, {message}")]
    Http { status: u16, message: String },

    /// APIサーバーに到達できなかった場合のエラー
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// トークンストレージ関連のエラー
    #[error("ストレージエラー: {0}")]
    Storage(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// トークンやレスポンスの解析エラー
    #[error("デコードエラー: {0}")]
    Decode(String),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型（UIの表示スタイルにのみ使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（認証切れなど）
    Medium,
    /// 高重要度（通信不能など）
    High,
    /// 最重要（サーバー障害）
    Critical,
}

/// HTTPステータスから導出されるエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// 通信不能（status 0）
    Network,
    /// 401 / 403
    Auth,
    /// 400 / 422
    Validation,
    /// その他の4xx
    Client,
    /// 5xx
    Server,
    Unknown,
}

impl ErrorCategory {
    /// HTTPステータスコードから分類を決定する
    ///
    /// 0 は応答なし（通信不能）を表す。5xx はネットワーク系障害と同じく一時的な障害として
    /// 扱うが、より具体的な `Server` を返す。
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorCategory::Network,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::Validation,
            402..=499 => ErrorCategory::Client,
            500..=599 => ErrorCategory::Server,
            _ => ErrorCategory::Unknown,
        }
    }

    /// ユーザーに表示するメッセージ
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::Network => {
                "サーバーに接続できません。ネットワーク接続を確認してください"
            }
            ErrorCategory::Auth => "認証に失敗しました。再度ログインしてください",
            ErrorCategory::Validation => "入力内容に誤りがあります",
            ErrorCategory::Client => "リクエストを処理できませんでした",
            ErrorCategory::Server => {
                "サーバーでエラーが発生しました。しばらく待ってから再試行してください"
            }
            ErrorCategory::Unknown => "不明なエラーが発生しました",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCategory::Validation | ErrorCategory::Client => ErrorSeverity::Low,
            ErrorCategory::Auth | ErrorCategory::Unknown => ErrorSeverity::Medium,
            ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::Server => ErrorSeverity::Critical,
        }
    }

    /// 時間をおけば解消し得るエラーかどうか
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }
}

/// ステータスコードの分類結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub status: u16,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: &'static str,
}

/// ステータスコードを分類し、表示用メッセージと重要度を付与する
///
/// # 引数
/// * `status` - HTTPステータスコード（応答なしの場合は0）
///
/// # 戻り値
/// 分類結果
pub fn classify_status(status: u16) -> ErrorInfo {
    let category = ErrorCategory::from_status(status);
    ErrorInfo {
        status,
        category,
        severity: category.severity(),
        message: category.user_message(),
    }
}

impl AppError {
    /// エラーの分類を取得
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Http { status, .. } => ErrorCategory::from_status(*status),
            AppError::Network(_) => ErrorCategory::Network,
            AppError::Unauthorized(_) => ErrorCategory::Auth,
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::NotFound(_) => ErrorCategory::Client,
            _ => ErrorCategory::Unknown,
        }
    }

    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Storage(_) => "認証情報の保存領域でエラーが発生しました",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
            AppError::Json(_) | AppError::Decode(_) => "データ形式の解析でエラーが発生しました",
            AppError::Concurrency(_) => "並行処理でエラーが発生しました",
            _ => self.category().user_message(),
        }
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Storage(_) | AppError::Configuration(_) | AppError::Concurrency(_) => {
                ErrorSeverity::High
            }
            _ => self.category().severity(),
        }
    }

    /// HTTPステータスコードを取得（HTTPエラー以外はNone）
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::Unauthorized(_) => Some(401),
            AppError::Network(_) => Some(0),
            _ => None,
        }
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Network(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
