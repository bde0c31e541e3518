use std::fmt;
use std::str::FromStr;

/// アプリケーションの実行環境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 開発環境（.envを読み込み、ログはdebug）
    Development,
    /// プロダクション環境
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// 環境ごとの既定のログレベル
    pub fn default_log_level(&self) -> log::LevelFilter {
        match self {
            Environment::Development => log::LevelFilter::Debug,
            Environment::Production => log::LevelFilter::Info,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("不明な実行環境です: {other}")),
        }
    }
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    /// 変数名
    pub var_name: String,
    /// エラーメッセージ
    pub message: String,
}

impl fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "環境変数 {} が見つかりません: {}",
            self.var_name, self.message
        )
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する（優先順位: 起動時 > コンパイル時 > エラー）
///
/// # 引数
/// * `var_name` - 環境変数名（文字列リテラル）
///
/// # 戻り値
/// 環境変数の値、または見つからない場合は `EnvVarError`
///
/// # 取得順序
/// 1. 起動時の環境変数（`std::env::var`）
/// 2. ビルド時に埋め込まれた環境変数（`option_env!`）
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            log::debug!("環境変数 {} を起動時の環境変数から取得しました", $var_name);
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("環境変数 {} をビルド時の値から取得しました", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: format!("起動時にもビルド時にも {} が設定されていません", $var_name),
            })
        }
    }};
}

/// 環境変数を取得する（オプション版）
///
/// # 戻り値
/// 環境変数の値、または見つからない場合はNone
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（デフォルト値付き）
///
/// # 引数
/// * `var_name` - 環境変数名
/// * `default_value` - 見つからない場合の値
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| {
            log::debug!(
                "{} が未設定のため既定値を使用します: {}",
                $var_name,
                $default_value
            );
            $default_value.to_string()
        })
    }};
}

/// 実行環境とログ出力の設定
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: Environment,
    pub log_level: log::LevelFilter,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 読み込む環境変数
    /// * `PLANWISE_ENVIRONMENT` - `development` / `production`
    /// * `PLANWISE_LOG_LEVEL` - `error`〜`trace`（未設定なら環境ごとの既定値）
    pub fn from_env() -> Self {
        let environment = get_environment();
        let log_level = std::env::var("PLANWISE_LOG_LEVEL")
            .ok()
            .and_then(|level| parse_log_level(&level))
            .unwrap_or_else(|| environment.default_log_level());

        Self {
            environment,
            log_level,
        }
    }
}

/// ログレベル名を解釈する（不明な名前はNone）
pub fn parse_log_level(level: &str) -> Option<log::LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" => Some(log::LevelFilter::Off),
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        "info" => Some(log::LevelFilter::Info),
        "debug" => Some(log::LevelFilter::Debug),
        "trace" => Some(log::LevelFilter::Trace),
        _ => None,
    }
}

/// 現在の実行環境を判定する
///
/// # 戻り値
/// `PLANWISE_ENVIRONMENT` が解釈できればその値、
/// なければデバッグビルドは Development、リリースビルドは Production
pub fn get_environment() -> Environment {
    if let Ok(value) = std::env::var("PLANWISE_ENVIRONMENT") {
        match value.parse::<Environment>() {
            Ok(environment) => return environment,
            Err(e) => log::warn!("{e}。ビルド設定から判定します"),
        }
    }

    if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// .envファイルを読み込む
///
/// デバッグビルドでのみ読み込む。ログシステムの初期化前に呼ぶため結果は標準エラーに出す。
pub fn load_environment_variables() {
    if !cfg!(debug_assertions) {
        return;
    }

    match dotenv::dotenv() {
        Ok(path) => eprintln!("環境ファイルを読み込みました: {}", path.display()),
        Err(e) => eprintln!("環境ファイルを読み込めませんでした（環境変数をそのまま使用します）: {e}"),
    }
}

/// ログシステムを初期化する
///
/// 二重初期化（テストからの呼び出しなど）はエラーにしない
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let result = env_logger::Builder::from_default_env()
        .filter_level(env_config.log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if result.is_ok() {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment
        );
    }
}

/// API設定のデフォルト値
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// API設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL（`/api` まで含む）
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    ///
    /// # 読み込む環境変数
    /// * `PLANWISE_API_URL` - ベースURL（デフォルト: http://localhost:8080/api）
    /// * `PLANWISE_API_TIMEOUT_SECONDS` - タイムアウト秒数（デフォルト: 30）
    pub fn from_env() -> Self {
        log::debug!("ApiConfig::from_env() - 環境変数の読み込みを開始");

        let base_url = crate::get_env_var_or_default!("PLANWISE_API_URL", DEFAULT_API_URL);

        let timeout_seconds =
            crate::get_env_var_or_default!("PLANWISE_API_TIMEOUT_SECONDS", "30")
                .parse()
                .unwrap_or_else(|_| {
                    log::warn!(
                        "PLANWISE_API_TIMEOUT_SECONDSのパースに失敗しました。デフォルト値30秒を使用します"
                    );
                    DEFAULT_TIMEOUT_SECONDS
                });

        log::info!("API設定: base_url={base_url}, timeout={timeout_seconds}s");

        Self {
            base_url,
            timeout_seconds,
        }
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合はErr
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("APIサーバーのベースURLが設定されていません".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "APIサーバーのベースURLはhttp(s)で始まる必要があります: {}",
                self.base_url
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("APIタイムアウトは0より大きい値である必要があります".to_string());
        }

        Ok(())
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1")
    }
}

/// セッション・一覧画面の動作設定
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// トークン状態の整合性チェック間隔（変更通知を取りこぼした場合の保険）
    pub reconcile_interval_seconds: u64,
    /// フィルター変更のデバウンス時間（ミリ秒）
    pub debounce_millis: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_seconds: 60,
            debounce_millis: 300,
        }
    }
}

impl SessionConfig {
    /// 環境変数からセッション設定を読み込む
    ///
    /// # 読み込む環境変数
    /// * `PLANWISE_RECONCILE_INTERVAL_SECONDS` - 整合性チェック間隔（デフォルト: 60）
    /// * `PLANWISE_DEBOUNCE_MILLIS` - デバウンス時間（デフォルト: 300、300〜400に制限）
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let reconcile_interval_seconds =
            crate::get_env_var_or_default!("PLANWISE_RECONCILE_INTERVAL_SECONDS", "60")
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .unwrap_or_else(|| {
                    log::warn!("PLANWISE_RECONCILE_INTERVAL_SECONDSが不正です。デフォルト値60秒を使用します");
                    defaults.reconcile_interval_seconds
                });

        let debounce_millis = crate::get_env_var_or_default!("PLANWISE_DEBOUNCE_MILLIS", "300")
            .parse::<u64>()
            .unwrap_or(defaults.debounce_millis)
            .clamp(300, 400);

        log::debug!(
            "セッション設定: reconcile_interval={reconcile_interval_seconds}s, debounce={debounce_millis}ms"
        );

        Self {
            reconcile_interval_seconds,
            debounce_millis,
        }
    }

    pub fn reconcile_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reconcile_interval_seconds)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_millis)
    }
}
