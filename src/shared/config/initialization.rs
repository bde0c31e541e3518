use crate::shared::config::environment::{get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// トークンを保存するファイル名
pub const TOKEN_FILE_NAME: &str = "session.json";

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか
    pub is_first_run: bool,
    /// 保存ディレクトリのパス
    pub storage_dir: PathBuf,
    /// トークンファイルのパス
    pub token_file: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. 保存ディレクトリの決定と作成
/// 2. 初回起動の判定（トークンファイルの有無）
pub fn initialize_application() -> AppResult<InitializationResult> {
    let environment = get_environment();
    let storage_dir = resolve_storage_dir()?;
    initialize_in(&storage_dir, environment)
}

/// 指定ディレクトリで初期化を実行する
pub fn initialize_in(storage_dir: &Path, environment: Environment) -> AppResult<InitializationResult> {
    ensure_storage_directory(storage_dir)?;

    let token_file = storage_dir.join(TOKEN_FILE_NAME);
    let is_first_run = !token_file.exists();

    if is_first_run {
        log_first_run_initialization(&environment, storage_dir, &token_file);
    }

    Ok(InitializationResult {
        is_first_run,
        storage_dir: storage_dir.to_path_buf(),
        token_file,
        environment,
    })
}

/// 保存ディレクトリを決定する
///
/// `PLANWISE_STORAGE_DIR` が設定されていればそれを使用し、
/// なければOSの設定ディレクトリ配下の `planwise` を使用する
fn resolve_storage_dir() -> AppResult<PathBuf> {
    if let Some(dir) = crate::get_env_var_optional!("PLANWISE_STORAGE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|dir| dir.join("planwise"))
        .ok_or_else(|| AppError::configuration("設定ディレクトリの取得に失敗しました"))
}

/// 保存ディレクトリを確実に作成する
fn ensure_storage_directory(storage_dir: &Path) -> AppResult<()> {
    if !storage_dir.exists() {
        fs::create_dir_all(storage_dir).map_err(|e| {
            AppError::configuration(format!("保存ディレクトリの作成に失敗: {e}"))
        })?;

        log::info!("保存ディレクトリを作成しました: {storage_dir:?}");
    }

    Ok(())
}

fn log_first_run_initialization(environment: &Environment, storage_dir: &Path, token_file: &Path) {
    log::info!("=== アプリケーション初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("保存ディレクトリ: {storage_dir:?}");
    log::info!("トークンファイル: {token_file:?}");
}

/// 初期化完了ログを出力する
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::info!("初回起動の初期化が正常に完了しました");
    } else {
        log::info!("アプリケーション起動完了（既存の認証情報を使用）");
    }
    log::info!("環境: {:?}", result.environment);
}
