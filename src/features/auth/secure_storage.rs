/// トークンストレージモジュール
///
/// JWTアクセストークンとリフレッシュトークンを保存・取得します。
/// 保存内容が変わるたびに変更通知を発行し、セッション管理側が
/// 外部からのトークン変更（ログアウト等）を検知できるようにします。
use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::watch;

/// ストレージのキー定義
pub struct StorageKeys;

impl StorageKeys {
    /// アクセストークンのキー
    pub const TOKEN: &'static str = "planwise_token";
    /// リフレッシュトークンのキー
    pub const REFRESH_TOKEN: &'static str = "planwise_refresh_token";
}

/// トークンストレージ
///
/// `subscribe` が返すReceiverの値は変更のたびに増加するバージョン番号です。
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
    fn subscribe(&self) -> watch::Receiver<u64>;

    /// アクセストークンを取得する（読み取りエラーは未保存として扱う）
    fn token(&self) -> Option<String> {
        self.get(StorageKeys::TOKEN).unwrap_or_else(|e| {
            log::warn!("トークンの読み取りに失敗しました: {e}");
            None
        })
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(StorageKeys::REFRESH_TOKEN).unwrap_or_else(|e| {
            log::warn!("リフレッシュトークンの読み取りに失敗しました: {e}");
            None
        })
    }

    /// トークンをまとめて保存する
    ///
    /// リフレッシュトークンがない場合は古いものを削除する
    fn save_tokens(&self, token: &str, refresh_token: Option<&str>) -> AppResult<()> {
        self.set(StorageKeys::TOKEN, token)?;
        match refresh_token {
            Some(refresh) => self.set(StorageKeys::REFRESH_TOKEN, refresh)?,
            None => self.remove(StorageKeys::REFRESH_TOKEN)?,
        }
        log::info!("認証トークンを保存しました");
        Ok(())
    }

    /// 認証情報をすべて削除する
    fn clear(&self) -> AppResult<()> {
        self.remove(StorageKeys::TOKEN)?;
        self.remove(StorageKeys::REFRESH_TOKEN)?;
        log::info!("認証トークンを削除しました");
        Ok(())
    }
}

/// メモリ上のトークンストレージ（テスト・一時利用向け）
pub struct MemoryTokenStorage {
    values: Mutex<HashMap<String, String>>,
    version: watch::Sender<u64>,
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            values: Mutex::new(HashMap::new()),
            version,
        }
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|e| AppError::concurrency(format!("ストレージのロック取得に失敗: {e}")))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        self.version.send_modify(|v| *v += 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let removed = self.lock()?.remove(key);
        if removed.is_some() {
            self.version.send_modify(|v| *v += 1);
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

/// JSONファイルに保存するトークンストレージ
///
/// 読み取りのたびにファイルを読み直すため、別プロセスによる書き換えも反映される。
/// 別プロセスによる変更は通知されないので、セッション管理側の定期チェックで検知する。
pub struct FileTokenStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
    version: watch::Sender<u64>,
}

impl FileTokenStorage {
    /// 新しいFileTokenStorageを作成する
    ///
    /// # 引数
    /// * `path` - 保存先のJSONファイル
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AppResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "トークンファイルの解析に失敗しました: path={:?}, {e}",
                self.path
            ))
        })
    }

    fn write_all(&self, values: &HashMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 一時ファイルに書いてから置き換える
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(values)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn modify<F>(&self, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AppError::concurrency(format!("ストレージのロック取得に失敗: {e}")))?;

        let mut values = self.read_all()?;
        if f(&mut values) {
            self.write_all(&values)?;
            self.version.send_modify(|v| *v += 1);
        }
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.modify(|values| {
            values.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.modify(|values| values.remove(key).is_some())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}
