/// REST上のエンティティ一覧へのアクセス
///
/// `/categories`・`/expenses`・`/incomes` はいずれも同じ形のエンドポイントを持つため、
/// 一覧・取得・作成・更新・削除と、絞り込み時のローカルフォールバックをここにまとめる。
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use crate::shared::pagination::{PageRequest, PaginatedResult};
use crate::shared::query::{local_query, QueryFilter};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// エンティティ一覧のエンドポイント
pub struct RemoteCollection<T> {
    api: Arc<ApiClient>,
    base_path: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RemoteCollection<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            base_path: self.base_path,
            _marker: PhantomData,
        }
    }
}

impl<T> RemoteCollection<T>
where
    T: DeserializeOwned,
{
    /// # 引数
    /// * `api` - APIクライアント
    /// * `base_path` - エンドポイントのパス（例: `/expenses`）
    pub fn new(api: Arc<ApiClient>, base_path: &'static str) -> Self {
        Self {
            api,
            base_path,
            _marker: PhantomData,
        }
    }

    pub fn base_path(&self) -> &'static str {
        self.base_path
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}/{id}", self.base_path)
    }

    /// 絞り込みなしの全件を取得する（ページング指定なし）
    pub async fn fetch_all(&self) -> AppResult<Vec<T>> {
        self.api.get(&format!("{}/all", self.base_path)).await
    }

    /// サーバー側でページングされた一覧を取得する
    pub async fn fetch_page(&self, page: &PageRequest) -> AppResult<PaginatedResult<T>> {
        self.api.get_pageable(self.base_path, page).await
    }

    /// サブパス配下の一覧を取得する（例: `/category/3`）
    pub async fn fetch_list(&self, sub_path: &str, query: &[(String, String)]) -> AppResult<Vec<T>> {
        self.api
            .get_with_query(&format!("{}{sub_path}", self.base_path), query)
            .await
    }

    /// サーバー側の集計（`{base}/stats`）を取得する
    pub async fn fetch_stats<S>(&self) -> AppResult<S>
    where
        S: DeserializeOwned,
    {
        self.api.get(&format!("{}/stats", self.base_path)).await
    }

    pub async fn fetch_one(&self, id: i64) -> AppResult<T> {
        self.api.get(&self.item_path(id)).await
    }

    pub async fn create<B>(&self, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
    {
        self.api.post(self.base_path, body).await
    }

    pub async fn update<B>(&self, id: i64, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
    {
        self.api.put(&self.item_path(id), body).await
    }

    pub async fn remove(&self, id: i64) -> AppResult<()> {
        self.api.delete(&self.item_path(id)).await
    }

    /// 一覧を取得する
    ///
    /// 絞り込み条件がなければサーバー側のページングを使用し、
    /// 条件があれば全件を取得してローカルで絞り込み・ページングする
    pub async fn query<F>(&self, page: &PageRequest, filter: &F) -> AppResult<PaginatedResult<T>>
    where
        F: QueryFilter<T>,
    {
        if filter.is_empty() {
            return self.fetch_page(page).await;
        }

        log::debug!("絞り込み条件ありのためローカルで検索します: endpoint={}", self.base_path);
        let all = self.fetch_all().await?;
        Ok(local_query(all, filter, page))
    }
}

/// 読み取り系の失敗を安全な既定値に置き換える
///
/// 一覧画面でエラー画面ではなく空の状態を表示するため。失敗はログに残す。
pub fn fail_soft<T>(result: AppResult<T>, context: &str, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("{context}に失敗したため空の結果を返します: {e}");
        fallback()
    })
}
