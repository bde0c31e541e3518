use crate::features::dashboard::stats::Summary;
use crate::features::ledger::models::{LedgerDto, LedgerKind, LedgerRecord};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use crate::shared::notification::{notify_outcome, Notifier};
use crate::shared::pagination::{PageRequest, PaginatedResult};
use crate::shared::query::EntryFilter;
use crate::shared::reload::{ListController, ListQuery};
use crate::shared::resource::{fail_soft, RemoteCollection};
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// 台帳エンティティの操作サービス
pub struct LedgerService<K> {
    collection: RemoteCollection<LedgerRecord<K>>,
    notifier: Arc<dyn Notifier>,
}

impl<K> Clone for LedgerService<K> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<K: LedgerKind> LedgerService<K> {
    /// # 引数
    /// * `api` - APIクライアント
    /// * `notifier` - 書き込み結果の通知先
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            collection: RemoteCollection::new(api, K::PATH),
            notifier,
        }
    }

    /// 一覧を取得する（失敗時はエラーを返す）
    ///
    /// 絞り込み条件がなければサーバー側のページングを使用し、
    /// あれば全件を取得してローカルで絞り込む
    pub async fn try_list(
        &self,
        page: &PageRequest,
        filter: &EntryFilter,
    ) -> AppResult<PaginatedResult<LedgerRecord<K>>> {
        self.collection.query(page, filter).await
    }

    /// 一覧を取得する
    ///
    /// # 戻り値
    /// 取得に失敗した場合は空のページ
    pub async fn list(&self, page: &PageRequest, filter: &EntryFilter) -> PaginatedResult<LedgerRecord<K>> {
        let context = format!("{}一覧の取得", K::LABEL);
        fail_soft(self.try_list(page, filter).await, &context, || {
            PaginatedResult::empty_page(page)
        })
    }

    /// 全件を取得する（失敗時は空）
    pub async fn get_all(&self) -> Vec<LedgerRecord<K>> {
        let context = format!("全{}の取得", K::LABEL);
        fail_soft(self.collection.fetch_all().await, &context, Vec::new)
    }

    pub async fn get(&self, id: i64) -> AppResult<LedgerRecord<K>> {
        self.collection.fetch_one(id).await
    }

    pub async fn create(&self, dto: &LedgerDto<K>) -> AppResult<LedgerRecord<K>> {
        let result = match dto.validate() {
            Ok(()) => self.collection.create(dto).await,
            Err(e) => Err(e),
        };

        let created = notify_outcome(
            self.notifier.as_ref(),
            result,
            &format!("{}を登録しました", K::LABEL),
            &format!("{}の登録に失敗しました", K::LABEL),
        )?;
        info!("{}を作成しました: id={}", K::LABEL, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: i64, dto: &LedgerDto<K>) -> AppResult<LedgerRecord<K>> {
        let result = match dto.validate() {
            Ok(()) => self.collection.update(id, dto).await,
            Err(e) => Err(e),
        };

        let updated = notify_outcome(
            self.notifier.as_ref(),
            result,
            &format!("{}を更新しました", K::LABEL),
            &format!("{}の更新に失敗しました", K::LABEL),
        )?;
        info!("{}を更新しました: id={id}", K::LABEL);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.remove(id).await;
        notify_outcome(
            self.notifier.as_ref(),
            result,
            &format!("{}を削除しました", K::LABEL),
            &format!("{}の削除に失敗しました", K::LABEL),
        )?;
        info!("{}を削除しました: id={id}", K::LABEL);
        Ok(())
    }

    /// カテゴリーで絞り込んだ一覧を取得する（失敗時は空）
    pub async fn get_by_category(&self, category_id: i64) -> Vec<LedgerRecord<K>> {
        let result = self
            .collection
            .fetch_list(&format!("/category/{category_id}"), &[])
            .await;
        let context = format!("カテゴリー別{}の取得", K::LABEL);
        fail_soft(result, &context, Vec::new)
    }

    /// 期間（両端を含む）で絞り込んだ一覧を取得する（失敗時は空）
    pub async fn get_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<LedgerRecord<K>> {
        if start > end {
            warn!("期間の指定が不正です: start={start}, end={end}");
            return Vec::new();
        }

        let query = EntryFilter::new()
            .with_date_range(Some(start), Some(end))
            .to_query_params();
        let result = self.collection.fetch_list("/date-range", &query).await;
        let context = format!("期間別{}の取得", K::LABEL);
        fail_soft(result, &context, Vec::new)
    }

    /// サーバー側の合計・件数・平均を取得する（失敗時はエラーを返す）
    pub async fn try_summary(&self) -> AppResult<Summary> {
        self.collection.fetch_stats().await
    }

    /// 合計・件数・平均を取得する（失敗時はゼロ）
    pub async fn summary(&self) -> Summary {
        let context = format!("{}の集計", K::LABEL);
        fail_soft(self.try_summary().await, &context, Summary::default)
    }

    /// 一覧画面用の再読み込みコントローラーを起動する
    ///
    /// 読み込みの失敗は空のページと `load_failed` で表される
    pub fn list_controller(&self, debounce: Duration) -> ListController<LedgerRecord<K>, EntryFilter> {
        let service = self.clone();
        ListController::spawn(
            move |query: ListQuery<EntryFilter>| {
                let service = service.clone();
                async move { service.try_list(&query.page, &query.filter).await }
            },
            debounce,
        )
    }
}
