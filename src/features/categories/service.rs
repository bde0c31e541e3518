use crate::features::categories::models::{
    Category, CategoryDto, CategoryFilter, CategoryStats, CategoryType,
};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use crate::shared::notification::{notify_outcome, Notifier};
use crate::shared::pagination::{PageRequest, PaginatedResult};
use crate::shared::resource::{fail_soft, RemoteCollection};
use log::info;
use serde_json::json;
use std::sync::Arc;

/// カテゴリーAPIのパス
pub const CATEGORIES_PATH: &str = "/categories";

/// カテゴリー操作サービス
#[derive(Clone)]
pub struct CategoryService {
    api: Arc<ApiClient>,
    collection: RemoteCollection<Category>,
    notifier: Arc<dyn Notifier>,
}

impl CategoryService {
    /// # 引数
    /// * `api` - APIクライアント
    /// * `notifier` - 書き込み結果の通知先
    pub fn new(api: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            collection: RemoteCollection::new(Arc::clone(&api), CATEGORIES_PATH),
            api,
            notifier,
        }
    }

    /// カテゴリー一覧を取得する（失敗時はエラーを返す）
    pub async fn try_list(
        &self,
        page: &PageRequest,
        filter: &CategoryFilter,
    ) -> AppResult<PaginatedResult<Category>> {
        self.collection.query(page, filter).await
    }

    /// カテゴリー一覧を取得する
    ///
    /// # 戻り値
    /// 取得に失敗した場合は空のページ
    pub async fn list(&self, page: &PageRequest, filter: &CategoryFilter) -> PaginatedResult<Category> {
        fail_soft(self.try_list(page, filter).await, "カテゴリー一覧の取得", || {
            PaginatedResult::empty_page(page)
        })
    }

    /// 全カテゴリーを取得する（失敗時は空）
    pub async fn get_all(&self) -> Vec<Category> {
        fail_soft(self.collection.fetch_all().await, "全カテゴリーの取得", Vec::new)
    }

    /// 種別で絞り込んだ有効なカテゴリーを取得する
    ///
    /// 経費・収入フォームの選択肢に使用する
    pub async fn get_by_type(&self, category_type: CategoryType) -> Vec<Category> {
        let result = self
            .collection
            .fetch_list(&format!("/type/{category_type}"), &[])
            .await
            .map(|categories| {
                categories
                    .into_iter()
                    .filter(|category| category.active)
                    .collect::<Vec<Category>>()
            });

        fail_soft(result, "種別ごとのカテゴリー取得", Vec::new)
    }

    pub async fn get(&self, id: i64) -> AppResult<Category> {
        self.collection.fetch_one(id).await
    }

    /// カテゴリーを作成する
    pub async fn create(&self, dto: &CategoryDto) -> AppResult<Category> {
        let result = match dto.validate() {
            Ok(()) => self.collection.create(dto).await,
            Err(e) => Err(e),
        };

        let category = notify_outcome(
            self.notifier.as_ref(),
            result,
            "カテゴリーを登録しました",
            "カテゴリーの登録に失敗しました",
        )?;
        info!("カテゴリーを作成しました: category_id={}", category.id);
        Ok(category)
    }

    /// カテゴリーを更新する
    pub async fn update(&self, id: i64, dto: &CategoryDto) -> AppResult<Category> {
        let result = match dto.validate() {
            Ok(()) => self.collection.update(id, dto).await,
            Err(e) => Err(e),
        };

        notify_outcome(
            self.notifier.as_ref(),
            result,
            "カテゴリーを更新しました",
            "カテゴリーの更新に失敗しました",
        )
    }

    /// カテゴリーの有効・無効を切り替える
    pub async fn set_active(&self, id: i64, active: bool) -> AppResult<Category> {
        let result = self
            .api
            .patch(&format!("{CATEGORIES_PATH}/{id}"), &json!({ "active": active }))
            .await;

        let (success, failure) = if active {
            ("カテゴリーを有効にしました", "カテゴリーの有効化に失敗しました")
        } else {
            ("カテゴリーを無効にしました", "カテゴリーの無効化に失敗しました")
        };
        notify_outcome(self.notifier.as_ref(), result, success, failure)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.remove(id).await;
        notify_outcome(
            self.notifier.as_ref(),
            result,
            "カテゴリーを削除しました",
            "カテゴリーの削除に失敗しました",
        )?;
        info!("カテゴリーを削除しました: category_id={id}");
        Ok(())
    }

    /// サーバー側のカテゴリー数の統計を取得する（失敗時はゼロ）
    pub async fn stats(&self) -> CategoryStats {
        fail_soft(
            self.collection.fetch_stats().await,
            "カテゴリー統計の取得",
            CategoryStats::default,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::api_client::test_support::unreachable_client;
    use crate::shared::errors::AppError;
    use crate::shared::notification::{ChannelNotifier, Notification, NotificationKind};
    use crate::shared::test_server::{ok, TestServer};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn service() -> (CategoryService, UnboundedReceiver<Notification>) {
        let (notifier, receiver) = ChannelNotifier::new();
        (
            CategoryService::new(unreachable_client(), Arc::new(notifier)),
            receiver,
        )
    }

    #[tokio::test]
    async fn test_reads_are_fail_soft() {
        let (service, _) = service();
        let page = PageRequest::new(2, 5);

        let result = service.list(&page, &CategoryFilter::new()).await;
        assert!(result.empty);
        assert_eq!(result.total_elements, 0);
        assert_eq!(result.page_number, 2);

        let filtered = service
            .list(&page, &CategoryFilter::new().with_search("casa"))
            .await;
        assert!(filtered.content.is_empty());

        assert!(service.get_all().await.is_empty());
        assert!(service.get_by_type(CategoryType::Income).await.is_empty());
        assert_eq!(service.stats().await, CategoryStats::default());
    }

    #[tokio::test]
    async fn test_try_list_surfaces_error() {
        let (service, _) = service();
        let result = service
            .try_list(&PageRequest::default(), &CategoryFilter::new())
            .await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_create_notifies_and_fails_without_request() {
        let (service, mut receiver) = service();

        let result = service
            .create(&CategoryDto::new("", CategoryType::Expense))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let notification = receiver.try_recv().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_delete_failure_notifies_and_reraises() {
        let (service, mut receiver) = service();

        assert!(service.delete(7).await.is_err());
        assert_eq!(receiver.try_recv().unwrap().kind, NotificationKind::Error);
    }

    fn served(server: &TestServer) -> (CategoryService, UnboundedReceiver<Notification>) {
        let (notifier, receiver) = ChannelNotifier::new();
        (
            CategoryService::new(server.anonymous_client(), Arc::new(notifier)),
            receiver,
        )
    }

    #[tokio::test]
    async fn test_stats_reads_server_summary() {
        let server = TestServer::start(|_| ok(json!({ "total": 5, "byType": { "INCOME": 2, "EXPENSE": 3 } }))).await;
        let (service, _) = served(&server);

        let stats = service.stats().await;

        assert_eq!(server.request_lines(), vec!["GET /api/categories/stats".to_string()]);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_type.income, 2);
        assert_eq!(stats.by_type.expense, 3);
    }

    #[tokio::test]
    async fn test_get_by_type_keeps_active_only() {
        let server = TestServer::start(|_| {
            ok(json!([
                { "id": 1, "name": "Salário", "type": "INCOME" },
                { "id": 2, "name": "Bolsa", "type": "INCOME", "active": false },
            ]))
        })
        .await;
        let (service, _) = served(&server);

        let categories = service.get_by_type(CategoryType::Income).await;

        assert_eq!(server.request_lines(), vec!["GET /api/categories/type/INCOME".to_string()]);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Salário");
    }

    #[tokio::test]
    async fn test_set_active_patches_flag() {
        let server = TestServer::start(|_| ok(json!({ "id": 4, "name": "Lazer", "type": "EXPENSE", "active": false }))).await;
        let (service, mut receiver) = served(&server);

        let category = service.set_active(4, false).await.unwrap();

        assert!(!category.active);
        let requests = server.requests();
        let request = &requests[0];
        assert_eq!(request.line(), "PATCH /api/categories/4");
        assert_eq!(serde_json::from_str::<serde_json::Value>(&request.body).unwrap(), json!({ "active": false }));
        assert_eq!(receiver.try_recv().unwrap().kind, NotificationKind::Success);
    }
}
