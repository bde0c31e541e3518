use crate::features::incomes::models::IncomeKind;
use crate::features::ledger::LedgerService;

/// 収入操作サービス
pub type IncomeService = LedgerService<IncomeKind>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dashboard::stats::Summary;
    use crate::features::incomes::models::IncomeDto;
    use crate::shared::api_client::test_support::unreachable_client;
    use crate::shared::errors::AppError;
    use crate::shared::notification::{ChannelNotifier, Notification, NotificationKind};
    use crate::shared::pagination::PageRequest;
    use crate::shared::query::EntryFilter;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn service() -> (IncomeService, UnboundedReceiver<Notification>) {
        let (notifier, receiver) = ChannelNotifier::new();
        (
            IncomeService::new(unreachable_client(), Arc::new(notifier)),
            receiver,
        )
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_failed_fallback_returns_empty_page() {
        let (service, _) = service();
        let filter = EntryFilter::new().with_search("salário");

        let result = service.list(&PageRequest::new(0, 10), &filter).await;

        assert!(result.content.is_empty());
        assert_eq!(result.total_elements, 0);
        assert!(result.empty);
    }

    #[tokio::test]
    async fn test_try_list_surfaces_error() {
        let (service, _) = service();
        let result = service
            .try_list(&PageRequest::default(), &EntryFilter::new())
            .await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_reads_are_fail_soft() {
        let (service, _) = service();

        assert!(service.get_all().await.is_empty());
        assert!(service.get_by_category(3).await.is_empty());
        assert!(service
            .get_by_date_range(ymd(2024, 1, 1), ymd(2024, 1, 31))
            .await
            .is_empty());
        assert_eq!(service.summary().await, Summary::default());
    }

    #[tokio::test]
    async fn test_inverted_date_range_is_empty() {
        let (service, _) = service();
        assert!(service
            .get_by_date_range(ymd(2024, 2, 1), ymd(2024, 1, 1))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_surfaces_error() {
        let (service, _) = service();
        assert!(service.get(1).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_create_notifies_error() {
        let (service, mut receiver) = service();
        let dto = IncomeDto::new("", dec!(10), ymd(2024, 1, 1), 1);

        let result = service.create(&dto).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let notification = receiver.try_recv().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.starts_with("収入の登録に失敗しました"));
    }

    #[tokio::test]
    async fn test_failed_update_and_delete_reraise() {
        let (service, mut receiver) = service();
        let dto = IncomeDto::new("Aluguel recebido", dec!(900), ymd(2024, 1, 1), 1);

        assert!(matches!(
            service.update(5, &dto).await,
            Err(AppError::Network(_))
        ));
        assert!(service.delete(5).await.is_err());

        assert_eq!(receiver.try_recv().unwrap().kind, NotificationKind::Error);
        assert_eq!(receiver.try_recv().unwrap().kind, NotificationKind::Error);
    }
}
