/// ユーザー向け通知（トースト等）のサイドチャネル
///
/// データ処理とは独立しており、書き込み系の成功・失敗をUIへ伝えるためだけに使用します。
use crate::shared::errors::AppResult;
use serde::Serialize;
use tokio::sync::mpsc;

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// 通知の送信先
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            kind: NotificationKind::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            kind: NotificationKind::Error,
            message: message.to_string(),
        });
    }
}

/// ログへ出力するだけの通知先
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success | NotificationKind::Info => {
                log::info!("通知: {}", notification.message)
            }
            NotificationKind::Warning => log::warn!("通知: {}", notification.message),
            NotificationKind::Error => log::error!("通知: {}", notification.message),
        }
    }
}

/// チャネル経由でUIへ通知を渡す通知先
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// 通知先と受信側を作成する
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // 受信側が破棄されていても処理は継続する
        if self.sender.send(notification).is_err() {
            log::debug!("通知の受信側が存在しないため破棄しました");
        }
    }
}

/// 書き込み系の結果をユーザーへ通知し、結果はそのまま返す
///
/// # 引数
/// * `notifier` - 通知先
/// * `result` - 処理結果
/// * `success_message` - 成功時のメッセージ
/// * `failure_message` - 失敗時のメッセージ（エラーの表示用メッセージを後ろに付ける）
pub fn notify_outcome<T>(
    notifier: &dyn Notifier,
    result: AppResult<T>,
    success_message: &str,
    failure_message: &str,
) -> AppResult<T> {
    match &result {
        Ok(_) => notifier.success(success_message),
        Err(e) => {
            log::error!("{failure_message}: {e}");
            notifier.error(&format!("{failure_message}: {}", e.user_message()));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::AppError;

    #[test]
    fn test_notify_outcome_reports_and_returns_error() {
        let (notifier, mut receiver) = ChannelNotifier::new();

        let result: AppResult<()> = notify_outcome(
            &notifier,
            Err(AppError::validation("説明は必須項目です")),
            "登録しました",
            "登録に失敗しました",
        );

        // エラーは呼び出し側へそのまま返る
        assert!(matches!(result, Err(AppError::Validation(_))));
        let notification = receiver.try_recv().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "登録に失敗しました: 説明は必須項目です");
    }

    #[test]
    fn test_notify_outcome_success() {
        let (notifier, mut receiver) = ChannelNotifier::new();

        let result = notify_outcome(&notifier, Ok(5), "登録しました", "登録に失敗しました");

        assert_eq!(result.unwrap(), 5);
        assert_eq!(receiver.try_recv().unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::new();

        notifier.success("経費を登録しました");
        notifier.error("経費の削除に失敗しました");

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.kind, NotificationKind::Success);
        assert_eq!(first.message, "経費を登録しました");

        let second = receiver.try_recv().unwrap();
        assert_eq!(second.kind, NotificationKind::Error);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_without_receiver() {
        // 受信側が破棄されていてもパニックしない
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        notifier.success("テスト");
    }
}
