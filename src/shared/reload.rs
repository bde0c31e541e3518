/// 一覧画面の再読み込み制御
///
/// 絞り込み条件の連続した変更をデバウンスしてから読み込みを行い、
/// 各読み込みに連番を振って最新のもの以外の結果は破棄する。
use crate::shared::errors::{AppError, AppResult};
use crate::shared::pagination::{PageRequest, PaginatedResult};
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// 単調増加する問い合わせ番号の発行元
#[derive(Debug, Default)]
pub struct QuerySequencer {
    counter: AtomicU64,
}

impl QuerySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の番号を発行する（1始まり）
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 最後に発行した番号（未発行なら0）
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.current() == ticket
    }
}

/// 一覧の問い合わせ条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery<F> {
    pub page: PageRequest,
    pub filter: F,
}

impl<F> ListQuery<F> {
    pub fn new(page: PageRequest, filter: F) -> Self {
        Self { page, filter }
    }
}

/// 一覧画面の表示状態
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub result: PaginatedResult<T>,
    pub loading: bool,
    /// 直近の読み込みが失敗した（結果は空のページ）
    pub load_failed: bool,
    /// 表示中の結果、または読み込み中の問い合わせの番号
    pub sequence: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            result: PaginatedResult::empty_page(&PageRequest::default()),
            loading: false,
            load_failed: false,
            sequence: 0,
        }
    }
}

/// 破棄時にタスクを中断するハンドル
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 読み込みタスクへの指示
enum ReloadCommand<F> {
    /// 条件の変更（前回と同じ条件なら読み込まない）
    Submit(ListQuery<F>),
    /// 直前の条件で必ず読み込み直す
    Refresh,
}

/// 一覧の読み込みを制御するコントローラー
///
/// 破棄すると、待機中・読み込み中の処理はすべて中断される
pub struct ListController<T, F> {
    commands: mpsc::UnboundedSender<ReloadCommand<F>>,
    state: watch::Receiver<ListState<T>>,
    _task: AbortOnDrop,
}

impl<T, F> ListController<T, F>
where
    T: Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// 読み込みタスクを起動する
    ///
    /// # 引数
    /// * `loader` - 問い合わせ条件から一覧を取得する処理
    /// * `debounce` - 最後の変更からこの時間だけ待ってから読み込む
    pub fn spawn<L, Fut>(loader: L, debounce: Duration) -> Self
    where
        L: Fn(ListQuery<F>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<PaginatedResult<T>>> + Send + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ListState::default());

        let task = tokio::spawn(run_reload_loop(receiver, state_tx, loader, debounce));

        Self {
            commands,
            state,
            _task: AbortOnDrop(task),
        }
    }

    /// 問い合わせ条件の変更を送る
    pub fn submit(&self, query: ListQuery<F>) -> AppResult<()> {
        self.send(ReloadCommand::Submit(query))
    }

    /// 直前の条件で再読み込みする
    ///
    /// 登録・更新・削除の後など、条件が同じでも一覧を取り直す場合に使う
    pub fn refresh(&self) -> AppResult<()> {
        self.send(ReloadCommand::Refresh)
    }

    fn send(&self, command: ReloadCommand<F>) -> AppResult<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::concurrency("一覧の読み込みタスクが終了しています"))
    }

    /// 表示状態の変化を購読する
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.clone()
    }
}

impl<T: Clone, F> ListController<T, F> {
    /// 現在の表示状態
    pub fn state(&self) -> ListState<T> {
        self.state.borrow().clone()
    }
}

async fn run_reload_loop<T, F, L, Fut>(
    mut receiver: mpsc::UnboundedReceiver<ReloadCommand<F>>,
    state: watch::Sender<ListState<T>>,
    loader: L,
    debounce: Duration,
) where
    T: Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
    L: Fn(ListQuery<F>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<PaginatedResult<T>>> + Send + 'static,
{
    let state = Arc::new(state);
    let sequencer = QuerySequencer::new();
    let mut last_dispatched: Option<ListQuery<F>> = None;
    // 新しい読み込みを開始すると前の読み込みは中断される
    let mut in_flight: Option<AbortOnDrop> = None;

    while let Some(command) = receiver.recv().await {
        let (mut pending, mut forced) = match command {
            ReloadCommand::Submit(query) => (Some(query), false),
            ReloadCommand::Refresh => (None, true),
        };

        // 一定時間指示が途切れるまで最新の条件に置き換える
        loop {
            match tokio::time::timeout(debounce, receiver.recv()).await {
                Ok(Some(ReloadCommand::Submit(newer))) => pending = Some(newer),
                Ok(Some(ReloadCommand::Refresh)) => forced = true,
                Ok(None) | Err(_) => break,
            }
        }

        let Some(query) = pending.or_else(|| last_dispatched.clone()) else {
            debug!("読み込み済みの条件がないため再読み込みを省略します");
            continue;
        };

        // 直前の読み込みが失敗していれば同じ条件でも読み込み直す
        let last_failed = state.borrow().load_failed;
        if !forced && !last_failed && last_dispatched.as_ref() == Some(&query) {
            debug!("前回と同じ条件のため再読み込みを省略します");
            continue;
        }
        last_dispatched = Some(query.clone());

        let ticket = sequencer.next();
        state.send_modify(|current| {
            current.loading = true;
            current.load_failed = false;
            current.sequence = ticket;
        });
        debug!("一覧の読み込みを開始します: sequence={ticket}");

        let load = loader(query.clone());
        let publisher = Arc::clone(&state);
        in_flight = Some(AbortOnDrop(tokio::spawn(async move {
            let outcome = load.await;
            publish(&publisher, ticket, &query.page, outcome);
        })));
    }

    // 送信側が破棄されても読み込み中の結果は反映する
    if let Some(mut pending) = in_flight.take() {
        let _ = (&mut pending.0).await;
    }
}

/// 最新の問い合わせの結果だけを表示状態へ反映する
fn publish<T>(
    state: &watch::Sender<ListState<T>>,
    ticket: u64,
    page: &PageRequest,
    outcome: AppResult<PaginatedResult<T>>,
) {
    state.send_if_modified(|current| {
        if current.sequence != ticket {
            debug!("古い読み込み結果を破棄します: sequence={ticket}");
            return false;
        }

        match outcome {
            Ok(result) => {
                current.result = result;
                current.load_failed = false;
            }
            Err(e) => {
                warn!("一覧の読み込みに失敗しました: {e}");
                current.result = PaginatedResult::empty_page(page);
                current.load_failed = true;
            }
        }
        current.loading = false;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const DEBOUNCE: Duration = Duration::from_millis(40);

    async fn settled<T: Clone>(receiver: &mut watch::Receiver<ListState<T>>, sequence: u64) -> ListState<T> {
        tokio::time::timeout(
            Duration::from_secs(3),
            receiver.wait_for(|state| state.sequence == sequence && !state.loading),
        )
        .await
        .unwrap()
        .unwrap()
        .clone()
    }

    fn query(page: u32, filter: &str) -> ListQuery<String> {
        ListQuery::new(PageRequest::new(page, 10), filter.to_string())
    }

    #[test]
    fn test_sequencer_is_monotonic() {
        let sequencer = QuerySequencer::new();
        assert_eq!(sequencer.current(), 0);

        let first = sequencer.next();
        let second = sequencer.next();
        assert!(second > first);
        assert!(sequencer.is_latest(second));
        assert!(!sequencer.is_latest(first));
    }

    #[tokio::test]
    async fn test_rapid_changes_are_debounced() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                recorder.lock().unwrap().push(query.filter.clone());
                async move { Ok::<_, AppError>(PaginatedResult::paginate(vec![query.filter], &query.page)) }
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(0, "m")).unwrap();
        controller.submit(query(0, "me")).unwrap();
        controller.submit(query(0, "mer")).unwrap();

        let state = settled(&mut receiver, 1).await;
        assert_eq!(state.result.content, vec!["mer".to_string()]);
        assert_eq!(*seen.lock().unwrap(), vec!["mer".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_query_is_not_reloaded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, AppError>(PaginatedResult::paginate(vec![query.filter], &query.page)) }
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(0, "aluguel")).unwrap();
        settled(&mut receiver, 1).await;

        controller.submit(query(0, "aluguel")).unwrap();
        tokio::time::sleep(DEBOUNCE * 4).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state().sequence, 1);
    }

    #[tokio::test]
    async fn test_latest_query_wins() {
        // 先に出した遅い読み込みの結果は表示されない
        let controller = ListController::spawn(
            |query: ListQuery<String>| async move {
                if query.page.page == 0 {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                }
                Ok::<_, AppError>(PaginatedResult::paginate(vec![query.filter], &query.page))
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(0, "slow")).unwrap();
        tokio::time::sleep(DEBOUNCE * 3).await;
        controller.submit(query(1, "fast")).unwrap();

        let state = settled(&mut receiver, 2).await;
        assert_eq!(state.result.page_number, 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let state = controller.state();
        assert_eq!(state.sequence, 2);
        assert_eq!(state.result.page_number, 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_flagged() {
        let controller = ListController::spawn(
            |_query: ListQuery<String>| async move {
                Err::<PaginatedResult<String>, _>(AppError::Network("unreachable".to_string()))
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(3, "x")).unwrap();

        let state = settled(&mut receiver, 1).await;
        assert!(state.load_failed);
        assert!(state.result.empty);
        assert_eq!(state.result.page_number, 3);
    }

    #[tokio::test]
    async fn test_same_query_is_retried_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        // 初回の読み込みだけ失敗する
        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Err(AppError::Network("timeout".to_string()))
                    } else {
                        Ok(PaginatedResult::paginate(vec![query.filter], &query.page))
                    }
                }
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(0, "rent")).unwrap();
        assert!(settled(&mut receiver, 1).await.load_failed);

        controller.submit(query(0, "rent")).unwrap();
        let state = settled(&mut receiver, 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!state.load_failed);
        assert_eq!(state.result.content, vec!["rent".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_reloads_last_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                // 2回目以降は登録後のデータが返る
                let filter = format!("{}#{call}", query.filter);
                async move { Ok::<_, AppError>(PaginatedResult::paginate(vec![filter], &query.page)) }
            },
            DEBOUNCE,
        );
        let mut receiver = controller.subscribe();

        controller.submit(query(0, "salário")).unwrap();
        settled(&mut receiver, 1).await;

        controller.refresh().unwrap();
        let state = settled(&mut receiver, 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.result.content, vec!["salário#1".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_before_any_query_does_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, AppError>(PaginatedResult::paginate(vec![query.filter], &query.page)) }
            },
            DEBOUNCE,
        );

        controller.refresh().unwrap();
        tokio::time::sleep(DEBOUNCE * 3).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.state().sequence, 0);
    }

    #[tokio::test]
    async fn test_dropping_controller_stops_loading() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let controller = ListController::spawn(
            move |query: ListQuery<String>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, AppError>(PaginatedResult::paginate(vec![query.filter], &query.page)) }
            },
            DEBOUNCE,
        );

        controller.submit(query(0, "a")).unwrap();
        drop(controller);
        tokio::time::sleep(DEBOUNCE * 3).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
