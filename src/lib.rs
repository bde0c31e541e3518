// 機能モジュール構造
pub mod features;
pub mod shared;

use features::auth::{
    AuthGuard, AuthService, FileTokenStorage, LoginRequest, SessionManager, SessionState,
    TokenStorage,
};
use features::categories::CategoryService;
use features::dashboard::DashboardService;
use features::expenses::{Expense, ExpenseService};
use features::incomes::{Income, IncomeService};
use log::{error, info, warn};
use shared::api_client::{ApiClient, ApiClientConfig};
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, SessionConfig,
};
use shared::config::{initialize_application, log_initialization_complete};
use shared::errors::{AppError, AppResult};
use shared::notification::{LogNotifier, Notifier};
use shared::pagination::PageRequest;
use shared::query::EntryFilter;
use shared::reload::{ListController, ListQuery};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// アプリケーション状態（セッションと各機能のサービスを保持）
///
/// すべてのサービスは同じAPIクライアントとトークンストレージを共有する
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    pub guard: AuthGuard,
    pub categories: CategoryService,
    pub expenses: ExpenseService,
    pub incomes: IncomeService,
    pub dashboard: DashboardService,
    pub session_config: SessionConfig,
}

impl AppState {
    /// アプリケーション状態を組み立てる
    ///
    /// # 引数
    /// * `api_config` - APIクライアント設定
    /// * `storage` - トークンの保存先
    /// * `notifier` - 書き込み結果の通知先
    /// * `session_config` - セッション・一覧画面の動作設定
    pub fn new(
        api_config: ApiClientConfig,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
        session_config: SessionConfig,
    ) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new_with_config(api_config, Arc::clone(&storage))?);

        let auth = AuthService::new(Arc::clone(&api), Arc::clone(&storage));
        let session = Arc::new(SessionManager::new(auth, storage));
        let guard = AuthGuard::new(Arc::clone(&session));

        let categories = CategoryService::new(Arc::clone(&api), Arc::clone(&notifier));
        let expenses = ExpenseService::new(Arc::clone(&api), Arc::clone(&notifier));
        let incomes = IncomeService::new(api, notifier);
        let dashboard =
            DashboardService::new(categories.clone(), expenses.clone(), incomes.clone());

        Ok(Self {
            session,
            guard,
            categories,
            expenses,
            incomes,
            dashboard,
            session_config,
        })
    }

    /// 経費一覧画面の再読み込みコントローラーを起動する
    pub fn expense_list(&self) -> ListController<Expense, EntryFilter> {
        self.expenses.list_controller(self.session_config.debounce())
    }

    /// 収入一覧画面の再読み込みコントローラーを起動する
    pub fn income_list(&self) -> ListController<Income, EntryFilter> {
        self.incomes.list_controller(self.session_config.debounce())
    }

    /// セッションを初期化し、トークンの外部変更の監視を開始する
    pub async fn start(&self) -> (SessionState, JoinHandle<()>) {
        let state = self.session.initialize().await;
        let watcher = Arc::clone(&self.session).spawn_watcher(self.session_config.reconcile_interval());
        (state, watcher)
    }
}

/// 環境変数の認証情報でログインする（未設定なら何もしない）
async fn login_from_env(state: &AppState) -> AppResult<()> {
    let email = crate::get_env_var_optional!("PLANWISE_EMAIL");
    let password = crate::get_env_var_optional!("PLANWISE_PASSWORD");

    let (Some(email), Some(password)) = (email, password) else {
        info!("PLANWISE_EMAIL/PLANWISE_PASSWORDが未設定のためログインをスキップします");
        return Ok(());
    };

    let user = state.session.login(&LoginRequest::new(email, password)).await?;
    info!("ログインしました: user_id={}", user.id);
    Ok(())
}

async fn run_async(state: AppState) -> AppResult<()> {
    let (session_state, watcher) = state.start().await;

    if !session_state.is_authenticated() {
        if let Err(e) = login_from_env(&state).await {
            error!("ログインに失敗しました: {e}");
            watcher.abort();
            return Err(e);
        }
    }

    if !state.session.is_authenticated() {
        warn!("未認証のためダッシュボードを表示できません");
        watcher.abort();
        return Ok(());
    }

    let overview = state.dashboard.overview().await;
    info!(
        "収入合計={}, 経費合計={}, 収支={}",
        overview.income_summary.total, overview.expense_summary.total, overview.balance
    );
    for month in &overview.monthly {
        info!(
            "{}: 収入={}, 経費={}, 収支={}",
            month.month, month.incomes, month.expenses, month.balance
        );
    }
    for expense in &overview.recent_expenses {
        info!(
            "最近の経費: {} {} {} ({})",
            expense.date, expense.description, expense.value, expense.category.name
        );
    }

    let expenses = state.expense_list();
    let mut updates = expenses.subscribe();
    expenses.submit(ListQuery::new(PageRequest::default(), EntryFilter::new()))?;
    match updates.wait_for(|list| list.sequence == 1 && !list.loading).await {
        Ok(list) if list.load_failed => warn!("経費一覧の読み込みに失敗しました"),
        Ok(list) => info!(
            "経費一覧: 全{}件中{}件を表示",
            list.result.total_elements,
            list.result.content.len()
        ),
        Err(e) => warn!("経費一覧の読み込みが中断されました: {e}"),
    }

    watcher.abort();
    Ok(())
}

/// アプリケーションのエントリーポイント
///
/// # 処理内容
/// 1. 環境変数の読み込みとログシステムの初期化
/// 2. 保存ディレクトリの初期化
/// 3. アプリケーション状態の組み立てとセッションの復元
/// 4. 必要に応じて環境変数の認証情報でログイン
/// 5. ダッシュボードの集計結果をログに出力
pub fn run() -> AppResult<()> {
    // 環境変数の読み込みはログシステム初期化前に行う
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let init_result = initialize_application()?;
    log_initialization_complete(&init_result);

    let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(init_result.token_file.clone()));
    let state = AppState::new(
        ApiClientConfig::from_env(),
        storage,
        Arc::new(LogNotifier),
        SessionConfig::from_env(),
    )?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::concurrency(format!("非同期ランタイムの起動に失敗しました: {e}")))?;

    runtime.block_on(run_async(state))
}
