/// テスト用のローカルHTTPサーバー
///
/// 127.0.0.1の空きポートで待ち受け、受信したリクエストを記録して
/// ハンドラーが返すステータスとJSONボディを応答する。接続は1リクエストごとに閉じる。
use crate::features::auth::secure_storage::{MemoryTokenStorage, TokenStorage};
use crate::shared::api_client::{ApiClient, ApiClientConfig};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// 受信したリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    /// クエリ文字列を含むパス
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// `GET /api/expenses/all` の形式
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

type Handler = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

pub struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// サーバーを起動する
    ///
    /// # 引数
    /// * `handler` - リクエストから (ステータス, JSONボディ) を返す
    pub async fn start<H>(handler: H) -> Self
    where
        H: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handle_connection(stream, recorded, handler).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// このサーバーを向いたクライアント
    pub fn client(&self, storage: Arc<dyn TokenStorage>) -> Arc<ApiClient> {
        let config = ApiClientConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 5,
        };
        Arc::new(ApiClient::new_with_config(config, storage).unwrap())
    }

    /// トークン未保存のストレージを使うクライアント
    pub fn anonymous_client(&self) -> Arc<ApiClient> {
        self.client(Arc::new(MemoryTokenStorage::new()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 受信したリクエストを `METHOD path` の形式で返す
    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 200 OK でJSONを返すハンドラー用の省略形
pub fn ok(body: serde_json::Value) -> (u16, String) {
    (200, body.to_string())
}

async fn handle_connection(
    mut stream: TcpStream,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    handler: Arc<Handler>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "authorization" => authorization = Some(value.trim().to_string()),
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => body.extend_from_slice(&chunk[..read]),
        }
    }

    let request = RecordedRequest {
        method,
        path,
        authorization,
        body: String::from_utf8_lossy(&body).to_string(),
    };
    let (status, response_body) = handler(&request);
    recorded.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
        reason_phrase(status),
        response_body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
