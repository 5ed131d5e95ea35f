//! HTTP implementation of [`TimelineSource`] against the SwiftShip backend

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::config::{ApiConfig, OrderScope};
use crate::traits::*;
use crate::types::*;

/// Backend client for the three timeline endpoints
///
/// No retries are attempted; a failed request surfaces as an error and the
/// timeline service degrades around it.
#[derive(Debug, Clone)]
pub struct HttpTimelineSource {
    http_client: HttpClient,
    base_url: Url,
    config: ApiConfig,
}

impl HttpTimelineSource {
    /// Create a client from validated settings
    pub fn new(config: ApiConfig) -> TimelineResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TimelineError::Config(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TimelineError::Config(format!(
                "Base URL cannot carry paths: '{}'",
                config.base_url
            )));
        }

        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn headers(&self) -> TimelineResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.config.token))
            .map_err(|e| TimelineError::Config(format!("Invalid auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn transactions_url(&self) -> Url {
        self.endpoint(&["transactions", "all"])
    }

    pub fn wallet_url(&self) -> Url {
        self.endpoint(&["wallet", &self.config.user_id])
    }

    pub fn orders_url(&self) -> Url {
        match self.config.order_scope() {
            OrderScope::User(user_id) => self.endpoint(&["orders", "user", &user_id]),
            OrderScope::Phone(phone) => {
                let mut url = self.endpoint(&["orders"]);
                url.query_pairs_mut().append_pair("phone", &phone);
                url
            }
        }
    }

    async fn get_json(&self, url: Url) -> TimelineResult<Value> {
        debug!(%url, "GET");
        let response = self
            .http_client
            .get(url)
            .headers(self.headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(response.json::<Value>().await?)
    }

    /// Post a payment record, as the checkout does once the payment sheet resolves
    pub async fn record_transaction(&self, record: &TransactionRecord) -> TimelineResult<()> {
        let url = self.endpoint(&["transactions", "create"]);
        debug!(%url, "POST");
        let response = self
            .http_client
            .post(url)
            .headers(self.headers()?)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

/// Build a status error, preferring the backend's JSON `message`
pub fn status_error(status: u16, body: &str) -> TimelineError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    if status >= 500 {
        warn!(status, %message, "backend server error");
    }
    TimelineError::Status { status, message }
}

/// Decode each element on its own; malformed records are skipped, not fatal
fn decode_items<T: DeserializeOwned>(items: Vec<Value>, key: &str) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(source = key, index, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Decode a list that may be bare or wrapped under `key`
pub fn decode_list<T: DeserializeOwned>(body: Value, key: &str) -> TimelineResult<Vec<T>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(TimelineError::Validation(format!(
                    "Expected a list under '{}', got {}",
                    key, other
                )))
            }
        },
        Value::Null => Vec::new(),
        other => {
            return Err(TimelineError::Validation(format!(
                "Expected a list of {}, got {}",
                key, other
            )))
        }
    };
    Ok(decode_items(items, key))
}

/// Decode the wallet object, which some deployments wrap under `wallet`
pub fn decode_wallet(body: Value) -> TimelineResult<WalletSnapshot> {
    let mut map = match body {
        Value::Object(mut map) => match map.remove("wallet") {
            Some(Value::Object(inner)) => inner,
            Some(_) | None => map,
        },
        Value::Null => return Ok(WalletSnapshot::default()),
        other => {
            return Err(TimelineError::Validation(format!(
                "Expected a wallet object, got {}",
                other
            )))
        }
    };

    let entries = match map.remove("transactions") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let mut wallet: WalletSnapshot = serde_json::from_value(Value::Object(map))?;
    wallet.transactions = decode_items(entries, "wallet");
    Ok(wallet)
}

#[async_trait]
impl TimelineSource for HttpTimelineSource {
    async fn fetch_transactions(&self) -> TimelineResult<Vec<TransactionRecord>> {
        let body = self.get_json(self.transactions_url()).await?;
        decode_list(body, "transactions")
    }

    async fn fetch_wallet(&self) -> TimelineResult<WalletSnapshot> {
        let body = self.get_json(self.wallet_url()).await?;
        decode_wallet(body)
    }

    async fn fetch_orders(&self) -> TimelineResult<Vec<OrderRecord>> {
        let body = self.get_json(self.orders_url()).await?;
        decode_list(body, "orders")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::payment::{patterns, PaymentMethod};
    use crate::timeline::core::TimelineService;
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;

    type Route = (&'static str, u16, String);

    /// Minimal HTTP/1.1 responder: answers by path prefix and forwards each raw request
    async fn serve(routes: Vec<Route>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let tx = tx.clone();
                tokio::spawn(async move { respond(stream, &routes, tx).await });
            }
        });

        (base_url, rx)
    }

    async fn respond(mut stream: TcpStream, routes: &[Route], tx: mpsc::UnboundedSender<String>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        let request = String::from_utf8_lossy(&buf).to_string();
        let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
        let (status, body) = routes
            .iter()
            .find(|(prefix, _, _)| path.starts_with(prefix))
            .map(|(_, status, body)| (*status, body.clone()))
            .unwrap_or((404, r#"{"message": "Not found"}"#.to_string()));
        tx.send(request).ok();

        let response = format!(
            "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    }

    fn client() -> HttpTimelineSource {
        HttpTimelineSource::new(ApiConfig::new("https://api.swiftship.test", "tok", "u42")).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let source = client();
        assert_eq!(
            source.transactions_url().as_str(),
            "https://api.swiftship.test/transactions/all"
        );
        assert_eq!(source.wallet_url().as_str(), "https://api.swiftship.test/wallet/u42");
        assert_eq!(
            source.orders_url().as_str(),
            "https://api.swiftship.test/orders/user/u42"
        );

        let by_phone = HttpTimelineSource::new(
            ApiConfig::new("https://api.swiftship.test", "tok", "u42").with_phone("9876543210"),
        )
        .unwrap();
        assert_eq!(
            by_phone.orders_url().as_str(),
            "https://api.swiftship.test/orders?phone=9876543210"
        );
    }

    #[test]
    fn test_phone_and_user_id_are_percent_encoded() {
        let by_phone = HttpTimelineSource::new(
            ApiConfig::new("https://api.swiftship.test", "tok", "u42").with_phone("+919876543210"),
        )
        .unwrap();
        let url = by_phone.orders_url();
        assert_eq!(url.as_str(), "https://api.swiftship.test/orders?phone=%2B919876543210");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("phone".to_string(), "+919876543210".to_string())]);

        let odd_user =
            HttpTimelineSource::new(ApiConfig::new("https://api.swiftship.test", "tok", "a/b c"))
                .unwrap();
        assert_eq!(
            odd_user.wallet_url().as_str(),
            "https://api.swiftship.test/wallet/a%2Fb%20c"
        );
    }

    #[test]
    fn test_base_url_path_is_kept() {
        let source =
            HttpTimelineSource::new(ApiConfig::new("https://swiftship.test/api/v1/", "tok", "u42"))
                .unwrap();
        assert_eq!(
            source.transactions_url().as_str(),
            "https://swiftship.test/api/v1/transactions/all"
        );
    }

    #[test]
    fn test_auth_header_uses_bearer_token() {
        let headers = client().headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(HttpTimelineSource::new(ApiConfig::new("ftp://x", "tok", "u1")).is_err());
    }

    #[test]
    fn test_decode_bare_and_wrapped_lists() {
        let bare: Vec<OrderRecord> =
            decode_list(json!([{"orderId": "SS-1", "status": "Pending"}]), "orders").unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<OrderRecord> = decode_list(
            json!({"success": true, "orders": [{"orderId": "SS-1"}, {"orderId": "SS-2"}]}),
            "orders",
        )
        .unwrap();
        assert_eq!(wrapped.len(), 2);

        let missing: Vec<OrderRecord> = decode_list(json!({"success": true}), "orders").unwrap();
        assert!(missing.is_empty());

        assert!(decode_list::<OrderRecord>(json!("nope"), "orders").is_err());
        assert!(decode_list::<OrderRecord>(json!({"orders": "nope"}), "orders").is_err());
    }

    #[test]
    fn test_malformed_row_does_not_drop_its_neighbours() {
        let transactions: Vec<TransactionRecord> = decode_list(
            json!([
                {"type": "Credit", "status": "Completed", "method": "UPI", "amount": 200,
                 "date": "2024-05-01T10:00:00Z"},
                {"type": "Debit", "method": 42, "amount": 10, "date": "2024-05-01T11:00:00Z"},
                {"type": "Credit", "orderId": 981, "date": "2024-05-01T12:00:00Z"}
            ]),
            "transactions",
        )
        .unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].method.as_deref(), Some("UPI"));
        assert_eq!(transactions[0].amount, Some(BigDecimal::from(200)));

        let wallet = decode_wallet(json!({
            "balance": 75,
            "transactions": [
                {"amount": 75, "date": "2024-05-01T10:00:00Z"},
                {"amount": 5, "isTopUp": "yes"}
            ]
        }))
        .unwrap();
        assert_eq!(wallet.balance, Some(BigDecimal::from(75)));
        assert_eq!(wallet.transactions.len(), 1);
    }

    #[test]
    fn test_decode_wallet() {
        let wallet = decode_wallet(json!({
            "balance": 420.5,
            "transactions": [{"amount": 100, "date": "2024-05-01T10:00:00Z", "isTopUp": true}]
        }))
        .unwrap();
        assert_eq!(wallet.balance, Some("420.5".parse::<BigDecimal>().unwrap()));
        assert_eq!(wallet.transactions.len(), 1);

        let wrapped = decode_wallet(json!({"wallet": {"balance": 10, "transactions": []}})).unwrap();
        assert_eq!(wrapped.balance, Some(BigDecimal::from(10)));
    }

    #[test]
    fn test_status_error_prefers_json_message() {
        match status_error(404, r#"{"message": "Wallet not found"}"#) {
            TimelineError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Wallet not found");
            }
            other => panic!("unexpected error: {other}"),
        }

        match status_error(502, "Bad Gateway") {
            TimelineError::Status { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_notice() {
        let (base_url, _requests) = serve(vec![
            (
                "/transactions/all",
                500,
                json!({"message": "Ledger database unavailable"}).to_string(),
            ),
            (
                "/wallet/u42",
                200,
                json!({"balance": 50, "transactions": [
                    {"amount": 50, "date": "2024-05-31T12:00:00Z", "isTopUp": true}
                ]})
                .to_string(),
            ),
            (
                "/orders/user/u42",
                200,
                json!({"orders": [
                    {"orderId": "SS-9", "status": "Pending", "totalAmount": 500,
                     "createdAt": "2024-06-01T11:00:00Z"}
                ]})
                .to_string(),
            ),
        ])
        .await;

        let source = HttpTimelineSource::new(ApiConfig::new(&base_url, "tok", "u42")).unwrap();
        let service = TimelineService::new(source);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let snapshot = service.load_at(now).await;

        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].title, "Order Placed");
        assert_eq!(snapshot.entries[1].title, "Top Up Successful");
        assert_eq!(snapshot.wallet_balance, Some(BigDecimal::from(50)));

        assert_eq!(snapshot.notices.len(), 1);
        let notice = &snapshot.notices[0];
        assert_eq!(notice.source, RecordKind::Transaction);
        assert!(notice.message.contains("500"));
        assert!(notice.message.contains("Ledger database unavailable"));
    }

    #[tokio::test]
    async fn test_record_transaction_posts_json_with_bearer_token() {
        let (base_url, mut requests) =
            serve(vec![("/transactions/create", 201, "{}".to_string())]).await;
        let source = HttpTimelineSource::new(ApiConfig::new(&base_url, "tok", "u42")).unwrap();

        let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let payment = patterns::completed_order_payment(
            "Asha",
            PaymentMethod::Upi,
            BigDecimal::from(138),
            "SS-1",
            date,
        )
        .unwrap();
        source.record_transaction(&payment).await.unwrap();

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("POST /transactions/create "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer tok"));
        assert!(request.contains(r#""orderId":"SS-1""#));
        assert!(request.contains(r#""method":"UPI""#));
    }

    #[tokio::test]
    async fn test_record_transaction_surfaces_rejection() {
        let (base_url, _requests) = serve(vec![(
            "/transactions/create",
            400,
            json!({"message": "Amount must be positive"}).to_string(),
        )])
        .await;
        let source = HttpTimelineSource::new(ApiConfig::new(&base_url, "tok", "u42")).unwrap();

        let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let payment = patterns::wallet_top_up_payment("Asha", BigDecimal::from(100), date).unwrap();

        match source.record_transaction(&payment).await {
            Err(TimelineError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Amount must be positive");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
