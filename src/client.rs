//! Login handshake, session resume, and the resource operations.
//!
//! A [`Client`] is a thin authenticated handle: construct it from an
//! existing token, obtain one through [`Client::login`], or rebuild one
//! from the credential store with [`Client::resume`]. Every resource
//! operation is a single blocking envelope-decoded POST; there is no
//! retry, refresh, or caching here.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::envelope;
use crate::error::{Error, Result};
use crate::model::{
    Category, NewTransaction, TransactionParams, TransactionsPage, UserInfo, Wallet,
};
use crate::store::{TokenStore, DEFAULT_IDENTITY};
use crate::token::is_token_expired;
use crate::transport::{Transport, API_BASE};

/// Default address of the OAuth token exchange.
const OAUTH_TOKEN_URL: &str = "https://oauth.moneylover.me/token";

/// Service addresses. The defaults point at production; tests (or a
/// proxy setup) can direct a client elsewhere.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Base address for resource calls.
    pub api: String,
    /// Address of the OAuth token exchange used by the login handshake.
    pub oauth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: API_BASE.to_string(),
            oauth: OAUTH_TOKEN_URL.to_string(),
        }
    }
}

/// Envelope payload of `/user/login-url`.
#[derive(Debug, Deserialize)]
struct LoginUrl {
    #[serde(default)]
    request_token: String,
    #[serde(default)]
    login_url: String,
}

/// Response of the OAuth token exchange (not envelope-wrapped).
#[derive(Debug, Deserialize)]
struct AccessToken {
    #[serde(default)]
    access_token: String,
}

/// Exchange credentials for an access token via the two-step handshake.
///
/// Step one asks the API for a one-shot request token plus a login URL
/// whose `client` query parameter identifies the web client. Step two
/// posts the credentials form to the OAuth endpoint, authorized with the
/// request token under the standard `Bearer` scheme and carrying the
/// extracted client identifier in a `Client` header.
pub fn fetch_token(endpoints: &Endpoints, email: &str, password: &str) -> Result<String> {
    let http = reqwest::blocking::Client::new();

    let body = http
        .post(format!("{}/user/login-url", endpoints.api))
        .header("Content-Type", "application/json")
        .send()?
        .bytes()?;
    let login: LoginUrl = envelope::decode_data(&body)?;

    let client_id = client_query_param(&login.login_url)
        .ok_or(Error::Protocol("login url carries no client parameter"))?;
    tracing::debug!(client = %client_id, "login url resolved");

    let body = http
        .post(&endpoints.oauth)
        .form(&[("email", email), ("password", password)])
        .header("Authorization", format!("Bearer {}", login.request_token))
        .header("Client", client_id)
        .send()?
        .bytes()?;
    let token: AccessToken = serde_json::from_slice(&body)?;
    if token.access_token.is_empty() {
        return Err(Error::MissingAccessToken);
    }
    Ok(token.access_token)
}

/// Extract the `client` query parameter from a login URL.
fn client_query_param(login_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(login_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "client")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Authenticated handle to the Money Lover API.
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Wrap an existing access token, using the production endpoints.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoints(token, &Endpoints::default())
    }

    /// Wrap an existing access token, directing calls at `endpoints`.
    pub fn with_endpoints(token: impl Into<String>, endpoints: &Endpoints) -> Self {
        Self {
            transport: Transport::new(endpoints.api.clone(), token),
        }
    }

    /// The access token this client authenticates with.
    pub fn token(&self) -> &str {
        self.transport.token()
    }

    /// Log in with credentials, persist the token under the default
    /// identity in the default store, and return an authenticated client.
    pub fn login(email: &str, password: &str) -> Result<Self> {
        Self::login_with(&Endpoints::default(), &TokenStore::open_default()?, email, password)
    }

    /// [`Client::login`] with explicit endpoints and credential store.
    pub fn login_with(
        endpoints: &Endpoints,
        store: &TokenStore,
        email: &str,
        password: &str,
    ) -> Result<Self> {
        let token = fetch_token(endpoints, email, password)?;
        store.save_default(&token)?;
        tracing::debug!(email, "login complete, token persisted");
        Ok(Self::with_endpoints(token, endpoints))
    }

    /// Rebuild a client from the token cached for `identity`.
    ///
    /// Loads the stored token, rejects it when its expiry claim is in the
    /// past or cannot be read, then confirms it with a `/user/info` call.
    /// Any failure along the way means "no usable session"; fall back to
    /// [`Client::login`].
    pub fn resume(store: &TokenStore, identity: &str) -> Option<Self> {
        Self::resume_with(&Endpoints::default(), store, identity)
    }

    /// [`Client::resume`] under the default single-user identity.
    pub fn resume_default(store: &TokenStore) -> Option<Self> {
        Self::resume_with(&Endpoints::default(), store, DEFAULT_IDENTITY)
    }

    /// [`Client::resume`] with explicit endpoints.
    pub fn resume_with(endpoints: &Endpoints, store: &TokenStore, identity: &str) -> Option<Self> {
        let token = store.load(identity).ok()?;
        match is_token_expired(&token) {
            Ok(false) => {}
            Ok(true) | Err(_) => {
                tracing::debug!(identity, "cached token expired or unreadable");
                return None;
            }
        }
        let client = Self::with_endpoints(token, endpoints);
        match client.get_user_info() {
            Ok(_) => Some(client),
            Err(_) => None,
        }
    }

    /// Fetch the authenticated user's profile.
    pub fn get_user_info(&self) -> Result<UserInfo> {
        self.transport.post_empty("/user/info")
    }

    /// List the user's wallets.
    pub fn get_wallets(&self) -> Result<Vec<Wallet>> {
        self.transport.post_empty("/wallet/list")
    }

    /// List the categories available in a wallet.
    pub fn get_categories(&self, wallet_id: &str) -> Result<Vec<Category>> {
        self.transport
            .post_form("/category/list", &[("walletId", wallet_id)])
    }

    /// List a wallet's transactions between two dates, inclusive.
    pub fn get_transactions(
        &self,
        wallet_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TransactionsPage> {
        self.transport.post_json(
            "/transaction/list",
            &json!({
                "walletId": wallet_id,
                "startDate": format_date(start),
                "endDate": format_date(end),
            }),
        )
    }

    /// Create a transaction.
    ///
    /// The date travels as a bare `YYYY-MM-DD` calendar day.
    pub fn add_transaction(&self, params: &TransactionParams) -> Result<NewTransaction> {
        self.transport.post_json(
            "/transaction/add",
            &json!({
                "with": [],
                "account": params.wallet_id,
                "category": params.category_id,
                "amount": params.amount,
                "note": params.note.as_deref().unwrap_or(""),
                "displayDate": format_date(params.date),
            }),
        )
    }

    /// Create an income transaction. Alias of [`Client::add_transaction`];
    /// income vs expense follows from the category.
    pub fn income(&self, params: &TransactionParams) -> Result<NewTransaction> {
        self.add_transaction(params)
    }

    /// Create an expense transaction. Alias of [`Client::add_transaction`].
    pub fn expense(&self, params: &TransactionParams) -> Result<NewTransaction> {
        self.add_transaction(params)
    }
}

/// Day-granular wire format for transaction dates.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD_NO_PAD;
    use base64::Engine;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Mock server plus the runtime that keeps it serving. The blocking
    /// client under test runs on the test thread itself.
    struct MockApi {
        server: MockServer,
        rt: tokio::runtime::Runtime,
    }

    impl MockApi {
        fn start() -> Self {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let server = rt.block_on(MockServer::start());
            Self { server, rt }
        }

        fn mount(&self, mock: Mock) {
            self.rt.block_on(mock.mount(&self.server));
        }

        fn endpoints(&self) -> Endpoints {
            Endpoints {
                api: self.server.uri(),
                oauth: format!("{}/token", self.server.uri()),
            }
        }

        fn client(&self, token: &str) -> Client {
            Client::with_endpoints(token, &self.endpoints())
        }
    }

    fn json_response(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body.to_string())
    }

    fn unexpired_token() -> String {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            + 3600;
        format!("hdr.{}.sig", STANDARD_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#)))
    }

    fn expired_token() -> String {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            - 3600;
        format!("hdr.{}.sig", STANDARD_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#)))
    }

    #[test]
    fn client_query_param_extraction() {
        assert_eq!(
            client_query_param("https://ml.example/login?foo=1&client=cli"),
            Some("cli".to_string())
        );
        assert_eq!(client_query_param("https://ml.example/login"), None);
        assert_eq!(client_query_param("https://ml.example/login?client="), None);
        assert_eq!(client_query_param("::not a url::"), None);
    }

    #[test]
    fn login_handshake_round_trips() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/login-url"))
                .respond_with(json_response(
                    r#"{"data":{"request_token":"req","login_url":"https://ml.example/login?client=cli"}}"#,
                )),
        );
        api.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .and(header("Authorization", "Bearer req"))
                .and(header("Client", "cli"))
                .and(body_string("email=user%40example.com&password=pass"))
                .respond_with(json_response(r#"{"access_token":"tok"}"#)),
        );

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::at(tmp.path().join("tokens.json"));
        let client =
            Client::login_with(&api.endpoints(), &store, "user@example.com", "pass").unwrap();

        assert_eq!(client.token(), "tok");
        assert_eq!(store.load_default().unwrap(), "tok");
    }

    #[test]
    fn login_url_without_client_parameter_is_a_protocol_error() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/login-url"))
                .respond_with(json_response(
                    r#"{"data":{"request_token":"req","login_url":"https://ml.example/login"}}"#,
                )),
        );

        let err = fetch_token(&api.endpoints(), "user@example.com", "pass").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn empty_access_token_is_an_auth_error() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/login-url"))
                .respond_with(json_response(
                    r#"{"data":{"request_token":"req","login_url":"https://ml.example/login?client=cli"}}"#,
                )),
        );
        api.mount(
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(json_response(r#"{"access_token":""}"#)),
        );

        let err = fetch_token(&api.endpoints(), "user@example.com", "pass").unwrap_err();
        assert!(matches!(err, Error::MissingAccessToken));
    }

    #[test]
    fn resource_calls_sign_with_the_authjwt_scheme() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/info"))
                .and(header("Authorization", "AuthJWT tok"))
                .respond_with(json_response(
                    r#"{"error":0,"data":{"_id":"uid","email":"user@example.com"}}"#,
                )),
        );

        let info = api.client("tok").get_user_info().unwrap();
        assert_eq!(info.id, "uid");
        assert_eq!(info.email, "user@example.com");
    }

    #[test]
    fn get_wallets_decodes_the_list_payload() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/wallet/list"))
                .and(header("Authorization", "AuthJWT tok"))
                .respond_with(json_response(
                    r#"{"error":0,"data":[{"_id":"w1","name":"Cash"},{"_id":"w2","name":"Bank"}]}"#,
                )),
        );

        let wallets = api.client("tok").get_wallets().unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].id, "w1");
        assert_eq!(wallets[1].name, "Bank");
    }

    #[test]
    fn get_categories_sends_the_wallet_form() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/category/list"))
                .and(header("Content-Type", "application/x-www-form-urlencoded"))
                .and(body_string("walletId=w1"))
                .respond_with(json_response(
                    r#"{"error":0,"data":[{"_id":"c1","name":"Salary","type":1}]}"#,
                )),
        );

        let categories = api.client("tok").get_categories("w1").unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "c1");
        assert_eq!(categories[0].kind, crate::model::CATEGORY_TYPE_INCOME);
    }

    #[test]
    fn get_transactions_sends_the_date_window() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/transaction/list"))
                .and(body_partial_json(json!({
                    "walletId": "w1",
                    "startDate": "2020-01-01",
                    "endDate": "2020-01-02",
                })))
                .respond_with(json_response(
                    r#"{"error":0,"data":{
                        "daterange":{"startDate":"2020-01-01","endDate":"2020-01-02"},
                        "transactions":[{"_id":"tx1","amount":100.0}]}}"#,
                )),
        );

        let page = api
            .client("tok")
            .get_transactions(
                "w1",
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            )
            .unwrap();
        assert_eq!(page.daterange.start_date, "2020-01-01");
        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.transactions[0].id, "tx1");
    }

    #[test]
    fn add_transaction_serializes_the_day_only() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/transaction/add"))
                .and(body_partial_json(json!({
                    "with": [],
                    "account": "w1",
                    "category": "c1",
                    "amount": "100",
                    "note": "",
                    "displayDate": "2020-01-01",
                })))
                .respond_with(json_response(
                    r#"{"error":0,"data":{"_id":"tx1","account":"w1","category":"c1","amount":100,"displayDate":"2020-01-01"}}"#,
                )),
        );

        let created = api
            .client("tok")
            .add_transaction(&TransactionParams {
                wallet_id: "w1".into(),
                category_id: "c1".into(),
                amount: "100".into(),
                note: None,
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            })
            .unwrap();
        assert_eq!(created.id, "tx1");
        assert_eq!(created.display_date, "2020-01-01");
    }

    #[test]
    fn expense_aliases_add_transaction() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/transaction/add"))
                .and(body_partial_json(json!({"note": "coffee"})))
                .respond_with(json_response(r#"{"error":0,"data":{"_id":"tx2"}}"#)),
        );

        let created = api
            .client("tok")
            .expense(&TransactionParams {
                wallet_id: "w1".into(),
                category_id: "c2".into(),
                amount: "3.50".into(),
                note: Some("coffee".into()),
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            })
            .unwrap();
        assert_eq!(created.id, "tx2");
    }

    #[test]
    fn error_envelope_surfaces_code_and_message() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/wallet/list"))
                .respond_with(json_response(r#"{"error":1,"msg":"bad"}"#)),
        );

        let err = api.client("tok").get_wallets().unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 1);
                assert_eq!(message, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resume_returns_a_client_for_a_healthy_session() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/info"))
                .respond_with(json_response(r#"{"error":0,"data":{"_id":"uid"}}"#)),
        );

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::at(tmp.path().join("tokens.json"));
        let token = unexpired_token();
        store.save("a@example.com", &token).unwrap();

        let client = Client::resume_with(&api.endpoints(), &store, "a@example.com").unwrap();
        assert_eq!(client.token(), token);
    }

    #[test]
    fn resume_rejects_an_expired_token_without_calling_out() {
        let api = MockApi::start();

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::at(tmp.path().join("tokens.json"));
        store.save("a@example.com", &expired_token()).unwrap();

        assert!(Client::resume_with(&api.endpoints(), &store, "a@example.com").is_none());
        let requests = api.rt.block_on(api.server.received_requests()).unwrap();
        assert!(requests.is_empty());
    }

    #[test]
    fn resume_rejects_a_session_the_service_refuses() {
        let api = MockApi::start();
        api.mount(
            Mock::given(method("POST"))
                .and(path("/user/info"))
                .respond_with(json_response(r#"{"error":401,"msg":"unauthorized"}"#)),
        );

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::at(tmp.path().join("tokens.json"));
        store.save("a@example.com", &unexpired_token()).unwrap();

        assert!(Client::resume_with(&api.endpoints(), &store, "a@example.com").is_none());
    }

    #[test]
    fn resume_without_a_stored_token_yields_none() {
        let api = MockApi::start();

        let tmp = TempDir::new().unwrap();
        let store = TokenStore::at(tmp.path().join("tokens.json"));

        assert!(Client::resume_with(&api.endpoints(), &store, "nobody").is_none());
    }
}
