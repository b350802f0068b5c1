//! Robinhood broker integration.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use trading_core::error::BrokerError;
use trading_core::traits::Broker;
use trading_core::types::{
    AccountProfile, Holding, HoldingsReport, LatestPrice, LoginRequest, Session,
};
use uuid::Uuid;

use crate::token_store::TokenStore;

/// Public OAuth client id of the Robinhood web/mobile apps.
pub const DEFAULT_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// Robinhood API configuration.
#[derive(Debug, Clone)]
pub struct RobinhoodConfig {
    pub base_url: String,
    pub client_id: String,
    pub scope: String,
    /// Requested token lifetime in seconds
    pub expires_in: u64,
    pub device_token: String,
    /// Where persisted sessions are kept; `None` disables persistence
    pub token_path: Option<PathBuf>,
}

impl Default for RobinhoodConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.robinhood.com".to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: "internal".to_string(),
            expires_in: 86_400,
            device_token: Uuid::new_v4().to_string(),
            token_path: None,
        }
    }
}

impl RobinhoodConfig {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Robinhood API request/response types
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    expires_in: u64,
    grant_type: &'a str,
    username: &'a str,
    password: &'a str,
    scope: &'a str,
    challenge_type: &'a str,
    device_token: &'a str,
    mfa_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    client_id: &'a str,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    mfa_required: bool,
    challenge: Option<serde_json::Value>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    next: Option<String>,
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RhAccount {
    account_number: String,
    buying_power: Option<String>,
    cash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RhPortfolio {
    equity: Option<String>,
    extended_hours_equity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RhPosition {
    instrument: String,
    quantity: String,
    average_buy_price: String,
}

#[derive(Debug, Deserialize)]
struct RhInstrument {
    symbol: String,
    name: String,
    simple_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RhQuote {
    symbol: String,
    last_trade_price: Option<String>,
    last_extended_hours_trade_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RhQuotesResponse {
    results: Vec<Option<RhQuote>>,
}

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|v| v.parse().ok())
}

/// Build a session from the token endpoint's reply.
fn session_from_token_response(status: StatusCode, body: &str) -> Result<Session, BrokerError> {
    let data: TokenResponse = serde_json::from_str(body).map_err(|_| {
        BrokerError::AuthenticationError(format!("{}: {}", status, body))
    })?;

    if let Some(access_token) = data.access_token {
        let mut session = Session::new(data.token_type.unwrap_or_else(|| "Bearer".into()), access_token);
        if let Some(refresh) = data.refresh_token {
            session = session.with_refresh_token(refresh);
        }
        return Ok(session);
    }

    if data.mfa_required {
        return Err(BrokerError::ChallengeRequired("MFA code required or rejected".into()));
    }
    if let Some(challenge) = data.challenge {
        return Err(BrokerError::ChallengeRequired(challenge.to_string()));
    }

    Err(BrokerError::AuthenticationError(
        data.detail.unwrap_or_else(|| format!("{}: no access token in response", status)),
    ))
}

/// Pick the price to report for a quote.
///
/// The extended-hours trade price wins when the broker supplies one.
fn quote_price(quote: &RhQuote) -> Option<Decimal> {
    parse_decimal(quote.last_extended_hours_trade_price.as_deref())
        .or_else(|| parse_decimal(quote.last_trade_price.as_deref()))
}

fn portfolio_equity(portfolio: &RhPortfolio) -> Option<Decimal> {
    parse_decimal(portfolio.extended_hours_equity.as_deref())
        .or_else(|| parse_decimal(portfolio.equity.as_deref()))
}

/// Join positions with their instruments and prices.
fn assemble_holdings(
    positions: Vec<(RhPosition, RhInstrument)>,
    prices: &HashMap<String, Decimal>,
    total_equity: Option<Decimal>,
) -> HoldingsReport {
    let holdings = positions
        .into_iter()
        .map(|(position, instrument)| {
            let quantity = parse_decimal(Some(position.quantity.as_str())).unwrap_or(dec!(0));
            let average = parse_decimal(Some(position.average_buy_price.as_str())).unwrap_or(dec!(0));
            let price = prices.get(&instrument.symbol).copied().unwrap_or(dec!(0));
            let name = instrument
                .simple_name
                .filter(|n| !n.is_empty())
                .unwrap_or(instrument.name);
            Holding::new(instrument.symbol, name, quantity, average, price, total_equity)
        })
        .collect();

    HoldingsReport::new(holdings)
}

/// Robinhood broker client.
pub struct RobinhoodBroker {
    config: RobinhoodConfig,
    client: Client,
    token_store: Option<TokenStore>,
}

impl RobinhoodBroker {
    /// Create a new Robinhood broker client.
    pub fn new(config: RobinhoodConfig) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
        headers.insert(
            "x-robinhood-api-version",
            header::HeaderValue::from_static("1.431.4"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        let token_store = config.token_path.clone().map(TokenStore::new);

        Ok(Self {
            config,
            client,
            token_store,
        })
    }

    /// GET a JSON document with the session's authorization.
    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BrokerError> {
        let resp = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, session.authorization())
            .query(query)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(BrokerError::NotLoggedIn);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BrokerError::ApiError(format!("{}: {}", status, text)));
        }

        resp.json().await.map_err(|e| BrokerError::ApiError(e.to_string()))
    }

    /// GET every page of a paginated listing.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        session: &Session,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, BrokerError> {
        let mut page: Page<T> = self.get_json(session, url, query).await?;
        let mut results = std::mem::take(&mut page.results);

        while let Some(next) = page.next.take() {
            page = self.get_json(session, &next, &[]).await?;
            results.append(&mut page.results);
        }

        Ok(results)
    }

    async fn get_quotes(
        &self,
        session: &Session,
        symbols: &[String],
    ) -> Result<HashMap<String, Decimal>, BrokerError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.config.url("quotes/");
        let joined = symbols.join(",");
        let data: RhQuotesResponse = self
            .get_json(session, &url, &[("symbols", joined.as_str())])
            .await?;

        Ok(data
            .results
            .into_iter()
            .flatten()
            .filter_map(|q| quote_price(&q).map(|price| (q.symbol, price)))
            .collect())
    }

    /// Try the stored session, dropping it if the broker rejects it.
    async fn restore_session(&self) -> Option<Session> {
        let store = self.token_store.as_ref()?;
        let session = store.load()?;

        let url = self.config.url("accounts/");
        match self.get_json::<Page<RhAccount>>(&session, &url, &[]).await {
            Ok(_) => {
                info!("Reusing stored session from {}", store.path().display());
                Some(session)
            }
            Err(e) => {
                warn!("Stored session rejected ({}), logging in again", e);
                if let Err(e) = store.clear() {
                    warn!("Could not remove stale session: {}", e);
                }
                None
            }
        }
    }
}

#[async_trait]
impl Broker for RobinhoodBroker {
    async fn login(&self, request: &LoginRequest) -> Result<Session, BrokerError> {
        if request.persist_session {
            if let Some(session) = self.restore_session().await {
                return Ok(session);
            }
        }

        let url = self.config.url("oauth2/token/");
        let payload = TokenRequest {
            client_id: &self.config.client_id,
            expires_in: self.config.expires_in,
            grant_type: "password",
            username: &request.username,
            password: &request.password,
            scope: &self.config.scope,
            challenge_type: request.challenge.as_str(),
            device_token: &self.config.device_token,
            mfa_code: &request.mfa_code,
        };

        debug!(
            "Requesting token for {} (challenge: {}, persist: {})",
            request.username,
            request.challenge.as_str(),
            request.persist_session
        );

        let resp = self
            .client
            .post(&url)
            .form(&payload)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let session = session_from_token_response(status, &text)?;

        if request.persist_session {
            if let Some(store) = &self.token_store {
                store.save(&session)?;
                return Ok(session.persisted(true));
            }
            warn!("Session persistence requested but no token path configured");
        }

        Ok(session)
    }

    async fn logout(&self, session: &Session) -> Result<(), BrokerError> {
        let url = self.config.url("oauth2/revoke_token/");
        let payload = RevokeRequest {
            client_id: &self.config.client_id,
            token: session.access_token(),
        };

        let resp = self
            .client
            .post(&url)
            .form(&payload)
            .send()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        if let Some(store) = &self.token_store {
            store.clear()?;
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BrokerError::ApiError(format!("{}: {}", status, text)));
        }

        Ok(())
    }

    async fn get_account(&self, session: &Session) -> Result<AccountProfile, BrokerError> {
        let url = self.config.url("accounts/");
        let page: Page<RhAccount> = self.get_json(session, &url, &[]).await?;
        let account = page
            .results
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::ApiError("No account on this login".into()))?;

        Ok(AccountProfile {
            account_number: account.account_number,
            buying_power: parse_decimal(account.buying_power.as_deref()),
            cash: parse_decimal(account.cash.as_deref()),
        })
    }

    async fn get_holdings(&self, session: &Session) -> Result<HoldingsReport, BrokerError> {
        let url = self.config.url("positions/");
        let positions: Vec<RhPosition> = self
            .get_all_pages(session, &url, &[("nonzero", "true")])
            .await?;

        let mut joined = Vec::with_capacity(positions.len());
        for position in positions {
            let instrument: RhInstrument = self.get_json(session, &position.instrument, &[]).await?;
            joined.push((position, instrument));
        }

        let symbols: Vec<String> = joined.iter().map(|(_, i)| i.symbol.clone()).collect();
        let prices = self.get_quotes(session, &symbols).await?;

        let url = self.config.url("portfolios/");
        let portfolios: Page<RhPortfolio> = self.get_json(session, &url, &[]).await?;
        let total_equity = portfolios.results.first().and_then(portfolio_equity);

        Ok(assemble_holdings(joined, &prices, total_equity))
    }

    async fn get_latest_prices(
        &self,
        session: &Session,
        symbols: &[String],
    ) -> Result<Vec<LatestPrice>, BrokerError> {
        let prices = self.get_quotes(session, symbols).await?;

        Ok(symbols
            .iter()
            .filter_map(|symbol| match prices.get(symbol) {
                Some(&price) => Some(LatestPrice {
                    symbol: symbol.clone(),
                    price,
                }),
                None => {
                    warn!("No quote returned for {}", symbol);
                    None
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Robinhood"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_token_response() {
        let body = r#"{"access_token":"abc","token_type":"Bearer","refresh_token":"def",
            "expires_in":86400,"scope":"internal"}"#;
        let session = session_from_token_response(StatusCode::OK, body).unwrap();
        assert_eq!(session.authorization(), "Bearer abc");
    }

    #[test]
    fn test_token_response_without_token() {
        let mfa = r#"{"mfa_required":true,"mfa_type":"app"}"#;
        assert!(matches!(
            session_from_token_response(StatusCode::OK, mfa),
            Err(BrokerError::ChallengeRequired(_))
        ));

        let denied = r#"{"detail":"Unable to log in with provided credentials."}"#;
        match session_from_token_response(StatusCode::BAD_REQUEST, denied) {
            Err(BrokerError::AuthenticationError(msg)) => {
                assert_eq!(msg, "Unable to log in with provided credentials.")
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert!(matches!(
            session_from_token_response(StatusCode::BAD_GATEWAY, "<html>"),
            Err(BrokerError::AuthenticationError(_))
        ));
    }

    #[test]
    fn test_quote_price_prefers_extended_hours() {
        let quote: RhQuote = serde_json::from_str(
            r#"{"symbol":"VTI","last_trade_price":"250.100000",
                "last_extended_hours_trade_price":"250.450000"}"#,
        )
        .unwrap();
        assert_eq!(quote_price(&quote), Some(dec!(250.45)));

        let regular: RhQuote = serde_json::from_str(
            r#"{"symbol":"QQQ","last_trade_price":"400.000000",
                "last_extended_hours_trade_price":null}"#,
        )
        .unwrap();
        assert_eq!(quote_price(&regular), Some(dec!(400)));
    }

    #[test]
    fn test_quotes_response_with_unknown_symbol() {
        let data: RhQuotesResponse = serde_json::from_str(
            r#"{"results":[{"symbol":"VTI","last_trade_price":"1.00",
                "last_extended_hours_trade_price":null}, null]}"#,
        )
        .unwrap();
        assert_eq!(data.results.len(), 2);
        assert!(data.results[1].is_none());
    }

    #[test]
    fn test_assemble_holdings() {
        let position: RhPosition = serde_json::from_str(
            r#"{"instrument":"https://api.robinhood.com/instruments/1/",
                "quantity":"4.00000000","average_buy_price":"200.0000"}"#,
        )
        .unwrap();
        let instrument: RhInstrument = serde_json::from_str(
            r#"{"symbol":"VTI","name":"Vanguard Total Stock Market ETF","simple_name":"Vanguard Total Market"}"#,
        )
        .unwrap();

        let mut prices = HashMap::new();
        prices.insert("VTI".to_string(), dec!(250));

        let report = assemble_holdings(vec![(position, instrument)], &prices, Some(dec!(2000)));
        let vti = report.get("VTI").unwrap();

        assert_eq!(vti.name, "Vanguard Total Market");
        assert_eq!(vti.equity, dec!(1000));
        assert_eq!(vti.equity_change, dec!(200));
        assert_eq!(vti.percent_change, dec!(25));
        assert_eq!(vti.percentage, Some(dec!(50)));
    }

    #[test]
    fn test_portfolio_equity_prefers_extended_hours() {
        let portfolio: RhPortfolio =
            serde_json::from_str(r#"{"equity":"100.00","extended_hours_equity":"101.50"}"#).unwrap();
        assert_eq!(portfolio_equity(&portfolio), Some(dec!(101.50)));
    }

    #[test]
    fn test_config_url() {
        let config = RobinhoodConfig {
            base_url: "https://api.robinhood.com/".into(),
            ..RobinhoodConfig::default()
        };
        assert_eq!(config.url("oauth2/token/"), "https://api.robinhood.com/oauth2/token/");
        assert_eq!(config.scope, "internal");
        assert_eq!(config.expires_in, 86_400);
    }

    mod http {
        use super::*;
        use crate::testing::{FakeApi, Recorded};
        use tempfile::TempDir;
        use trading_core::types::MfaChallenge;
        use zeroize::Zeroizing;

        const ACCOUNTS: &str = r#"{"next":null,"results":[{"account_number":"5RH00001",
            "buying_power":"1250.50","cash":"1000.00"}]}"#;

        fn routes(request: &Recorded) -> (u16, String) {
            match (request.method.as_str(), request.path.as_str()) {
                ("POST", "/oauth2/token/") => (
                    200,
                    r#"{"access_token":"fresh","token_type":"Bearer","refresh_token":"r1"}"#.into(),
                ),
                ("POST", "/oauth2/revoke_token/") => (200, "{}".into()),
                ("GET", "/accounts/")
                    if request.authorization.as_deref() == Some("Bearer stored") =>
                {
                    (200, ACCOUNTS.into())
                }
                ("GET", "/accounts/") => (401, r#"{"detail":"Invalid token."}"#.into()),
                _ => (404, r#"{"detail":"Not found."}"#.into()),
            }
        }

        fn broker(api: &FakeApi, dir: &TempDir) -> RobinhoodBroker {
            RobinhoodBroker::new(RobinhoodConfig {
                base_url: api.base_url().to_string(),
                device_token: "device-1".into(),
                token_path: Some(dir.path().join("session.json")),
                ..RobinhoodConfig::default()
            })
            .unwrap()
        }

        fn store(dir: &TempDir) -> TokenStore {
            TokenStore::new(dir.path().join("session.json"))
        }

        fn login_request(challenge: MfaChallenge, mfa_code: &str, persist: bool) -> LoginRequest {
            LoginRequest {
                username: "alice".into(),
                password: Zeroizing::new("hunter2".into()),
                mfa_code: Zeroizing::new(mfa_code.into()),
                challenge,
                persist_session: persist,
            }
        }

        #[tokio::test]
        async fn test_stored_session_reused_without_token_request() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            store(&dir).save(&Session::new("Bearer", "stored")).unwrap();

            let session = broker(&api, &dir)
                .login(&login_request(MfaChallenge::Sms, "111111", true))
                .await
                .unwrap();

            assert_eq!(session.authorization(), "Bearer stored");
            assert!(session.is_persisted());
            assert_eq!(api.count("GET", "/accounts/"), 1);
            assert_eq!(api.count("POST", "/oauth2/token/"), 0);
        }

        #[tokio::test]
        async fn test_rejected_stored_session_is_replaced() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            store(&dir).save(&Session::new("Bearer", "expired")).unwrap();

            let session = broker(&api, &dir)
                .login(&login_request(MfaChallenge::Sms, "111111", true))
                .await
                .unwrap();

            assert_eq!(session.authorization(), "Bearer fresh");
            assert!(session.is_persisted());
            assert_eq!(api.count("GET", "/accounts/"), 1);
            assert_eq!(api.count("POST", "/oauth2/token/"), 1);

            let saved = store(&dir).load().unwrap();
            assert_eq!(saved.authorization(), "Bearer fresh");
        }

        #[tokio::test]
        async fn test_unpersisted_login_writes_nothing() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();

            let session = broker(&api, &dir)
                .login(&login_request(MfaChallenge::Email, "222222", false))
                .await
                .unwrap();

            assert_eq!(session.authorization(), "Bearer fresh");
            assert!(!session.is_persisted());
            assert!(!dir.path().join("session.json").exists());
            assert_eq!(api.count("GET", "/accounts/"), 0);
        }

        #[tokio::test]
        async fn test_unpersisted_login_ignores_stored_session() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            store(&dir).save(&Session::new("Bearer", "stored")).unwrap();

            let session = broker(&api, &dir)
                .login(&login_request(MfaChallenge::Email, "222222", false))
                .await
                .unwrap();

            assert_eq!(session.authorization(), "Bearer fresh");
            assert_eq!(api.count("GET", "/accounts/"), 0);
            assert_eq!(store(&dir).load().unwrap().authorization(), "Bearer stored");
        }

        #[tokio::test]
        async fn test_token_form_per_challenge() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            let broker = broker(&api, &dir);

            broker
                .login(&login_request(MfaChallenge::Email, "222222", false))
                .await
                .unwrap();
            let email = api.last("POST", "/oauth2/token/").unwrap();

            broker
                .login(&login_request(MfaChallenge::Sms, "333333", false))
                .await
                .unwrap();
            let sms = api.last("POST", "/oauth2/token/").unwrap();

            for form in [&email, &sms] {
                let fields = form.form_fields();
                assert!(fields.contains(&"grant_type=password"));
                assert!(fields.contains(&"username=alice"));
                assert!(fields.contains(&"password=hunter2"));
                assert!(fields.contains(&"expires_in=86400"));
                assert!(fields.contains(&"scope=internal"));
                assert!(fields.contains(&"device_token=device-1"));
                let client_id = format!("client_id={}", DEFAULT_CLIENT_ID);
                assert!(fields.contains(&client_id.as_str()));
            }

            assert!(email.form_fields().contains(&"challenge_type=email"));
            assert!(email.form_fields().contains(&"mfa_code=222222"));
            assert!(sms.form_fields().contains(&"challenge_type=sms"));
            assert!(sms.form_fields().contains(&"mfa_code=333333"));
        }

        #[tokio::test]
        async fn test_logout_revokes_and_clears_store() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            let session = Session::new("Bearer", "stored");
            store(&dir).save(&session).unwrap();

            broker(&api, &dir).logout(&session).await.unwrap();

            let revoke = api.last("POST", "/oauth2/revoke_token/").unwrap();
            assert!(revoke.form_fields().contains(&"token=stored"));
            assert!(!dir.path().join("session.json").exists());
        }

        #[tokio::test]
        async fn test_account_with_rejected_session() {
            let api = FakeApi::start(routes).await;
            let dir = tempfile::tempdir().unwrap();
            let broker = broker(&api, &dir);

            let profile = broker
                .get_account(&Session::new("Bearer", "stored"))
                .await
                .unwrap();
            assert_eq!(profile.account_number, "5RH00001");
            assert_eq!(profile.buying_power, Some(dec!(1250.50)));

            assert!(matches!(
                broker.get_account(&Session::new("Bearer", "revoked")).await,
                Err(BrokerError::NotLoggedIn)
            ));
        }
    }
}
