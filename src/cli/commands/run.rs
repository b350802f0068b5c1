//! Run command: login, portfolio report, moving averages, price polling.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::Duration;
use trading_auth::{load_backup_code, Credentials, SessionManager};
use trading_broker::{RobinhoodBroker, RobinhoodConfig};
use trading_config::{AppConfig, BrokerSettings, CredentialsSettings, CredentialsSource};
use trading_core::traits::{Broker, HistorySource};
use trading_core::types::Session;
use trading_data::{YahooConfig, YahooDataSource};
use trading_indicators::MovingAverageCalculator;
use trading_monitor::{report_profile, Clock, MarketHours, QuotePoller, SystemClock};
use tracing::{error, info, warn};

pub async fn run(config: &AppConfig) -> Result<()> {
    let credentials = load_credentials(&config.credentials)?;

    let broker = RobinhoodBroker::new(broker_config(&config.broker))
        .context("Failed to create broker client")?;
    let manager = SessionManager::new(&broker)
        .with_backup_code(load_backup_code(&config.broker.backup_code_env));

    let session = manager.login(&credentials).await.context("Login failed")?;
    drop(credentials);

    let session = session.map(|(session, path)| {
        info!("Session opened via {:?}", path);
        session
    });

    let history = YahooDataSource::new(YahooConfig {
        base_url: config.history.base_url.clone(),
        user_agent: config.history.user_agent.clone(),
    })
    .context("Failed to create market data client")?;

    watch_and_close(
        config,
        &manager,
        &history,
        session.as_ref(),
        &SystemClock,
        &mut io::stdout(),
    )
    .await
}

/// Report, poll, then log out when configured, whatever the outcome.
///
/// A logout failure is returned only when everything before it succeeded.
async fn watch_and_close<B, H, C, W>(
    config: &AppConfig,
    manager: &SessionManager<'_, B>,
    history: &H,
    session: Option<&Session>,
    clock: &C,
    out: &mut W,
) -> Result<()>
where
    B: Broker + ?Sized,
    H: HistorySource + ?Sized,
    C: Clock + ?Sized,
    W: Write,
{
    let outcome = watch(config, manager.broker(), history, session, clock, out).await;

    let Some(session) = session.filter(|_| config.broker.logout_on_exit) else {
        return outcome;
    };

    let logout = manager.logout(session).await.context("Logout failed");
    match (outcome, logout) {
        (Err(e), Err(logout_err)) => {
            error!("{:#}", logout_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), logout) => logout,
    }
}

async fn watch<B, H, C, W>(
    config: &AppConfig,
    broker: &B,
    history: &H,
    session: Option<&Session>,
    clock: &C,
    out: &mut W,
) -> Result<()>
where
    B: Broker + ?Sized,
    H: HistorySource + ?Sized,
    C: Clock + ?Sized,
    W: Write,
{
    match session {
        Some(session) => report_profile(broker, session, &mut *out).await?,
        None => warn!("No session, skipping portfolio report"),
    }

    let watchlist = config.watchlist.watchlist();
    writeln!(out, "Stocks: {}", watchlist)?;

    let averages = MovingAverageCalculator::new(history)
        .with_lookback(config.history.lookback)
        .calculate(&watchlist)
        .await
        .context("Failed to calculate moving averages")?;
    writeln!(out, "Moving Averages: {}", averages)?;

    let Some(session) = session else {
        warn!("No session, skipping price polling");
        return Ok(());
    };

    let hours = MarketHours::new(config.market.open, config.market.close);
    let polls = QuotePoller::new(broker, session, &watchlist, clock, hours)
        .with_interval(Duration::from_secs(config.market.poll_interval_secs))
        .run(&mut *out)
        .await
        .context("Price polling failed")?;
    info!("Market closed after {} polls", polls);

    Ok(())
}

fn load_credentials(settings: &CredentialsSettings) -> Result<Credentials> {
    let credentials = match settings.source {
        CredentialsSource::File => Credentials::from_file(&settings.path)?,
        CredentialsSource::Env => Credentials::from_env(
            &settings.username_env,
            &settings.password_env,
            &settings.totp_secret_env,
        )?,
    };
    Ok(credentials)
}

fn broker_config(settings: &BrokerSettings) -> RobinhoodConfig {
    let mut config = RobinhoodConfig {
        base_url: settings.base_url.clone(),
        scope: settings.scope.clone(),
        expires_in: settings.expires_in,
        token_path: Some(settings.token_path.clone()),
        ..RobinhoodConfig::default()
    };
    if let Some(client_id) = &settings.client_id {
        config.client_id = client_id.clone();
    }
    if let Some(device_token) = &settings.device_token {
        config.device_token = device_token.clone();
    }
    config
}
