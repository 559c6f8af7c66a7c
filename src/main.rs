//! # Locshare
//!
//! Headless location-sharing client. Acquires (simulated) position fixes,
//! creates or joins a sharing session, and keeps the session server updated
//! while logging the roster of other participants.
//!
//! Join an existing session by passing its id or a full share link as the
//! first argument, or via the `SESSION` environment variable.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use locshare::config::Settings;
use locshare::domain::{ResolvedLocation, SessionId};
use locshare::position::{LocationAcquirer, SimulatedPositionSource};
use locshare::shared::PositionError;
use locshare::startup::ShareClient;

/// Starting point of the simulated walk (Copenhagen).
const START_LATITUDE: f64 = 55.6761;
const START_LONGITUDE: f64 = 12.5683;

#[tokio::main]
async fn main() -> Result<()> {
    locshare::telemetry::init_tracing();

    let settings = Settings::load().context("failed to load configuration")?;
    info!(
        server = %settings.origin(),
        environment = %settings.environment,
        "Starting locshare client"
    );

    let client = ShareClient::new(settings)?;
    info!(participant = %client.identity(), "Participant identity loaded");

    // Positions flow from the acquirer task; the first one gates session
    // creation, the rest feed the sync channel.
    let (location_tx, mut locations) = mpsc::unbounded_channel::<Result<ResolvedLocation, PositionError>>();
    let error_tx = location_tx.clone();

    let source = SimulatedPositionSource::new(
        START_LATITUDE,
        START_LONGITUDE,
        std::time::Duration::from_secs(2),
    );
    let mut acquirer = LocationAcquirer::start(
        source,
        client.identity().clone(),
        move |location| {
            let _ = location_tx.send(Ok(location));
        },
        move |err| {
            let _ = error_tx.send(Err(err));
        },
    );

    let initial_location = match locations.recv().await {
        Some(Ok(location)) => location,
        Some(Err(err)) => {
            // The one user-visible failure: positioning could not be
            // established at all.
            anyhow::bail!("unable to determine location: {err}");
        }
        None => anyhow::bail!("position acquisition ended unexpectedly"),
    };
    info!(
        latitude = initial_location.latitude,
        longitude = initial_location.longitude,
        "Initial location resolved"
    );

    let share = client
        .start_sharing(requested_session(), initial_location, |roster| {
            for location in &roster {
                info!(
                    participant = %location.user_id,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "Participant location"
                );
            }
        })
        .await?;

    info!(session_id = %share.session_id, "Sharing started");
    println!("Share this link (valid 24h): {}", share.share_link);

    loop {
        tokio::select! {
            update = locations.recv() => match update {
                Some(Ok(location)) => {
                    share.channel.send_location(
                        location.latitude,
                        location.longitude,
                        location.heading,
                    );
                }
                // Watch-mode failures after the first fix are logged by the
                // acquirer itself and never reach this channel.
                Some(Err(err)) => info!(error = %err, "Position watch ended"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    acquirer.stop();
    share.channel.close();
    Ok(())
}

/// Session requested on the command line or environment, if any. Accepts a
/// bare session id or a full share link.
fn requested_session() -> Option<SessionId> {
    let raw = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SESSION").ok())?;
    Some(SessionId::from_share_link(&raw).unwrap_or_else(|| SessionId::from(raw)))
}
