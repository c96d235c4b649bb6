use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront::StorefrontError;
use storefront::config::fetch_config;
use storefront::models::UserProfile;
use storefront::reconcile::Reconciler;
use storefront::refresh::{RefreshPhase, RefreshScheduler};
use storefront::rest::RestClient;
use storefront::session::{self, SessionContext, populate_env_from_keychain};

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match parse_command(std::env::args().skip(1))? {
        Command::Login { token, user_id } => {
            session::sign_in(&token, &UserProfile::with_id(user_id))
        }
        Command::Logout => session::sign_out(),
        Command::Watch => watch().await,
    }
}

const USAGE: &str = "usage: storefront [login <token> <user-id> | logout]";

/// What the binary was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Keep the payment history refreshed until Ctrl-C.
    Watch,
    Login { token: String, user_id: i64 },
    Logout,
}

fn parse_command(args: impl IntoIterator<Item = String>) -> Result<Command, StorefrontError> {
    let args: Vec<String> = args.into_iter().collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => Ok(Command::Watch),
        ["logout"] => Ok(Command::Logout),
        ["login", token, user_id] => {
            let user_id = user_id.parse().map_err(|_| {
                StorefrontError::Config(format!("user id must be an integer, got {user_id:?}"))
            })?;
            Ok(Command::Login {
                token: (*token).to_string(),
                user_id,
            })
        }
        _ => Err(StorefrontError::Config(USAGE.to_string())),
    }
}

async fn watch() -> Result<(), StorefrontError> {
    populate_env_from_keychain();
    let app_config = fetch_config()?;

    let session = SessionContext::from_config(&app_config.session);
    let user_id = session.require_user_id()?;
    let client = RestClient::from_config(&app_config, session)?;

    let handle =
        RefreshScheduler::new(Reconciler::new(client), user_id, app_config.refresh_interval)
            .start();
    let mut snapshots = handle.subscribe();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                match snapshot.phase {
                    RefreshPhase::Ready => {
                        let source = snapshot
                            .provenance
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        info!(count = snapshot.payments.len(), %source, "Payment history");
                        for p in &snapshot.payments {
                            info!(
                                payment_id = p.id,
                                order_id = p.order_id,
                                amount = %p.amount,
                                status = ?p.status,
                                date = %p.payment_date,
                                "Payment"
                            );
                        }
                    }
                    RefreshPhase::Failed => {
                        error!(
                            error = snapshot.error.as_deref().unwrap_or_default(),
                            stale_count = snapshot.payments.len(),
                            "Payment history unavailable"
                        );
                    }
                    RefreshPhase::Idle | RefreshPhase::Loading => {}
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
