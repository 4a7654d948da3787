// src/services/wait_for_db.rs
// DOCUMENTATION: Block until the database accepts connections
// PURPOSE: Used by `manage wait-for-db` before migrations and server start
// in containers, where the app can start before PostgreSQL is ready

use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Name of the only database the service uses
pub const DEFAULT_DATABASE: &str = "default";

fn unavailable_message(interval: Duration) -> String {
    match interval.as_secs() {
        1 => "Database unavailable, waiting 1 second...".to_string(),
        secs => format!("Database unavailable, waiting {} seconds...", secs),
    }
}

/// Retry `check` until it succeeds, sleeping `interval` after each failure
/// DOCUMENTATION: Every error counts as "not ready yet". Returns the number
/// of attempts made.
pub async fn wait_for_db<F, Fut, E>(mut check: F, interval: Duration) -> u32
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    log::info!("Waiting for database...");
    let mut attempts = 0;

    loop {
        attempts += 1;
        match check(DEFAULT_DATABASE).await {
            Ok(()) => break,
            Err(e) => {
                log::debug!("Database check failed: {}", e);
                log::info!("{}", unavailable_message(interval));
                tokio::time::sleep(interval).await;
            }
        }
    }

    log::info!("Database available!");
    attempts
}

/// Open a single connection and run `SELECT 1`
pub async fn check_database(database_url: &str) -> Result<(), sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url)?.disable_statement_logging();
    let mut conn = options.connect().await?;
    sqlx::query("SELECT 1").execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_wait_for_db_ready() {
        let databases = Arc::new(Mutex::new(Vec::new()));
        let seen = databases.clone();

        let attempts = wait_for_db(
            move |db| {
                seen.lock().unwrap().push(db);
                async { Ok::<(), String>(()) }
            },
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(attempts, 1);
        assert_eq!(*databases.lock().unwrap(), vec![DEFAULT_DATABASE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_db_delay() {
        // Two connection refusals, three operational errors, then ready
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let attempts = wait_for_db(
            move |db| {
                assert_eq!(db, DEFAULT_DATABASE);
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    match n {
                        0 | 1 => Err("connection refused".to_string()),
                        2..=4 => Err("database system is starting up".to_string()),
                        _ => Ok(()),
                    }
                }
            },
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(attempts, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unavailable_message() {
        assert_eq!(
            unavailable_message(Duration::from_secs(1)),
            "Database unavailable, waiting 1 second..."
        );
        assert_eq!(
            unavailable_message(Duration::from_secs(5)),
            "Database unavailable, waiting 5 seconds..."
        );
    }

    #[tokio::test]
    async fn test_check_database_rejects_bad_url() {
        assert!(check_database("not a url").await.is_err());
    }
}
