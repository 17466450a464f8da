// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime wiring shared by every subcommand, plus `vetdesk login` / `logout`.

use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::debug;
use vetdesk_client::{ApiClient, FileTokenStore, LoginRedirect};
use vetdesk_clinic::{ClinicQueries, ErrorBoundary};
use vetdesk_config::VetdeskConfig;
use vetdesk_core::{TokenStore, VetdeskError};
use vetdesk_query::{QueryClient, QueryHandle, QueryOptions};

use crate::error::CliError;

/// One process's view of the clinic: config, client, cache.
pub struct Session {
    pub config: VetdeskConfig,
    pub client: ApiClient,
    pub queries: ClinicQueries,
    navigator: Arc<LoginRedirect>,
}

impl Session {
    pub fn open(config: VetdeskConfig) -> Result<Self, VetdeskError> {
        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(&config.auth.credentials_path));
        let navigator = Arc::new(LoginRedirect::new());
        let client = ApiClient::from_config(&config.api, tokens, navigator.clone())?;
        let cache = QueryClient::new(QueryOptions::from_config(&config.cache));
        debug!(
            base_url = client.base_url(),
            credentials = %config.auth.credentials_path,
            "session opened"
        );

        Ok(Self {
            queries: ClinicQueries::new(client.clone(), cache),
            client,
            config,
            navigator,
        })
    }

    /// Set when a refresh failed and the client asked for a fresh login.
    pub fn login_redirect(&self) -> Option<String> {
        self.navigator.take_redirect()
    }
}

/// Loads one view's data behind `boundary`, turning a failed load into
/// [`CliError::View`].
pub async fn load_view<T>(boundary: &ErrorBoundary, handle: &mut QueryHandle<T>) -> Result<T, CliError>
where
    T: Clone + Send + Sync + 'static,
{
    let loaded = match handle.load().await {
        Ok(data) => Some(data.clone()),
        Err(e) => {
            boundary.capture(e);
            None
        }
    };
    match (loaded, boundary.failure()) {
        (Some(data), _) => Ok(data),
        (None, Some(failure)) => Err(CliError::View(failure)),
        (None, None) => Err(CliError::Usage(format!("{} view failed", boundary.name()))),
    }
}

/// Run the `vetdesk login` command.
pub async fn run_login(session: &Session, email: Option<String>) -> Result<(), CliError> {
    let email = match email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    if email.is_empty() {
        return Err(CliError::Usage("an email address is required".to_string()));
    }
    let password = rpassword::prompt_password("Password: ")?;

    session.client.login(&email, &password).await?;
    println!("Logged in as {email}.");
    Ok(())
}

/// Run the `vetdesk logout` command.
pub fn run_logout(session: &Session) -> Result<(), CliError> {
    session.client.logout()?;
    println!("Logged out.");
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String, std::io::Error> {
    let mut stdout = std::io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
