//! Connector for the Bridge REST API.
//!
//! This module provides the `BridgeConnector` struct for signing in and making
//! authenticated requests, plus the participant listing helpers built on `get`.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{
    CredentialPrompt, CredentialStore, Credentials, PasswordStore, Session, TerminalPrompt,
};
use crate::config::{ConfigStore, AUTH_SECTION};
use crate::models::{ParticipantPage, ParticipantTable};

use super::request::{encode_segment, is_json, resolve_url};
use super::{BridgeError, RequestOptions, ResponseBody};

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the Bridge web services
pub const BASE_URL: &str = "https://webservices.sagebridge.org";

/// Header carrying the session token on authenticated calls
const SESSION_HEADER: HeaderName = HeaderName::from_static("bridge-session");

const SIGN_IN_PATH: &str = "/v3/auth/signIn";
const PARTICIPANTS_PATH: &str = "/v3/participants";

const DEFAULT_STUDY: &str = "parkinson";
const DEFAULT_ACCOUNT_TYPE: &str = "researcher";

/// HTTP transport bound to one base URL. Knows nothing about sessions.
#[derive(Clone)]
struct Http {
    client: Client,
    base_url: String,
}

impl Http {
    fn execute(
        &self,
        method: Method,
        uri: &str,
        headers: HeaderMap,
        options: &RequestOptions,
        with_body: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<ResponseBody, BridgeError> {
        let url = resolve_url(&self.base_url, uri);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self.client.request(method, &url).headers(headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = with_body(request).send()?;
        let status = response.status();
        debug!(status = %status, url = %url, "Response received");

        if !status.is_success() {
            let body = response.text()?;
            return Err(BridgeError::from_status(status, body));
        }

        let json = is_json(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let text = response.text()?;
        if json {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .map_err(|source| BridgeError::Decode { url, source })
        } else {
            Ok(ResponseBody::Text(text))
        }
    }

    fn sign_in(&self, credentials: &Credentials) -> Result<Session, BridgeError> {
        let body = self
            .execute(
                Method::POST,
                SIGN_IN_PATH,
                HeaderMap::new(),
                &RequestOptions::new(),
                |request| request.json(credentials),
            )
            .map_err(|e| BridgeError::authentication("sign-in request failed", Some(e)))?;

        body.into_json()
            .and_then(Session::from_response)
            .ok_or_else(|| BridgeError::authentication("sign-in response has no session token", None))
    }
}

/// Builder for [`BridgeConnector`]; `connect` performs the sign-in.
pub struct BridgeConnectorBuilder {
    email: Option<String>,
    password: Option<String>,
    study: String,
    account_type: String,
    remember_me: bool,
    base_url: String,
    config: ConfigStore,
    prompt: Box<dyn CredentialPrompt>,
    password_store: Box<dyn PasswordStore>,
    client: Option<Client>,
}

impl Default for BridgeConnectorBuilder {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            study: DEFAULT_STUDY.to_string(),
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
            remember_me: false,
            base_url: BASE_URL.to_string(),
            config: ConfigStore::default(),
            prompt: Box::new(TerminalPrompt),
            password_store: Box::new(CredentialStore),
            client: None,
        }
    }
}

impl BridgeConnectorBuilder {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn study(mut self, study: impl Into<String>) -> Self {
        self.study = study.into();
        self
    }

    pub fn account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    /// Save the password after a successful sign-in (OS keychain by default)
    pub fn remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Where stored credentials are looked up when no email is given
    pub fn config(mut self, config: ConfigStore) -> Self {
        self.config = config;
        self
    }

    pub fn prompt(mut self, prompt: impl CredentialPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Where remembered passwords are saved and offered from
    pub fn password_store(mut self, store: impl PasswordStore + 'static) -> Self {
        self.password_store = Box::new(store);
        self
    }

    /// Preconfigured HTTP client (proxies, TLS, default timeouts)
    pub fn http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Email and password: explicit arguments, then the config file, then the prompt
    fn resolve_credentials(&self) -> Result<(String, String), BridgeError> {
        let mut email = self.email.clone();
        let mut password = self.password.clone();

        if email.is_none() {
            let auth = self.config.section(AUTH_SECTION)?;
            email = auth.get("email").filter(|s| !s.is_empty()).cloned();
            password = auth.get("password").cloned().or(password);
        }

        let email = match email {
            Some(email) => email,
            None => {
                password = None;
                self.prompt.username().map_err(BridgeError::Prompt)?
            }
        };
        let password = match password {
            Some(password) => password,
            None => self.stored_or_prompted_password(&email)?,
        };
        Ok((email, password))
    }

    /// Remembered password if the prompt accepts it, otherwise a typed one
    fn stored_or_prompted_password(&self, email: &str) -> Result<String, BridgeError> {
        if let Some(stored) = self.password_store.load(email) {
            if self.prompt.use_stored_password(email).map_err(BridgeError::Prompt)? {
                debug!("Using remembered password");
                return Ok(stored);
            }
        }
        self.prompt.password(email).map_err(BridgeError::Prompt)
    }

    /// Sign in and return a connector holding the new session
    pub fn connect(self) -> Result<BridgeConnector, BridgeError> {
        let (email, password) = self.resolve_credentials()?;

        let client = match self.client {
            Some(client) => client,
            // No timeout unless one is configured (blocking default is 30s)
            None => Client::builder().timeout(None::<Duration>).build()?,
        };
        let http = Http {
            client,
            base_url: self.base_url,
        };

        let credentials = Credentials {
            study: self.study,
            email,
            password,
            account_type: self.account_type,
        };
        let session = http.sign_in(&credentials)?;

        match session.first_name() {
            Some(name) => info!("Welcome {}", name),
            None => info!("Signed in"),
        }

        if self.remember_me {
            if let Err(e) = self.password_store.save(&credentials.email, &credentials.password) {
                warn!(error = %e, "Failed to remember password");
            }
        }

        Ok(BridgeConnector { http, session })
    }
}

/// Signed-in client for the Bridge REST API.
///
/// Holds one session for its whole lifetime. The session is never mutated, so
/// a shared reference may be used from several threads.
#[derive(Clone)]
pub struct BridgeConnector {
    http: Http,
    session: Session,
}

impl BridgeConnector {
    pub fn builder() -> BridgeConnectorBuilder {
        BridgeConnectorBuilder::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    fn headers_for(&self, options: &RequestOptions) -> Result<HeaderMap, BridgeError> {
        if let Some(headers) = &options.headers {
            return Ok(headers.clone());
        }
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(self.session.token())
            .map_err(|_| BridgeError::InvalidHeader("session token is not a valid header value".into()))?;
        headers.insert(SESSION_HEADER, value);
        Ok(headers)
    }

    // ===== Generic REST Methods =====

    /// GET `uri`, returning parsed JSON or raw text depending on content type
    pub fn get(&self, uri: &str, options: &RequestOptions) -> Result<ResponseBody, BridgeError> {
        let headers = self.headers_for(options)?;
        self.http
            .execute(Method::GET, uri, headers, options, |request| request)
    }

    /// POST a JSON body to `uri`
    pub fn post<B: Serialize + ?Sized>(
        &self,
        uri: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<ResponseBody, BridgeError> {
        let headers = self.headers_for(options)?;
        self.http
            .execute(Method::POST, uri, headers, options, |request| request.json(body))
    }

    /// PUT a raw body to `uri`
    pub fn put(
        &self,
        uri: &str,
        body: Option<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<ResponseBody, BridgeError> {
        let headers = self.headers_for(options)?;
        self.http
            .execute(Method::PUT, uri, headers, options, |request| match body {
                Some(body) => request.body(body),
                None => request,
            })
    }

    /// DELETE `uri`; the response body is discarded
    pub fn delete(&self, uri: &str, options: &RequestOptions) -> Result<(), BridgeError> {
        let headers = self.headers_for(options)?;
        self.http
            .execute(Method::DELETE, uri, headers, options, |request| request)?;
        Ok(())
    }

    // ===== Participant Methods =====

    /// Fetch all participants who enrolled between the optional dates.
    ///
    /// Pages through `/v3/participants` until the server-reported total is
    /// reached. Columns include createdOn, email, firstName, id, lastName,
    /// status, studyIdentifier and type, plus anything else the server sends.
    pub fn participants(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<ParticipantTable, BridgeError> {
        let mut table = ParticipantTable::new();
        let mut offset: u64 = 0;

        loop {
            let mut options = RequestOptions::new();
            if let Some(start) = start_date {
                options = options.query("startDate", start.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            if let Some(end) = end_date {
                options = options.query("endDate", end.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            options = options.query("offsetBy", offset.to_string());

            let value = self.get_json(PARTICIPANTS_PATH, &options)?;
            let page: ParticipantPage = serde_json::from_value(value).map_err(|e| {
                BridgeError::UnexpectedResponse(format!("participant listing: {}", e))
            })?;

            let total = page.total;
            let received = page.items.len() as u64;
            if received == 0 && (table.len() as u64) < total {
                return Err(BridgeError::Pagination { offset, total });
            }

            let rows = ParticipantTable::from_items(page.items).map_err(|item| {
                BridgeError::UnexpectedResponse(format!("participant item is not an object: {}", item))
            })?;
            table.append(rows);
            offset += received;
            info!(fetched = table.len(), total = total, "Fetched participant page");

            if table.len() as u64 >= total {
                return Ok(table);
            }
        }
    }

    /// Fetch consent history, health code and other metadata for one participant
    pub fn participant_metadata(&self, user_id: &str) -> Result<Value, BridgeError> {
        let uri = format!("{}/{}", PARTICIPANTS_PATH, encode_segment(user_id));
        self.get_json(&uri, &RequestOptions::new())
    }

    /// Fetch information about a participant's last requests (uploads, sign-on, etc.)
    pub fn participant_info(&self, user_id: &str) -> Result<Value, BridgeError> {
        let uri = format!("{}/{}/requestInfo", PARTICIPANTS_PATH, encode_segment(user_id));
        self.get_json(&uri, &RequestOptions::new())
    }

    fn get_json(&self, uri: &str, options: &RequestOptions) -> Result<Value, BridgeError> {
        self.get(uri, options)?.into_json().ok_or_else(|| {
            BridgeError::UnexpectedResponse(format!("expected a JSON response from {}", uri))
        })
    }
}
