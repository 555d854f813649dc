//! BusWay API client implementation

use crate::{
    error::ApiError,
    types::{
        AuthToken, Booking, BookingConfirmation, BookingRequest, Bus, BusId, Credentials,
        FieldErrors, LoginResponse, Registration, SeatId, UserId,
    },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the booking API
///
/// Cheap to clone: clones share one connection pool.
#[derive(Clone, Debug)]
pub struct BusWayClient {
    client: Client,
    base_url: String,
}

impl BusWayClient {
    /// Request timeout used by [`BusWayClient::new`]
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] for a malformed base URL and
    /// [`ApiError::RequestFailed`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to, without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /api/buses/`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or parsing failures
    #[tracing::instrument(skip_all)]
    pub async fn list_buses(&self) -> Result<Vec<Bus>, ApiError> {
        let response = send(self.client.get(self.url("/api/buses/"))).await?;
        parse_json(response).await
    }

    /// `GET /api/buses/{id}`: the bus with its seats
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or parsing failures
    #[tracing::instrument(skip_all, fields(bus_id = %bus_id))]
    pub async fn get_bus(&self, bus_id: BusId) -> Result<Bus, ApiError> {
        let response = send(self.client.get(self.url(&format!("/api/buses/{bus_id}")))).await?;
        parse_json(response).await
    }

    /// `POST /api/booking/`: book one seat for the token's owner
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] (usually carrying a `detail`) when the
    /// server refuses the booking, [`ApiError::Unauthorized`] for a bad token,
    /// and transport errors otherwise.
    #[tracing::instrument(skip_all, fields(seat_id = %seat_id))]
    pub async fn book_seat(
        &self,
        seat_id: SeatId,
        token: &AuthToken,
    ) -> Result<BookingConfirmation, ApiError> {
        let request = self
            .client
            .post(self.url("/api/booking/"))
            .header(reqwest::header::AUTHORIZATION, token_header(token))
            .json(&BookingRequest { seat: seat_id });

        let response = send(request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // The seat is ours once the server says so; the body is informational.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Booking confirmed but the body could not be read");
                return Ok(BookingConfirmation::default());
            }
        };

        if body.trim().is_empty() {
            return Ok(BookingConfirmation::default());
        }

        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Booking confirmed with an unreadable body");
            BookingConfirmation::default()
        }))
    }

    /// `POST /api/login/`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] or [`ApiError::Unauthorized`] for bad
    /// credentials, and transport or parsing errors otherwise.
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = send(self.client.post(self.url("/api/login/")).json(credentials)).await?;
        parse_json(response).await
    }

    /// `POST /api/register/`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with per-field messages when the form
    /// is refused, and transport errors otherwise.
    #[tracing::instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let response =
            send(self.client.post(self.url("/api/register/")).json(registration)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// `GET /api/user/{user_id}/bookings/`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, non-success statuses, or parsing failures
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn user_bookings(
        &self,
        user_id: UserId,
        token: &AuthToken,
    ) -> Result<Vec<Booking>, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/api/user/{user_id}/bookings/")))
            .header(reqwest::header::AUTHORIZATION, token_header(token));

        let response = send(request).await?;
        parse_json(response).await
    }
}

fn token_header(token: &AuthToken) -> String {
    format!("Token {}", token.expose())
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    request.send().await.map_err(|e| {
        tracing::warn!(error = %e, "API request failed");
        ApiError::RequestFailed(e.to_string())
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
    } else {
        Err(error_from_response(response).await)
    }
}

/// Map a non-success response to an [`ApiError`]
///
/// A 400 whose JSON object has no `detail` key is treated as per-field
/// validation errors.
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let payload = serde_json::from_str::<serde_json::Value>(&body).ok();

    let detail = payload
        .as_ref()
        .and_then(|p| p.get("detail"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);

    tracing::debug!(status = status.as_u16(), detail = ?detail, "API returned an error");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized { detail },
        StatusCode::BAD_REQUEST if detail.is_none() => {
            match payload.map(serde_json::from_value::<FieldErrors>) {
                Some(Ok(errors)) if !errors.is_empty() => ApiError::Validation(errors),
                _ => ApiError::Rejected {
                    status: status.as_u16(),
                    detail,
                },
            }
        },
        _ => ApiError::Rejected {
            status: status.as_u16(),
            detail,
        },
    }
}
