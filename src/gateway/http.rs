//! `reqwest`-backed implementation of the reservation API client.

use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use reqwest::{Client, Method, StatusCode};
use time::{Date, macros::format_description};
use uuid::Uuid;

use super::{
    SlotLockGateway,
    config::LockApiConfig,
    error::{LockApiError, LockApiResult},
    models::{BookingRecord, CreateBookingRecord, HoldGrant, HoldStatus, SlotRecord},
};

/// Header carrying the identity the backend attributes holds to.
const CLIENT_ID_HEADER: &str = "x-client-id";

/// HTTP client for the reservation API.
#[derive(Clone)]
pub struct HttpSlotLockGateway {
    client: Client,
    base_url: Arc<str>,
    client_id: Arc<str>,
    bearer_token: Option<Arc<str>>,
}

impl HttpSlotLockGateway {
    /// Build a gateway from the given connection settings.
    pub fn new(config: LockApiConfig) -> LockApiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| LockApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            client_id: Arc::<str>::from(config.client_id),
            bearer_token: config.bearer_token.map(Arc::<str>::from),
        })
    }

    /// Identity this gateway acts as; slot listings are reconciled against it.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self
            .client
            .request(method, url)
            .header(CLIENT_ID_HEADER, self.client_id.as_ref());
        if let Some(ref token) = self.bearer_token {
            builder.bearer_auth(token.as_ref())
        } else {
            builder
        }
    }

    /// Issue a reserve-shaped request (reserve or extend) and decode the grant.
    async fn hold_request(
        &self,
        method: Method,
        path: String,
        slot_id: Uuid,
        ttl_minutes: u32,
    ) -> LockApiResult<HoldGrant> {
        let response = self
            .request(method, &path)
            .query(&[("minutes", ttl_minutes)])
            .send()
            .await
            .map_err(|source| LockApiError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Err(LockApiError::Conflict { slot_id }),
            StatusCode::NOT_FOUND => Err(LockApiError::SlotNotFound { slot_id }),
            status if status.is_success() => {
                response
                    .json::<HoldGrant>()
                    .await
                    .map_err(|source| LockApiError::DecodeResponse { path, source })
            }
            other => Err(LockApiError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn release_one(&self, slot_id: Uuid) -> LockApiResult<()> {
        let path = format!("time-slots/{slot_id}/reserve");
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(|source| LockApiError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            // A hold that is already gone (released or expired) counts as
            // released; callers must not be able to tell the difference.
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(LockApiError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn get_json<T>(&self, path: String) -> LockApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|source| LockApiError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LockApiError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| LockApiError::DecodeResponse { path, source })
    }
}

impl SlotLockGateway for HttpSlotLockGateway {
    fn reserve(&self, slot_id: Uuid, ttl_minutes: u32) -> BoxFuture<'static, LockApiResult<HoldGrant>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("time-slots/{slot_id}/reserve");
            gateway
                .hold_request(Method::POST, path, slot_id, ttl_minutes)
                .await
        })
    }

    fn release(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<()>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.release_one(slot_id).await })
    }

    fn release_many(&self, slot_ids: Vec<Uuid>) -> BoxFuture<'static, LockApiResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            // The backend offers no batch endpoint: fan out one release per
            // slot and wait for every call to settle.
            let outcomes = join_all(
                slot_ids
                    .iter()
                    .map(|&slot_id| gateway.release_one(slot_id)),
            )
            .await;

            let failed: Vec<Uuid> = slot_ids
                .into_iter()
                .zip(outcomes)
                .filter_map(|(slot_id, outcome)| outcome.is_err().then_some(slot_id))
                .collect();

            if failed.is_empty() {
                Ok(())
            } else {
                Err(LockApiError::ReleaseBatch { slot_ids: failed })
            }
        })
    }

    fn extend(&self, slot_id: Uuid, ttl_minutes: u32) -> BoxFuture<'static, LockApiResult<HoldGrant>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("time-slots/{slot_id}/reserve/extend");
            gateway
                .hold_request(Method::PUT, path, slot_id, ttl_minutes)
                .await
        })
    }

    fn hold_status(&self, slot_id: Uuid) -> BoxFuture<'static, LockApiResult<HoldStatus>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("time-slots/{slot_id}/reserve/status");
            gateway.get_json::<HoldStatus>(path).await
        })
    }

    fn fetch_slots(&self, court_id: Uuid, date: Date) -> BoxFuture<'static, LockApiResult<Vec<SlotRecord>>> {
        let gateway = self.clone();
        Box::pin(async move {
            let format = format_description!("[year]-[month]-[day]");
            let date_param = date
                .format(&format)
                .unwrap_or_else(|_| date.to_string());

            let path = format!("courts/{court_id}/slots");
            let response = gateway
                .request(Method::GET, &path)
                .query(&[("date", date_param)])
                .send()
                .await
                .map_err(|source| LockApiError::RequestSend {
                    path: path.clone(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(LockApiError::RequestStatus {
                    path,
                    status: response.status(),
                });
            }

            response
                .json::<Vec<SlotRecord>>()
                .await
                .map_err(|source| LockApiError::DecodeResponse { path, source })
        })
    }

    fn create_booking(&self, request: CreateBookingRecord) -> BoxFuture<'static, LockApiResult<BookingRecord>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = "bookings".to_string();
            let response = gateway
                .request(Method::POST, &path)
                .json(&request)
                .send()
                .await
                .map_err(|source| LockApiError::RequestSend {
                    path: path.clone(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(LockApiError::RequestStatus {
                    path,
                    status: response.status(),
                });
            }

            response
                .json::<BookingRecord>()
                .await
                .map_err(|source| LockApiError::DecodeResponse { path, source })
        })
    }
}
