//! Bearer-token authentication middleware
//!
//! Resolves the caller's token against the current topology snapshot and
//! stores the resulting [`RequestContext`] in the request extensions. The
//! resolved target lives only in that context; nothing process-wide is
//! written, so concurrent requests with tokens for different targets are
//! forwarded independently.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use application::AuthService;
use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::{config_reload::ReloadableConfig, error::ApiError, middleware::RequestId};

/// Layer that applies bearer-token authentication
#[derive(Clone, Debug)]
pub struct TokenAuthLayer {
    config: ReloadableConfig,
    auth: AuthService,
}

impl TokenAuthLayer {
    /// Authenticate against the topology held by `config`
    #[must_use]
    pub const fn new(config: ReloadableConfig, auth: AuthService) -> Self {
        Self { config, auth }
    }
}

impl<S> Layer<S> for TokenAuthLayer {
    type Service = TokenAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenAuth {
            inner,
            config: self.config.clone(),
            auth: self.auth,
        }
    }
}

/// Middleware service for bearer-token authentication
#[derive(Clone, Debug)]
pub struct TokenAuth<S> {
    inner: S,
    config: ReloadableConfig,
    auth: AuthService,
}

impl<S> Service<Request> for TokenAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // One snapshot per request; a concurrent reload cannot split it
        let topology = self.config.topology();
        let auth = self.auth;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map_or_else(uuid::Uuid::now_v7, RequestId::as_uuid);
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            let outcome =
                auth.authenticate(topology, req.uri().path(), authorization, request_id);

            match outcome {
                Ok(ctx) => {
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                },
                Err(failure) => Ok(ApiError::from(failure).into_response()),
            }
        })
    }
}
