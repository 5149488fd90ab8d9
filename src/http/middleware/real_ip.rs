//! Real-IP rewriting middleware.
//!
//! Wraps any inner service (the next stage of the pipeline). Each request
//! has its client-identity headers rewritten and is then handed to the
//! inner service once. When the identity cannot be established the
//! request is answered with `500` and the inner service is not called.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::ConnectInfo,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::{ready, Either, Ready};
use tower::{Layer, Service};

use crate::error::ResolveError;
use crate::observability::metrics;
use crate::security::headers::{self, DiscardMode, HeaderNames};
use crate::security::real_ip::{resolve, Resolution};
use crate::security::trust::TrustSet;

/// Resolved client address, inserted into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealIp(pub IpAddr);

/// Per-instance settings for the middleware.
#[derive(Debug, Clone, Default)]
pub struct RealIpSettings {
    /// Instance name, used in log lines.
    pub name: String,
    pub headers: HeaderNames,
    pub discard_mode: DiscardMode,
}

/// Layer producing [`RealIpService`].
#[derive(Clone)]
pub struct RealIpLayer {
    trust: Arc<TrustSet>,
    settings: Arc<RealIpSettings>,
}

impl RealIpLayer {
    pub fn new(trust: Arc<TrustSet>, settings: RealIpSettings) -> Self {
        Self {
            trust,
            settings: Arc::new(settings),
        }
    }
}

impl<S> Layer<S> for RealIpLayer {
    type Service = RealIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RealIpService {
            inner,
            trust: self.trust.clone(),
            settings: self.settings.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RealIpService<S> {
    inner: S,
    trust: Arc<TrustSet>,
    settings: Arc<RealIpSettings>,
}

impl<S, B> Service<Request<B>> for RealIpService<S>
where
    S: Service<Request<B>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        match self.rewrite(&mut request) {
            Ok(resolution) => {
                request.extensions_mut().insert(RealIp(resolution.real_ip));
                Either::Right(self.inner.call(request))
            }
            Err(e) => {
                tracing::error!(
                    middleware = %self.settings.name,
                    error = %e,
                    "Failed to resolve client address"
                );
                metrics::record_resolution_error(e.kind());
                Either::Left(ready(Ok(internal_error())))
            }
        }
    }
}

impl<S> RealIpService<S> {
    fn rewrite<B>(&self, request: &mut Request<B>) -> Result<Resolution, ResolveError> {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .ok_or_else(|| ResolveError::malformed("", "no peer address on request"))?;

        let names = &self.settings.headers;
        let chain = headers::forwarded_for_value(request.headers(), &names.forwarded_for)?;
        let resolution = resolve(&self.trust, &peer, chain.as_deref())?;

        tracing::debug!(
            middleware = %self.settings.name,
            peer = %peer,
            real_ip = %resolution.real_ip,
            outcome = resolution.outcome(),
            "Resolved client address"
        );
        metrics::record_resolution(resolution.outcome());

        headers::apply(
            &resolution,
            request.headers_mut(),
            names,
            self.settings.discard_mode,
        )?;
        Ok(resolution)
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "500 internal error").into_response()
}
