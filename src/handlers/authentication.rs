// Authentication middleware for Tingwu API
//
// This module provides bearer-token authentication for the inbound API.
// The expected token comes from configuration; when none is configured,
// authentication is disabled and all requests pass. OPTIONS requests are
// always allowed to support CORS pre-flight.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header,
    Error,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::{debug, info, warn};
use std::env;

/// Read the configured inbound API token, if any
fn configured_token() -> Option<String> {
    env::var("TINGWU_API_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
}

/// Middleware factory for authentication
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        if configured_token().is_none() {
            info!("No inbound API token configured, authentication is disabled");
        }
        ok(AuthenticationMiddleware { service })
    }
}

/// Authentication middleware implementation
pub struct AuthenticationMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS pre-flight never carries credentials
        if req.method() == actix_web::http::Method::OPTIONS {
            debug!("OPTIONS request - bypassing authentication check");
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if let Err(error) = authenticate(&req) {
            return Box::pin(async move { Err(error) });
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

/// Authenticate a request by checking its bearer token against the configured one
fn authenticate(req: &ServiceRequest) -> Result<(), Error> {
    let expected = match configured_token() {
        Some(token) => token,
        None => {
            debug!("Authentication disabled, allowing request");
            return Ok(());
        }
    };

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing or malformed Authorization header");
            ErrorUnauthorized("Authorization header is required")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format, missing 'Bearer' prefix");
        ErrorUnauthorized("Invalid Authorization header format. Must be 'Bearer <token>'")
    })?;

    if token == expected {
        Ok(())
    } else {
        warn!("Rejected request with invalid API token");
        Err(ErrorUnauthorized("Invalid API token"))
    }
}
