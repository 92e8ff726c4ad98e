use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenService;
use crate::error::AppError;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Requires a valid bearer token on every request except registration and login.
///
/// Verified `Claims` are stored in the request extensions for the
/// `AuthenticatedUser` extractor. Role checks are not done here; handlers
/// declare the role they need explicitly.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !PUBLIC_PATHS.contains(&req.path()) {
            match authenticate(&req) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                }
                Err(app_err) => {
                    log::debug!("Rejected {} {}: {}", req.method(), req.path(), app_err);
                    let response = app_err.error_response().map_into_right_body();
                    let (request, _) = req.into_parts();
                    return Box::pin(ready(Ok(ServiceResponse::new(request, response))));
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

fn authenticate(req: &ServiceRequest) -> Result<crate::auth::Claims, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("Token service not configured".into()))?;

    tokens.verify_token(token)
}
