//! Access token middleware.
//!
//! Looks for an access token in the `Authorization: Bearer` header or the `token` cookie and verifies it with the
//! [`TokenManager`] registered as app data. On success the [`AuthenticatedUser`] is attached to the request extensions
//! and the request continues. Otherwise a 401 Unauthorized response is returned and the route is never called.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{
    auth::{token_from_request, AuthenticatedUser, TokenManager},
    errors::{AuthError, ServerError},
};

#[derive(Default)]
pub struct TokenAuthMiddlewareFactory;

impl TokenAuthMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TokenAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(TokenAuthMiddlewareService { service: Rc::new(service) })
    }
}

pub struct TokenAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let tokens = req.app_data::<web::Data<TokenManager>>().cloned().ok_or_else(|| {
                error!("🔐️ No token manager has been registered with the server");
                ServerError::ConfigurationError("No token manager".into())
            })?;
            let token = token_from_request(req.request()).ok_or_else(|| {
                debug!("🔐️ Request to {} has no access token", req.path());
                ServerError::AuthenticationError(AuthError::MissingToken)
            })?;
            let user = tokens.verify_token(&token).map_err(|e| {
                debug!("🔐️ Rejected access token for {}. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Request to {} authenticated as user {}", req.path(), user);
            req.extensions_mut().insert(AuthenticatedUser(user));
            service.call(req).await
        })
    }
}
