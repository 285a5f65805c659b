//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate module.
//!
//! Every handler is generic over the storage traits it needs, so that the endpoint tests can run them against mocks.
//! Handlers that need an authenticated user take an [`AuthenticatedUser`] argument; the route macro puts those behind
//! the access token middleware.
use actix_web::{
    cookie::Cookie,
    error::JsonPayloadError,
    get,
    http::header::AUTHORIZATION,
    web,
    HttpMessage,
    HttpRequest,
    HttpResponse,
    Responder,
};
use bonus_engine::{
    db_types::UserId,
    order_objects::SubmitOrderResult,
    AuthApi,
    AuthManagement,
    LedgerApi,
    LedgerApiError,
    LedgerManagement,
    OrderApiError,
    OrderIntakeApi,
    OrderManagement,
};
use log::*;

use crate::{
    auth::{AuthenticatedUser, TokenManager, TOKEN_COOKIE},
    data_objects::{Credentials, OrderResponse, WithdrawRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires auth) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::TokenAuthMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// JSON bodies that are malformed, or sent with the wrong content type, are answered with 400 Bad Request.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        debug!("💻️ Could not deserialize JSON payload. {err}");
        ServerError::CouldNotDeserializePayload(err.to_string()).into()
    })
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/register" impl AuthManagement);
/// Creates an account and logs the new user in.
pub async fn register<B: AuthManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, ServerError> {
    let credentials = body.into_inner();
    trace!("💻️ Received registration request for {}", credentials.login);
    let user = api.register(&credentials.login, &credentials.password).await?;
    info!("💻️ New user '{}' registered with id {user}", credentials.login);
    Ok(logged_in_response(user, &tokens))
}

route!(login => Post "/login" impl AuthManagement);
pub async fn login<B: AuthManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    tokens: web::Data<TokenManager>,
) -> Result<HttpResponse, ServerError> {
    let credentials = body.into_inner();
    trace!("💻️ Received login request for {}", credentials.login);
    let user = api.authenticate(&credentials.login, &credentials.password).await.map_err(|e| {
        debug!("💻️ Login failed for {}. {e}", credentials.login);
        ServerError::from(e)
    })?;
    debug!("💻️ User {user} logged in");
    Ok(logged_in_response(user, &tokens))
}

fn logged_in_response(user: UserId, tokens: &TokenManager) -> HttpResponse {
    let token = tokens.issue_token(user);
    let cookie = Cookie::build(TOKEN_COOKIE, token.clone()).path("/").http_only(true).finish();
    HttpResponse::Ok().cookie(cookie).insert_header((AUTHORIZATION, format!("Bearer {token}"))).finish()
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders" impl OrderManagement where requires auth);
/// Registers an order number for the user. The body is the bare number, sent as `text/plain`.
///
/// * `202 Accepted`: the number is new and will be sent to the accrual service.
/// * `200 OK`: the user had already submitted this number.
/// * `409 Conflict`: another user owns this number.
/// * `422 Unprocessable Entity`: the number is malformed or fails the Luhn check.
pub async fn submit_order<B: OrderManagement>(
    req: HttpRequest,
    user: AuthenticatedUser,
    body: String,
    api: web::Data<OrderIntakeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    if !req.content_type().eq_ignore_ascii_case("text/plain") {
        debug!("💻️ Order submission with content type '{}' rejected", req.content_type());
        return Err(ServerError::UnsupportedContentType("text/plain"));
    }
    let number = body.trim();
    if number.is_empty() {
        return Err(ServerError::InvalidRequestBody("The order number is missing".into()));
    }
    trace!("💻️ User {} submitted order {number}", user.id());
    match api.submit(user.id(), number).await? {
        SubmitOrderResult::Accepted => Ok(HttpResponse::Accepted().finish()),
        SubmitOrderResult::AlreadyAddedBySelf => Ok(HttpResponse::Ok().finish()),
        SubmitOrderResult::ConflictOtherUser => Err(ServerError::OrderOwnedByOtherUser),
    }
}

route!(list_orders => Get "/orders" impl OrderManagement where requires auth);
/// The user's orders, oldest first. `204 No Content` if there are none.
pub async fn list_orders<B: OrderManagement>(
    user: AuthenticatedUser,
    api: web::Data<OrderIntakeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching orders for user {}", user.id());
    match api.orders_for_user(user.id()).await {
        Ok(orders) => {
            let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
            Ok(HttpResponse::Ok().json(orders))
        },
        Err(OrderApiError::NoData) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Err(e.into()),
    }
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(balance => Get "/balance" impl LedgerManagement where requires auth);
pub async fn balance<B: LedgerManagement>(
    user: AuthenticatedUser,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching balance for user {}", user.id());
    let balance = api.balance(user.id()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

route!(withdraw => Post "/balance/withdraw" impl LedgerManagement where requires auth);
/// Spends points against an order number.
///
/// * `402 Payment Required`: the balance does not cover `sum`.
/// * `422 Unprocessable Entity`: the order number is invalid, or `sum` is not positive.
pub async fn withdraw<B: LedgerManagement>(
    user: AuthenticatedUser,
    body: web::Json<WithdrawRequest>,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ User {} wants to withdraw {} against order {}", user.id(), request.sum, request.order);
    let entry = api.withdraw(user.id(), &request.order, request.sum).await.map_err(|e| {
        if let LedgerApiError::InsufficientFunds { .. } = e {
            info!("💻️ Withdrawal by user {} refused. {e}", user.id());
        }
        ServerError::from(e)
    })?;
    info!("💻️ User {} withdrew {} against order {}", user.id(), entry.amount.abs(), entry.order_number);
    Ok(HttpResponse::Ok().finish())
}

route!(withdrawals => Get "/withdrawals" impl LedgerManagement where requires auth);
/// The user's withdrawals, oldest first. `204 No Content` if there are none.
pub async fn withdrawals<B: LedgerManagement>(
    user: AuthenticatedUser,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching withdrawals for user {}", user.id());
    match api.withdrawals(user.id()).await {
        Ok(withdrawals) => Ok(HttpResponse::Ok().json(withdrawals)),
        Err(LedgerApiError::NoData) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Err(e.into()),
    }
}
