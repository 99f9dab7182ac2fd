use crate::db::get_db_pool;
use crate::orm::users;
use crate::permission::{self, Permission};
use crate::session::session_user_id;
use actix_session::Session;
use actix_web::dev::{
    self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform,
};
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use sea_orm::EntityTrait;
use std::rc::Rc;
use std::time::Instant;

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// User data. Optional. None is a guest.
    pub user: Option<users::Model>,
    /// Permission bitmask resolved from the user's role. Empty for guests.
    pub permissions: Permission,
    /// Unread notification count for the user.
    pub unread_notifications: u64,
    /// Time the request started for page load statistics.
    pub request_start: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            user: None,
            permissions: Permission::empty(),
            unread_notifications: 0,
            request_start: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    /// Resolve the session into a user, their permissions and inbox count.
    /// A blocked account's session resolves to a guest.
    pub async fn from_session(session: &Session) -> Self {
        let db = get_db_pool();

        let user = match session_user_id(session) {
            Some(uid) => match users::Entity::find_by_id(uid).one(db).await {
                Ok(Some(user)) if user.active => Some(user),
                Ok(_) => {
                    session.purge();
                    None
                }
                Err(e) => {
                    log::error!("Failed to load session user {}: {}", uid, e);
                    None
                }
            },
            None => None,
        };

        let permissions = match &user {
            Some(user) => permission::user_permissions(db, user)
                .await
                .unwrap_or_else(|e| {
                    log::error!("Failed to resolve permissions for user {}: {}", user.id, e);
                    Permission::empty()
                }),
            None => Permission::empty(),
        };

        let unread_notifications = match &user {
            Some(user) => crate::notifications::count_unread(db, user.id)
                .await
                .unwrap_or(0),
            None => 0,
        };

        ClientCtxInner {
            user,
            permissions,
            unread_notifications,
            ..Default::default()
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            Some(cbox) => Self(cbox.clone()),
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.user.as_ref().map(|u| u.id)
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.0.user.as_ref()
    }

    /// Returns either the user's name or the word for guest.
    pub fn get_name(&self) -> String {
        match &self.0.user {
            Some(user) => user.name.to_owned(),
            None => "Guest".to_owned(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.0.user.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.0.user.as_ref().map(|u| u.confirmed).unwrap_or(false)
    }

    pub fn get_unread_notifications(&self) -> u64 {
        self.0.unread_notifications
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.0.permissions.contains(permission)
    }

    /// Require user to be logged in. Returns user_id or ErrorUnauthorized.
    pub fn require_login(&self) -> Result<i32, Error> {
        self.get_id()
            .ok_or_else(|| actix_web::error::ErrorUnauthorized("Login required"))
    }

    /// Require user to be logged in. Returns the user or ErrorUnauthorized.
    pub fn require_user(&self) -> Result<&users::Model, Error> {
        self.get_user()
            .ok_or_else(|| actix_web::error::ErrorUnauthorized("Login required"))
    }

    /// Require a confirmed account. Unconfirmed accounts can log in and
    /// manage settings but cannot interact with content.
    pub fn require_confirmed(&self) -> Result<&users::Model, Error> {
        match self.get_user() {
            Some(user) if user.confirmed => Ok(user),
            Some(_) => Err(actix_web::error::ErrorForbidden(
                "Please confirm your account first",
            )),
            None => Err(actix_web::error::ErrorUnauthorized("Login required")),
        }
    }

    /// Require specific permission. Returns () or ErrorForbidden.
    pub fn require_permission(&self, permission: Permission) -> Result<(), Error> {
        self.require_login()?;
        if !self.can(permission) {
            return Err(actix_web::error::ErrorForbidden("Insufficient permissions"));
        }
        Ok(())
    }

    /// Check if user can modify content (owner or holds the permission).
    pub fn can_modify(&self, resource_user_id: i32, permission: Permission) -> bool {
        if self.can(permission) {
            return true;
        }
        self.get_id() == Some(resource_user_id)
    }

    /// Require ownership of a resource. Returns () or ErrorForbidden.
    pub fn require_ownership(&self, resource_user_id: i32) -> Result<(), Error> {
        let user_id = self.require_login()?;
        if user_id == resource_user_id {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                "You don't own this resource",
            ))
        }
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        // Borrows of `req` must be done in a precise way to avoid conflicts.
        // This order is important.
        let (httpreq, payload) = req.into_parts();
        let session = Session::extract(&httpreq).into_inner();
        let req = ServiceRequest::from_parts(httpreq, payload);

        Box::pin(async move {
            match session {
                Ok(session) => {
                    let inner = ClientCtxInner::from_session(&session).await;
                    req.extensions_mut().insert(Data::new(inner));
                }
                Err(err) => {
                    log::error!("Unable to extract Session data in middleware: {}", err);
                }
            }

            svc.call(req).await
        })
    }
}
