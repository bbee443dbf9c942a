use crate::entities::Role;
use crate::error::AppError;
use crate::middlewares::AuthUser;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

/// 限制作用域只允许指定角色访问，需位于 [`AuthMiddleware`](super::AuthMiddleware) 之内
pub struct RequireRole {
    allowed: Rc<Vec<Role>>,
}

impl RequireRole {
    pub fn new(allowed: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: Rc::new(allowed.into()),
        }
    }

    pub fn admin() -> Self {
        Self::new([Role::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    allowed: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
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
        let role = req.extensions().get::<AuthUser>().map(|u| u.role);
        match role {
            Some(role) if self.allowed.contains(&role) => Box::pin(self.service.call(req)),
            Some(role) => {
                log::warn!("Role {role} denied access to {}", req.path());
                Box::pin(async move { Err(AppError::Forbidden.into()) })
            }
            None => Box::pin(async move {
                Err(AppError::AuthError("Missing access token".to_string()).into())
            }),
        }
    }
}
