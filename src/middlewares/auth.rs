use crate::error::AppError;
use crate::utils::{AdminIdentity, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec![
                "/healthz",
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/bookings",
                "/api/v1/admin/login",
            ],
            // 前缀匹配的公开路径
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/otp/",
                "/api/v1/bookings/",
            ],
            // 需要排除的路径（即使在公开前缀下也需要认证）
            excluded_paths: vec!["/api/v1/admin/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

/// 非公开路径要求 `Authorization: Bearer <admin token>`
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        if self.public_paths.is_public_path(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self.jwt_service.verify_admin_token(token) {
            Ok(claims) => {
                req.extensions_mut().insert(AdminIdentity(claims.sub));
                Box::pin(self.service.call(req))
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}

/// 当前请求的管理员 (仅在鉴权通过的路径上存在)
pub fn current_admin(req: &HttpRequest) -> Option<AdminIdentity> {
    req.extensions().get::<AdminIdentity>().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/healthz"));
        assert!(paths.is_public_path("/api/v1/otp/send"));
        assert!(paths.is_public_path("/api/v1/otp/verify"));
        assert!(paths.is_public_path("/api/v1/bookings"));
        assert!(paths.is_public_path("/api/v1/bookings/7d3c1d7e-0000-0000-0000-000000000000"));
        assert!(paths.is_public_path("/api/v1/admin/login"));
        assert!(paths.is_public_path("/swagger-ui/index.html"));
    }

    #[test]
    fn test_admin_paths_require_token() {
        let paths = PublicPaths::new();
        assert!(!paths.is_public_path("/api/v1/admin/bookings"));
        assert!(!paths.is_public_path("/api/v1/admin/ambulances"));
        assert!(!paths.is_public_path("/api/v1/admin/login/extra"));
        assert!(!paths.is_public_path("/api/v1/unknown"));
    }
}
