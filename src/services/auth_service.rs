use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::UserService;
use crate::utils::{JwtService, verify_password};

#[derive(Clone)]
pub struct AuthService {
    user_service: UserService,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(user_service: UserService, jwt_service: JwtService) -> Self {
        Self {
            user_service,
            jwt_service,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .user_service
            .find_by_username(request.username.trim())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self
            .jwt_service
            .generate_token(user.id, &user.username, user.role)?;
        log::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            token,
            role: user.role,
            expires_in: self.jwt_service.expires_in(),
            user: user.into(),
        })
    }
}
