use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::error::{AppError, AppResult};
use crate::utils::jwt::verify_token;
use crate::AppState;

/// Id of the caller, attached to the response so outer layers can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i32);

/// Extract and validate the JWT from the Authorization header.
///
/// A missing header is 401; a header that is not a bearer token, or a token
/// that fails verification, is 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) = auth.map_err(|rejection| {
        if rejection.is_missing() {
            AppError::Unauthorized("Access token required".to_string())
        } else {
            AppError::Forbidden("Invalid token".to_string())
        }
    })?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    let user = AuthenticatedUser(claims.sub);
    request.extensions_mut().insert(claims);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}
