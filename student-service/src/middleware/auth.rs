//! Caller context.
//!
//! The service sits behind a fronting proxy that authenticates the user and
//! forwards their identity as `X-User-Role` / `X-User-Id` headers. Handlers
//! gate mutations on the role carried here.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const USER_ID_HEADER: &str = "X-User-Id";

pub const ADMIN_ROLE: &str = "ADMIN";
pub const TEACHER_ROLE: &str = "TEACHER";

/// Identity headers of the calling user. Both are optional at extraction
/// time; role checks happen per handler.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub role: Option<String>,
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role.as_deref() {
            Some(ADMIN_ROLE) => Ok(()),
            _ => Err(AppError::Forbidden(anyhow::anyhow!("Admin access required"))),
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role.as_deref() == Some(TEACHER_ROLE)
    }

    /// Teachers may only touch records assigned to them; everyone else
    /// falls through to the admin gate at the call site.
    pub fn require_own_students(&self, teacher_id: Option<&str>) -> Result<(), AppError> {
        if self.is_teacher() && self.user_id.as_deref() != teacher_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "You can only access your own students"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref uid) = user_id {
            tracing::Span::current().record("user_id", uid.as_str());
        }

        Ok(RequestContext { role, user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_passes_the_gate() {
        let ctx = RequestContext {
            role: Some("ADMIN".to_string()),
            user_id: Some("admin".to_string()),
        };
        assert!(ctx.require_admin().is_ok());
    }

    #[test]
    fn teacher_role_is_rejected() {
        let ctx = RequestContext {
            role: Some("TEACHER".to_string()),
            user_id: None,
        };
        assert!(matches!(
            ctx.require_admin().unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn missing_role_is_rejected() {
        assert!(RequestContext::default().require_admin().is_err());
    }
}
