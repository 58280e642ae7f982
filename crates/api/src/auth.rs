use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::collections::HashMap;
use types::{Role, TeacherId};

/// Static bearer-token table. With no tokens configured the service runs open
/// and every caller acts as admin (dev mode).
#[derive(Clone, Debug, Default)]
pub struct AuthTokens {
    admin: Option<String>,
    teachers: HashMap<String, TeacherId>,
    student: Option<String>,
}

impl AuthTokens {
    pub fn new(
        admin: Option<String>,
        teachers: Vec<(String, TeacherId)>,
        student: Option<String>,
    ) -> Self {
        Self {
            admin,
            teachers: teachers.into_iter().collect(),
            student,
        }
    }

    pub fn is_open(&self) -> bool {
        self.admin.is_none() && self.teachers.is_empty() && self.student.is_none()
    }

    fn resolve(&self, token: &str) -> Option<AuthUser> {
        if self.admin.as_deref() == Some(token) {
            return Some(AuthUser {
                role: Role::Admin,
                teacher_id: None,
            });
        }
        if let Some(id) = self.teachers.get(token) {
            return Some(AuthUser {
                role: Role::Teacher,
                teacher_id: Some(id.clone()),
            });
        }
        if self.student.as_deref() == Some(token) {
            return Some(AuthUser {
                role: Role::Student,
                teacher_id: None,
            });
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub role: Role,
    pub teacher_id: Option<TeacherId>,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(ApiError::Forbidden("admin role required".into())),
        }
    }

    /// The teacher this caller acts as; `None` means an admin acting at large.
    pub fn acting_teacher(&self) -> Result<Option<&TeacherId>, ApiError> {
        match self.role {
            Role::Admin => Ok(None),
            Role::Teacher => Ok(self.teacher_id.as_ref()),
            Role::Student => Err(ApiError::Forbidden(
                "teacher or admin role required".into(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.auth.is_open() {
            return Ok(AuthUser {
                role: Role::Admin,
                teacher_id: None,
            });
        }
        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;
        state.auth.resolve(token).ok_or(ApiError::Unauthorized)
    }
}
