use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Every failure a handler can surface. All are recovered at the request boundary
/// and rendered as a JSON notice (plus a redirect for the guard cases).
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Nom d'utilisateur ou mot de passe incorrect.")]
    AuthFailure,

    #[display(fmt = "Veuillez vous connecter.")]
    Unauthenticated,

    /// Authenticated, but not with the role the route needs.
    #[display(fmt = "Accès refusé.")]
    Forbidden { landing: &'static str },

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Les mots de passe ne correspondent pas.")]
    PasswordMismatch,

    #[display(fmt = "Le matricule est requis pour un utilisateur.")]
    MissingLinkedIdentity,

    #[display(fmt = "Nom d'utilisateur déjà utilisé.")]
    DuplicateUsername,

    #[display(fmt = "{}", _0)]
    DuplicateKey(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "Erreur génération du document : {}", _0)]
    ExportFailure(String),

    #[display(fmt = "Internal error: {}", _0)]
    Internal(String),

    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

/// True when the statement was rejected by a UNIQUE / PRIMARY KEY constraint.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

impl AppError {
    fn redirect_target(&self) -> Option<&'static str> {
        match self {
            AppError::Unauthenticated => Some("/login"),
            AppError::Forbidden { landing } => Some(*landing),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated | AppError::Forbidden { .. } => StatusCode::SEE_OTHER,
            AppError::Validation(_) | AppError::PasswordMismatch | AppError::MissingLinkedIdentity => {
                StatusCode::BAD_REQUEST
            }
            AppError::DuplicateUsername | AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExportFailure(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = match self {
            AppError::Database(e) if is_unique_violation(e) => {
                "Enregistrement déjà existant.".to_string()
            }
            AppError::Database(e) => {
                error!(error = %e, "Database error");
                "Erreur interne, contactez l'administrateur.".to_string()
            }
            AppError::Internal(reason) => {
                error!(reason = %reason, "Internal error");
                "Erreur interne, contactez l'administrateur.".to_string()
            }
            AppError::ExportFailure(reason) => {
                error!(reason = %reason, "Export failed");
                self.to_string()
            }
            other => other.to_string(),
        };

        match self.redirect_target() {
            Some(location) => HttpResponse::build(status)
                .insert_header((header::LOCATION, location))
                .json(json!({ "error": message, "redirect": location })),
            None => HttpResponse::build(status).json(json!({ "error": message })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_errors_redirect() {
        let resp = AppError::Unauthenticated.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

        let resp = AppError::Forbidden { landing: "/me" }.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/me");
    }

    #[test]
    fn auth_failure_is_generic() {
        let resp = AppError::AuthFailure.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn validation_kinds_are_bad_requests() {
        assert_eq!(AppError::PasswordMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingLinkedIdentity.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateUsername.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("Stagiaire introuvable.".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
