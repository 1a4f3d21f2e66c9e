use thiserror::Error;

/// Failure of an action.
///
/// `Validation` is raised before touching the database; `Rule` carries a
/// human-readable business-rule message meant to be shown as-is.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rule(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ActionError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn rule(msg: impl Into<String>) -> Self { Self::Rule(msg.into()) }

    /// Validation failures regardless of which layer detected them.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Model(models::errors::ModelError::Validation(_)))
    }
}

impl From<sea_orm::DbErr> for ActionError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
