//! OpenAPI document served at `/api-docs/openapi.json`.
//!
//! Request bodies are documented with plain mirror structs so the action
//! inputs stay free of schema derives.

use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::routes::{appointments, techniques, therapists};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    /// Self-registration always yields a `RECEPTIONIST`; staff added through
    /// `/therapists` register with the same email to set their password.
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct PatientRequest {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(ToSchema)]
pub struct TechniqueRequest { pub name: String, pub description: Option<String> }

#[derive(ToSchema)]
pub struct ServiceRequest {
    pub name: String,
    /// At least 10 characters.
    pub description: String,
    pub price: f64,
    /// Minutes.
    pub duration: i32,
    pub technique_ids: Vec<Uuid>,
}

#[derive(ToSchema)]
pub struct PackageItemRequest { pub service_id: Uuid, pub sessions: i32 }

#[derive(ToSchema)]
pub struct PackageRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub items: Vec<PackageItemRequest>,
}

#[derive(ToSchema)]
pub struct AppointmentRequest {
    pub service_id: Uuid,
    pub patient_ids: Vec<Uuid>,
    /// RFC 3339 timestamp.
    pub date: String,
    /// `SINGLE` or `MULTIPLE`.
    pub mode: String,
    pub description: Option<String>,
    pub therapist_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct AppointmentUpdateRequest {
    pub date: Option<String>,
    pub description: Option<String>,
    pub therapist_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct SaleRequest {
    pub patient_id: Uuid,
    /// `SERVICE` or `PACKAGE`.
    pub sale_type: String,
    pub service_id: Option<Uuid>,
    pub sessions: Option<i32>,
    pub package_id: Option<Uuid>,
    pub amount: f64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::patients::list,
        crate::routes::patients::create,
        crate::routes::patients::get,
        crate::routes::patients::update,
        crate::routes::patients::delete,
        crate::routes::patients::balances,
        crate::routes::patients::sales,
        crate::routes::techniques::list,
        crate::routes::techniques::create,
        crate::routes::techniques::get,
        crate::routes::techniques::update,
        crate::routes::techniques::delete,
        crate::routes::techniques::therapists,
        crate::routes::techniques::assign_therapists,
        crate::routes::therapists::list,
        crate::routes::therapists::create,
        crate::routes::therapists::techniques,
        crate::routes::therapists::set_techniques,
        crate::routes::therapists::performance,
        crate::routes::services::list,
        crate::routes::services::list_active,
        crate::routes::services::create,
        crate::routes::services::get,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::toggle_status,
        crate::routes::packages::list,
        crate::routes::packages::create,
        crate::routes::packages::get,
        crate::routes::packages::update,
        crate::routes::packages::delete,
        crate::routes::packages::toggle_status,
        crate::routes::appointments::list,
        crate::routes::appointments::create,
        crate::routes::appointments::get,
        crate::routes::appointments::update,
        crate::routes::appointments::delete,
        crate::routes::appointments::complete,
        crate::routes::appointments::evaluate,
        crate::routes::sales::create,
        crate::routes::sales::chart,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            PatientRequest,
            TechniqueRequest,
            ServiceRequest,
            PackageItemRequest,
            PackageRequest,
            AppointmentRequest,
            AppointmentUpdateRequest,
            SaleRequest,
            appointments::CompleteRequest,
            appointments::EvaluationRequest,
            techniques::AssignTherapistsRequest,
            therapists::CreateTherapistRequest,
            therapists::SetTechniquesRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "patients"),
        (name = "techniques"),
        (name = "therapists"),
        (name = "services"),
        (name = "packages"),
        (name = "appointments"),
        (name = "sales")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for p in ["/health", "/appointments/{id}/complete", "/charts/sales", "/therapists/{id}/performance"] {
            assert!(paths.contains_key(p), "missing {p}");
        }
    }
}
