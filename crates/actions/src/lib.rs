//! Action layer: validated, transactional operations of the practice on top
//! of the `models` entities.
//! - Every mutation validates its input before touching the database.
//! - Multi-row writes run inside one transaction; dropping it rolls back.
//! - Errors are reported through [`errors::ActionError`].

use uuid::Uuid;

pub mod errors;
pub mod auth;
#[cfg(test)]
pub mod test_support;
pub mod user_service;
pub mod patient_service;
pub mod technique_service;
pub mod catalog_service;
pub mod package_service;
pub mod appointment_service;
pub mod sale_service;
pub mod chart_service;
pub mod report_service;

pub use errors::ActionError;

/// Drop repeated ids, keeping first-seen order.
pub(crate) fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
