//! SeaORM entities for the practice: patients, catalog, appointments,
//! sales and prepaid balances, staff and techniques.

pub mod errors;
pub mod db;
pub mod enums;
pub mod validate;
pub mod user;
pub mod user_credentials;
pub mod patient;
pub mod technique;
pub mod service;
pub mod service_technique;
pub mod package;
pub mod package_item;
pub mod appointment;
pub mod appointment_patient;
pub mod sale;
pub mod patient_service_balance;
pub mod balance_usage;
pub mod user_technique;
