//! String-backed status enums.
//!
//! Columns store the upper-case wire form (`ACTIVE`, `DONE`, ...); these
//! types give the action layer exhaustive matching over them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ModelError::Validation(format!(
                        "invalid {}: {}", stringify!($name), other
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Whether a service or package can be picked for new bookings and sales.
    CatalogStatus { Active => "ACTIVE", Inactive => "INACTIVE" }
);

string_enum!(AppointmentStatus { Programmed => "PROGRAMMED", Done => "DONE" });

string_enum!(
    /// Review outcome of a completed appointment.
    Evaluation {
        UnderEvaluation => "UNDER_EVALUATION",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
);

string_enum!(
    /// SINGLE books exactly one patient, MULTIPLE a group session.
    AppointmentMode { Single => "SINGLE", Multiple => "MULTIPLE" }
);

string_enum!(SaleType { Service => "SERVICE", Package => "PACKAGE" });

string_enum!(UserRole { Admin => "ADMIN", Therapist => "THERAPIST", Receptionist => "RECEPTIONIST" });

string_enum!(TechniqueLevel { Learning => "LEARNING", Certified => "CERTIFIED" });

impl CatalogStatus {
    pub fn toggled(self) -> Self {
        match self {
            CatalogStatus::Active => CatalogStatus::Inactive,
            CatalogStatus::Inactive => CatalogStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("done".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Done);
        assert_eq!("Under_Evaluation".parse::<Evaluation>().unwrap(), Evaluation::UnderEvaluation);
        assert!(matches!("later".parse::<AppointmentMode>(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn serde_uses_wire_names() {
        let v = serde_json::to_value(SaleType::Package).unwrap();
        assert_eq!(v, serde_json::json!("PACKAGE"));
        let e: Evaluation = serde_json::from_value(serde_json::json!("APPROVED")).unwrap();
        assert_eq!(e, Evaluation::Approved);
    }

    #[test]
    fn toggle_flips_status() {
        assert_eq!(CatalogStatus::Active.toggled(), CatalogStatus::Inactive);
        assert_eq!(CatalogStatus::Inactive.toggled(), CatalogStatus::Active);
        assert_eq!(CatalogStatus::ALL.len(), 2);
    }
}
