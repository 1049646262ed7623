use crate::error::CommandError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourierId(pub u32);

impl fmt::Display for CourierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Driving license categories a courier may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseCategory {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A+B")]
    AB,
}

impl LicenseCategory {
    /// Whether the category covers motorcycles (contains `A`).
    pub fn permits_motorcycle(&self) -> bool {
        matches!(self, Self::A | Self::AB)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::AB => "A+B",
        }
    }
}

impl FromStr for LicenseCategory {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "A+B" => Ok(Self::AB),
            other => Err(CommandError::UnknownLicense(other.to_string())),
        }
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery courier that may rent motorcycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    pub id: CourierId,
    pub name: String,
    /// Company registration number (CNPJ), unique across couriers.
    pub cnpj: String,
    pub birth_date: Option<NaiveDate>,
    /// Driving license number, unique across couriers.
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub enabled: bool,
}

impl Courier {
    /// Creates a courier in its registration state (enabled).
    pub fn new(
        id: CourierId,
        name: impl Into<String>,
        cnpj: impl Into<String>,
        license_number: impl Into<String>,
        license_category: LicenseCategory,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            cnpj: cnpj.into(),
            birth_date: None,
            license_number: license_number.into(),
            license_category,
            enabled: true,
        }
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_category_parsing() {
        assert_eq!("A".parse::<LicenseCategory>(), Ok(LicenseCategory::A));
        assert_eq!("B".parse::<LicenseCategory>(), Ok(LicenseCategory::B));
        assert_eq!("A+B".parse::<LicenseCategory>(), Ok(LicenseCategory::AB));
        assert_eq!(
            "C".parse::<LicenseCategory>(),
            Err(CommandError::UnknownLicense("C".to_string()))
        );
    }

    #[test]
    fn test_license_category_permits_motorcycle() {
        assert!(LicenseCategory::A.permits_motorcycle());
        assert!(LicenseCategory::AB.permits_motorcycle());
        assert!(!LicenseCategory::B.permits_motorcycle());
    }

    #[test]
    fn test_license_category_serde_names() {
        let json = serde_json::to_string(&LicenseCategory::AB).unwrap();
        assert_eq!(json, "\"A+B\"");
        let parsed: LicenseCategory = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(parsed, LicenseCategory::A);
    }

    #[test]
    fn test_new_courier_is_enabled() {
        let courier = Courier::new(CourierId(1), "Ana", "11222333000181", "CNH-1", LicenseCategory::A);
        assert!(courier.enabled);
        assert!(courier.birth_date.is_none());
    }
}
