//! Search areas: departments and municipalities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Error returned when parsing an invalid department code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid department code: {reason}")]
pub struct InvalidDepartmentCode {
    reason: &'static str,
}

/// A valid administrative department code.
///
/// Department codes are 1 to 3 uppercase ASCII letters or digits: `"01"`,
/// `"35"`, `"2A"`, `"971"`, and the data provider's `"OM"` bucket for
/// overseas territories. The code is stored inline so the type is `Copy`.
///
/// # Examples
///
/// ```
/// use slot_finder::domain::DepartmentCode;
///
/// let ille_et_vilaine = DepartmentCode::parse("35").unwrap();
/// assert_eq!(ille_et_vilaine.as_str(), "35");
///
/// // Lowercase is rejected unless normalized first
/// assert!(DepartmentCode::parse("2a").is_err());
/// assert_eq!(DepartmentCode::parse_normalized(" 2a ").unwrap().as_str(), "2A");
///
/// // Wrong length is rejected
/// assert!(DepartmentCode::parse("").is_err());
/// assert!(DepartmentCode::parse("9740").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepartmentCode {
    bytes: [u8; 3],
    len: u8,
}

impl DepartmentCode {
    /// Parse a department code from a string.
    ///
    /// The input must be 1 to 3 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidDepartmentCode> {
        let raw = s.as_bytes();

        if raw.is_empty() || raw.len() > 3 {
            return Err(InvalidDepartmentCode {
                reason: "must be 1 to 3 characters",
            });
        }

        let mut bytes = [0u8; 3];
        for (slot, &b) in bytes.iter_mut().zip(raw) {
            if !(b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(InvalidDepartmentCode {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
            *slot = b;
        }

        Ok(DepartmentCode {
            bytes,
            len: raw.len() as u8,
        })
    }

    /// Parse a department code, trimming whitespace and upper-casing first.
    ///
    /// Use this for user input and provider payloads (which spell the
    /// overseas bucket `"om"`).
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidDepartmentCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the department code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics are ever stored
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Debug for DepartmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepartmentCode({})", self.as_str())
    }
}

impl fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DepartmentCode {
    type Error = InvalidDepartmentCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_normalized(&value)
    }
}

impl From<DepartmentCode> for String {
    fn from(code: DepartmentCode) -> Self {
        code.as_str().to_string()
    }
}

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An administrative department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub code: DepartmentCode,
    pub name: String,
}

/// A municipality, located by its town-hall coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    /// INSEE municipality code (e.g. "35238" for Rennes).
    pub code: String,
    pub postal_code: String,
    /// Department the municipality belongs to.
    pub department: DepartmentCode,
    pub name: String,
    pub coordinates: Coordinates,
}

/// Which kind of area a raw selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Municipality,
    Department,
}

impl FromStr for AreaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "municipality" | "commune" => Ok(AreaKind::Municipality),
            "department" | "departement" => Ok(AreaKind::Department),
            other => Err(DomainError::UnsupportedAreaKind(other.to_string())),
        }
    }
}

/// Either kind of search area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Area {
    Municipality(Municipality),
    Department(Department),
}

impl Area {
    /// The department whose dataset covers this area.
    pub fn department_code(&self) -> DepartmentCode {
        match self {
            Area::Municipality(m) => m.department,
            Area::Department(d) => d.code,
        }
    }

    /// Human-readable label, e.g. `"Rennes (35000)"` or `"Ille-et-Vilaine (35)"`.
    pub fn label(&self) -> String {
        match self {
            Area::Municipality(m) => format!("{} ({})", m.name, m.postal_code),
            Area::Department(d) => format!("{} ({})", d.name, d.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(DepartmentCode::parse("01").is_ok());
        assert!(DepartmentCode::parse("35").is_ok());
        assert!(DepartmentCode::parse("2A").is_ok());
        assert!(DepartmentCode::parse("2B").is_ok());
        assert!(DepartmentCode::parse("971").is_ok());
        assert!(DepartmentCode::parse("OM").is_ok());
    }

    #[test]
    fn reject_bad_codes() {
        assert!(DepartmentCode::parse("").is_err());
        assert!(DepartmentCode::parse("9741").is_err());
        assert!(DepartmentCode::parse("2a").is_err());
        assert!(DepartmentCode::parse("3-").is_err());
        assert!(DepartmentCode::parse("é").is_err());
    }

    #[test]
    fn normalized_parse_trims_and_uppercases() {
        let code = DepartmentCode::parse_normalized(" om ").unwrap();
        assert_eq!(code.as_str(), "OM");
    }

    #[test]
    fn display_and_debug() {
        let code = DepartmentCode::parse("971").unwrap();
        assert_eq!(format!("{}", code), "971");
        assert_eq!(format!("{:?}", code), "DepartmentCode(971)");
    }

    #[test]
    fn short_codes_do_not_collide_with_padding() {
        let a = DepartmentCode::parse("1").unwrap();
        let b = DepartmentCode::parse("01").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "1");
    }

    #[test]
    fn serde_uses_plain_string() {
        let code = DepartmentCode::parse("2A").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"2A\"");

        let back: DepartmentCode = serde_json::from_str("\"2a\"").unwrap();
        assert_eq!(back, code);

        assert!(serde_json::from_str::<DepartmentCode>("\"toolong\"").is_err());
    }

    #[test]
    fn parse_area_kind() {
        assert_eq!("municipality".parse::<AreaKind>().unwrap(), AreaKind::Municipality);
        assert_eq!("commune".parse::<AreaKind>().unwrap(), AreaKind::Municipality);
        assert_eq!("departement".parse::<AreaKind>().unwrap(), AreaKind::Department);
        assert!("region".parse::<AreaKind>().is_err());
    }

    #[test]
    fn area_labels() {
        let municipality = Area::Municipality(Municipality {
            code: "35238".into(),
            postal_code: "35000".into(),
            department: DepartmentCode::parse("35").unwrap(),
            name: "Rennes".into(),
            coordinates: Coordinates::new(48.11, -1.68),
        });
        assert_eq!(municipality.label(), "Rennes (35000)");
        assert_eq!(municipality.department_code().as_str(), "35");

        let department = Area::Department(Department {
            code: DepartmentCode::parse("35").unwrap(),
            name: "Ille-et-Vilaine".into(),
        });
        assert_eq!(department.label(), "Ille-et-Vilaine (35)");
    }
}
