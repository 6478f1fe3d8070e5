use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A validated request type tag for types the portal does not know about.
///
/// Tags are lowercase: an ASCII letter followed by letters, digits, `_` or
/// `-`. Input is normalised to lowercase before validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(NonEmptyString);

impl TypeTag {
    /// Creates a new `TypeTag`, normalising to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTypeError` if the string is empty, does not start with a
    /// letter, or contains characters outside `[a-z0-9_-]`.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidTypeError> {
        let s = s.into().trim().to_lowercase();
        let non_empty = NonEmptyString::new(s.clone()).map_err(|_| InvalidTypeError(s.clone()))?;

        let mut chars = s.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let rest_valid =
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !starts_with_letter || !rest_valid {
            return Err(InvalidTypeError(s));
        }

        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for TypeTag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a request type tag is malformed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid request type '{0}': must start with a letter and contain only letters, digits, '_' or '-'"
)]
pub struct InvalidTypeError(String);

/// The discriminator selecting which department view claims a request and how
/// its payload is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestType {
    /// Employee loan or salary advance.
    Loan,
    /// IT or office asset allocation.
    Asset,
    /// Candidate interview scheduling.
    Interview,
    /// Manpower requisition form.
    Mrf,
    /// Employee grievance.
    Grievance,
    /// Leave of absence.
    Leave,
    /// Letter or certificate request.
    Document,
    /// Training or course enrolment.
    Training,
    /// Expense reimbursement.
    Reimbursement,
    /// Overtime claim.
    Overtime,
    /// Uniform issue.
    Uniform,
    /// Any other request type.
    Other(TypeTag),
}

impl RequestType {
    /// All request types with a dedicated payload shape.
    pub const KNOWN: [Self; 11] = [
        Self::Loan,
        Self::Asset,
        Self::Interview,
        Self::Mrf,
        Self::Grievance,
        Self::Leave,
        Self::Document,
        Self::Training,
        Self::Reimbursement,
        Self::Overtime,
        Self::Uniform,
    ];

    /// The lowercase wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Loan => "loan",
            Self::Asset => "asset",
            Self::Interview => "interview",
            Self::Mrf => "mrf",
            Self::Grievance => "grievance",
            Self::Leave => "leave",
            Self::Document => "document",
            Self::Training => "training",
            Self::Reimbursement => "reimbursement",
            Self::Overtime => "overtime",
            Self::Uniform => "uniform",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = InvalidTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = TypeTag::new(s)?;
        Ok(Self::KNOWN
            .into_iter()
            .find(|known| known.as_str() == tag.as_str())
            .unwrap_or(Self::Other(tag)))
    }
}

impl Serialize for RequestType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for RequestType {
    type Error = InvalidTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
