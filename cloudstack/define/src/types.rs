//! Catalog type tags.
//!
//! The catalog describes every parameter and response field with a short,
//! lower-case type tag (`"boolean"`, `"long"`, `"map"`, ...). [`PrimitiveType`]
//! is the closed set of tags the generator understands, plus an explicit
//! [`PrimitiveType::Other`] arm so unknown tags are carried rather than
//! rejected.

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// A catalog primitive type tag.
///
/// Parsing never fails: anything not listed lands in [`PrimitiveType::Other`].
///
/// ## Examples
///
/// ```
/// use cloudstack_define::PrimitiveType;
///
/// assert_eq!("long".parse::<PrimitiveType>(), Ok(PrimitiveType::Long));
/// assert_eq!("uservmresponse".parse::<PrimitiveType>(), Ok(PrimitiveType::UserVmResponse));
/// assert_eq!(
///     "imageformat".parse::<PrimitiveType>(),
///     Ok(PrimitiveType::Other("imageformat".to_string()))
/// );
/// assert_eq!(PrimitiveType::Map.as_tag(), "map");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(from = "String", into = "String")]
pub enum PrimitiveType {
    Boolean,
    Short,
    Int,
    Integer,
    Long,
    Float,
    List,
    Map,
    Set,
    ResponseObject,
    UserVmResponse,
    OutOfBandManagementResponse,
    #[default]
    String,
    Uuid,
    Date,
    /// Any tag outside the known set.
    #[strum(default)]
    Other(String),
}

impl PrimitiveType {
    /// Returns the catalog tag for this type.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Short => "short",
            Self::Int => "int",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::List => "list",
            Self::Map => "map",
            Self::Set => "set",
            Self::ResponseObject => "responseobject",
            Self::UserVmResponse => "uservmresponse",
            Self::OutOfBandManagementResponse => "outofbandmanagementresponse",
            Self::String => "string",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for PrimitiveType {
    fn from(tag: String) -> Self {
        tag.parse().unwrap_or(Self::Other(tag))
    }
}

impl From<PrimitiveType> for String {
    fn from(kind: PrimitiveType) -> Self {
        kind.as_tag().to_string()
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}
