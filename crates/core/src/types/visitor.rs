//! Visitor targeting record.
//!
//! One record exists per visitor. It is persisted as JSON and handed to the
//! flag service as evaluation context:
//!
//! ```json
//! { "key": "demo-regular-user", "kind": "user", "country": "GB",
//!   "custom": { "vipStatus": "none" } }
//! ```

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Record key used for VIP visitors.
pub const VIP_USER_KEY: &str = "demo-vip-user";

/// Record key used for regular visitors.
pub const REGULAR_USER_KEY: &str = "demo-regular-user";

/// Market the visitor is targeted as.
///
/// Deserialization is strict: only `"GB"` and `"BE"` are accepted. Stored
/// records are read leniently through [`VisitorContext`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Country {
    #[default]
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "BE")]
    Be,
}

impl Country {
    /// Two-letter code as stored and sent to the flag service.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Gb => "GB",
            Self::Be => "BE",
        }
    }

    /// Every supported market, in display order.
    pub const ALL: [Self; 2] = [Self::Gb, Self::Be];
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// VIP segment of a visitor. Also the value type of the
/// `vip-gaming-experience` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VipStatus {
    #[default]
    None,
    Vip,
}

impl VipStatus {
    #[must_use]
    pub const fn is_vip(self) -> bool {
        matches!(self, Self::Vip)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Vip => "vip",
        }
    }
}

/// Context kind discriminator. Only `"user"` exists in this domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    #[default]
    User,
}

/// Custom targeting attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CustomAttributes {
    #[serde(rename = "vipStatus", default)]
    pub vip_status: VipStatus,
}

/// The persisted visitor targeting record.
///
/// `country` is always populated: a stored record without one, or with an
/// unknown code, reads back as [`Country::Gb`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitorContext {
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub kind: ContextKind,
    #[serde(default, deserialize_with = "lenient_country")]
    pub country: Country,
    #[serde(default)]
    pub custom: CustomAttributes,
}

impl VisitorContext {
    /// A regular (non-VIP) record for the given market.
    #[must_use]
    pub fn regular(country: Country) -> Self {
        Self {
            key: REGULAR_USER_KEY.to_string(),
            kind: ContextKind::User,
            country,
            custom: CustomAttributes {
                vip_status: VipStatus::None,
            },
        }
    }

    /// A VIP record for the given market.
    #[must_use]
    pub fn vip(country: Country) -> Self {
        Self {
            key: VIP_USER_KEY.to_string(),
            kind: ContextKind::User,
            country,
            custom: CustomAttributes {
                vip_status: VipStatus::Vip,
            },
        }
    }

    #[must_use]
    pub const fn vip_status(&self) -> VipStatus {
        self.custom.vip_status
    }

    #[must_use]
    pub const fn is_vip(&self) -> bool {
        self.custom.vip_status.is_vip()
    }
}

impl Default for VisitorContext {
    fn default() -> Self {
        Self::regular(Country::default())
    }
}

fn default_key() -> String {
    REGULAR_USER_KEY.to_string()
}

/// Reads a stored country code, mapping anything but `"BE"` to GB.
fn lenient_country<'de, D>(deserializer: D) -> Result<Country, D::Error>
where
    D: Deserializer<'de>,
{
    let code = Option::<String>::deserialize(deserializer)?;
    Ok(match code.as_deref() {
        Some("BE") => Country::Be,
        _ => Country::Gb,
    })
}
