//! Wire models for the 1Password Connect API.
//!
//! Field names follow the Connect JSON (camelCase). Enumerations accept the
//! uppercase names the API emits; unknown upstream values decode into a
//! catch-all variant so that reading an item never fails on a new category
//! or field type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vault visible to the configured Connect token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Reference from an item to the vault that holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVault {
    pub id: String,
}

/// An item stored in a vault.
///
/// Identity is `(vault.id, id)`; titles are not unique within a vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub vault: ItemVault,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategory>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ItemUrl>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub favorite: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub version: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<ItemSection>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ItemField>,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Item {
    /// Minimal reference used to address an item for deletion.
    pub fn reference(id: impl Into<String>, vault_id: impl Into<String>) -> Self {
        Self { id: id.into(), vault: ItemVault { id: vault_id.into() }, ..Self::default() }
    }
}

/// Item categories known to the Connect API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Login,
    Password,
    ApiCredential,
    Server,
    Database,
    CreditCard,
    Membership,
    Passport,
    SoftwareLicense,
    OutdoorLicense,
    SecureNote,
    WirelessRouter,
    BankAccount,
    DriverLicense,
    Identity,
    RewardProgram,
    Document,
    EmailAccount,
    SocialSecurityNumber,
    MedicalRecord,
    SshKey,
    #[serde(other)]
    Custom,
}

impl ItemCategory {
    /// Map a request category onto the categories the plugin can create.
    ///
    /// Only `login`, `password` and `database` are accepted (in any case);
    /// everything else yields `None` and the item is created without a category.
    pub fn from_request(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "login" => Some(Self::Login),
            "password" => Some(Self::Password),
            "database" => Some(Self::Database),
            _ => None,
        }
    }

    /// The uppercase name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Password => "PASSWORD",
            Self::ApiCredential => "API_CREDENTIAL",
            Self::Server => "SERVER",
            Self::Database => "DATABASE",
            Self::CreditCard => "CREDIT_CARD",
            Self::Membership => "MEMBERSHIP",
            Self::Passport => "PASSPORT",
            Self::SoftwareLicense => "SOFTWARE_LICENSE",
            Self::OutdoorLicense => "OUTDOOR_LICENSE",
            Self::SecureNote => "SECURE_NOTE",
            Self::WirelessRouter => "WIRELESS_ROUTER",
            Self::BankAccount => "BANK_ACCOUNT",
            Self::DriverLicense => "DRIVER_LICENSE",
            Self::Identity => "IDENTITY",
            Self::RewardProgram => "REWARD_PROGRAM",
            Self::Document => "DOCUMENT",
            Self::EmailAccount => "EMAIL_ACCOUNT",
            Self::SocialSecurityNumber => "SOCIAL_SECURITY_NUMBER",
            Self::MedicalRecord => "MEDICAL_RECORD",
            Self::SshKey => "SSH_KEY",
            Self::Custom => "CUSTOM",
        }
    }
}

/// A URL attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUrl {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub href: String,
}

/// A named group of fields inside an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSection {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Reference from a field to its section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub id: String,
}

/// A single labelled value on an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemField {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionRef>,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<FieldPurpose>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generate: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<GeneratorRecipe>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
}

/// Field value types known to the Connect API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    #[default]
    String,
    Email,
    Concealed,
    Url,
    Otp,
    Date,
    MonthYear,
    Menu,
    Address,
    Reference,
    #[serde(rename = "SSHKEY")]
    SshKey,
    CreditCardNumber,
    CreditCardType,
    Gender,
    Phone,
    #[serde(other)]
    Unknown,
}

/// Semantic role of a field on login and password items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldPurpose {
    #[serde(alias = "username")]
    Username,
    #[serde(alias = "password")]
    Password,
    #[serde(alias = "notes")]
    Notes,
}

/// Password generation recipe for fields with `generate: true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorRecipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub character_sets: Vec<CharacterSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_characters: Option<String>,
}

/// Character classes a generated value may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterSet {
    Letters,
    Digits,
    Symbols,
}
