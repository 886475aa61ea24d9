//! Core type definitions for Keyfold.
//!
//! This crate defines the UI-agnostic types shared by the editing engine:
//! - Item, vault and member identifiers (UUID v7)
//! - Vault items with their typed field lists, tags and attachment metadata
//! - Member permission sets
//! - otpauth URL parsing for the QR capture flow
//!
//! Presentation concerns (layout, localization, file-size formatting) and
//! persistence concerns (encryption, sync) live with their respective
//! collaborators, not here.

mod ids;
mod item;
mod member;
mod otp;

pub use ids::{AttachmentId, ItemId, MemberId, VaultId};
pub use item::{AttachmentInfo, Field, FieldKind, FieldPatch, ItemPatch, VaultItem};
pub use member::{MemberStatus, Permissions, Vault, VaultMember};
pub use otp::{parse_otp_url, OtpParams};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid otpauth URL: {0}")]
    InvalidOtpUrl(String),
}
