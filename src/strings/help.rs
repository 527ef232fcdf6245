//! # Help Text
//!
//! Header and line format of the `/help` listing.

pub const HEADER: &str = "Available commands:";
pub const AUTH_MARKER: &str = " (requires sign-in)";

pub fn entry(trigger: &str, description: &str, requires_authentication: bool) -> String {
    format!(
        "{trigger} - {description}{}",
        if requires_authentication { AUTH_MARKER } else { "" }
    )
}
