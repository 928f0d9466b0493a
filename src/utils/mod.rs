//! Utility functions and helpers.

pub mod http;
pub mod text;

/// Show only the first few characters of a credential.
pub fn mask_secret(secret: &str) -> String {
    const VISIBLE: usize = 4;

    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<unset>".to_string();
    }
    if trimmed.chars().count() <= VISIBLE * 2 {
        return "****".to_string();
    }
    let head: String = trimmed.chars().take(VISIBLE).collect();
    format!("{head}****")
}
