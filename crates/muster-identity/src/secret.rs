//! Account credentials.
//!
//! The secret file holds two whitespace-separated hex fields on the first
//! line: account id and passhash. Anything else is rejected.

use std::{fs, path::Path, str::FromStr};

use rand::Rng;

use crate::error::IdentityError;

/// Login credentials for the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    /// Stable account identifier.
    pub account: u64,
    /// Hash of the account secret.
    pub passhash: u64,
}

impl Credentials {
    /// Read credentials from a secret file.
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    /// Fresh throwaway credentials for accounts created on first login.
    pub fn ephemeral() -> Self {
        let mut rng = rand::rng();
        Self { account: rng.random(), passhash: rng.random() }
    }
}

impl FromStr for Credentials {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s
            .lines()
            .next()
            .ok_or_else(|| IdentityError::MalformedSecret("empty file".into()))?;
        let mut fields = line.split_whitespace();
        let account = parse_hex(fields.next(), "account")?;
        let passhash = parse_hex(fields.next(), "passhash")?;
        if fields.next().is_some() {
            return Err(IdentityError::MalformedSecret("trailing fields".into()));
        }
        Ok(Self { account, passhash })
    }
}

fn parse_hex(field: Option<&str>, name: &str) -> Result<u64, IdentityError> {
    let field =
        field.ok_or_else(|| IdentityError::MalformedSecret(format!("missing {name}")))?;
    u64::from_str_radix(field.trim_start_matches("0x"), 16)
        .map_err(|e| IdentityError::MalformedSecret(format!("{name}: {e}")))
}
