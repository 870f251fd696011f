//! MFA Provider Bits
//!
//! The set of MFA providers available to a user after a successful
//! primary-credential check. A set rather than a single value: the
//! chosen next step is carried separately in `AuthenticationState`,
//! while every available provider bit is reported so the caller can
//! offer an alternative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single MFA provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MfaProvider {
    /// One-time code delivered by email (always available)
    Email,
    /// Authenticator-app TOTP code
    App,
    /// FIDO2 hardware device assertion
    Device,
}

impl MfaProvider {
    const fn bit(self) -> u8 {
        match self {
            MfaProvider::Email => 0b001,
            MfaProvider::App => 0b010,
            MfaProvider::Device => 0b100,
        }
    }
}

/// Combinable set of MFA providers
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MfaProviders(u8);

impl MfaProviders {
    /// The empty set
    pub const NONE: MfaProviders = MfaProviders(0);

    /// Add a provider to the set
    pub fn insert(&mut self, provider: MfaProvider) {
        self.0 |= provider.bit();
    }

    /// Check membership
    pub fn contains(&self, provider: MfaProvider) -> bool {
        self.0 & provider.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of providers in the set
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}

impl FromIterator<MfaProvider> for MfaProviders {
    fn from_iter<I: IntoIterator<Item = MfaProvider>>(iter: I) -> Self {
        let mut set = MfaProviders::NONE;
        for provider in iter {
            set.insert(provider);
        }
        set
    }
}

impl fmt::Debug for MfaProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_set();
        for provider in [MfaProvider::Email, MfaProvider::App, MfaProvider::Device] {
            if self.contains(provider) {
                list.entry(&provider);
            }
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = MfaProviders::NONE;
        assert!(set.is_empty());
        assert!(!set.contains(MfaProvider::Email));
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = MfaProviders::NONE;
        set.insert(MfaProvider::Email);
        set.insert(MfaProvider::Device);

        assert!(set.contains(MfaProvider::Email));
        assert!(set.contains(MfaProvider::Device));
        assert!(!set.contains(MfaProvider::App));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = MfaProviders::NONE;
        set.insert(MfaProvider::App);
        set.insert(MfaProvider::App);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_iterator() {
        let set: MfaProviders = [MfaProvider::Email, MfaProvider::App].into_iter().collect();
        assert!(set.contains(MfaProvider::Email));
        assert!(set.contains(MfaProvider::App));
        assert!(!set.contains(MfaProvider::Device));
    }
}
