//! Mobile-money provider profiles and dialing-prefix detection.
//!
//! Detection is a pure linear scan over a static, ordered table. The first
//! profile with a matching prefix wins.

use serde::{Deserialize, Serialize};

/// Country code that may precede a national number.
pub const COUNTRY_CODE: &str = "233";

/// Mobile-money network operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Mtn,
    Vodafone,
    AirtelTigo,
}

impl Provider {
    /// Stable lowercase key ("mtn", "vodafone", "airteltigo").
    pub fn key(&self) -> &'static str {
        match self {
            Self::Mtn => "mtn",
            Self::Vodafone => "vodafone",
            Self::AirtelTigo => "airteltigo",
        }
    }

    /// Static profile for this provider.
    pub fn profile(&self) -> &'static ProviderProfile {
        match self {
            Self::Mtn => &PROVIDERS[0],
            Self::Vodafone => &PROVIDERS[1],
            Self::AirtelTigo => &PROVIDERS[2],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.profile().display_name
    }
}

/// Immutable description of a provider and the prefixes it owns.
#[derive(Debug, PartialEq, Eq)]
pub struct ProviderProfile {
    pub key: Provider,
    pub display_name: &'static str,
    /// National-format prefixes, trunk `0` included.
    pub dialing_prefixes: &'static [&'static str],
}

impl ProviderProfile {
    /// Whether a two-digit network code belongs to this provider.
    ///
    /// Only the last two digits of each registered prefix take part in the
    /// comparison, so the trunk `0` never matters.
    pub fn owns(&self, network_code: &str) -> bool {
        self.dialing_prefixes
            .iter()
            .any(|prefix| prefix.get(1..) == Some(network_code))
    }
}

/// Detection order matters: the first matching profile wins.
pub const PROVIDERS: [ProviderProfile; 3] = [
    ProviderProfile {
        key: Provider::Mtn,
        display_name: "MTN MoMo",
        dialing_prefixes: &["024", "054", "055", "059"],
    },
    ProviderProfile {
        key: Provider::Vodafone,
        display_name: "Vodafone Cash",
        dialing_prefixes: &["020", "050"],
    },
    ProviderProfile {
        key: Provider::AirtelTigo,
        display_name: "AirtelTigo Money",
        dialing_prefixes: &["027", "057", "026", "056"],
    },
];

/// Strip everything that is not an ASCII digit.
pub fn clean_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// The three significant prefix digits of a cleaned number.
///
/// Numbers starting with the country code use characters `[3, 6)`, everything
/// else uses `[0, 3)`. Returns `None` below three digits. A number that is
/// little more than the country code yields whatever digits follow it.
pub fn significant_prefix(cleaned: &str) -> Option<&str> {
    if cleaned.len() < 3 {
        return None;
    }
    match cleaned.strip_prefix(COUNTRY_CODE) {
        Some(rest) => Some(&rest[..rest.len().min(3)]),
        None => Some(&cleaned[..3]),
    }
}

/// Two-digit network code carried by a significant prefix.
///
/// A prefix in national format ("024") carries it at positions `[1, 3)`; one
/// that followed the country code without a trunk `0` ("241") carries it at
/// `[0, 2)`.
pub fn network_code(prefix: &str) -> Option<&str> {
    prefix.strip_prefix('0').unwrap_or(prefix).get(..2)
}

/// Detect the provider for a raw, user-entered phone number.
pub fn detect_provider(phone: &str) -> Option<Provider> {
    let cleaned = clean_number(phone);
    let code = significant_prefix(&cleaned).and_then(network_code)?;

    PROVIDERS
        .iter()
        .find(|profile| profile.owns(code))
        .map(|profile| profile.key)
}
