//! # Adapter Registry Module
//!
//! Identifies which GameCube adapter a device is from the opaque id string
//! the input source reports, and picks the mapping family for it.
//!
//! ## Known Adapters
//!
//! Checked in this order, first match wins:
//!
//! | Adapter | Id matches | Family |
//! |---------|------------|--------|
//! | Nintendo WUP-028 | `057e…0337`, `wup-028`, `gamecube adapter` | nintendo |
//! | Mayflash GameCube Adapter | `mayflash…gamecube`, `0079…1844`, `0079…1843` | mayflash |
//! | Mayflash GameCube Adapter (Wii U Mode) | `0079…1800` | nintendo |
//! | Raphnet GameCube Adapter | `raphnet`, `289b` | raphnet |
//! | 8BitDo GBros Adapter | `8bitdo…gbros`, `2dc8…5106` | standard |
//! | Brook GameCube Converter | `brook…gamecube`, `brook…gc` | standard |
//! | Generic GameCube Adapter | `gamecube`, `0079`, `gc…controller`, `gc…adapter` | generic |
//!
//! `a…b` means `a` followed by `b` anywhere later in the id. Matching is
//! case-insensitive.
//!
//! ## Usage
//!
//! ```
//! use gc_input::controller::adapters::identify_or_fallback;
//! use gc_input::controller::mapping::MappingKind;
//!
//! let adapter = identify_or_fallback("0079-1844 Mayflash GameCube", false);
//! assert_eq!(adapter.name, "Mayflash GameCube Adapter");
//! assert_eq!(adapter.mapping, MappingKind::Mayflash);
//! ```

use super::mapping::MappingKind;

/// A device-id pattern: alternatives, each an ordered list of fragments.
///
/// An alternative matches when all of its fragments occur in the lowercase
/// id, each one after the end of the previous.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    alternatives: &'static [&'static [&'static str]],
}

impl Matcher {
    #[must_use]
    pub const fn new(alternatives: &'static [&'static [&'static str]]) -> Self {
        Self { alternatives }
    }

    /// Returns whether `device_id` matches any alternative.
    #[must_use]
    pub fn matches(&self, device_id: &str) -> bool {
        let id = device_id.to_ascii_lowercase();
        self.alternatives
            .iter()
            .any(|fragments| contains_in_order(&id, fragments))
    }
}

fn contains_in_order(haystack: &str, fragments: &[&str]) -> bool {
    let mut rest = haystack;
    for fragment in fragments {
        match rest.find(fragment) {
            Some(pos) => rest = &rest[pos + fragment.len()..],
            None => return false,
        }
    }
    true
}

/// A known adapter model.
#[derive(Debug, Clone, Copy)]
pub struct AdapterSignature {
    pub name: &'static str,
    pub matcher: Matcher,
    pub mapping: MappingKind,
    /// Controller ports the adapter exposes per device.
    pub ports: u8,
}

/// Result of a successful registry lookup.
#[derive(Debug, Clone, Copy)]
pub struct Identified {
    pub signature: &'static AdapterSignature,
    /// Position of the signature in [`ADAPTERS`].
    pub index: usize,
}

/// Known adapters in priority order. The generic catch-all must stay last.
pub static ADAPTERS: [AdapterSignature; 7] = [
    AdapterSignature {
        name: "Nintendo WUP-028",
        matcher: Matcher::new(&[&["057e", "0337"], &["wup-028"], &["gamecube adapter"]]),
        mapping: MappingKind::Nintendo,
        ports: 1,
    },
    AdapterSignature {
        name: "Mayflash GameCube Adapter",
        matcher: Matcher::new(&[&["mayflash", "gamecube"], &["0079", "1844"], &["0079", "1843"]]),
        mapping: MappingKind::Mayflash,
        ports: 1,
    },
    AdapterSignature {
        name: "Mayflash GameCube Adapter (Wii U Mode)",
        matcher: Matcher::new(&[&["0079", "1800"]]),
        mapping: MappingKind::Nintendo,
        ports: 1,
    },
    AdapterSignature {
        name: "Raphnet GameCube Adapter",
        matcher: Matcher::new(&[&["raphnet"], &["289b"]]),
        mapping: MappingKind::Raphnet,
        ports: 1,
    },
    AdapterSignature {
        name: "8BitDo GBros Adapter",
        matcher: Matcher::new(&[&["8bitdo", "gbros"], &["2dc8", "5106"]]),
        mapping: MappingKind::Standard,
        ports: 1,
    },
    AdapterSignature {
        name: "Brook GameCube Converter",
        matcher: Matcher::new(&[&["brook", "gamecube"], &["brook", "gc"]]),
        mapping: MappingKind::Standard,
        ports: 1,
    },
    AdapterSignature {
        name: "Generic GameCube Adapter",
        matcher: Matcher::new(&[&["gamecube"], &["0079"], &["gc", "controller"], &["gc", "adapter"]]),
        mapping: MappingKind::Generic,
        ports: 1,
    },
];

/// Name reported for devices no signature matches.
pub const UNKNOWN_ADAPTER_NAME: &str = "Unknown Adapter";

static UNKNOWN_STANDARD: AdapterSignature = AdapterSignature {
    name: UNKNOWN_ADAPTER_NAME,
    matcher: Matcher::new(&[]),
    mapping: MappingKind::Standard,
    ports: 1,
};

static UNKNOWN_GENERIC: AdapterSignature = AdapterSignature {
    name: UNKNOWN_ADAPTER_NAME,
    matcher: Matcher::new(&[]),
    mapping: MappingKind::Generic,
    ports: 1,
};

/// Looks `device_id` up in [`ADAPTERS`].
///
/// Returns `None` when no signature matches.
#[must_use]
pub fn identify(device_id: &str) -> Option<Identified> {
    ADAPTERS
        .iter()
        .enumerate()
        .find(|(_, signature)| signature.matcher.matches(device_id))
        .map(|(index, signature)| Identified { signature, index })
}

/// Like [`identify`], but never fails.
///
/// Unmatched devices get an "Unknown Adapter" signature using the standard
/// family when the device reports the platform's standard gamepad layout and
/// the generic family otherwise.
#[must_use]
pub fn identify_or_fallback(device_id: &str, standard_layout: bool) -> &'static AdapterSignature {
    match identify(device_id) {
        Some(found) => found.signature,
        None if standard_layout => &UNKNOWN_STANDARD,
        None => &UNKNOWN_GENERIC,
    }
}
