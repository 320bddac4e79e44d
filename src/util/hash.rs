//! Hashing utilities for stable object identifiers.
//!
//! Xcode identifies every object in a project document with a 96-bit
//! hexadecimal string. Deriving it from content keeps regenerated projects
//! byte-identical across runs.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add multiple strings to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize into a 24-digit uppercase object identifier.
    pub fn finish_object_id(self) -> String {
        self.finish()[..24].to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_are_nul_terminated() {
        let mut fp = Fingerprint::new();
        fp.update_str("hello");
        assert_eq!(
            fp.finish(),
            "f3aefe62965a91903610f0e23cc8a69d5b87cea6d28e75489b0d2ca02ed7993c"
        );
    }

    #[test]
    fn test_fingerprint_separates_components() {
        let joined = {
            let mut fp = Fingerprint::new();
            fp.update_str("ab").update_str("c");
            fp.finish()
        };
        let split = {
            let mut fp = Fingerprint::new();
            fp.update_str("a").update_str("bc");
            fp.finish()
        };
        assert_ne!(joined, split);
    }

    #[test]
    fn test_object_id_shape() {
        let mut fp = Fingerprint::new();
        fp.update_strs(["target", "core-debug", "core-release"]);
        let id = fp.finish_object_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
