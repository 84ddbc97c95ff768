//! Integrity hashing: named digest algorithms over canonical bytes.
//!
//! **Exactly one place defines integrity hashing.** Algorithms are selected
//! by name (the names published alongside PLRS hashes, e.g. `"sha256"`);
//! unknown names are rejected when parsed, before any hashing begins.
//!
//! Digests are lowercase hex with no algorithm prefix, matching the `Hash`
//! fields stored in index entries, bundles and custody logs.

use sha2::Digest;

/// Error selecting a digest algorithm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The requested algorithm name is not supported.
    #[error("unsupported hash algorithm: {name}")]
    UnsupportedAlgorithm { name: String },
}

/// Declares `HashAlgorithm`, its names, `ALL`, and the digest dispatch from one list.
macro_rules! define_hash_algorithms {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $name:literal, $hasher:ty
        ),+ $(,)?
    ) => {
        /// A supported integrity digest algorithm.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum HashAlgorithm {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashAlgorithm {
            /// All algorithms in declaration order.
            pub const ALL: &[HashAlgorithm] = &[
                $( Self::$variant, )+
            ];

            /// The published algorithm name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }

            /// Digest `data`, returning the raw digest bytes.
            #[must_use]
            pub fn digest_bytes(self, data: &[u8]) -> Vec<u8> {
                match self {
                    $( Self::$variant => <$hasher>::digest(data).to_vec(), )+
                }
            }
        }
    };
}

define_hash_algorithms! {
    /// SHA-224.
    Sha224 => "sha224", sha2::Sha224,
    /// SHA-256 (default for every PLRS artifact).
    Sha256 => "sha256", sha2::Sha256,
    /// SHA-384.
    Sha384 => "sha384", sha2::Sha384,
    /// SHA-512.
    Sha512 => "sha512", sha2::Sha512,
    /// SHA-512/224.
    Sha512t224 => "sha512_224", sha2::Sha512_224,
    /// SHA-512/256.
    Sha512t256 => "sha512_256", sha2::Sha512_256,
}

/// The algorithm used when none is named.
pub const DEFAULT_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

impl Default for HashAlgorithm {
    fn default() -> Self {
        DEFAULT_ALGORITHM
    }
}

impl HashAlgorithm {
    /// Look up an algorithm by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::UnsupportedAlgorithm`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self, DigestError> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DigestError::UnsupportedAlgorithm {
                name: name.to_string(),
            })
    }

    /// Length of the hex digest this algorithm produces.
    #[must_use]
    pub fn hex_len(self) -> usize {
        self.digest_bytes(b"").len() * 2
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest `data` with `algorithm`, returning lowercase hex.
#[must_use]
pub fn digest_hex(data: &[u8], algorithm: HashAlgorithm) -> String {
    hex::encode(algorithm.digest_bytes(data))
}
