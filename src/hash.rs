//! The keyed hash family of the construction: F, H, H_msg and PRF.
//!
//! All four functions produce n-byte outputs and are domain-separated by a
//! leading `toByte(x, n)` integer prefix. The underlying primitives come
//! from the `sha2`/`sha3` crates and are selected by name, so a caller
//! learns about a missing primitive at construction time rather than in the
//! middle of a signature.

use sha2::{Digest, Sha256, Sha512};
use sha3::{
    Shake128, Shake256,
    digest::{ExtendableOutput, Update, XofReader},
};

use crate::error::{Error, XmssResult};
use crate::params::XmssParams;

const HASH_PADDING_F: u64 = 0;
const HASH_PADDING_H: u64 = 1;
const HASH_PADDING_HASH: u64 = 2;
const HASH_PADDING_PRF: u64 = 3;

/// `toByte(x, k)`: writes the big-endian `k`-byte representation of `x`,
/// where `k` is the length of `out`.
pub(crate) fn to_byte(out: &mut [u8], mut val: u64) {
    for byte in out.iter_mut().rev() {
        *byte = (val & 0xff) as u8;
        val >>= 8;
    }
}

/// The hash primitives this engine can be parameterized over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HashKind {
    Sha256,
    Sha512,
    Shake128,
    Shake256,
}

impl HashKind {
    fn for_name(name: &str) -> XmssResult<Self> {
        match name {
            "SHA-256" => Ok(Self::Sha256),
            "SHA-512" => Ok(Self::Sha512),
            "SHAKE-128" => Ok(Self::Shake128),
            "SHAKE-256" => Ok(Self::Shake256),
            _ => Err(Error::HashUnavailable(name.to_string())),
        }
    }

    fn engine(self) -> HashEngine {
        match self {
            Self::Sha256 => HashEngine::Sha256(Sha256::new()),
            Self::Sha512 => HashEngine::Sha512(Sha512::new()),
            Self::Shake128 => HashEngine::Shake128(Shake128::default()),
            Self::Shake256 => HashEngine::Shake256(Shake256::default()),
        }
    }
}

/// An incremental hasher over one of the supported primitives.
enum HashEngine {
    Sha256(Sha256),
    Sha512(Sha512),
    Shake128(Shake128),
    Shake256(Shake256),
}

impl HashEngine {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => Digest::update(h, data),
            Self::Sha512(h) => Digest::update(h, data),
            Self::Shake128(h) => Update::update(h, data),
            Self::Shake256(h) => Update::update(h, data),
        }
    }

    fn finalize(self, out: &mut [u8]) {
        match self {
            Self::Sha256(h) => out.copy_from_slice(&h.finalize()[..out.len()]),
            Self::Sha512(h) => out.copy_from_slice(&h.finalize()[..out.len()]),
            Self::Shake128(h) => h.finalize_xof().read(out),
            Self::Shake256(h) => h.finalize_xof().read(out),
        }
    }
}

/// The four keyed hash functions, bound to one parameter set.
///
/// `f`, `h` and `prf` are pure; the incremental H_msg state lives in the
/// [`MessageHasher`] values this type hands out, so one `XmssHash` can be
/// shared freely within a thread and cloned per worker for parallel work.
#[derive(Clone, Copy, Debug)]
pub struct XmssHash {
    n: usize,
    kind: HashKind,
}

impl XmssHash {
    /// Binds the hash family to a parameter set.
    ///
    /// Fails with [`Error::HashUnavailable`] when the parameter set names a
    /// primitive this build does not provide.
    pub fn new(params: &XmssParams) -> XmssResult<Self> {
        let kind = HashKind::for_name(params.hash_function_name())?;
        Ok(Self {
            n: params.element_size(),
            kind,
        })
    }

    /// Opens an engine preloaded with `toByte(domain, n) || key`.
    fn keyed(&self, domain: u64, key: &[u8]) -> HashEngine {
        let mut pad = vec![0u8; self.n];
        to_byte(&mut pad, domain);
        let mut engine = self.kind.engine();
        engine.update(&pad);
        engine.update(key);
        engine
    }

    fn finish(&self, engine: HashEngine) -> Vec<u8> {
        let mut out = vec![0u8; self.n];
        engine.finalize(&mut out);
        out
    }

    /// `F(key, m) = Hash(toByte(0, n) || key || m)` for an n-byte `m`.
    pub fn f(&self, key: &[u8], input: &[u8]) -> Vec<u8> {
        debug_assert_eq!(key.len(), self.n);
        debug_assert_eq!(input.len(), self.n);
        let mut engine = self.keyed(HASH_PADDING_F, key);
        engine.update(input);
        self.finish(engine)
    }

    /// `H(key, m) = Hash(toByte(1, n) || key || m)` for a 2n-byte `m`.
    pub fn h(&self, key: &[u8], input: &[u8]) -> Vec<u8> {
        debug_assert_eq!(key.len(), self.n);
        debug_assert_eq!(input.len(), 2 * self.n);
        let mut engine = self.keyed(HASH_PADDING_H, key);
        engine.update(input);
        self.finish(engine)
    }

    /// `PRF(key, m) = Hash(toByte(3, n) || key || m)` for a 32-byte `m`
    /// (an address, or `toByte(i, 32)` when deriving the randomizer).
    pub fn prf(&self, key: &[u8], input: &[u8; 32]) -> Vec<u8> {
        debug_assert_eq!(key.len(), self.n);
        let mut engine = self.keyed(HASH_PADDING_PRF, key);
        engine.update(input);
        self.finish(engine)
    }

    /// Opens the incremental `H_msg` stream keyed with
    /// `randomness || root || index_bytes` (prefixed by `toByte(2, n)`).
    pub fn h_msg_init(
        &self,
        randomness: &[u8],
        root: &[u8],
        index_bytes: &[u8],
    ) -> MessageHasher {
        let mut engine = self.keyed(HASH_PADDING_HASH, randomness);
        engine.update(root);
        engine.update(index_bytes);
        MessageHasher { n: self.n, engine }
    }
}

/// An open `H_msg` stream. Consumes message bytes incrementally; finalizing
/// yields the n-byte message hash and closes the stream.
pub struct MessageHasher {
    n: usize,
    engine: HashEngine,
}

impl MessageHasher {
    /// Feeds message bytes into the stream.
    pub fn update(&mut self, msg: &[u8]) {
        self.engine.update(msg);
    }

    /// Finalizes the stream to the n-byte message hash.
    pub fn finalize(self) -> Vec<u8> {
        let mut out = vec![0u8; self.n];
        self.engine.finalize(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::XmssOid;

    fn hash() -> XmssHash {
        XmssHash::new(&XmssOid::XmssSha2_10_256.parameters()).unwrap()
    }

    #[test]
    fn to_byte_is_big_endian() {
        let mut out = [0u8; 4];
        to_byte(&mut out, 0x0102_0304);
        assert_eq!(out, [1, 2, 3, 4]);

        let mut wide = [0u8; 32];
        to_byte(&mut wide, 5);
        assert_eq!(wide[31], 5);
        assert!(wide[..31].iter().all(|&b| b == 0));
    }

    #[test]
    fn outputs_are_element_sized() {
        let hash = hash();
        let key = [0u8; 32];
        assert_eq!(hash.f(&key, &[1u8; 32]).len(), 32);
        assert_eq!(hash.h(&key, &[1u8; 64]).len(), 32);
        assert_eq!(hash.prf(&key, &[1u8; 32]).len(), 32);
    }

    #[test]
    fn domains_are_separated() {
        let hash = hash();
        let key = [7u8; 32];
        let m = [9u8; 32];
        // F and PRF hash the same key and input under different prefixes.
        assert_ne!(hash.f(&key, &m), hash.prf(&key, &m));
    }

    #[test]
    fn h_msg_is_incremental() {
        let hash = hash();
        let r = [1u8; 32];
        let root = [2u8; 32];
        let idx = [3u8; 32];
        let msg = b"an arbitrary-length message fed in pieces";

        let mut one = hash.h_msg_init(&r, &root, &idx);
        one.update(msg);
        let whole = one.finalize();

        let mut two = hash.h_msg_init(&r, &root, &idx);
        for chunk in msg.chunks(7) {
            two.update(chunk);
        }
        assert_eq!(two.finalize(), whole);
    }

    #[test]
    fn unknown_hash_name_is_rejected() {
        assert!(matches!(
            HashKind::for_name("MD5"),
            Err(Error::HashUnavailable(_))
        ));
    }

    #[test]
    fn shake_engines_emit_n_bytes() {
        let params = XmssOid::XmssShake_10_256.parameters();
        let hash = XmssHash::new(&params).unwrap();
        assert_eq!(hash.prf(&[0u8; 32], &[0u8; 32]).len(), 32);

        let params = XmssOid::XmssShake_10_512.parameters();
        let hash = XmssHash::new(&params).unwrap();
        assert_eq!(hash.prf(&[0u8; 64], &[0u8; 32]).len(), 64);
    }
}
