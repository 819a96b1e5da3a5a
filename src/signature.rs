//! The XMSS signature: leaf index, message randomizer, WOTS+ chains, and
//! authentication path, with the flat wire layout of the construction.

use crate::error::{Error, XmssResult};
use crate::params::XmssParams;

/// An XMSS signature.
///
/// Serialized as `toByte(index, 4) || r(n) || wots_sig(len*n) ||
/// auth_path(h*n)` with no framing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmssSignature {
    leaf_index: u64,
    randomness: Vec<u8>,
    wots_signature: Vec<u8>,
    auth_path: Vec<u8>,
}

impl XmssSignature {
    pub(crate) fn new(
        leaf_index: u64,
        randomness: Vec<u8>,
        wots_signature: Vec<u8>,
        auth_path: Vec<u8>,
    ) -> Self {
        Self {
            leaf_index,
            randomness,
            wots_signature,
            auth_path,
        }
    }

    /// The leaf index this signature consumed.
    pub fn leaf_index(&self) -> u64 {
        self.leaf_index
    }

    /// The n-byte message randomizer `r`.
    pub fn randomness(&self) -> &[u8] {
        &self.randomness
    }

    /// The `len * n` bytes of WOTS+ chain values.
    pub fn wots_signature(&self) -> &[u8] {
        &self.wots_signature
    }

    /// The `h * n` bytes of sibling nodes from leaf to root.
    pub fn auth_path(&self) -> &[u8] {
        &self.auth_path
    }

    /// Serializes the signature into the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            4 + self.randomness.len() + self.wots_signature.len() + self.auth_path.len(),
        );
        out.extend_from_slice(&(self.leaf_index as u32).to_be_bytes());
        out.extend_from_slice(&self.randomness);
        out.extend_from_slice(&self.wots_signature);
        out.extend_from_slice(&self.auth_path);
        out
    }

    /// Parses a signature for the given parameter set, rejecting any byte
    /// string that is not exactly `4 + n + len*n + h*n` long.
    pub fn from_bytes(params: &XmssParams, bytes: &[u8]) -> XmssResult<Self> {
        let expected = params.signature_bytes();
        if bytes.len() != expected {
            return Err(Error::InvalidSignatureLength {
                expected,
                got: bytes.len(),
            });
        }

        let n = params.element_size();
        let wots_bytes = params.wots_signature_bytes();
        let leaf_index = u64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
        let randomness = bytes[4..4 + n].to_vec();
        let wots_signature = bytes[4 + n..4 + n + wots_bytes].to_vec();
        let auth_path = bytes[4 + n + wots_bytes..].to_vec();

        Ok(Self {
            leaf_index,
            randomness,
            wots_signature,
            auth_path,
        })
    }
}
