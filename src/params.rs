use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// All single-tree XMSS parameter-set OIDs defined by the draft.
///
/// Each OID fixes the hash function, the element size `n`, and the tree
/// height `h`; everything else is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(non_camel_case_types)]
pub enum XmssOid {
    /// `XMSS-SHA2_10_256`
    XmssSha2_10_256 = 0x0000_0001,
    /// `XMSS-SHA2_16_256`
    XmssSha2_16_256 = 0x0000_0002,
    /// `XMSS-SHA2_20_256`
    XmssSha2_20_256 = 0x0000_0003,
    /// `XMSS-SHA2_10_512`
    XmssSha2_10_512 = 0x0000_0004,
    /// `XMSS-SHA2_16_512`
    XmssSha2_16_512 = 0x0000_0005,
    /// `XMSS-SHA2_20_512`
    XmssSha2_20_512 = 0x0000_0006,
    /// `XMSS-SHAKE_10_256`
    XmssShake_10_256 = 0x0000_0007,
    /// `XMSS-SHAKE_16_256`
    XmssShake_16_256 = 0x0000_0008,
    /// `XMSS-SHAKE_20_256`
    XmssShake_20_256 = 0x0000_0009,
    /// `XMSS-SHAKE_10_512`
    XmssShake_10_512 = 0x0000_000a,
    /// `XMSS-SHAKE_16_512`
    XmssShake_16_512 = 0x0000_000b,
    /// `XMSS-SHAKE_20_512`
    XmssShake_20_512 = 0x0000_000c,
}

/// Runtime parameters derived from an [`XmssOid`].
///
/// Immutable for the lifetime of a key. `len_1`, `len_2` and `len` follow
/// the draft:
/// `len_1 = ceil(8n / lg(w))`, `len_2 = floor(lg(len_1 * (w-1)) / lg(w)) + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XmssParams {
    oid: XmssOid,
    n: usize,
    w: u32,
    log2_w: u32,
    len_1: usize,
    len_2: usize,
    len: usize,
    tree_height: u32,
    hash_name: &'static str,
}

impl XmssOid {
    /// Returns the raw OID value as used in serialized keys.
    pub fn raw_oid(self) -> u32 {
        self as u32
    }

    /// Derives the full parameter set for this OID.
    pub fn parameters(self) -> XmssParams {
        use XmssOid::*;
        let (n, tree_height, hash_name) = match self {
            XmssSha2_10_256 => (32, 10, "SHA-256"),
            XmssSha2_16_256 => (32, 16, "SHA-256"),
            XmssSha2_20_256 => (32, 20, "SHA-256"),
            XmssSha2_10_512 => (64, 10, "SHA-512"),
            XmssSha2_16_512 => (64, 16, "SHA-512"),
            XmssSha2_20_512 => (64, 20, "SHA-512"),
            XmssShake_10_256 => (32, 10, "SHAKE-128"),
            XmssShake_16_256 => (32, 16, "SHAKE-128"),
            XmssShake_20_256 => (32, 20, "SHAKE-128"),
            XmssShake_10_512 => (64, 10, "SHAKE-256"),
            XmssShake_16_512 => (64, 16, "SHAKE-256"),
            XmssShake_20_512 => (64, 20, "SHAKE-256"),
        };

        let w = 16u32;
        let log2_w = 4u32;
        let len_1 = (8 * n as usize).div_ceil(log2_w as usize);
        let len_2 = ((len_1 * (w as usize - 1)).ilog2() / log2_w) as usize + 1;

        XmssParams {
            oid: self,
            n,
            w,
            log2_w,
            len_1,
            len_2,
            len: len_1 + len_2,
            tree_height,
            hash_name,
        }
    }
}

impl XmssParams {
    /// The OID these parameters were derived from.
    pub fn oid(&self) -> XmssOid {
        self.oid
    }

    /// Element size `n` in bytes (= output length of the hash function).
    pub fn element_size(&self) -> usize {
        self.n
    }

    /// The Winternitz parameter `w`.
    pub fn wots_parameter(&self) -> u32 {
        self.w
    }

    /// `lg(w)`, the number of message bits consumed per WOTS+ digit.
    pub fn log2_w(&self) -> u32 {
        self.log2_w
    }

    /// Number of message digits in a WOTS+ digit string.
    pub fn len_1(&self) -> usize {
        self.len_1
    }

    /// Number of checksum digits in a WOTS+ digit string.
    pub fn len_2(&self) -> usize {
        self.len_2
    }

    /// Total WOTS+ chain count `len = len_1 + len_2`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Height `h` of the Merkle tree.
    pub fn tree_height(&self) -> u32 {
        self.tree_height
    }

    /// Number of one-time key pairs, `2^h`.
    pub fn num_leaves(&self) -> u64 {
        1u64 << self.tree_height
    }

    /// Name of the underlying hash primitive, e.g. `"SHA-256"`.
    pub fn hash_function_name(&self) -> &'static str {
        self.hash_name
    }

    /// Size of a serialized WOTS+ signature, `len * n`.
    pub fn wots_signature_bytes(&self) -> usize {
        self.len * self.n
    }

    /// Size of a serialized XMSS signature:
    /// `index(4) + r(n) + wots_sig(len*n) + auth_path(h*n)`.
    pub fn signature_bytes(&self) -> usize {
        4 + self.n + self.wots_signature_bytes() + self.tree_height as usize * self.n
    }
}

impl TryFrom<u32> for XmssOid {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0000_0001 => Ok(Self::XmssSha2_10_256),
            0x0000_0002 => Ok(Self::XmssSha2_16_256),
            0x0000_0003 => Ok(Self::XmssSha2_20_256),
            0x0000_0004 => Ok(Self::XmssSha2_10_512),
            0x0000_0005 => Ok(Self::XmssSha2_16_512),
            0x0000_0006 => Ok(Self::XmssSha2_20_512),
            0x0000_0007 => Ok(Self::XmssShake_10_256),
            0x0000_0008 => Ok(Self::XmssShake_16_256),
            0x0000_0009 => Ok(Self::XmssShake_20_256),
            0x0000_000a => Ok(Self::XmssShake_10_512),
            0x0000_000b => Ok(Self::XmssShake_16_512),
            0x0000_000c => Ok(Self::XmssShake_20_512),
            _ => Err(Error::InvalidOid(value)),
        }
    }
}

impl FromStr for XmssOid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XMSS-SHA2_10_256" => Ok(Self::XmssSha2_10_256),
            "XMSS-SHA2_16_256" => Ok(Self::XmssSha2_16_256),
            "XMSS-SHA2_20_256" => Ok(Self::XmssSha2_20_256),
            "XMSS-SHA2_10_512" => Ok(Self::XmssSha2_10_512),
            "XMSS-SHA2_16_512" => Ok(Self::XmssSha2_16_512),
            "XMSS-SHA2_20_512" => Ok(Self::XmssSha2_20_512),
            "XMSS-SHAKE_10_256" => Ok(Self::XmssShake_10_256),
            "XMSS-SHAKE_16_256" => Ok(Self::XmssShake_16_256),
            "XMSS-SHAKE_20_256" => Ok(Self::XmssShake_20_256),
            "XMSS-SHAKE_10_512" => Ok(Self::XmssShake_10_512),
            "XMSS-SHAKE_16_512" => Ok(Self::XmssShake_16_512),
            "XMSS-SHAKE_20_512" => Ok(Self::XmssShake_20_512),
            _ => Err(Error::InvalidParameterSet(s.to_string())),
        }
    }
}

impl fmt::Display for XmssOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::XmssSha2_10_256 => "XMSS-SHA2_10_256",
            Self::XmssSha2_16_256 => "XMSS-SHA2_16_256",
            Self::XmssSha2_20_256 => "XMSS-SHA2_20_256",
            Self::XmssSha2_10_512 => "XMSS-SHA2_10_512",
            Self::XmssSha2_16_512 => "XMSS-SHA2_16_512",
            Self::XmssSha2_20_512 => "XMSS-SHA2_20_512",
            Self::XmssShake_10_256 => "XMSS-SHAKE_10_256",
            Self::XmssShake_16_256 => "XMSS-SHAKE_16_256",
            Self::XmssShake_20_256 => "XMSS-SHAKE_20_256",
            Self::XmssShake_10_512 => "XMSS-SHAKE_10_512",
            Self::XmssShake_16_512 => "XMSS-SHAKE_16_512",
            Self::XmssShake_20_512 => "XMSS-SHAKE_20_512",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha2_256_parameters() {
        let params = XmssOid::XmssSha2_10_256.parameters();
        assert_eq!(params.element_size(), 32);
        assert_eq!(params.wots_parameter(), 16);
        assert_eq!(params.len_1(), 64);
        assert_eq!(params.len_2(), 3);
        assert_eq!(params.len(), 67);
        assert_eq!(params.tree_height(), 10);
        assert_eq!(params.num_leaves(), 1024);
        assert_eq!(params.hash_function_name(), "SHA-256");
        assert_eq!(params.signature_bytes(), 2500);
    }

    #[test]
    fn sha2_512_parameters() {
        let params = XmssOid::XmssSha2_20_512.parameters();
        assert_eq!(params.element_size(), 64);
        assert_eq!(params.len_1(), 128);
        assert_eq!(params.len_2(), 3);
        assert_eq!(params.len(), 131);
        assert_eq!(params.tree_height(), 20);
        assert_eq!(params.hash_function_name(), "SHA-512");
    }

    #[test]
    fn shake_element_sizes() {
        assert_eq!(XmssOid::XmssShake_16_256.parameters().element_size(), 32);
        assert_eq!(XmssOid::XmssShake_16_512.parameters().element_size(), 64);
    }

    #[test]
    fn unknown_oid_is_rejected() {
        assert!(matches!(
            XmssOid::try_from(0x0000_000d),
            Err(Error::InvalidOid(0x0000_000d))
        ));
        assert!(matches!(XmssOid::try_from(0), Err(Error::InvalidOid(0))));
    }

    #[test]
    fn name_round_trip() {
        for raw in 1u32..=0x0c {
            let oid = XmssOid::try_from(raw).unwrap();
            assert_eq!(oid.to_string().parse::<XmssOid>().unwrap(), oid);
        }
    }
}
