//! WOTS+ one-time signatures: secret-key derivation, signing, and
//! public-key recovery.
//!
//! Secret elements are never stored; element `j` of leaf `i` is derived on
//! demand as `PRF(S_XMSS, ADRS)` with the OTS address set to `(i, j)`, so a
//! tree of one-time keys costs only the master seed. All key material is
//! handled flat, as `len` consecutive n-byte elements.

use zeroize::Zeroize;

use crate::address::{Address, KeyMask};
use crate::error::{Error, XmssResult};
use crate::hash::{XmssHash, to_byte};
use crate::params::XmssParams;

/// `base_w`: unpacks bytes into base-w digits, most significant bits first.
pub(crate) fn base_w(params: &XmssParams, output: &mut [u32], input: &[u8]) {
    let mut in_idx = 0;
    let mut total: u8 = 0;
    let mut bits: u32 = 0;

    for digit in output.iter_mut() {
        if bits == 0 {
            total = input[in_idx];
            in_idx += 1;
            bits = 8;
        }
        bits -= params.log2_w();
        *digit = u32::from(total >> bits) & (params.wots_parameter() - 1);
    }
}

/// Computes the checksum digits over the message digits:
/// `C = sum(w - 1 - m_i)`, left-aligned to a whole number of digits.
fn checksum(params: &XmssParams, csum_digits: &mut [u32], msg_digits: &[u32]) {
    let mut csum: u32 = 0;
    for digit in msg_digits {
        csum += params.wots_parameter() - 1 - digit;
    }

    let csum_bits = params.len_2() as u32 * params.log2_w();
    csum <<= (8 - (csum_bits % 8)) % 8;
    let mut csum_bytes = vec![0u8; csum_bits.div_ceil(8) as usize];
    to_byte(&mut csum_bytes, u64::from(csum));
    base_w(params, csum_digits, &csum_bytes);
}

/// Derives the full length-`len` digit string for a message digest:
/// `len_1` message digits followed by `len_2` checksum digits.
pub(crate) fn chain_lengths(params: &XmssParams, msg: &[u8]) -> Vec<u32> {
    let mut lengths = vec![0u32; params.len()];
    let (msg_digits, csum_digits) = lengths.split_at_mut(params.len_1());
    base_w(params, msg_digits, msg);
    checksum(params, csum_digits, msg_digits);
    lengths
}

/// The chaining function: iterates `F` over `x` for `steps` steps starting
/// at `start`, with a fresh key and bitmask per step from `PRF(SEED, ADRS)`.
///
/// Chains never run past `w - 1`; correct callers stay in range and the
/// loop bound enforces the domain.
pub(crate) fn chain(
    hash: &XmssHash,
    params: &XmssParams,
    x: &mut [u8],
    start: u32,
    steps: u32,
    adrs: &mut Address,
    public_seed: &[u8],
) {
    let mut i = start;
    while i < start + steps && i < params.wots_parameter() {
        adrs.set_hash_address(i);

        adrs.set_key_mask_mode(KeyMask::MaskMode);
        let bitmask = hash.prf(public_seed, &adrs.bytes());
        for (byte, mask) in x.iter_mut().zip(bitmask.iter()) {
            *byte ^= mask;
        }

        adrs.set_key_mask_mode(KeyMask::KeyMode);
        let key = hash.prf(public_seed, &adrs.bytes());
        let next = hash.f(&key, x);
        x.copy_from_slice(&next);
        i += 1;
    }
}

/// Derives the `len` secret elements for the leaf addressed by `adrs`
/// (OTS type, `ots_address` already set) into `out`.
fn expand_secret(
    hash: &XmssHash,
    params: &XmssParams,
    out: &mut [u8],
    secret_seed: &[u8],
    adrs: &mut Address,
) {
    let n = params.element_size();
    adrs.set_hash_address(0);
    adrs.set_key_mask_mode(KeyMask::KeyMode);
    for j in 0..params.len() {
        adrs.set_chain_address(j as u32);
        let mut element = hash.prf(secret_seed, &adrs.bytes());
        out[j * n..(j + 1) * n].copy_from_slice(&element);
        element.zeroize();
    }
}

/// Computes the WOTS+ public key for the leaf addressed by `adrs`: every
/// secret element chained to position `w - 1`.
pub(crate) fn public_key(
    hash: &XmssHash,
    params: &XmssParams,
    secret_seed: &[u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> Vec<u8> {
    let n = params.element_size();
    let mut pk = vec![0u8; params.len() * n];
    expand_secret(hash, params, &mut pk, secret_seed, adrs);

    for j in 0..params.len() {
        adrs.set_chain_address(j as u32);
        chain(
            hash,
            params,
            &mut pk[j * n..(j + 1) * n],
            0,
            params.wots_parameter() - 1,
            adrs,
            public_seed,
        );
    }
    pk
}

/// Signs an n-byte message digest with the one-time key of the leaf
/// addressed by `adrs`: element `j` chained for `b[j]` steps.
pub(crate) fn sign(
    hash: &XmssHash,
    params: &XmssParams,
    secret_seed: &[u8],
    msg: &[u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> Vec<u8> {
    debug_assert_eq!(msg.len(), params.element_size());
    let n = params.element_size();
    let lengths = chain_lengths(params, msg);

    let mut sig = vec![0u8; params.len() * n];
    expand_secret(hash, params, &mut sig, secret_seed, adrs);

    for (j, steps) in lengths.iter().enumerate() {
        adrs.set_chain_address(j as u32);
        chain(
            hash,
            params,
            &mut sig[j * n..(j + 1) * n],
            0,
            *steps,
            adrs,
            public_seed,
        );
    }
    sig
}

/// Recovers the WOTS+ public key from a message digest and its signature
/// by running every chain for the remaining `w - 1 - b[j]` steps.
///
/// This is the recovery half of verification; the caller compresses the
/// result with an L-tree and checks it against the authentication path.
pub fn pk_from_signature(
    hash: &XmssHash,
    params: &XmssParams,
    msg: &[u8],
    sig: &[u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> XmssResult<Vec<u8>> {
    let n = params.element_size();
    let expected = params.wots_signature_bytes();
    if sig.len() != expected {
        return Err(Error::InvalidSignatureLength {
            expected,
            got: sig.len(),
        });
    }

    let lengths = chain_lengths(params, msg);
    let mut pk = sig.to_vec();
    for (j, digit) in lengths.iter().enumerate() {
        adrs.set_chain_address(j as u32);
        chain(
            hash,
            params,
            &mut pk[j * n..(j + 1) * n],
            *digit,
            params.wots_parameter() - 1 - *digit,
            adrs,
            public_seed,
        );
    }
    Ok(pk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressType;
    use crate::params::XmssOid;

    fn setup() -> (XmssParams, XmssHash) {
        let params = XmssOid::XmssSha2_10_256.parameters();
        let hash = XmssHash::new(&params).unwrap();
        (params, hash)
    }

    fn ots_adrs(leaf: u32) -> Address {
        let mut adrs = Address::new(AddressType::OtsHash);
        adrs.set_ots_address(leaf);
        adrs
    }

    #[test]
    fn base_w_unpacks_nibbles() {
        let (params, _) = setup();
        let mut digits = [0u32; 4];
        base_w(&params, &mut digits, &[0x12, 0x34]);
        assert_eq!(digits, [1, 2, 3, 4]);
    }

    #[test]
    fn checksum_digits() {
        let (params, _) = setup();
        // C over [1, 2, 3, 4] = 14 + 13 + 12 + 11 = 50; shifted left by 4
        // and re-read in base 16 this is [0, 3, 2].
        let mut csum = [0u32; 3];
        checksum(&params, &mut csum, &[1, 2, 3, 4]);
        assert_eq!(csum, [0, 3, 2]);
    }

    #[test]
    fn chain_with_zero_steps_is_identity() {
        let (params, hash) = setup();
        let seed = [2u8; 32];
        let mut adrs = Address::new(AddressType::OtsHash);
        let x = [0x5au8; 32];
        let mut out = x;
        chain(&hash, &params, &mut out, 5, 0, &mut adrs, &seed);
        assert_eq!(out, x);
    }

    #[test]
    fn chain_composes() {
        let (params, hash) = setup();
        let seed = [2u8; 32];
        let x = [0x33u8; 32];

        let mut whole = x;
        let mut adrs = Address::new(AddressType::OtsHash);
        chain(&hash, &params, &mut whole, 0, 11, &mut adrs, &seed);

        let mut split = x;
        let mut adrs = Address::new(AddressType::OtsHash);
        chain(&hash, &params, &mut split, 0, 4, &mut adrs, &seed);
        chain(&hash, &params, &mut split, 4, 7, &mut adrs, &seed);

        assert_eq!(whole, split);
    }

    #[test]
    fn chain_clamps_at_w_minus_one() {
        let (params, hash) = setup();
        let seed = [2u8; 32];
        let x = [0x33u8; 32];

        let mut clamped = x;
        let mut adrs = Address::new(AddressType::OtsHash);
        chain(&hash, &params, &mut clamped, 10, 100, &mut adrs, &seed);

        let mut exact = x;
        let mut adrs = Address::new(AddressType::OtsHash);
        chain(&hash, &params, &mut exact, 10, 6, &mut adrs, &seed);

        assert_eq!(clamped, exact);
    }

    #[test]
    fn public_key_recovered_from_signature() {
        let (params, hash) = setup();
        let secret_seed = [0x42u8; 32];
        let public_seed = [0x24u8; 32];
        let msg = [0xa5u8; 32];

        let pk = public_key(&hash, &params, &secret_seed, &mut ots_adrs(3), &public_seed);
        let sig = sign(
            &hash,
            &params,
            &secret_seed,
            &msg,
            &mut ots_adrs(3),
            &public_seed,
        );
        let recovered =
            pk_from_signature(&hash, &params, &msg, &sig, &mut ots_adrs(3), &public_seed)
                .unwrap();

        assert_eq!(recovered, pk);
    }

    #[test]
    fn zero_digit_leaves_secret_element_unchained() {
        let (params, hash) = setup();
        let n = params.element_size();
        let secret_seed = [0x42u8; 32];
        let public_seed = [0x24u8; 32];

        // An all-zero digest has message digits of 0: sigma[j] == priv[j]
        // for every message chain.
        let msg = [0u8; 32];
        let sig = sign(
            &hash,
            &params,
            &secret_seed,
            &msg,
            &mut ots_adrs(0),
            &public_seed,
        );

        let mut secrets = vec![0u8; params.len() * n];
        expand_secret(&hash, &params, &mut secrets, &secret_seed, &mut ots_adrs(0));
        assert_eq!(
            &sig[..params.len_1() * n],
            &secrets[..params.len_1() * n]
        );

        // And recovery of a maxed digit runs zero remaining steps: for an
        // all-ones digest, recovered message chains equal the signature.
        let msg = [0xffu8; 32];
        let sig = sign(
            &hash,
            &params,
            &secret_seed,
            &msg,
            &mut ots_adrs(0),
            &public_seed,
        );
        let recovered =
            pk_from_signature(&hash, &params, &msg, &sig, &mut ots_adrs(0), &public_seed)
                .unwrap();
        assert_eq!(
            &recovered[..params.len_1() * n],
            &sig[..params.len_1() * n]
        );
    }

    #[test]
    fn short_signature_is_rejected() {
        let (params, hash) = setup();
        let mut adrs = Address::new(AddressType::OtsHash);
        let result = pk_from_signature(
            &hash,
            &params,
            &[0u8; 32],
            &[0u8; 66 * 32],
            &mut adrs,
            &[0u8; 32],
        );
        assert!(matches!(
            result,
            Err(Error::InvalidSignatureLength { expected, got })
                if expected == 67 * 32 && got == 66 * 32
        ));
    }
}
