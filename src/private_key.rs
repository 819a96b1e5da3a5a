//! The XMSS private key and the leaf-index reservation it guards.
//!
//! Everything in the key is immutable after construction except the leaf
//! counter, which is owned by [`LeafReservation`] and advanced atomically.
//! A reserved index is never handed out twice for the lifetime of the
//! value; an index reserved by a signing operation that is later abandoned
//! is consumed and lost, which is the safe direction for a one-time scheme.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use rand::CryptoRng;
use zeroize::Zeroizing;

use crate::address::Address;
use crate::error::{Error, XmssResult};
use crate::hash::XmssHash;
use crate::merkle;
use crate::params::{XmssOid, XmssParams};

/// The monotonic leaf-index counter of an XMSS key.
///
/// Callers persisting keys must durably record a reservation before any
/// signature using it becomes observable (write-ahead reservation); this
/// type provides the in-memory half of that contract and can be
/// reconstructed at a given starting index when a key is restored.
#[derive(Debug)]
pub struct LeafReservation {
    next: AtomicU64,
    capacity: u64,
}

impl LeafReservation {
    /// A fresh reservation over `capacity` leaves, starting at index 0.
    pub fn new(capacity: u64) -> Self {
        Self::starting_at(0, capacity)
    }

    /// A reservation whose first `next` leaves are already consumed.
    pub fn starting_at(next: u64, capacity: u64) -> Self {
        Self {
            next: AtomicU64::new(next),
            capacity,
        }
    }

    /// Atomically reserves the next unused leaf index.
    ///
    /// Every successful call returns a distinct value; once `capacity`
    /// indices have been handed out, all further calls fail with
    /// [`Error::LeafExhausted`].
    pub fn reserve(&self) -> XmssResult<u64> {
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            if current >= self.capacity {
                return Err(Error::LeafExhausted);
            }
            match self.next.compare_exchange_weak(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(current),
                Err(actual) => current = actual,
            }
        }
    }

    /// The index the next successful [`reserve`](Self::reserve) will return.
    pub fn next_index(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Number of reservations left before exhaustion.
    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.next_index())
    }
}

/// An XMSS private key: master seed, PRF seed, public seed, public root,
/// and the leaf reservation.
pub struct XmssPrivateKey {
    params: XmssParams,
    secret_seed: Zeroizing<Vec<u8>>,
    prf_seed: Zeroizing<Vec<u8>>,
    public_seed: Vec<u8>,
    root: Vec<u8>,
    reservation: LeafReservation,
}

impl XmssPrivateKey {
    /// Generates a key for the given parameter set, drawing the three
    /// n-byte seeds from `rng` and computing the public root.
    pub fn generate<R: CryptoRng>(oid: XmssOid, rng: &mut R) -> XmssResult<Self> {
        let n = oid.parameters().element_size();
        let mut seed = Zeroizing::new(vec![0u8; 3 * n]);
        rng.fill_bytes(&mut seed);
        Self::from_seeds(oid, &seed[..n], &seed[n..2 * n], &seed[2 * n..])
    }

    /// Builds a key from explicit seed material: the WOTS+ master seed
    /// `S_XMSS`, the randomizer seed `SK_PRF`, and the public `SEED`.
    ///
    /// Each seed must be exactly n bytes. The public root is recomputed
    /// from scratch, which costs a full tree traversal.
    pub fn from_seeds(
        oid: XmssOid,
        secret_seed: &[u8],
        prf_seed: &[u8],
        public_seed: &[u8],
    ) -> XmssResult<Self> {
        let params = oid.parameters();
        let n = params.element_size();
        for seed in [secret_seed, prf_seed, public_seed] {
            if seed.len() != n {
                return Err(Error::InvalidSeedLength {
                    expected: n,
                    got: seed.len(),
                });
            }
        }

        let mut key = Self {
            params,
            secret_seed: Zeroizing::new(secret_seed.to_vec()),
            prf_seed: Zeroizing::new(prf_seed.to_vec()),
            public_seed: public_seed.to_vec(),
            root: Vec::new(),
            reservation: LeafReservation::new(params.num_leaves()),
        };

        let hash = XmssHash::new(&params)?;
        let context = Address::default();
        key.root = key.tree_hash(&hash, 0, params.tree_height(), &context);
        Ok(key)
    }

    /// Atomically reserves the next unused leaf index; see
    /// [`LeafReservation::reserve`].
    pub fn reserve_unused_leaf_index(&self) -> XmssResult<u64> {
        self.reservation.reserve()
    }

    /// Marks the first `index` leaves as consumed, e.g. when restoring a
    /// key whose reservation state lives in an external store.
    pub fn set_unused_leaf_index(&mut self, index: u64) {
        self.reservation = LeafReservation::starting_at(index, self.params.num_leaves());
    }

    /// Number of signatures this key can still produce.
    pub fn remaining_signatures(&self) -> u64 {
        self.reservation.remaining()
    }

    /// Computes the Merkle node at `target_height` whose left-most leaf is
    /// `start`, regenerating the WOTS+ leaves underneath from the master
    /// seed. `adrs` contributes layer and tree context only.
    pub fn tree_hash(
        &self,
        hash: &XmssHash,
        start: u64,
        target_height: u32,
        adrs: &Address,
    ) -> Vec<u8> {
        merkle::tree_hash(
            hash,
            &self.params,
            &self.secret_seed,
            &self.public_seed,
            start,
            target_height,
            adrs,
        )
    }

    /// The parameter set of this key.
    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// The n-byte public root of the Merkle tree.
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// The n-byte public seed mixed into every bitmask and hash key.
    pub fn public_seed(&self) -> &[u8] {
        &self.public_seed
    }

    /// The n-byte `SK_PRF` seed used to derive per-signature randomness.
    pub(crate) fn prf_seed(&self) -> &[u8] {
        &self.prf_seed
    }

    /// The n-byte master seed WOTS+ secret elements are derived from.
    pub(crate) fn secret_seed(&self) -> &[u8] {
        &self.secret_seed
    }
}

impl fmt::Debug for XmssPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmssPrivateKey")
            .field("oid", &self.params.oid())
            .field("seeds", &"[REDACTED]")
            .field("next_leaf", &self.reservation.next_index())
            .finish()
    }
}
