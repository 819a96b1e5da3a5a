//! The streaming XMSS signing engine.
//!
//! A signer borrows a private key and owns its own hash state, so several
//! signers on different threads can share one key; the atomic leaf
//! reservation keeps their indices disjoint. The first `update` (or a bare
//! `sign`) reserves a leaf index and opens the randomized message stream;
//! `sign` finalizes the stream, signs the digest with the reserved one-time
//! key, and resets the signer for the next message.
//!
//! A reservation made for a signing operation that never completes is
//! consumed and lost. That is intentional: losing a leaf is harmless,
//! reusing one is fatal.

use zeroize::Zeroizing;

use crate::address::{Address, AddressType};
use crate::error::XmssResult;
use crate::hash::{MessageHasher, XmssHash, to_byte};
use crate::private_key::XmssPrivateKey;
use crate::signature::XmssSignature;
use crate::wots;

/// State of one in-flight signature: the reserved leaf, the randomizer
/// derived from it, and the open message stream keyed with both.
struct PendingSignature {
    leaf_index: u64,
    randomness: Zeroizing<Vec<u8>>,
    msg_stream: MessageHasher,
}

/// A streaming signer over a borrowed [`XmssPrivateKey`].
pub struct XmssSigner<'a> {
    private_key: &'a XmssPrivateKey,
    hash: XmssHash,
    pending: Option<PendingSignature>,
}

/// Reserves a leaf index and opens the message stream for it:
/// `r = PRF(SK_PRF, toByte(i, 32))`, H_msg keyed with
/// `r || root || toByte(i, n)`.
fn reserve_leaf(
    private_key: &XmssPrivateKey,
    hash: &XmssHash,
) -> XmssResult<PendingSignature> {
    let leaf_index = private_key.reserve_unused_leaf_index()?;

    let mut index32 = [0u8; 32];
    to_byte(&mut index32, leaf_index);
    let randomness = Zeroizing::new(hash.prf(private_key.prf_seed(), &index32));

    let mut index_n = vec![0u8; private_key.params().element_size()];
    to_byte(&mut index_n, leaf_index);
    let msg_stream = hash.h_msg_init(&randomness, private_key.root(), &index_n);

    Ok(PendingSignature {
        leaf_index,
        randomness,
        msg_stream,
    })
}

impl<'a> XmssSigner<'a> {
    /// Creates a signer for the given private key.
    ///
    /// Fails with [`crate::Error::HashUnavailable`] when the key's
    /// parameter set names a hash primitive this build does not provide.
    pub fn new(private_key: &'a XmssPrivateKey) -> XmssResult<Self> {
        let hash = XmssHash::new(private_key.params())?;
        Ok(Self {
            private_key,
            hash,
            pending: None,
        })
    }

    /// Feeds message bytes into the signer, reserving a leaf index first if
    /// none is held.
    ///
    /// Fails with [`crate::Error::LeafExhausted`] when the key has no
    /// unused leaves; the signer then holds no reservation and later calls
    /// fail the same way.
    pub fn update(&mut self, msg: &[u8]) -> XmssResult<()> {
        let state = self.initialize()?;
        state.msg_stream.update(msg);
        Ok(())
    }

    /// Produces the signature over all bytes fed since the last `sign`
    /// (the empty message if none) and resets the signer.
    ///
    /// Signing is deterministic: the signature is a pure function of the
    /// private key, the reserved leaf index, and the message.
    pub fn sign(&mut self) -> XmssResult<XmssSignature> {
        let state = match self.pending.take() {
            Some(state) => state,
            None => reserve_leaf(self.private_key, &self.hash)?,
        };
        Ok(self.sign_pending(state))
    }

    fn initialize(&mut self) -> XmssResult<&mut PendingSignature> {
        match &mut self.pending {
            Some(state) => Ok(state),
            state @ None => Ok(state.insert(reserve_leaf(self.private_key, &self.hash)?)),
        }
    }

    /// Signs the message hash of a completed stream: authentication path
    /// first, then the WOTS+ signature from a freshly reset OTS address.
    fn sign_pending(&self, state: PendingSignature) -> XmssSignature {
        let PendingSignature {
            leaf_index,
            randomness,
            msg_stream,
        } = state;
        let msg_hash = msg_stream.finalize();

        let context = Address::new(AddressType::HashTree);
        let auth_path = self.build_auth_path(leaf_index, &context);

        let mut ots_adrs = Address::new(AddressType::OtsHash);
        ots_adrs.set_ots_address(leaf_index as u32);
        let wots_signature = wots::sign(
            &self.hash,
            self.private_key.params(),
            self.private_key.secret_seed(),
            &msg_hash,
            &mut ots_adrs,
            self.private_key.public_seed(),
        );

        // `randomness` is dropped (and zeroized) here; the copy inside the
        // signature is public output.
        XmssSignature::new(leaf_index, randomness.to_vec(), wots_signature, auth_path)
    }

    /// Collects the sibling node at every level of the path from
    /// `leaf_index` to the root: `auth[j] = treeHash((i/2^j ^ 1) * 2^j, j)`.
    fn build_auth_path(&self, leaf_index: u64, adrs: &Address) -> Vec<u8> {
        let params = self.private_key.params();
        let n = params.element_size();
        let mut auth_path = vec![0u8; params.tree_height() as usize * n];

        for height in 0..params.tree_height() {
            let sibling_start = ((leaf_index >> height) ^ 1) << height;
            let node = self
                .private_key
                .tree_hash(&self.hash, sibling_start, height, adrs);
            let h = height as usize;
            auth_path[h * n..(h + 1) * n].copy_from_slice(&node);
        }
        auth_path
    }
}

impl signature::Signer<XmssSignature> for XmssPrivateKey {
    /// One-shot signing; each call consumes one leaf index.
    fn try_sign(&self, msg: &[u8]) -> Result<XmssSignature, signature::Error> {
        let mut signer = XmssSigner::new(self).map_err(|_| signature::Error::new())?;
        signer.update(msg).map_err(|_| signature::Error::new())?;
        signer.sign().map_err(|_| signature::Error::new())
    }
}
