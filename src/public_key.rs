//! The XMSS public key and signature verification.

use subtle::ConstantTimeEq;

use crate::address::{Address, AddressType};
use crate::error::{Error, XmssResult};
use crate::hash::{XmssHash, to_byte};
use crate::merkle;
use crate::params::{XmssOid, XmssParams};
use crate::private_key::XmssPrivateKey;
use crate::signature::XmssSignature;
use crate::wots;

/// An XMSS public key: the Merkle root and the public seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmssPublicKey {
    params: XmssParams,
    root: Vec<u8>,
    public_seed: Vec<u8>,
}

impl XmssPublicKey {
    /// Builds a public key from its n-byte root and public seed.
    pub fn new(oid: XmssOid, root: &[u8], public_seed: &[u8]) -> XmssResult<Self> {
        let params = oid.parameters();
        let n = params.element_size();
        for part in [root, public_seed] {
            if part.len() != n {
                return Err(Error::InvalidKeyLength {
                    expected: n,
                    got: part.len(),
                });
            }
        }
        Ok(Self {
            params,
            root: root.to_vec(),
            public_seed: public_seed.to_vec(),
        })
    }

    /// Serializes the key as `toByte(oid, 4) || root || SEED`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.params.element_size();
        let mut out = Vec::with_capacity(4 + 2 * n);
        out.extend_from_slice(&self.params.oid().raw_oid().to_be_bytes());
        out.extend_from_slice(&self.root);
        out.extend_from_slice(&self.public_seed);
        out
    }

    /// Parses a public key from its serialized layout, resolving the
    /// leading OID and length-checking the remainder against it.
    pub fn from_bytes(bytes: &[u8]) -> XmssResult<Self> {
        if bytes.len() < 4 {
            return Err(Error::InvalidOid(0));
        }
        let raw_oid = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let oid = XmssOid::try_from(raw_oid)?;
        let n = oid.parameters().element_size();
        if bytes.len() != 4 + 2 * n {
            return Err(Error::InvalidKeyLength {
                expected: 4 + 2 * n,
                got: bytes.len(),
            });
        }
        Self::new(oid, &bytes[4..4 + n], &bytes[4 + n..])
    }

    /// The parameter set of this key.
    pub fn params(&self) -> &XmssParams {
        &self.params
    }

    /// The n-byte Merkle root.
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// The n-byte public seed.
    pub fn public_seed(&self) -> &[u8] {
        &self.public_seed
    }

    /// Verifies `signature` over `msg`.
    ///
    /// Recomputes the randomized message hash, recovers the WOTS+ public
    /// key from the signature, compresses it to a leaf, folds the leaf with
    /// the authentication path, and compares the result against the root in
    /// constant time.
    pub fn verify(&self, msg: &[u8], signature: &XmssSignature) -> XmssResult<()> {
        let params = &self.params;
        let n = params.element_size();
        let leaf_index = signature.leaf_index();
        if leaf_index >= params.num_leaves() {
            return Err(Error::VerificationFailed);
        }

        let hash = XmssHash::new(params)?;

        let mut index_bytes = vec![0u8; n];
        to_byte(&mut index_bytes, leaf_index);
        let mut stream = hash.h_msg_init(signature.randomness(), &self.root, &index_bytes);
        stream.update(msg);
        let msg_hash = stream.finalize();

        let mut ots_adrs = Address::new(AddressType::OtsHash);
        ots_adrs.set_ots_address(leaf_index as u32);
        let mut wots_pk = wots::pk_from_signature(
            &hash,
            params,
            &msg_hash,
            signature.wots_signature(),
            &mut ots_adrs,
            &self.public_seed,
        )?;

        let mut ltree_adrs = Address::new(AddressType::LTree);
        ltree_adrs.set_ltree_address(leaf_index as u32);
        let leaf = merkle::l_tree(&hash, params, &mut wots_pk, &mut ltree_adrs, &self.public_seed);

        let mut node_adrs = Address::new(AddressType::HashTree);
        let computed = merkle::compute_root(
            &hash,
            params,
            &leaf,
            leaf_index,
            signature.auth_path(),
            &mut node_adrs,
            &self.public_seed,
        );

        if bool::from(computed.ct_eq(&self.root)) {
            Ok(())
        } else {
            Err(Error::VerificationFailed)
        }
    }
}

impl From<&XmssPrivateKey> for XmssPublicKey {
    fn from(private_key: &XmssPrivateKey) -> Self {
        Self {
            params: *private_key.params(),
            root: private_key.root().to_vec(),
            public_seed: private_key.public_seed().to_vec(),
        }
    }
}

impl signature::Verifier<XmssSignature> for XmssPublicKey {
    fn verify(&self, msg: &[u8], signature: &XmssSignature) -> Result<(), signature::Error> {
        XmssPublicKey::verify(self, msg, signature).map_err(|_| signature::Error::new())
    }
}
