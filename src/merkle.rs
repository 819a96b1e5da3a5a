//! Merkle tree machinery: randomized two-to-one hashing, L-tree
//! compression of WOTS+ public keys, subtree construction, and root
//! recomputation from an authentication path.

use crate::address::{Address, AddressType, KeyMask};
use crate::hash::XmssHash;
use crate::params::XmssParams;
use crate::wots;

/// `RAND_HASH(left, right)`: keyed two-to-one compression with per-node
/// key and bitmask halves from `PRF(SEED, ADRS)`.
pub(crate) fn rand_hash(
    hash: &XmssHash,
    left: &[u8],
    right: &[u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> Vec<u8> {
    let n = left.len();

    adrs.set_key_mask_mode(KeyMask::KeyMode);
    let key = hash.prf(public_seed, &adrs.bytes());
    adrs.set_key_mask_mode(KeyMask::MaskMode);
    let mask_left = hash.prf(public_seed, &adrs.bytes());
    adrs.set_key_mask_mode(KeyMask::MaskLowMode);
    let mask_right = hash.prf(public_seed, &adrs.bytes());

    let mut masked = vec![0u8; 2 * n];
    for i in 0..n {
        masked[i] = left[i] ^ mask_left[i];
        masked[n + i] = right[i] ^ mask_right[i];
    }
    hash.h(&key, &masked)
}

/// Compresses a WOTS+ public key (`len` elements, destroyed in place) into
/// a single n-byte leaf, halving the element count each round and carrying
/// an odd trailing element up.
pub(crate) fn l_tree(
    hash: &XmssHash,
    params: &XmssParams,
    wots_pk: &mut [u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> Vec<u8> {
    let n = params.element_size();
    let mut l = params.len();
    let mut height = 0u32;

    adrs.set_tree_height(height);
    while l > 1 {
        let parent_nodes = l >> 1;
        for i in 0..parent_nodes {
            adrs.set_tree_index(i as u32);
            let node = rand_hash(
                hash,
                &wots_pk[2 * i * n..(2 * i + 1) * n],
                &wots_pk[(2 * i + 1) * n..(2 * i + 2) * n],
                adrs,
                public_seed,
            );
            wots_pk[i * n..(i + 1) * n].copy_from_slice(&node);
        }
        if l & 1 == 1 {
            wots_pk.copy_within((l - 1) * n..l * n, (l >> 1) * n);
            l = (l >> 1) + 1;
        } else {
            l >>= 1;
        }
        height += 1;
        adrs.set_tree_height(height);
    }
    wots_pk[..n].to_vec()
}

/// Computes the leaf for `leaf_index`: the WOTS+ public key derived from
/// the master seed, compressed with an L-tree.
fn generate_leaf(
    hash: &XmssHash,
    params: &XmssParams,
    secret_seed: &[u8],
    public_seed: &[u8],
    leaf_index: u64,
    ots_adrs: &mut Address,
    ltree_adrs: &mut Address,
) -> Vec<u8> {
    ots_adrs.set_ots_address(leaf_index as u32);
    ltree_adrs.set_ltree_address(leaf_index as u32);
    let mut pk = wots::public_key(hash, params, secret_seed, ots_adrs, public_seed);
    l_tree(hash, params, &mut pk, ltree_adrs, public_seed)
}

/// Merkle's TreeHash: computes the node at `target_height` whose left-most
/// leaf is `start`, regenerating every leaf underneath from the master seed.
///
/// Precondition: `start` is a multiple of `2^target_height`. The caller's
/// address contributes layer and tree context only; the three working
/// addresses are fresh per invocation.
pub(crate) fn tree_hash(
    hash: &XmssHash,
    params: &XmssParams,
    secret_seed: &[u8],
    public_seed: &[u8],
    start: u64,
    target_height: u32,
    adrs: &Address,
) -> Vec<u8> {
    debug_assert_eq!(start % (1u64 << target_height), 0);

    let n = params.element_size();
    let mut stack = vec![0u8; (target_height as usize + 1) * n];
    let mut heights = vec![0u32; target_height as usize + 1];
    let mut offset = 0usize;

    let mut ots_adrs = adrs.subtree(AddressType::OtsHash);
    let mut ltree_adrs = adrs.subtree(AddressType::LTree);
    let mut node_adrs = adrs.subtree(AddressType::HashTree);

    for i in 0..(1u64 << target_height) {
        let leaf_index = start + i;
        let leaf = generate_leaf(
            hash,
            params,
            secret_seed,
            public_seed,
            leaf_index,
            &mut ots_adrs,
            &mut ltree_adrs,
        );
        stack[offset * n..(offset + 1) * n].copy_from_slice(&leaf);
        heights[offset] = 0;
        offset += 1;

        while offset >= 2 && heights[offset - 1] == heights[offset - 2] {
            let node_height = heights[offset - 1];
            node_adrs.set_tree_height(node_height);
            node_adrs.set_tree_index((leaf_index >> (node_height + 1)) as u32);
            let node = rand_hash(
                hash,
                &stack[(offset - 2) * n..(offset - 1) * n],
                &stack[(offset - 1) * n..offset * n],
                &mut node_adrs,
                public_seed,
            );
            stack[(offset - 2) * n..(offset - 1) * n].copy_from_slice(&node);
            offset -= 1;
            heights[offset - 1] = node_height + 1;
        }
    }

    stack[..n].to_vec()
}

/// Recomputes the root from a leaf and its authentication path, choosing
/// the left/right position at each level from the bits of `leaf_index`.
pub(crate) fn compute_root(
    hash: &XmssHash,
    params: &XmssParams,
    leaf: &[u8],
    mut leaf_index: u64,
    auth_path: &[u8],
    adrs: &mut Address,
    public_seed: &[u8],
) -> Vec<u8> {
    let n = params.element_size();
    let mut buffer = vec![0u8; 2 * n];
    let mut auth_offset = 0usize;

    if leaf_index & 1 == 1 {
        buffer[n..].copy_from_slice(leaf);
        buffer[..n].copy_from_slice(&auth_path[..n]);
    } else {
        buffer[..n].copy_from_slice(leaf);
        buffer[n..].copy_from_slice(&auth_path[..n]);
    }
    auth_offset += n;

    for height in 0..params.tree_height() - 1 {
        adrs.set_tree_height(height);
        leaf_index >>= 1;
        adrs.set_tree_index(leaf_index as u32);

        let node = rand_hash(hash, &buffer[..n], &buffer[n..], adrs, public_seed);
        let sibling = &auth_path[auth_offset..auth_offset + n];
        if leaf_index & 1 == 1 {
            buffer[n..].copy_from_slice(&node);
            buffer[..n].copy_from_slice(sibling);
        } else {
            buffer[..n].copy_from_slice(&node);
            buffer[n..].copy_from_slice(sibling);
        }
        auth_offset += n;
    }

    adrs.set_tree_height(params.tree_height() - 1);
    leaf_index >>= 1;
    adrs.set_tree_index(leaf_index as u32);
    rand_hash(hash, &buffer[..n], &buffer[n..], adrs, public_seed)
}
