//! The 32-byte hash address (ADRS) threaded through every keyed hash call.
//!
//! An address is eight big-endian 32-bit words: layer (word 0), tree
//! (words 1-2), type (word 3), and four type-specific words. The three
//! layouts are modeled as a tagged payload, so switching the type yields
//! freshly zeroed type-specific words by construction.

/// Length of a serialized address in bytes.
pub const ADDRESS_BYTES: usize = 32;

/// Discriminator values for the three address layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AddressType {
    /// WOTS+ chain hashing and secret-element derivation.
    OtsHash = 0,
    /// L-tree compression of a WOTS+ public key.
    LTree = 1,
    /// Merkle tree node hashing.
    HashTree = 2,
}

/// Selects what `PRF(SEED, ADRS)` produces at the current address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum KeyMask {
    /// The hash key.
    KeyMode = 0,
    /// The bitmask; for two-input hashes, its left half.
    MaskMode = 1,
    /// The right-half bitmask of a two-input hash.
    MaskLowMode = 2,
}

/// A hash address in one of the three layouts of the construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Address {
    // Common words 0-2. A single-tree engine keeps them at zero; they stay
    // part of the model because they are part of the wire layout.
    layer: u32,
    tree: u64,
    fields: Fields,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fields {
    Ots {
        ots_address: u32,
        chain_address: u32,
        hash_address: u32,
        key_mask: u32,
    },
    LTree {
        ltree_address: u32,
        tree_height: u32,
        tree_index: u32,
        key_mask: u32,
    },
    HashTree {
        tree_height: u32,
        tree_index: u32,
        key_mask: u32,
    },
}

impl Fields {
    fn zeroed(address_type: AddressType) -> Self {
        match address_type {
            AddressType::OtsHash => Fields::Ots {
                ots_address: 0,
                chain_address: 0,
                hash_address: 0,
                key_mask: 0,
            },
            AddressType::LTree => Fields::LTree {
                ltree_address: 0,
                tree_height: 0,
                tree_index: 0,
                key_mask: 0,
            },
            AddressType::HashTree => Fields::HashTree {
                tree_height: 0,
                tree_index: 0,
                key_mask: 0,
            },
        }
    }
}

impl Address {
    /// Creates a zeroed address of the given type.
    pub fn new(address_type: AddressType) -> Self {
        Self {
            layer: 0,
            tree: 0,
            fields: Fields::zeroed(address_type),
        }
    }

    /// Switches the layout, zeroing all type-specific words.
    pub fn set_type(&mut self, address_type: AddressType) {
        self.fields = Fields::zeroed(address_type);
    }

    /// A fresh address of the given type carrying over the layer and tree
    /// words of `self`.
    pub fn subtree(&self, address_type: AddressType) -> Self {
        Self {
            layer: self.layer,
            tree: self.tree,
            fields: Fields::zeroed(address_type),
        }
    }

    /// Sets the OTS key-pair index (OTS layout, word 4).
    pub fn set_ots_address(&mut self, index: u32) {
        debug_assert!(
            matches!(self.fields, Fields::Ots { .. }),
            "ots_address written on a non-OTS address"
        );
        if let Fields::Ots { ots_address, .. } = &mut self.fields {
            *ots_address = index;
        }
    }

    /// Sets the chain index within a WOTS+ key (OTS layout, word 5).
    pub fn set_chain_address(&mut self, index: u32) {
        debug_assert!(
            matches!(self.fields, Fields::Ots { .. }),
            "chain_address written on a non-OTS address"
        );
        if let Fields::Ots { chain_address, .. } = &mut self.fields {
            *chain_address = index;
        }
    }

    /// Sets the step index within a WOTS+ chain (OTS layout, word 6).
    pub fn set_hash_address(&mut self, index: u32) {
        debug_assert!(
            matches!(self.fields, Fields::Ots { .. }),
            "hash_address written on a non-OTS address"
        );
        if let Fields::Ots { hash_address, .. } = &mut self.fields {
            *hash_address = index;
        }
    }

    /// Sets the leaf index being compressed (L-tree layout, word 4).
    pub fn set_ltree_address(&mut self, index: u32) {
        debug_assert!(
            matches!(self.fields, Fields::LTree { .. }),
            "ltree_address written on a non-L-tree address"
        );
        if let Fields::LTree { ltree_address, .. } = &mut self.fields {
            *ltree_address = index;
        }
    }

    /// Sets the node height (L-tree and hash-tree layouts, word 5).
    pub fn set_tree_height(&mut self, height: u32) {
        match &mut self.fields {
            Fields::LTree { tree_height, .. } | Fields::HashTree { tree_height, .. } => {
                *tree_height = height;
            }
            Fields::Ots { .. } => {
                debug_assert!(false, "tree_height written on an OTS address");
            }
        }
    }

    /// Sets the node index within its level (L-tree and hash-tree layouts,
    /// word 6).
    pub fn set_tree_index(&mut self, index: u32) {
        match &mut self.fields {
            Fields::LTree { tree_index, .. } | Fields::HashTree { tree_index, .. } => {
                *tree_index = index;
            }
            Fields::Ots { .. } => {
                debug_assert!(false, "tree_index written on an OTS address");
            }
        }
    }

    /// Selects key or bitmask derivation (word 7, all layouts).
    pub fn set_key_mask_mode(&mut self, mode: KeyMask) {
        let word = mode as u32;
        match &mut self.fields {
            Fields::Ots { key_mask, .. }
            | Fields::LTree { key_mask, .. }
            | Fields::HashTree { key_mask, .. } => *key_mask = word,
        }
    }

    /// Serializes the address as eight big-endian 32-bit words.
    pub fn bytes(&self) -> [u8; ADDRESS_BYTES] {
        let mut words = [0u32; 8];
        words[0] = self.layer;
        words[1] = (self.tree >> 32) as u32;
        words[2] = self.tree as u32;
        match self.fields {
            Fields::Ots {
                ots_address,
                chain_address,
                hash_address,
                key_mask,
            } => {
                words[3] = AddressType::OtsHash as u32;
                words[4] = ots_address;
                words[5] = chain_address;
                words[6] = hash_address;
                words[7] = key_mask;
            }
            Fields::LTree {
                ltree_address,
                tree_height,
                tree_index,
                key_mask,
            } => {
                words[3] = AddressType::LTree as u32;
                words[4] = ltree_address;
                words[5] = tree_height;
                words[6] = tree_index;
                words[7] = key_mask;
            }
            Fields::HashTree {
                tree_height,
                tree_index,
                key_mask,
            } => {
                words[3] = AddressType::HashTree as u32;
                // Word 4 is padding in the hash-tree layout.
                words[5] = tree_height;
                words[6] = tree_index;
                words[7] = key_mask;
            }
        }

        let mut out = [0u8; ADDRESS_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::new(AddressType::OtsHash)
    }
}
