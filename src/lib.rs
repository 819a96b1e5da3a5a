//! XMSS (eXtended Merkle Signature Scheme) signing engine in Rust.
//!
//! Implements the single-tree construction of
//! draft-irtf-cfrg-xmss-hash-based-signatures: WOTS+ one-time signatures,
//! L-tree leaf compression, Merkle authentication paths, and a streaming
//! signer with atomic leaf-index reservation.
//!
//! XMSS is stateful: every signature consumes one leaf of a fixed-height
//! tree of one-time keys, and reusing a leaf forfeits security. The engine
//! therefore reserves an index atomically before any part of a signature is
//! produced; an index reserved by an abandoned operation is lost, never
//! reissued. Callers persisting keys must make that reservation durable
//! before releasing the signature (write-ahead reservation).
//!
//! # Example
//!
//! ```no_run
//! use xmss_engine::{XmssOid, XmssPrivateKey, XmssPublicKey, XmssSigner};
//!
//! # fn main() -> xmss_engine::XmssResult<()> {
//! let key = XmssPrivateKey::generate(XmssOid::XmssSha2_10_256, &mut rand::rng())?;
//! let public_key = XmssPublicKey::from(&key);
//!
//! let mut signer = XmssSigner::new(&key)?;
//! signer.update(b"message to sign")?;
//! let signature = signer.sign()?;
//!
//! public_key.verify(b"message to sign", &signature)?;
//! # Ok(())
//! # }
//! ```

mod address;
mod error;
mod hash;
mod merkle;
mod params;
mod private_key;
mod public_key;
mod signature;
mod signer;
pub mod wots;

pub use address::{ADDRESS_BYTES, Address, AddressType, KeyMask};
pub use error::{Error, XmssResult};
pub use hash::{MessageHasher, XmssHash};
pub use params::{XmssOid, XmssParams};
pub use private_key::{LeafReservation, XmssPrivateKey};
pub use public_key::XmssPublicKey;
pub use self::signature::XmssSignature;
pub use signer::XmssSigner;
