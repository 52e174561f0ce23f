//! Certificate decoding
//!
//! DER decoding, OID resolution, signature algorithm extraction and
//! leaf-to-root chain walking over the certificates a server presented.

pub mod asn1;
pub mod chain;
pub mod oid;
pub mod signature;

pub use asn1::{Asn1Node, Asn1Tree, NodeId};
pub use chain::walk_chain;
pub use oid::{decode_oid, OidRegistry};
pub use signature::{find_signature_oid, resolve_signature_algorithm, signature_hash_algorithm};
