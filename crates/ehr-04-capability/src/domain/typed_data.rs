//! # EIP-712 Typed Data
//!
//! ```text
//! EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)
//! AccessRequest(address provider,address patient,bytes32 recordId,uint8 role,uint64 timestamp,uint256 nonce,uint64 ttl)
//!
//! digest = keccak256(0x19 || 0x01 || domainSeparator || hashStruct(request))
//! ```

use super::entities::{RequestId, UnsignedAccessRequest};
use shared_crypto::hashing::{keccak256, keccak256_concat};
use shared_types::{Address, Hash, NetworkContext, U256};

/// Domain type string.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Primary type string.
pub const ACCESS_REQUEST_TYPE: &str = "AccessRequest(address provider,address patient,bytes32 recordId,uint8 role,uint64 timestamp,uint256 nonce,uint64 ttl)";

/// The signing domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl TypedDataDomain {
    /// Domain bound to a session's network.
    pub fn from_network(network: &NetworkContext) -> Self {
        Self {
            name: network.protocol_name.clone(),
            version: network.protocol_version.clone(),
            chain_id: network.chain_id,
            verifying_contract: network.verifying_authority,
        }
    }

    pub fn separator(&self) -> Hash {
        keccak256_concat(&[
            &keccak256(DOMAIN_TYPE.as_bytes()),
            &keccak256(self.name.as_bytes()),
            &keccak256(self.version.as_bytes()),
            &word_u64(self.chain_id),
            &word_address(&self.verifying_contract),
        ])
    }

    /// Digest the signer signs and the verifier recomputes.
    pub fn digest(&self, request: &UnsignedAccessRequest) -> Hash {
        keccak256_concat(&[&[0x19, 0x01], &self.separator(), &struct_hash(request)])
    }

    /// Request id: the digest.
    pub fn request_id(&self, request: &UnsignedAccessRequest) -> RequestId {
        RequestId(self.digest(request))
    }
}

/// `hashStruct(AccessRequest)`.
pub fn struct_hash(request: &UnsignedAccessRequest) -> Hash {
    keccak256_concat(&[
        &keccak256(ACCESS_REQUEST_TYPE.as_bytes()),
        &word_address(&request.requester),
        &word_address(&request.owner),
        request.record_id.as_bytes(),
        &word_u64(u64::from(request.role.as_u8())),
        &word_u64(request.timestamp),
        &word_u256(&request.nonce),
        &word_u64(request.ttl),
    ])
}

fn word_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

fn word_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_u256(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}
