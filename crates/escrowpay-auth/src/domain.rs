//! Signing domains.
//!
//! A domain binds every digest to one protocol name, version, chain and
//! verifying contract. A signature made for one domain never verifies
//! under another, which is what stops cross-chain and cross-deployment
//! replay.

use escrowpay_types::{Address, Rail, constants};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::typed::{put_address, put_u64, type_hash};

const DOMAIN_TYPE: &str =
    "EscrowDomain(string name,string version,uint256 chainId,address verifyingContract)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl SigningDomain {
    /// The canonical domain for a rail deployed at `verifying_contract`.
    #[must_use]
    pub fn for_rail(rail: Rail, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: rail.domain_name().to_string(),
            version: constants::DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    /// `SHA-256(type_hash || SHA-256(name) || SHA-256(version) || chain_id || contract)`.
    #[must_use]
    pub fn separator(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(5 * 32);
        buf.extend_from_slice(&type_hash(DOMAIN_TYPE));
        buf.extend_from_slice(&Sha256::digest(self.name.as_bytes()));
        buf.extend_from_slice(&Sha256::digest(self.version.as_bytes()));
        put_u64(&mut buf, self.chain_id);
        put_address(&mut buf, &self.verifying_contract);
        Sha256::digest(&buf).into()
    }

    #[must_use]
    pub fn separator_hex(&self) -> String {
        hex::encode(self.separator())
    }
}
