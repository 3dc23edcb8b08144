//! Metadata record attached to a collectible mint.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::domain::encoding::{BorshEncode, InstructionDataWriter};

/// A creator entry on a metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataCreator {
    pub address: Pubkey,
    pub verified: bool,
    /// Percentage of royalties routed to this creator.
    pub share: u8,
}

impl MetadataCreator {
    /// The single verified creator every platform collectible carries.
    pub fn treasury(address: Pubkey) -> Self {
        Self {
            address,
            verified: true,
            share: 100,
        }
    }
}

impl BorshEncode for MetadataCreator {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer
            .write_pubkey(&self.address)
            .write_bool(self.verified)
            .write_u8(self.share);
    }
}

/// The `DataV2` record understood by the token metadata program.
///
/// Collection and uses are never set by this application and always encode
/// as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<MetadataCreator>>,
}

impl MetadataRecord {
    /// Record for a platform collectible: zero royalty, treasury as sole
    /// verified creator.
    pub fn collectible(
        name: impl Into<String>,
        symbol: impl Into<String>,
        uri: impl Into<String>,
        treasury: Pubkey,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
            creators: Some(vec![MetadataCreator::treasury(treasury)]),
        }
    }
}

impl BorshEncode for MetadataRecord {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer
            .write_string(&self.name)
            .write_string(&self.symbol)
            .write_string(&self.uri)
            .write_u16(self.seller_fee_basis_points)
            .write_option(self.creators.as_ref())
            // collection
            .write_u8(0)
            // uses
            .write_u8(0);
    }
}
