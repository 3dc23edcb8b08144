//! Constants for the mint-and-sell transaction.

/// Collectible mints are indivisible.
pub const COLLECTIBLE_DECIMALS: u8 = 0;

/// Exactly one unit is ever minted per collectible.
pub const COLLECTIBLE_SUPPLY: u64 = 1;

/// Number of instructions in a mint-and-sell transaction.
pub const MINT_SALE_INSTRUCTION_COUNT: usize = 7;
