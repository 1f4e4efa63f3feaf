use super::*;
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::PUBKEY_BYTES,
};

/// Source of the baseline stable borrow rate for an asset
pub trait MarketRateSource {
    ///
    fn market_borrow_rate(&self, asset: &Pubkey) -> Result<Ray, ProgramError>;
}

/// Owner fed market borrow rate for a single asset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RateOracle {
    ///
    pub version: u8,
    /// Only the owner may feed or pause
    pub owner: Pubkey,
    /// Asset this rate applies to
    pub asset: Pubkey,
    ///
    pub available: bool,
    /// Annualized rate, raw ray value
    pub market_borrow_rate: u128,
    ///
    pub last_update: LastUpdate,
}

impl RateOracle {
    ///
    pub fn new(owner: Pubkey, asset: Pubkey, market_borrow_rate: Ray, now: UnixTimestamp) -> Result<Self, ProgramError> {
        Ok(Self {
            version: PROGRAM_VERSION,
            owner,
            asset,
            available: true,
            market_borrow_rate: market_borrow_rate.to_scaled_val()?,
            last_update: LastUpdate::new(now),
        })
    }

    ///
    pub fn feed_market_rate(
        &mut self,
        caller: &Pubkey,
        market_borrow_rate: Ray,
        now: UnixTimestamp,
    ) -> ProgramResult {
        assert_authority(&self.owner, caller)?;
        self.last_update.seconds_elapsed(now)?;

        self.market_borrow_rate = market_borrow_rate.to_scaled_val()?;
        self.available = true;
        self.last_update.update_timestamp(now);

        Ok(())
    }

    ///
    pub fn pause(&mut self, caller: &Pubkey) -> ProgramResult {
        assert_authority(&self.owner, caller)?;
        self.available = false;

        Ok(())
    }
}

impl MarketRateSource for RateOracle {
    fn market_borrow_rate(&self, asset: &Pubkey) -> Result<Ray, ProgramError> {
        if &self.asset != asset {
            msg!("Rate oracle serves {}, not {}", self.asset, asset);
            return Err(LendingError::UnmatchedRateOracle.into());
        }
        if !self.available {
            return Err(LendingError::RateOracleNotAvailable.into());
        }

        Ok(Ray::from_scaled_val(self.market_borrow_rate))
    }
}

impl Sealed for RateOracle {}
impl IsInitialized for RateOracle {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}

const RATE_ORACLE_PADDING_LEN: usize = 64;
const RATE_ORACLE_LEN: usize = 154;

impl Pack for RateOracle {
    const LEN: usize = RATE_ORACLE_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, RATE_ORACLE_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            owner,
            asset,
            available,
            market_borrow_rate,
            last_update,
            _padding,
        ) = mut_array_refs![
            output,
            1,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            1,
            16,
            LAST_UPDATE_LEN,
            RATE_ORACLE_PADDING_LEN
        ];

        *version = self.version.to_le_bytes();
        owner.copy_from_slice(self.owner.as_ref());
        asset.copy_from_slice(self.asset.as_ref());
        pack_bool(self.available, available);
        *market_borrow_rate = self.market_borrow_rate.to_le_bytes();
        self.last_update.pack_into_slice(&mut last_update[..]);
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, RATE_ORACLE_LEN];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            owner,
            asset,
            available,
            market_borrow_rate,
            last_update,
            _padding,
        ) = array_refs![
            input,
            1,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            1,
            16,
            LAST_UPDATE_LEN,
            RATE_ORACLE_PADDING_LEN
        ];

        Ok(Self {
            version: unpack_version(version, "RateOracle")?,
            owner: Pubkey::new_from_array(*owner),
            asset: Pubkey::new_from_array(*asset),
            available: unpack_bool(available)?,
            market_borrow_rate: u128::from_le_bytes(*market_borrow_rate),
            last_update: LastUpdate::unpack_from_slice(&last_update[..])?,
        })
    }
}
