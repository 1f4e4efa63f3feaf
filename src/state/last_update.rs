use crate::error::LendingError;
use arrayref::{array_mut_ref, array_ref};
use solana_program::{
    clock::UnixTimestamp,
    msg,
    program_error::ProgramError,
    program_pack::{Pack, Sealed},
};

/// Last update state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LastUpdate {
    /// Unix timestamp of the last accrual
    pub timestamp: UnixTimestamp,
}

impl Sealed for LastUpdate {}
///
pub const LAST_UPDATE_LEN: usize = 8;

impl Pack for LastUpdate {
    const LEN: usize = LAST_UPDATE_LEN;

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, LAST_UPDATE_LEN];
        *output = self.timestamp.to_le_bytes();
    }

    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, LAST_UPDATE_LEN];
        Ok(Self {
            timestamp: UnixTimestamp::from_le_bytes(*input),
        })
    }
}

impl LastUpdate {
    /// Create new last update
    pub fn new(timestamp: UnixTimestamp) -> Self {
        Self { timestamp }
    }

    /// Return seconds elapsed since the stored timestamp
    pub fn seconds_elapsed(&self, now: UnixTimestamp) -> Result<u64, ProgramError> {
        if now < self.timestamp {
            msg!("Timestamp {} precedes last update {}", now, self.timestamp);
            return Err(LendingError::InvalidTimestamp.into());
        }

        Ok((now - self.timestamp) as u64)
    }

    /// Set last update timestamp
    pub fn update_timestamp(&mut self, now: UnixTimestamp) {
        self.timestamp = now;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_seconds_elapsed() {
        let last_update = LastUpdate::new(1_000);
        assert_eq!(last_update.seconds_elapsed(1_000).unwrap(), 0);
        assert_eq!(last_update.seconds_elapsed(1_060).unwrap(), 60);
        assert_matches!(
            last_update.seconds_elapsed(999),
            Err(ProgramError::Custom(code)) if code == LendingError::InvalidTimestamp as u32
        );
    }

    #[test]
    fn test_pack() {
        let last_update = LastUpdate::new(1_650_000_000);
        let mut buf = [0u8; LAST_UPDATE_LEN];
        last_update.pack_into_slice(&mut buf);
        assert_eq!(LastUpdate::unpack_from_slice(&buf).unwrap(), last_update);
    }
}
