//! Chain parameters: magic bytes, address prefixes and the coinbase subsidy schedule

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{DecodeError, Result};
use crate::types::{Integer, Natural};

/// How the block subsidy is derived for fee computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsidySchedule {
    /// subsidy = initial >> ⌊height / interval⌋, zero after 64 halvings
    Halving { initial: Integer, interval: Natural },
    /// One constant for every block, regardless of height
    Fixed(Integer),
}

impl SubsidySchedule {
    pub fn mainnet() -> Self {
        SubsidySchedule::Halving {
            initial: INITIAL_SUBSIDY,
            interval: HALVING_INTERVAL,
        }
    }

    /// Subsidy at `height`; `None` when the schedule needs a height and none is known
    pub fn subsidy(&self, height: Option<Natural>) -> Option<Integer> {
        match *self {
            SubsidySchedule::Fixed(amount) => Some(amount),
            SubsidySchedule::Halving { initial, interval } => {
                let height = height?;
                if interval == 0 {
                    return Some(initial);
                }
                let halvings = height / interval;
                if halvings >= 64 {
                    return Some(0);
                }
                Some(initial >> halvings)
            }
        }
    }
}

impl Default for SubsidySchedule {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Network-specific parameters used while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainParams {
    pub magic: [u8; 4],
    pub pubkey_address_prefix: u8,
    pub script_address_prefix: u8,
    pub bech32_hrp: String,
    pub subsidy: SubsidySchedule,
}

impl ChainParams {
    pub fn mainnet() -> Self {
        Self {
            magic: MAINNET_MAGIC,
            pubkey_address_prefix: PUBKEY_ADDRESS_PREFIX,
            script_address_prefix: SCRIPT_ADDRESS_PREFIX,
            bech32_hrp: MAINNET_HRP.to_string(),
            subsidy: SubsidySchedule::mainnet(),
        }
    }

    pub fn with_subsidy(mut self, subsidy: SubsidySchedule) -> Self {
        self.subsidy = subsidy;
        self
    }

    /// Load parameters from JSON; omitted fields fall back to mainnet values.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: ChainParams =
            serde_json::from_str(json).map_err(|e| DecodeError::InvalidConfig(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if bech32::Hrp::parse(&self.bech32_hrp).is_err() {
            return Err(DecodeError::InvalidConfig(format!(
                "invalid bech32 hrp: {:?}",
                self.bech32_hrp
            )));
        }
        Ok(())
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
