//! Tenant settings: payment window, fee caps, auction configs, outbid
//! policy and seller registration.
//!
//! Setters assume the caller was already checked against the owner and
//! return the change event.

use std::collections::{HashMap, HashSet};

use escrowpay_types::{
    Address, AuctionConfig, EscrowError, PaymentEvent, PaymentsConfig, Result, UniverseId,
    constants, validate_payment_window,
};

#[derive(Debug, Clone)]
pub struct TenantSettings {
    payment_window: u64,
    default_max_fee_bps: u32,
    universe_max_fee_bps: HashMap<UniverseId, u32>,
    default_auction: AuctionConfig,
    universe_auction: HashMap<UniverseId, AuctionConfig>,
    to_local_balance_on_outbid: HashSet<UniverseId>,
    seller_registration_required: bool,
    registered_sellers: HashSet<Address>,
}

impl TenantSettings {
    #[must_use]
    pub fn from_config(config: &PaymentsConfig) -> Self {
        Self {
            payment_window: config.payment_window,
            default_max_fee_bps: config.default_max_fee_bps,
            universe_max_fee_bps: HashMap::new(),
            default_auction: config.default_auction,
            universe_auction: HashMap::new(),
            to_local_balance_on_outbid: HashSet::new(),
            seller_registration_required: config.seller_registration_required,
            registered_sellers: HashSet::new(),
        }
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    #[must_use]
    pub fn payment_window(&self) -> u64 {
        self.payment_window
    }

    #[must_use]
    pub fn default_max_fee_bps(&self) -> u32 {
        self.default_max_fee_bps
    }

    #[must_use]
    pub fn max_fee_bps(&self, universe: UniverseId) -> u32 {
        self.universe_max_fee_bps
            .get(&universe)
            .copied()
            .unwrap_or(self.default_max_fee_bps)
    }

    #[must_use]
    pub fn default_auction_config(&self) -> AuctionConfig {
        self.default_auction
    }

    /// Universe config, or the default when the universe has none.
    #[must_use]
    pub fn auction_config(&self, universe: UniverseId) -> AuctionConfig {
        self.universe_auction
            .get(&universe)
            .copied()
            .unwrap_or(self.default_auction)
    }

    #[must_use]
    pub fn to_local_balance_on_outbid(&self, universe: UniverseId) -> bool {
        self.to_local_balance_on_outbid.contains(&universe)
    }

    #[must_use]
    pub fn seller_registration_required(&self) -> bool {
        self.seller_registration_required
    }

    #[must_use]
    pub fn is_registered_seller(&self, seller: &Address) -> bool {
        self.registered_sellers.contains(seller)
    }

    // -----------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------

    pub fn set_payment_window(&mut self, window: u64) -> Result<PaymentEvent> {
        validate_payment_window(window)?;
        let prev_window = std::mem::replace(&mut self.payment_window, window);
        Ok(PaymentEvent::PaymentWindow {
            window,
            prev_window,
        })
    }

    pub fn set_default_max_fee_bps(&mut self, max_fee_bps: u32) -> Result<PaymentEvent> {
        ensure_fee_cap(max_fee_bps)?;
        let prev_max_fee_bps = std::mem::replace(&mut self.default_max_fee_bps, max_fee_bps);
        Ok(PaymentEvent::DefaultMaxFee {
            max_fee_bps,
            prev_max_fee_bps,
        })
    }

    pub fn set_universe_max_fee_bps(
        &mut self,
        universe_id: UniverseId,
        max_fee_bps: u32,
    ) -> Result<PaymentEvent> {
        ensure_fee_cap(max_fee_bps)?;
        let prev_max_fee_bps = self.max_fee_bps(universe_id);
        self.universe_max_fee_bps.insert(universe_id, max_fee_bps);
        Ok(PaymentEvent::UniverseMaxFee {
            universe_id,
            max_fee_bps,
            prev_max_fee_bps,
        })
    }

    pub fn set_default_auction_config(&mut self, config: AuctionConfig) -> Result<PaymentEvent> {
        config.validate()?;
        let prev_config = std::mem::replace(&mut self.default_auction, config);
        Ok(PaymentEvent::DefaultAuctionConfig {
            config,
            prev_config,
        })
    }

    pub fn set_universe_auction_config(
        &mut self,
        universe_id: UniverseId,
        config: AuctionConfig,
    ) -> Result<PaymentEvent> {
        config.validate()?;
        let prev_config = self.auction_config(universe_id);
        self.universe_auction.insert(universe_id, config);
        Ok(PaymentEvent::UniverseAuctionConfig {
            universe_id,
            config,
            prev_config,
        })
    }

    pub fn set_to_local_balance_on_outbid(
        &mut self,
        universe_id: UniverseId,
        to_local: bool,
    ) -> PaymentEvent {
        if to_local {
            self.to_local_balance_on_outbid.insert(universe_id);
        } else {
            self.to_local_balance_on_outbid.remove(&universe_id);
        }
        PaymentEvent::ToLocalBalanceOnOutBid {
            universe_id,
            to_local_balance_on_outbid: to_local,
        }
    }

    pub fn set_seller_registration_required(&mut self, required: bool) -> PaymentEvent {
        self.seller_registration_required = required;
        PaymentEvent::SellerRegistrationRequired { required }
    }

    pub fn register_seller(&mut self, seller: Address) -> Result<PaymentEvent> {
        if !self.registered_sellers.insert(seller) {
            return Err(EscrowError::SellerAlreadyRegistered(seller));
        }
        Ok(PaymentEvent::NewSeller { seller })
    }
}

fn ensure_fee_cap(max_fee_bps: u32) -> Result<()> {
    if max_fee_bps > constants::BPS_DENOMINATOR {
        return Err(EscrowError::FeeAboveHundredPercent {
            fee_bps: max_fee_bps,
        });
    }
    Ok(())
}
