//! Shared harness for the engine integration tests: keys, a deployed
//! engine and a hand-driven clock.

#![allow(dead_code)]

use escrowpay_auth::{PartyKey, TypedMessage};
use escrowpay_engine::{CallContext, PaymentsEngine};
use escrowpay_ledger::{
    FundingSource, InMemoryToken, NativeBank, NativeRail, TokenLedger, TokenRail,
};
use escrowpay_types::constants::HOUR;
use escrowpay_types::{
    Address, AssetTransferResult, BidInput, BuyNowInput, EscrowError, PaymentId, PaymentsConfig,
    Rail, Result, Signature, UniverseId,
};
use tracing_subscriber::EnvFilter;

pub const START: u64 = 1_700_000_000;
pub const CHAIN_ID: u64 = 1_337;
pub const ESCROW: Address = Address::from_bytes([0xee; 32]);
pub const FEES: Address = Address::from_bytes([0xfe; 32]);
pub const UNIVERSE: UniverseId = UniverseId(1);
pub const FEE_BPS: u32 = 500;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Harness<F> {
    pub engine: PaymentsEngine<F>,
    pub owner: PartyKey,
    pub operator: PartyKey,
    pub now: u64,
}

impl Harness<NativeRail> {
    pub fn native() -> Self {
        Self::deploy(Rail::Native, NativeRail::new(NativeBank::new(), ESCROW))
    }

    /// Give `who` external coins.
    pub fn mint(&mut self, who: &Address, amount: u128) {
        self.engine
            .funding_mut()
            .bank_mut()
            .mint(who, amount)
            .unwrap();
    }
}

impl Harness<TokenRail<InMemoryToken>> {
    pub fn token() -> Self {
        Self::deploy(Rail::Token, TokenRail::new(InMemoryToken::new(), ESCROW))
    }

    /// Give `who` tokens and approve the escrow for `allowance`.
    pub fn mint_and_approve(&mut self, who: &Address, amount: u128, allowance: u128) {
        let token = self.engine.funding_mut().token_mut();
        token.mint(who, amount).unwrap();
        token.approve(who, &ESCROW, allowance);
    }

    pub fn allowance(&self, who: &Address) -> u128 {
        self.engine.funding().token().allowance(who, &ESCROW)
    }
}

/// Token whose outgoing transfers fail while `paused` is set.
#[derive(Debug, Default)]
pub struct PausableToken {
    pub inner: InMemoryToken,
    pub paused: bool,
}

impl TokenLedger for PausableToken {
    fn balance_of(&self, owner: &Address) -> u128 {
        self.inner.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.inner.allowance(owner, spender)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.inner.approve(owner, spender, amount);
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        if self.paused {
            return Err(EscrowError::Internal("paused".into()));
        }
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        self.inner.transfer_from(spender, from, to, amount)
    }
}

impl Harness<TokenRail<PausableToken>> {
    pub fn pausable_token() -> Self {
        Self::deploy(Rail::Token, TokenRail::new(PausableToken::default(), ESCROW))
    }

    pub fn fund(&mut self, who: &Address, amount: u128) {
        let token = self.engine.funding_mut().token_mut();
        token.inner.mint(who, amount).unwrap();
        token.inner.approve(who, &ESCROW, amount);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.engine.funding_mut().token_mut().paused = paused;
    }
}

impl<F: FundingSource> Harness<F> {
    fn deploy(rail: Rail, funding: F) -> Self {
        init_tracing();
        let owner = PartyKey::generate();
        let operator = PartyKey::generate();
        let mut config = PaymentsConfig::new(owner.address(), rail, CHAIN_ID, ESCROW);
        config.default_operator = operator.address();
        config.default_fees_collector = FEES;
        let engine = PaymentsEngine::new(&config, funding).unwrap();
        Self {
            engine,
            owner,
            operator,
            now: START,
        }
    }

    pub fn ctx(&self, who: &Address) -> CallContext {
        CallContext::new(*who, self.now)
    }

    pub fn owner_ctx(&self) -> CallContext {
        self.ctx(&self.owner.address())
    }

    pub fn advance(&mut self, secs: u64) {
        self.now += secs;
    }

    /// A registered seller.
    pub fn seller(&mut self) -> PartyKey {
        let seller = PartyKey::generate();
        self.engine
            .register_as_seller(&self.ctx(&seller.address()))
            .unwrap();
        seller
    }

    pub fn sign_operator<M: TypedMessage>(&self, msg: &M) -> Signature {
        self.operator.sign_typed(self.engine.domain(), msg)
    }

    pub fn sign_as<M: TypedMessage>(&self, key: &PartyKey, msg: &M) -> Signature {
        key.sign_typed(self.engine.domain(), msg)
    }

    pub fn buy_now_input(
        &self,
        label: &str,
        buyer: &PartyKey,
        seller: &PartyKey,
        amount: u128,
    ) -> BuyNowInput {
        BuyNowInput {
            payment_id: PaymentId::derive(label.as_bytes()),
            amount,
            fee_bps: FEE_BPS,
            universe_id: UNIVERSE,
            deadline: self.now + HOUR,
            buyer: buyer.address(),
            seller: seller.address(),
        }
    }

    pub fn bid_input(
        &self,
        label: &str,
        bidder: &PartyKey,
        seller: &PartyKey,
        bid_amount: u128,
        ends_at: u64,
    ) -> BidInput {
        BidInput {
            payment_id: PaymentId::derive(label.as_bytes()),
            ends_at,
            bid_amount,
            fee_bps: FEE_BPS,
            universe_id: UNIVERSE,
            deadline: self.now + HOUR,
            bidder: bidder.address(),
            seller: seller.address(),
        }
    }

    /// A delivery result signed by the current default operator.
    pub fn signed_result(&self, id: PaymentId, was_successful: bool) -> (AssetTransferResult, Signature) {
        let result = AssetTransferResult {
            payment_id: id,
            was_successful,
        };
        let sig = self.sign_operator(&result);
        (result, sig)
    }
}
