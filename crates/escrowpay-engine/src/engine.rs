//! The payments engine: one state machine over any [`FundingSource`].
//!
//! Each mutating call runs to completion against `&mut self`, so calls are
//! serialized and no external transfer can re-enter the engine mid-call.
//! Every call validates first and writes last: a rejected call leaves no
//! trace in the ledger, the payment book, the rail or the event log.

use escrowpay_auth::{PaymentVerifier, SigningDomain};
use escrowpay_ledger::{
    BalanceLedger, Collection, CollectionRequest, FundingSource, FundingSplit, InMemoryToken,
    NativeRail, RoleRegistry, SolvencyReport, SolvencyTracker, TokenRail, split_funding,
};
use escrowpay_types::{
    Address, AuctionConfig, AuctionData, BuyNowInput, EscrowError, Payment, PaymentEvent,
    PaymentId, PaymentState, PaymentsConfig, Result, TenantConfig, UniverseId,
};

use crate::book::PaymentBook;
use crate::context::CallContext;
use crate::settings::TenantSettings;
use crate::withdraw_lock::WithdrawLock;

/// Native-coin deployment.
pub type NativePayments = PaymentsEngine<NativeRail>;

/// Token deployment.
pub type TokenPayments<T = InMemoryToken> = PaymentsEngine<TokenRail<T>>;

/// Ledger share and validated external collection for one payment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FundingPlan {
    pub(crate) payer: Address,
    pub(crate) split: FundingSplit,
    pub(crate) collection: Collection,
}

#[derive(Debug)]
pub struct PaymentsEngine<F> {
    pub(crate) funding: F,
    pub(crate) ledger: BalanceLedger,
    pub(crate) registry: RoleRegistry,
    pub(crate) settings: TenantSettings,
    pub(crate) verifier: PaymentVerifier,
    pub(crate) withdraw_lock: WithdrawLock,
    pub(crate) payments: PaymentBook,
    pub(crate) solvency: SolvencyTracker,
    pub(crate) events: Vec<PaymentEvent>,
}

impl<F: FundingSource> PaymentsEngine<F> {
    /// Deploy an engine over `funding`.
    ///
    /// # Errors
    /// Invalid config, or a config whose rail or escrow account disagrees
    /// with `funding`.
    pub fn new(config: &PaymentsConfig, funding: F) -> Result<Self> {
        config.validate()?;
        if config.rail != funding.rail() {
            return Err(EscrowError::Configuration(format!(
                "config rail {} does not match funding rail {}",
                config.rail,
                funding.rail()
            )));
        }
        if config.escrow_account != funding.escrow_account() {
            return Err(EscrowError::Configuration(
                "config escrow_account does not match funding source".to_string(),
            ));
        }

        let domain = SigningDomain::for_rail(config.rail, config.chain_id, config.escrow_account);
        tracing::info!(
            rail = %config.rail,
            chain_id = config.chain_id,
            domain = %domain.separator_hex(),
            "payments engine deployed"
        );

        Ok(Self {
            funding,
            ledger: BalanceLedger::new(),
            registry: RoleRegistry::new(
                config.owner,
                config.default_operator,
                config.default_fees_collector,
            ),
            settings: TenantSettings::from_config(config),
            verifier: PaymentVerifier::new(domain),
            withdraw_lock: WithdrawLock::new(),
            payments: PaymentBook::new(),
            solvency: SolvencyTracker::new(),
            events: Vec::new(),
        })
    }

    // =================================================================
    // Tenant resolution
    // =================================================================

    /// Everything the state machine needs to know about `universe` now.
    #[must_use]
    pub fn tenant_config(&self, universe: UniverseId) -> TenantConfig {
        TenantConfig {
            operator: self.registry.universe_operator(universe),
            fees_collector: self.registry.universe_fees_collector(universe),
            max_fee_bps: self.settings.max_fee_bps(universe),
            payment_window: self.settings.payment_window(),
            auction: self.settings.auction_config(universe),
            to_local_balance_on_outbid: self.settings.to_local_balance_on_outbid(universe),
            seller_registration_required: self.settings.seller_registration_required(),
        }
    }

    // =================================================================
    // Read-only views
    // =================================================================

    #[must_use]
    pub fn payment_state(&self, id: &PaymentId, now: u64) -> PaymentState {
        self.payments.state_at(id, now)
    }

    #[must_use]
    pub fn payment_info(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.get(id)
    }

    /// Timing of a live auction; defaults once resolved or if unknown.
    #[must_use]
    pub fn existing_auction(&self, id: &PaymentId) -> AuctionData {
        self.payments
            .get(id)
            .and_then(|p| p.auction)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn accepts_refunds(&self, id: &PaymentId, now: u64) -> bool {
        self.payments
            .get(id)
            .is_some_and(|p| p.accepts_refunds(now))
    }

    /// Ledger balance.
    #[must_use]
    pub fn balance_of(&self, user: &Address) -> u128 {
        self.ledger.balance_of(user)
    }

    #[must_use]
    pub fn split_funding_sources(&self, user: &Address, amount: u128) -> FundingSplit {
        split_funding(self.ledger.balance_of(user), amount)
    }

    /// Ledger balance plus what the rail could pull from `user` right now.
    #[must_use]
    pub fn max_funds_available(&self, user: &Address) -> u128 {
        self.ledger
            .balance_of(user)
            .saturating_add(self.funding.available_to(user))
    }

    /// Whether `user` can fund `amount` from ledger and external funds.
    #[must_use]
    pub fn enough_funds_available(&self, user: &Address, amount: u128) -> bool {
        let split = self.split_funding_sources(user, amount);
        self.funding.available_to(user) >= split.external_funds
    }

    /// `floor(amount * fee_bps / 10_000)`.
    #[allow(clippy::unused_self)]
    pub fn compute_fee_amount(&self, amount: u128, fee_bps: u32) -> Result<u128> {
        escrowpay_types::compute_fee_amount(amount, fee_bps)
    }

    #[must_use]
    pub fn universe_operator(&self, universe: UniverseId) -> Address {
        self.registry.universe_operator(universe)
    }

    #[must_use]
    pub fn universe_fees_collector(&self, universe: UniverseId) -> Address {
        self.registry.universe_fees_collector(universe)
    }

    #[must_use]
    pub fn payment_window(&self) -> u64 {
        self.settings.payment_window()
    }

    #[must_use]
    pub fn max_fee_bps(&self, universe: UniverseId) -> u32 {
        self.settings.max_fee_bps(universe)
    }

    #[must_use]
    pub fn auction_config(&self, universe: UniverseId) -> AuctionConfig {
        self.settings.auction_config(universe)
    }

    #[must_use]
    pub fn to_local_balance_on_outbid(&self, universe: UniverseId) -> bool {
        self.settings.to_local_balance_on_outbid(universe)
    }

    #[must_use]
    pub fn seller_registration_required(&self) -> bool {
        self.settings.seller_registration_required()
    }

    #[must_use]
    pub fn is_registered_seller(&self, seller: &Address) -> bool {
        self.settings.is_registered_seller(seller)
    }

    #[must_use]
    pub fn only_user_can_withdraw(&self, user: &Address) -> bool {
        self.withdraw_lock.only_user_can_withdraw(user)
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.registry.owner()
    }

    #[must_use]
    pub fn verifier(&self) -> &PaymentVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn domain(&self) -> &SigningDomain {
        self.verifier.domain()
    }

    #[must_use]
    pub fn funding(&self) -> &F {
        &self.funding
    }

    /// Direct access to the external currency, e.g. to fund accounts or
    /// grant allowances.
    pub fn funding_mut(&mut self) -> &mut F {
        &mut self.funding
    }

    #[must_use]
    pub fn events(&self) -> &[PaymentEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<PaymentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Escrow holdings must equal tracked flows and what is owed.
    ///
    /// # Errors
    /// [`EscrowError::SolvencyViolation`].
    pub fn check_solvency(&self) -> Result<()> {
        let report = SolvencyReport {
            holdings: self.funding.escrow_holdings(),
            ledger_total: self.ledger.total(),
            in_flight: self.payments.in_flight_total(),
        };
        self.solvency.verify(&report).inspect_err(|e| {
            tracing::warn!(error = %e, "solvency check failed");
        })
    }

    // =================================================================
    // Owner-gated configuration
    // =================================================================

    pub fn set_default_operator(&mut self, ctx: &CallContext, operator: Address) -> Result<()> {
        let ev = self.registry.set_default_operator(&ctx.sender, operator)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_universe_operator(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
        operator: Address,
    ) -> Result<()> {
        let ev = self
            .registry
            .set_universe_operator(&ctx.sender, universe, operator)?;
        self.emit(ev);
        Ok(())
    }

    pub fn remove_universe_operator(&mut self, ctx: &CallContext, universe: UniverseId) -> Result<()> {
        let ev = self.registry.remove_universe_operator(&ctx.sender, universe)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_default_fees_collector(
        &mut self,
        ctx: &CallContext,
        fees_collector: Address,
    ) -> Result<()> {
        let ev = self
            .registry
            .set_default_fees_collector(&ctx.sender, fees_collector)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_universe_fees_collector(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
        fees_collector: Address,
    ) -> Result<()> {
        let ev = self
            .registry
            .set_universe_fees_collector(&ctx.sender, universe, fees_collector)?;
        self.emit(ev);
        Ok(())
    }

    pub fn remove_universe_fees_collector(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
    ) -> Result<()> {
        let ev = self
            .registry
            .remove_universe_fees_collector(&ctx.sender, universe)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_payment_window(&mut self, ctx: &CallContext, window: u64) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_payment_window(window)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_default_max_fee_bps(&mut self, ctx: &CallContext, max_fee_bps: u32) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_default_max_fee_bps(max_fee_bps)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_universe_max_fee_bps(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
        max_fee_bps: u32,
    ) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_universe_max_fee_bps(universe, max_fee_bps)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_default_auction_config(
        &mut self,
        ctx: &CallContext,
        config: AuctionConfig,
    ) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_default_auction_config(config)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_universe_auction_config(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
        config: AuctionConfig,
    ) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_universe_auction_config(universe, config)?;
        self.emit(ev);
        Ok(())
    }

    pub fn set_to_local_balance_on_outbid(
        &mut self,
        ctx: &CallContext,
        universe: UniverseId,
        to_local: bool,
    ) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_to_local_balance_on_outbid(universe, to_local);
        self.emit(ev);
        Ok(())
    }

    pub fn set_seller_registration_required(
        &mut self,
        ctx: &CallContext,
        required: bool,
    ) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let ev = self.settings.set_seller_registration_required(required);
        self.emit(ev);
        Ok(())
    }

    /// Rotate the signing domain. Signatures made for the old domain stop
    /// verifying immediately.
    pub fn set_verifier_domain(&mut self, ctx: &CallContext, domain: SigningDomain) -> Result<()> {
        self.registry.ensure_owner(&ctx.sender)?;
        let prev_verifying_contract = self.verifier.domain().verifying_contract;
        let verifying_contract = domain.verifying_contract;
        self.verifier = PaymentVerifier::new(domain);
        self.emit(PaymentEvent::VerifierChanged {
            verifying_contract,
            prev_verifying_contract,
        });
        Ok(())
    }

    // =================================================================
    // Self-service
    // =================================================================

    pub fn register_as_seller(&mut self, ctx: &CallContext) -> Result<()> {
        let ev = self.settings.register_seller(ctx.sender)?;
        self.emit(ev);
        Ok(())
    }

    /// Lock or unlock the caller's balance against relayed withdrawals.
    pub fn set_only_user_can_withdraw(&mut self, ctx: &CallContext, flag: bool) {
        let ev = self.withdraw_lock.set_only_user_can_withdraw(ctx.sender, flag);
        self.emit(ev);
    }

    // =================================================================
    // Shared internals
    // =================================================================

    pub(crate) fn emit(&mut self, event: PaymentEvent) {
        tracing::debug!(event = event.name(), "event emitted");
        self.events.push(event);
    }

    /// Checks shared by BuyNow and first bids: amount, fee cap, deadline,
    /// distinct parties, seller registration.
    pub(crate) fn validate_purchase(
        &self,
        purchase: &BuyNowInput,
        tenant: &TenantConfig,
        now: u64,
        zero_amount: EscrowError,
    ) -> Result<()> {
        if purchase.amount == 0 {
            return Err(zero_amount);
        }
        if purchase.fee_bps > tenant.max_fee_bps {
            return Err(EscrowError::FeeAboveMax {
                fee_bps: purchase.fee_bps,
                max_fee_bps: tenant.max_fee_bps,
            });
        }
        if now > purchase.deadline {
            return Err(EscrowError::DeadlineExpired {
                deadline: purchase.deadline,
                now,
            });
        }
        if purchase.buyer == purchase.seller {
            return Err(EscrowError::BuyerSellerCoincide);
        }
        if tenant.seller_registration_required && !self.settings.is_registered_seller(&purchase.seller) {
            return Err(EscrowError::SellerNotRegistered(purchase.seller));
        }
        Ok(())
    }

    /// Work out where `required` comes from without moving anything.
    pub(crate) fn plan_funding(
        &self,
        ctx: &CallContext,
        payer: Address,
        required: u128,
        amount: u128,
        exact: bool,
    ) -> Result<FundingPlan> {
        let split = split_funding(self.ledger.balance_of(&payer), required);
        let collection = self.funding.plan_collection(&CollectionRequest {
            payer,
            sender: ctx.sender,
            attached_value: ctx.value,
            external_needed: split.external_funds,
            amount,
            exact,
        })?;
        tracing::debug!(
            payer = %payer,
            local = split.local_funds,
            external = split.external_funds,
            pull = collection.pull,
            surplus = collection.surplus,
            "funding planned"
        );
        Ok(FundingPlan {
            payer,
            split,
            collection,
        })
    }

    /// Execute a plan: external pull first, then the ledger moves.
    pub(crate) fn commit_funding(&mut self, plan: &FundingPlan) -> Result<()> {
        if plan.collection.pull > 0 {
            self.funding
                .debit(&plan.collection.from, plan.collection.pull)?;
            self.solvency.record_inflow(plan.collection.pull);
        }
        self.ledger.debit(&plan.payer, plan.split.local_funds)?;
        self.ledger.credit(&plan.payer, plan.collection.surplus)?;
        Ok(())
    }

    /// Pay `amount` of `user`'s ledger balance out to their external
    /// account. The ledger is debited before the transfer and restored if
    /// the transfer fails.
    pub(crate) fn payout(&mut self, user: &Address, amount: u128) -> Result<()> {
        self.ledger.debit(user, amount)?;
        if let Err(e) = self.funding.credit(user, amount) {
            self.ledger.credit(user, amount)?;
            tracing::warn!(user = %user, amount, error = %e, "payout failed");
            return Err(e);
        }
        self.solvency.record_outflow(amount);
        Ok(())
    }

    /// Reject native value on calls that do not take funds.
    pub(crate) fn ensure_no_value(ctx: &CallContext) -> Result<()> {
        if ctx.value != 0 {
            return Err(EscrowError::UnexpectedValue { value: ctx.value });
        }
        Ok(())
    }
}
