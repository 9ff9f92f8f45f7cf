use crate::limiter::SubscriptionLimiter;
use crate::security::Security;
use crate::symbol::{SecurityType, Symbol};
use std::collections::HashSet;

/// A selection function's verdict for one application: either a concrete
/// symbol set or "unchanged", the sentinel that short-circuits reconciliation
/// entirely (`security_changes = none`).
pub enum Selection {
    Symbols(Vec<Symbol>),
    Unchanged,
}

/// The additions/removals delta the synchronizer attaches to a `TimeSlice`.
/// `currency_feeds` lists the FX conversion pairs that newly-added
/// securities require but don't yet have a subscription for; the caller
/// turns each into an internal-feed `Subscription` (`is_internal_feed =
/// true`) — `apply` only identifies the need, it doesn't hold a
/// `SubscriptionCollection` to add one to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityChanges {
    pub additions: Vec<Symbol>,
    pub removals: Vec<Symbol>,
    pub currency_feeds: Vec<CurrencyPair>,
}

impl SecurityChanges {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.currency_feeds.is_empty()
    }
}

/// An FX pair needed to convert a security's quote currency into the
/// account currency; `symbol()` is the internal-feed subscription's symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        CurrencyPair { base: base.into(), quote: quote.into() }
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::new(format!("{}{}", self.base, self.quote), SecurityType::Forex, "FX")
    }
}

/// The conversion pairs `security` needs subscribed as internal feeds,
/// given the account's base currency. A 6-letter forex symbol is split into
/// its base/quote halves and crossed against the account currency (e.g. a
/// GBPJPY holding against a USD account needs USDJPY and GBPUSD); anything
/// else needs one direct cross against its quote currency. Empty if the
/// security already settles in the account currency.
pub fn currency_feeds_required(security: &Security, account_currency: &str) -> Vec<CurrencyPair> {
    if security.quote_currency.eq_ignore_ascii_case(account_currency) {
        return Vec::new();
    }
    if security.symbol.security_type == SecurityType::Forex && security.symbol.name.len() == 6 {
        let base = &security.symbol.name[0..3];
        let quote = &security.symbol.name[3..6];
        let mut pairs = Vec::new();
        if !quote.eq_ignore_ascii_case(account_currency) {
            pairs.push(CurrencyPair::new(account_currency, quote));
        }
        if !base.eq_ignore_ascii_case(account_currency) {
            pairs.push(CurrencyPair::new(base, account_currency));
        }
        pairs
    } else {
        vec![CurrencyPair::new(account_currency, &security.quote_currency)]
    }
}

/// A dynamic, rule-defined set of symbols. Membership is reconciled against
/// a selection function's output on every `apply`; the function itself is
/// owned by the caller (the synchronizer passes the bundle in), this type
/// only tracks current membership and admission.
pub struct Universe {
    pub members: HashSet<Symbol>,
}

impl Universe {
    pub fn new() -> Self {
        Universe { members: HashSet::new() }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `member` may be safely dropped right now: not in the new
/// selection, removal permitted by the universe's own policy, not currently
/// held, and with no resting orders.
pub fn allows_removal(security: &Security, in_new_selection: bool) -> bool {
    !in_new_selection && !security.holds_stock && !security.has_open_orders
}

/// Reconciles `selection` against `universe.members`, consulting `securities`
/// for holding/order state and `limiter` for admission of new symbols.
/// Returns the delta and leaves `universe.members` updated to reflect exactly
/// the symbols actually admitted — a rejected addition is not added, so a
/// repeated `apply` with the same bundle and an unchanged limiter state keeps
/// rejecting it rather than flapping.
pub fn apply(
    universe: &mut Universe,
    selection: Selection,
    securities: &dyn Fn(&Symbol) -> Security,
    limiter: &mut SubscriptionLimiter,
    resolution_for: &dyn Fn(&Symbol) -> crate::resolution::Resolution,
    account_currency: &str,
) -> (SecurityChanges, Vec<crate::error::FeedError>) {
    let selected = match selection {
        Selection::Unchanged => return (SecurityChanges::default(), Vec::new()),
        Selection::Symbols(s) => s.into_iter().collect::<HashSet<_>>(),
    };

    let mut removals = Vec::new();
    for member in universe.members.iter() {
        if selected.contains(member) {
            continue;
        }
        let security = securities(member);
        if allows_removal(&security, false) {
            removals.push(member.clone());
        }
    }
    for symbol in &removals {
        universe.members.remove(symbol);
    }

    let mut additions = Vec::new();
    let mut currency_feeds = Vec::new();
    let mut rejections = Vec::new();
    for symbol in selected {
        if universe.members.contains(&symbol) {
            continue;
        }
        let resolution = resolution_for(&symbol);
        match limiter.can_add(resolution) {
            Ok(()) => {
                let security = securities(&symbol);
                for pair in currency_feeds_required(&security, account_currency) {
                    if !currency_feeds.contains(&pair) {
                        currency_feeds.push(pair);
                    }
                }
                universe.members.insert(symbol.clone());
                additions.push(symbol);
            }
            Err(reason) => {
                rejections.push(crate::error::FeedError::AdmissionRejected { symbol: symbol.name.clone(), reason });
            }
        }
    }

    (SecurityChanges { additions, removals, currency_feeds }, rejections)
}
