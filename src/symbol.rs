use std::fmt;

/// The security type carried on a `Symbol`, mirroring the teacher's
/// `MarketType` distinction between tradable product classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum SecurityType {
    Equity,
    Forex,
    Future,
    Crypto,
    Index,
    Option,
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityType::Equity => "Equity",
            SecurityType::Forex => "Forex",
            SecurityType::Future => "Future",
            SecurityType::Crypto => "Crypto",
            SecurityType::Index => "Index",
            SecurityType::Option => "Option",
        };
        write!(f, "{}", s)
    }
}

/// A value-object identifier: structural equality over `(name, security_type,
/// market)`, an opaque `unique_id` is carried for symbol-cache lookups but
/// never participates in equality (two feeds mapping the same ticker from
/// different vendors are still the same tradable symbol).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Symbol {
    pub name: String,
    pub security_type: SecurityType,
    pub market: String,
    pub unique_id: u64,
}

impl Symbol {
    pub fn new(name: impl Into<String>, security_type: SecurityType, market: impl Into<String>) -> Self {
        let name = name.into();
        let market = market.into();
        Symbol {
            unique_id: Self::hash_id(&name, security_type, &market),
            name,
            security_type,
            market,
        }
    }

    fn hash_id(name: &str, security_type: SecurityType, market: &str) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = ahash::AHasher::default();
        name.hash(&mut hasher);
        security_type.hash(&mut hasher);
        market.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.security_type == other.security_type && self.market == other.market
    }
}
impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.name, self.security_type, &self.market).cmp(&(&other.name, other.security_type, &other.market))
    }
}
impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.security_type.hash(state);
        self.market.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.security_type, self.market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_unique_id() {
        let a = Symbol::new("EURUSD", SecurityType::Forex, "Oanda");
        let b = Symbol::new("EURUSD", SecurityType::Forex, "Oanda");
        assert_eq!(a, b);
        assert_eq!(a.unique_id, b.unique_id);
    }

    #[test]
    fn different_market_is_a_different_symbol() {
        let a = Symbol::new("SPY", SecurityType::Equity, "NYSE");
        let b = Symbol::new("SPY", SecurityType::Equity, "ARCA");
        assert_ne!(a, b);
    }
}
