//! Supported currencies and currency pairs
//!
//! Static configuration: the set of tradable instruments is fixed at compile
//! time and never changes while the engine runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// List of supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// United States dollar
    USD,
    /// Euro
    EUR,
    /// Ruble
    RUB,
    /// Japanese yen
    JPY,
    /// Sterling
    GBP,
    /// Australian dollar
    AUD,
    /// Canadian dollar
    CAD,
    /// Swiss franc
    CHF,
    /// Swedish krona
    SEK,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// List of supported currency pairs
///
/// The base currency is the unit being bought or sold; the quote currency is
/// what it is paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyPair {
    UsdEur,
    UsdRub,
    UsdJpy,
    UsdGbp,
    UsdAud,
    UsdCad,
    UsdChf,
    UsdSek,
    EurRub,
    EurGbp,
    EurChf,
    RubJpy,
}

impl CurrencyPair {
    /// All supported pairs, one matching worker each
    pub const ALL: [CurrencyPair; 12] = [
        CurrencyPair::UsdEur,
        CurrencyPair::UsdRub,
        CurrencyPair::UsdJpy,
        CurrencyPair::UsdGbp,
        CurrencyPair::UsdAud,
        CurrencyPair::UsdCad,
        CurrencyPair::UsdChf,
        CurrencyPair::UsdSek,
        CurrencyPair::EurRub,
        CurrencyPair::EurGbp,
        CurrencyPair::EurChf,
        CurrencyPair::RubJpy,
    ];

    /// The currency being bought or sold
    pub fn base(&self) -> Currency {
        match self {
            CurrencyPair::UsdEur
            | CurrencyPair::UsdRub
            | CurrencyPair::UsdJpy
            | CurrencyPair::UsdGbp
            | CurrencyPair::UsdAud
            | CurrencyPair::UsdCad
            | CurrencyPair::UsdChf
            | CurrencyPair::UsdSek => Currency::USD,
            CurrencyPair::EurRub | CurrencyPair::EurGbp | CurrencyPair::EurChf => Currency::EUR,
            CurrencyPair::RubJpy => Currency::RUB,
        }
    }

    /// The currency the base is paid with
    pub fn quote(&self) -> Currency {
        match self {
            CurrencyPair::UsdEur => Currency::EUR,
            CurrencyPair::UsdRub | CurrencyPair::EurRub => Currency::RUB,
            CurrencyPair::UsdJpy | CurrencyPair::RubJpy => Currency::JPY,
            CurrencyPair::UsdGbp | CurrencyPair::EurGbp => Currency::GBP,
            CurrencyPair::UsdAud => Currency::AUD,
            CurrencyPair::UsdCad => Currency::CAD,
            CurrencyPair::UsdChf | CurrencyPair::EurChf => Currency::CHF,
            CurrencyPair::UsdSek => Currency::SEK,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.quote())
    }
}
