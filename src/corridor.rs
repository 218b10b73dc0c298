//! Remittance corridors
//!
//! A corridor is a destination country together with the currency the
//! recipient is paid in and the payout methods offered there. Every transfer
//! is funded in [`SOURCE_CURRENCY`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Currency every transfer is funded in
pub const SOURCE_CURRENCY: &str = "GBP";

/// Destination country (unique key of the rate table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    Somalia,
    Kenya,
}

impl Country {
    /// ISO code of the currency the recipient receives
    pub fn currency(&self) -> &'static str {
        match self {
            Country::Somalia => "USD",
            Country::Kenya => "KES",
        }
    }

    /// Payout methods offered in this country, default first
    pub fn payment_methods(&self) -> &'static [PaymentMethod] {
        match self {
            Country::Somalia => &[PaymentMethod::EvcPlus, PaymentMethod::MoneyCollection],
            Country::Kenya => &[PaymentMethod::MPesa, PaymentMethod::MoneyCollection],
        }
    }

    pub fn default_payment_method(&self) -> PaymentMethod {
        self.payment_methods()[0]
    }

    pub fn supports(&self, method: PaymentMethod) -> bool {
        self.payment_methods().contains(&method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Somalia => "Somalia",
            Country::Kenya => "Kenya",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "somalia" | "so" => Ok(Country::Somalia),
            "kenya" | "ke" => Ok(Country::Kenya),
            other => Err(format!("Unsupported country: {}", other)),
        }
    }
}

/// Payout method on the recipient side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "EVC-PLUS")]
    EvcPlus,
    #[serde(rename = "M-PESA")]
    MPesa,
    #[serde(rename = "Money collection")]
    MoneyCollection,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::EvcPlus => "EVC-PLUS",
            PaymentMethod::MPesa => "M-PESA",
            PaymentMethod::MoneyCollection => "Money collection",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "evc-plus" | "evc_plus" | "evcplus" => Ok(PaymentMethod::EvcPlus),
            "m-pesa" | "m_pesa" | "mpesa" => Ok(PaymentMethod::MPesa),
            "money collection" | "money_collection" => Ok(PaymentMethod::MoneyCollection),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}
