//! Splitting an owed amount across payment methods
//!
//! Cash may be combined with the card terminal: the terminal takes whatever
//! the cash does not cover, and cash beyond the amount is returned as change.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::SettlementError;

/// Payment method label carried in billing requests ("MetodoPago1/2")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Terminal,
    /// Account credit. Parsed and labelled only; [`Settlement::split`] never
    /// selects it.
    Credit,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Terminal => "Terminal",
            Self::Credit => "Credito",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" => Some(Self::Cash),
            "terminal" => Some(Self::Terminal),
            "credito" | "crédito" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| SettlementError::UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the operator picked at the till
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentSelection {
    pub cash: bool,
    /// Cash handed over; `None` until the operator types a figure
    pub cash_received: Option<Decimal>,
    pub terminal: bool,
}

/// Settled split of an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub amount: Decimal,
    /// Portion of the amount paid in cash
    pub cash_amount: Decimal,
    /// Remainder charged on the card terminal
    pub terminal_amount: Decimal,
    /// Cash handed back
    pub change: Decimal,
    pub primary: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<PaymentMethod>,
}

impl Settlement {
    pub fn split(amount: Decimal, selection: &PaymentSelection) -> Result<Self, SettlementError> {
        let amount = amount.max(Decimal::ZERO);

        match (selection.cash, selection.terminal) {
            (false, false) => Err(SettlementError::NoPaymentMethod),
            (false, true) => Ok(Self {
                amount,
                cash_amount: Decimal::ZERO,
                terminal_amount: amount,
                change: Decimal::ZERO,
                primary: PaymentMethod::Terminal,
                secondary: None,
            }),
            (true, terminal) => {
                let received = selection.cash_received.ok_or(SettlementError::MissingCash)?;
                if !terminal && received < amount {
                    return Err(SettlementError::InsufficientCash { received, amount });
                }
                let cash_amount = received.min(amount).max(Decimal::ZERO);
                Ok(Self {
                    amount,
                    cash_amount,
                    terminal_amount: if terminal {
                        amount - cash_amount
                    } else {
                        Decimal::ZERO
                    },
                    change: (received - amount).max(Decimal::ZERO),
                    primary: PaymentMethod::Cash,
                    secondary: terminal.then_some(PaymentMethod::Terminal),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cash(received: Decimal) -> PaymentSelection {
        PaymentSelection {
            cash: true,
            cash_received: Some(received),
            terminal: false,
        }
    }

    #[test]
    fn labels_round_trip() {
        for method in [PaymentMethod::Cash, PaymentMethod::Terminal, PaymentMethod::Credit] {
            assert_eq!(PaymentMethod::from_label(method.label()), Some(method));
        }
        assert_eq!("CRÉDITO".parse::<PaymentMethod>(), Ok(PaymentMethod::Credit));
        assert_eq!(
            "cheque".parse::<PaymentMethod>(),
            Err(SettlementError::UnknownMethod("cheque".into()))
        );
    }

    #[test]
    fn split_never_selects_credit() {
        for (cash, terminal) in [(true, false), (false, true), (true, true)] {
            let selection = PaymentSelection {
                cash,
                cash_received: Some(dec!(50)),
                terminal,
            };
            let s = Settlement::split(dec!(30), &selection).unwrap();
            assert_ne!(s.primary, PaymentMethod::Credit);
            assert_ne!(s.secondary, Some(PaymentMethod::Credit));
        }
    }

    #[test]
    fn cash_only_returns_change() {
        let s = Settlement::split(dec!(30), &cash(dec!(50))).unwrap();
        assert_eq!(s.cash_amount, dec!(30));
        assert_eq!(s.change, dec!(20));
        assert_eq!(s.terminal_amount, Decimal::ZERO);
        assert_eq!(s.primary, PaymentMethod::Cash);
        assert_eq!(s.secondary, None);
    }

    #[test]
    fn cash_only_must_cover_amount() {
        assert_eq!(
            Settlement::split(dec!(30), &cash(dec!(20))),
            Err(SettlementError::InsufficientCash {
                received: dec!(20),
                amount: dec!(30),
            })
        );
        let selection = PaymentSelection {
            cash: true,
            ..Default::default()
        };
        assert_eq!(
            Settlement::split(dec!(30), &selection),
            Err(SettlementError::MissingCash)
        );
    }

    #[test]
    fn terminal_only_takes_everything() {
        let selection = PaymentSelection {
            terminal: true,
            ..Default::default()
        };
        let s = Settlement::split(dec!(45.50), &selection).unwrap();
        assert_eq!(s.terminal_amount, dec!(45.50));
        assert_eq!(s.primary, PaymentMethod::Terminal);
    }

    #[test]
    fn mixed_payment_sends_remainder_to_terminal() {
        let selection = PaymentSelection {
            cash: true,
            cash_received: Some(dec!(20)),
            terminal: true,
        };
        let s = Settlement::split(dec!(50), &selection).unwrap();
        assert_eq!(s.cash_amount, dec!(20));
        assert_eq!(s.terminal_amount, dec!(30));
        assert_eq!(s.change, Decimal::ZERO);
        assert_eq!(s.secondary, Some(PaymentMethod::Terminal));

        let selection = PaymentSelection {
            cash_received: Some(dec!(60)),
            ..selection
        };
        let s = Settlement::split(dec!(50), &selection).unwrap();
        assert_eq!(s.terminal_amount, Decimal::ZERO);
        assert_eq!(s.change, dec!(10));
    }

    #[test]
    fn nothing_selected_is_rejected() {
        assert_eq!(
            Settlement::split(dec!(10), &PaymentSelection::default()),
            Err(SettlementError::NoPaymentMethod)
        );
    }
}
