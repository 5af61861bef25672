//! # Payment Module
//!
//! Everything the Payment screen computes: card field masks, cash change,
//! and the state machine that drives a single checkout.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PaymentFlow States                                 │
//! │                                                                         │
//! │  AwaitingMethodSelection                                               │
//! │        │ select_method()                                                │
//! │        ▼                                                                │
//! │  AwaitingDetails { method } ◄──────────┐                                │
//! │        │ submit(details)               │ validation fails (no change)   │
//! │        ├───────────────────────────────┘                                │
//! │        ▼                               ▲                                │
//! │  Processing { method } ── cancel() ────┘                                │
//! │        │ complete(receipt_id, at)                                       │
//! │        ▼                                                                │
//! │  Completed ──► Receipt                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow never generates ids or reads the clock; the caller supplies
//! both when completing, which keeps this crate free of I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::cart::CheckoutSnapshot;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Receipt, ReceiptLine};

/// Card numbers are capped at 16 digits (19 characters with spaces).
pub const CARD_NUMBER_DIGITS: usize = 16;

/// `MMYY`
pub const EXPIRY_DIGITS: usize = 4;

pub const CVV_MAX_DIGITS: usize = 4;

// =============================================================================
// Card Field Masks
// =============================================================================

fn digits_only(raw: &str, max: usize) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

/// Groups card digits by four: `"4111111111111111"` → `"4111 1111 1111 1111"`.
///
/// ```rust
/// use adega_core::payment::format_card_number;
///
/// assert_eq!(format_card_number("411111"), "4111 11");
/// assert_eq!(format_card_number("4111-1111-1111-1111-99"), "4111 1111 1111 1111");
/// ```
pub fn format_card_number(raw: &str) -> String {
    let digits = digits_only(raw, CARD_NUMBER_DIGITS);

    let mut out = String::with_capacity(CARD_NUMBER_DIGITS + 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(d);
    }
    out
}

/// Masks expiry input as `MM/YY`.
///
/// The slash appears as soon as two digits are present.
///
/// ```rust
/// use adega_core::payment::format_expiry;
///
/// assert_eq!(format_expiry("1"), "1");
/// assert_eq!(format_expiry("12"), "12/");
/// assert_eq!(format_expiry("12/279"), "12/27");
/// ```
pub fn format_expiry(raw: &str) -> String {
    let digits = digits_only(raw, EXPIRY_DIGITS);
    if digits.len() < 2 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    format!("{}/{}", month, year)
}

/// Keeps at most four digits.
pub fn sanitize_cvv(raw: &str) -> String {
    digits_only(raw, CVV_MAX_DIGITS)
}

/// Cardholder names are printed upper-case on the card.
pub fn normalize_holder_name(raw: &str) -> String {
    raw.to_uppercase()
}

// =============================================================================
// Payment Details
// =============================================================================

/// The credit card form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    /// Applies the input masks to raw keystrokes.
    pub fn from_raw(number: &str, holder_name: &str, expiry: &str, cvv: &str) -> Self {
        CardDetails {
            number: format_card_number(number),
            holder_name: normalize_holder_name(holder_name),
            expiry: format_expiry(expiry),
            cvv: sanitize_cvv(cvv),
        }
    }

    /// Every field must be filled in. No Luhn or expiry-date check: there is
    /// no gateway behind the form.
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("card number", &self.number),
            ("cardholder name", &self.holder_name),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CoreError::missing(field)),
            None => Ok(()),
        }
    }
}

/// What the operator submitted for the selected method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Card(CardDetails),
    Cash { received: Money },
    Pix,
}

impl PaymentDetails {
    /// Cash details from the "Valor recebido" field. Unparseable text counts
    /// as nothing received.
    pub fn cash_from_text(received: &str) -> Self {
        PaymentDetails::Cash {
            received: Money::parse_lenient(received),
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::Cash { .. } => PaymentMethod::Cash,
            PaymentDetails::Pix => PaymentMethod::Pix,
        }
    }
}

// =============================================================================
// Change
// =============================================================================

/// Change owed for a cash payment.
///
/// ```rust
/// use adega_core::money::Money;
/// use adega_core::payment::compute_change;
///
/// let change = compute_change(Money::from_cents(10000), Money::from_cents(15000)).unwrap();
/// assert_eq!(change.cents(), 5000);
///
/// assert!(compute_change(Money::from_cents(10000), Money::from_cents(8000)).is_err());
/// ```
pub fn compute_change(total: Money, received: Money) -> CoreResult<Money> {
    if received < total {
        return Err(CoreError::InsufficientPayment { total, received });
    }
    Ok(received - total)
}

/// Live "Troco" preview while the operator types; never negative.
pub fn preview_change(total: Money, received: Money) -> Money {
    received.saturating_sub_to_zero(total)
}

// =============================================================================
// Payment Flow
// =============================================================================

/// Where a checkout currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PaymentStage {
    AwaitingMethodSelection,
    AwaitingDetails { method: PaymentMethod },
    Processing { method: PaymentMethod },
    Completed { method: PaymentMethod },
}

impl fmt::Display for PaymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStage::AwaitingMethodSelection => write!(f, "awaiting method selection"),
            PaymentStage::AwaitingDetails { method } => write!(f, "awaiting {} details", method),
            PaymentStage::Processing { method } => write!(f, "processing {}", method),
            PaymentStage::Completed { method } => write!(f, "completed by {}", method),
        }
    }
}

/// Amounts fixed at submit time, carried into the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settlement {
    received: Option<Money>,
    change: Money,
}

/// One checkout, from method selection to receipt.
#[derive(Debug, Clone)]
pub struct PaymentFlow {
    snapshot: CheckoutSnapshot,
    stage: PaymentStage,
    settlement: Option<Settlement>,
    receipt: Option<Receipt>,
}

impl PaymentFlow {
    pub fn new(snapshot: CheckoutSnapshot) -> Self {
        PaymentFlow {
            snapshot,
            stage: PaymentStage::AwaitingMethodSelection,
            settlement: None,
            receipt: None,
        }
    }

    fn reject(&self, action: &str) -> CoreError {
        CoreError::InvalidPaymentState {
            state: self.stage.to_string(),
            action: action.to_string(),
        }
    }

    /// Picks (or switches) the payment method.
    ///
    /// ## Errors
    /// `InvalidPaymentState` once processing has started.
    pub fn select_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        match self.stage {
            PaymentStage::AwaitingMethodSelection | PaymentStage::AwaitingDetails { .. } => {
                self.stage = PaymentStage::AwaitingDetails { method };
                Ok(())
            }
            _ => Err(self.reject("select a payment method")),
        }
    }

    /// Validates the details and moves to `Processing`.
    ///
    /// On any error the flow is left exactly as it was, so the operator can
    /// fix the form and resubmit.
    ///
    /// ## Errors
    /// - `InsufficientInput` for an incomplete card form
    /// - `InsufficientPayment` when cash does not cover the total
    /// - `InvalidPaymentState` when not awaiting details for this method
    pub fn submit(&mut self, details: &PaymentDetails) -> CoreResult<()> {
        let method = match self.stage {
            PaymentStage::AwaitingDetails { method } if method == details.method() => method,
            _ => return Err(self.reject(&format!("submit {} payment", details.method()))),
        };

        let settlement = match details {
            PaymentDetails::Card(card) => {
                card.validate()?;
                Settlement {
                    received: None,
                    change: Money::zero(),
                }
            }
            PaymentDetails::Cash { received } => Settlement {
                received: Some(*received),
                change: compute_change(self.total(), *received)?,
            },
            PaymentDetails::Pix => Settlement {
                received: None,
                change: Money::zero(),
            },
        };

        self.settlement = Some(settlement);
        self.stage = PaymentStage::Processing { method };
        Ok(())
    }

    /// Finishes processing and produces the receipt.
    pub fn complete(&mut self, receipt_id: String, completed_at: DateTime<Utc>) -> CoreResult<Receipt> {
        let (method, settlement) = match (self.stage, self.settlement) {
            (PaymentStage::Processing { method }, Some(settlement)) => (method, settlement),
            _ => return Err(self.reject("complete payment")),
        };

        let receipt = Receipt {
            id: receipt_id,
            method,
            lines: self.snapshot.lines.iter().map(ReceiptLine::from).collect(),
            total: self.snapshot.total,
            received: settlement.received,
            change: settlement.change,
            completed_at,
        };

        self.stage = PaymentStage::Completed { method };
        self.receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Abandons processing and returns to the details form.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match self.stage {
            PaymentStage::Processing { method } => {
                self.settlement = None;
                self.stage = PaymentStage::AwaitingDetails { method };
                Ok(())
            }
            _ => Err(self.reject("cancel payment")),
        }
    }

    pub fn stage(&self) -> PaymentStage {
        self.stage
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.stage, PaymentStage::Processing { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.stage, PaymentStage::Completed { .. })
    }

    pub fn snapshot(&self) -> &CheckoutSnapshot {
        &self.snapshot
    }

    pub fn total(&self) -> Money {
        self.snapshot.total
    }

    /// Set once the flow is `Completed`.
    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
