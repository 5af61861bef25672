//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PDV Adegas                             │
//! │                                                                         │
//! │  Screen action ──► command fn ──► Result<T, ApiError>                   │
//! │                        │                                                │
//! │                        ├── CoreError::InvalidIdentifier ─┐              │
//! │                        ├── CoreError::EmptyCart ─────────┼─► ApiError   │
//! │                        ├── ValidationError ──────────────┤      │       │
//! │                        └── no session ───────────────────┘      │       │
//! │                                                                 ▼       │
//! │                                      toast: { code, message }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are in Portuguese because they are shown to the operator as-is.
//! Nothing here is fatal: the action is aborted and state is untouched.

use adega_core::{CoreError, ValidationError};
use serde::Serialize;

/// Error returned from register commands.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_PAYMENT",
///   "message": "Valor recebido é menor que o total"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Message shown in the toast
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form input rejected
    ValidationError,

    /// CPF failed format or check digits
    InvalidIdentifier,

    /// Cash received below total
    InsufficientPayment,

    /// Checkout with nothing in the cart
    EmptyCart,

    /// Barcode or product id unknown
    NotFound,

    /// No operator logged in
    Unauthenticated,

    /// A payment is already being processed
    PaymentInProgress,

    /// Action not allowed at the current payment stage
    InvalidPaymentState,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Faça login para continuar")
    }

    pub fn payment_in_progress() -> Self {
        ApiError::new(
            ErrorCode::PaymentInProgress,
            "Aguarde: pagamento em processamento",
        )
    }

    pub fn no_checkout() -> Self {
        ApiError::new(
            ErrorCode::InvalidPaymentState,
            "Nenhum pedido aguardando pagamento",
        )
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "name" => "Nome",
        "category" => "Categoria",
        "price" | "amount" => "Preço",
        "stock" => "Estoque",
        "barcode" => "Código de barras",
        "password" => "Senha",
        "card number" => "Número do cartão",
        "cardholder name" => "Nome no cartão",
        "expiry" => "Validade",
        "cvv" => "CVV",
        other => other,
    }
}

fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::Required { field } => {
            format!("{} é obrigatório", field_label(field))
        }
        ValidationError::TooShort { field, min } if field == "password" => {
            format!("A senha deve ter no mínimo {} caracteres", min)
        }
        ValidationError::TooShort { field, min } => {
            format!("{} deve ter no mínimo {} caracteres", field_label(field), min)
        }
        ValidationError::TooLong { field, max } => {
            format!("{} deve ter no máximo {} caracteres", field_label(field), max)
        }
        ValidationError::Negative { field } => {
            format!("{} não pode ser negativo", field_label(field))
        }
        ValidationError::InvalidFormat { field, .. } => {
            format!("{} inválido", field_label(field))
        }
        ValidationError::Duplicate { field, value } => {
            format!("{} '{}' já cadastrado", field_label(field), value)
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIdentifier => ApiError::new(
                ErrorCode::InvalidIdentifier,
                "CPF inválido. Por favor, verifique o CPF digitado.",
            ),
            CoreError::InsufficientInput { field } if field.starts_with("card")
                || matches!(field.as_str(), "expiry" | "cvv") =>
            {
                ApiError::validation("Preencha todos os dados do cartão")
            }
            CoreError::InsufficientInput { field } => {
                ApiError::validation(format!("Preencha o campo {}", field_label(&field)))
            }
            CoreError::InsufficientPayment { .. } => ApiError::new(
                ErrorCode::InsufficientPayment,
                "Valor recebido é menor que o total",
            ),
            CoreError::EmptyCart => ApiError::new(
                ErrorCode::EmptyCart,
                "Carrinho vazio. Adicione produtos antes de finalizar.",
            ),
            CoreError::ProductNotFound(code) => {
                ApiError::not_found(format!("Produto não encontrado: {}", code))
            }
            CoreError::InvalidPaymentState { state, action } => {
                tracing::debug!(%state, %action, "Rejected payment action");
                ApiError::new(
                    ErrorCode::InvalidPaymentState,
                    "Ação indisponível nesta etapa do pagamento",
                )
            }
            CoreError::Validation(e) => ApiError::validation(validation_message(&e)),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(validation_message(&err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
