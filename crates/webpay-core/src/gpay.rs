//! # Google Pay Wire Types
//!
//! Request, callback and payload shapes exchanged with the Google Pay client
//! (API version 2.0), plus the builders that derive them from a
//! `WalletConfiguration`.

use crate::config::{GooglePayAuthMethod, GooglePayEnvironment, GooglePayNetwork, WalletConfiguration};
use crate::details::PaymentDetails;
use crate::shipping::{checkout_total, recalculate_total, RecalculatedTotal};
use serde::{Deserialize, Serialize};

pub const API_VERSION: u32 = 2;
pub const API_VERSION_MINOR: u32 = 0;

// =============================================================================
// Payment method
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardParameters {
    pub allowed_auth_methods: Vec<GooglePayAuthMethod>,
    pub allowed_card_networks: Vec<GooglePayNetwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayParameters {
    pub gateway: String,
    pub gateway_merchant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationSpecification {
    /// Always `PAYMENT_GATEWAY`
    #[serde(rename = "type")]
    pub specification_type: String,
    pub parameters: GatewayParameters,
}

/// A card payment method tokenized through a payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Always `CARD`
    #[serde(rename = "type")]
    pub method_type: String,
    pub parameters: CardParameters,
    pub tokenization_specification: TokenizationSpecification,
}

impl PaymentMethod {
    /// Card method from the configured networks and auth methods, tokenized
    /// for `gateway` with the Google Pay merchant identifier.
    pub fn card(configuration: &WalletConfiguration, gateway: &str) -> Self {
        let google = &configuration.google_pay;
        Self {
            method_type: "CARD".to_string(),
            parameters: CardParameters {
                allowed_auth_methods: google.merchant_capabilities.clone(),
                allowed_card_networks: google.supported_networks.clone(),
            },
            tokenization_specification: TokenizationSpecification {
                specification_type: "PAYMENT_GATEWAY".to_string(),
                parameters: GatewayParameters {
                    gateway: gateway.to_string(),
                    gateway_merchant_id: google.merchant_identifier.clone(),
                },
            },
        }
    }
}

// =============================================================================
// Client setup and readiness
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    pub merchant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_origin: Option<String>,
}

/// Serializable part of the options a payments client is created with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub environment: GooglePayEnvironment,
    pub merchant_info: MerchantInfo,
}

impl ClientSettings {
    pub fn from_configuration(configuration: &WalletConfiguration) -> Self {
        Self {
            environment: configuration.google_pay.environment,
            merchant_info: MerchantInfo {
                merchant_id: Some(configuration.google_pay.merchant_identifier.clone()),
                merchant_name: configuration.merchant.display_name.clone(),
                merchant_origin: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsReadyToPayRequest {
    pub api_version: u32,
    pub api_version_minor: u32,
    pub allowed_payment_methods: Vec<PaymentMethod>,
}

impl IsReadyToPayRequest {
    pub fn new(payment_method: PaymentMethod) -> Self {
        Self {
            api_version: API_VERSION,
            api_version_minor: API_VERSION_MINOR,
            allowed_payment_methods: vec![payment_method],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsReadyToPayResponse {
    pub result: bool,
}

// =============================================================================
// Payment data request
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalPriceStatus {
    Estimated,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub total_price_status: TotalPriceStatus,
    pub total_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price_label: Option<String>,
    pub currency_code: String,
}

impl TransactionInfo {
    /// Transaction info for a total, without a display label
    pub fn new(total: &RecalculatedTotal) -> Self {
        Self {
            total_price_status: if total.pending {
                TotalPriceStatus::Estimated
            } else {
                TotalPriceStatus::Final
            },
            total_price: total.amount.value_string(),
            total_price_label: None,
            currency_code: total.amount.currency.clone(),
        }
    }

    /// Builder: show the total's label on the sheet
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.total_price_label = Some(label.into());
        self
    }
}

impl From<RecalculatedTotal> for TransactionInfo {
    fn from(total: RecalculatedTotal) -> Self {
        let label = total.label.clone();
        TransactionInfo::new(&total).with_label(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackIntent {
    PaymentAuthorization,
    ShippingAddress,
    ShippingOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_country_codes: Option<Vec<String>>,
    pub phone_number_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionParameters {
    pub default_selected_option_id: String,
    pub shipping_options: Vec<SelectionOption>,
}

impl ShippingOptionParameters {
    /// Shipping options labelled `"{symbol}{value}: {label}"`.
    ///
    /// `None` unless one option is preselected, since the sheet needs a default.
    pub fn from_configuration(configuration: &WalletConfiguration) -> Option<Self> {
        let details = &configuration.payment_details;
        let default_option = details.selected_shipping_option()?;

        let shipping_options = details
            .shipping_options()
            .iter()
            .map(|option| SelectionOption {
                id: option.id.clone(),
                label: format!(
                    "{}{}: {}",
                    option.amount.currency_symbol(),
                    option.amount.value_string(),
                    option.label
                ),
                description: option.description.clone(),
            })
            .collect();

        Some(Self {
            default_selected_option_id: default_option.id.clone(),
            shipping_options,
        })
    }
}

/// Request handed to the client when the payer clicks the button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataRequest {
    pub api_version: u32,
    pub api_version_minor: u32,
    pub allowed_payment_methods: Vec<PaymentMethod>,
    pub merchant_info: MerchantInfo,
    pub transaction_info: TransactionInfo,
    pub email_required: bool,
    pub shipping_address_required: bool,
    pub shipping_address_parameters: ShippingAddressParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_parameters: Option<ShippingOptionParameters>,
    pub callback_intents: Vec<CallbackIntent>,
}

impl PaymentDataRequest {
    /// Build the request from the configuration as it is at click time
    pub fn from_configuration(configuration: &WalletConfiguration, payment_method: PaymentMethod) -> Self {
        let google = &configuration.google_pay;
        let options = &configuration.payment_options;
        let live_shipping = configuration.requests_shipping_options();

        let mut callback_intents = vec![CallbackIntent::PaymentAuthorization];
        if live_shipping {
            callback_intents.push(CallbackIntent::ShippingAddress);
            callback_intents.push(CallbackIntent::ShippingOption);
        }

        Self {
            api_version: API_VERSION,
            api_version_minor: API_VERSION_MINOR,
            allowed_payment_methods: vec![payment_method],
            merchant_info: MerchantInfo {
                merchant_id: Some(google.merchant_identifier.clone()),
                merchant_name: configuration.merchant.display_name.clone(),
                merchant_origin: Some(configuration.merchant.domain_name.clone()),
            },
            transaction_info: TransactionInfo::new(&checkout_total(&configuration.payment_details)),
            email_required: options.request_payer_email,
            shipping_address_required: options.request_shipping,
            shipping_address_parameters: ShippingAddressParameters {
                allowed_country_codes: google.allowed_country_codes.clone(),
                phone_number_required: options.request_payer_phone,
            },
            shipping_option_required: live_shipping.then_some(true),
            shipping_option_parameters: if live_shipping {
                ShippingOptionParameters::from_configuration(configuration)
            } else {
                None
            },
            callback_intents,
        }
    }
}

// =============================================================================
// Live callbacks
// =============================================================================

/// What made the sheet call back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackTrigger {
    Initialize,
    ShippingAddress,
    ShippingOption,
    Offer,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptionData {
    pub id: String,
}

/// Partial address revealed to the merchant while the sheet is open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateAddress {
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediatePaymentData {
    pub callback_trigger: CallbackTrigger,
    #[serde(default)]
    pub shipping_address: Option<IntermediateAddress>,
    #[serde(default)]
    pub shipping_option_data: Option<SelectionOptionData>,
}

/// Reply to a data-changed callback; serializes to `{}` when empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_transaction_info: Option<TransactionInfo>,
}

impl PaymentDataUpdate {
    /// Reply to a live callback: a new total when the payer picked a known
    /// shipping option, empty for anything else.
    pub fn for_change(details: &PaymentDetails, data: &IntermediatePaymentData) -> Self {
        let new_transaction_info = match (data.callback_trigger, &data.shipping_option_data) {
            (CallbackTrigger::ShippingOption, Some(selection)) => {
                recalculate_total(details, &selection.id).map(TransactionInfo::from)
            }
            _ => None,
        };

        Self {
            new_transaction_info,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_transaction_info.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Success,
    Error,
}

/// Reply to the payment-authorized callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorizationResult {
    pub transaction_state: TransactionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PaymentDataError>,
}

impl PaymentAuthorizationResult {
    pub fn success() -> Self {
        Self {
            transaction_state: TransactionState::Success,
            error: None,
        }
    }

    /// Decline the authorization; the sheet shows `message` to the payer
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            transaction_state: TransactionState::Error,
            error: Some(PaymentDataError {
                reason: "OTHER_ERROR".to_string(),
                message: message.into(),
                intent: CallbackIntent::PaymentAuthorization,
            }),
        }
    }
}

/// Error shown on the payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDataError {
    pub reason: String,
    pub message: String,
    pub intent: CallbackIntent,
}

// =============================================================================
// Payment data payload
// =============================================================================

/// Full shipping address returned with the payment data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub address3: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub sorting_code: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Payload the sheet resolves with once the payer confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub api_version: u32,
    pub api_version_minor: u32,
    /// Tokenized card data, passed through untouched
    pub payment_method_data: serde_json::Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_option_data: Option<SelectionOptionData>,
}
