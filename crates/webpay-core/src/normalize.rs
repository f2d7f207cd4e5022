//! # Response Normalization
//!
//! Maps each wallet's raw payment payload into the unified `PaymentResponse`,
//! and provider rejections into a `PaymentError`. Fields the wallet did not
//! return stay `None`; nothing is defaulted.

use crate::error::PaymentError;
use crate::gpay::{Address, PaymentData};
use crate::response::{BillingDetails, PaymentResponse, ShippingDetails, WalletKind};
use serde::{Deserialize, Serialize};

/// Normalize a Google Pay payment data payload
pub fn normalize_google_payment(data: PaymentData) -> PaymentResponse {
    let billing_details = data.email.map(|email| BillingDetails {
        email: Some(email),
        ..BillingDetails::default()
    });

    PaymentResponse {
        wallet: WalletKind::GooglePay,
        google_api_version: Some(data.api_version),
        google_api_minor: Some(data.api_version_minor),
        payment_details: data.payment_method_data,
        billing_details,
        shipping_details: data.shipping_address.map(shipping_from_google_address),
        shipping_option_selected: data.shipping_option_data.map(|option| option.id),
    }
}

/// Normalize a Google Pay payload that arrived as untyped JSON
pub fn normalize_google_payment_value(value: serde_json::Value) -> Result<PaymentResponse, PaymentError> {
    let data: PaymentData = serde_json::from_value(value)?;
    Ok(normalize_google_payment(data))
}

fn shipping_from_google_address(address: Address) -> ShippingDetails {
    let address_line = [address.address1, address.address2, address.address3]
        .into_iter()
        .flatten()
        .filter(|line| !line.is_empty())
        .collect();

    ShippingDetails {
        address_line,
        administrative_area: address.administrative_area,
        country_code: address.country_code,
        locality: address.locality,
        postal_code: address.postal_code,
        name: address.name,
        phone: address.phone_number,
        sorting_code: address.sorting_code,
        ..ShippingDetails::default()
    }
}

/// Contact as returned by an Apple Pay session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayContact {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub sub_locality: Option<String>,
    #[serde(default)]
    pub administrative_area: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl ApplePayContact {
    /// "Given Family", or whichever part is present
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplePayShippingMethod {
    pub identifier: String,
}

/// Authorized Apple Pay payment as received by a gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayPayment {
    /// Encrypted payment token, passed through untouched
    pub token: serde_json::Value,
    #[serde(default)]
    pub billing_contact: Option<ApplePayContact>,
    #[serde(default)]
    pub shipping_contact: Option<ApplePayContact>,
    #[serde(default)]
    pub shipping_method: Option<ApplePayShippingMethod>,
}

/// Normalize an Apple Pay payment.
///
/// Apple returns email and phone on the shipping contact, so billing details
/// fall back to it for those fields.
pub fn normalize_apple_payment(payment: ApplePayPayment) -> PaymentResponse {
    let billing = payment.billing_contact.as_ref();
    let shipping = payment.shipping_contact.as_ref();

    let billing_details = BillingDetails {
        name: billing.and_then(ApplePayContact::full_name),
        email: billing
            .and_then(|c| c.email_address.clone())
            .or_else(|| shipping.and_then(|c| c.email_address.clone())),
        phone: billing
            .and_then(|c| c.phone_number.clone())
            .or_else(|| shipping.and_then(|c| c.phone_number.clone())),
    };

    let shipping_details = payment
        .shipping_contact
        .as_ref()
        .filter(|contact| !contact.address_lines.is_empty() || contact.postal_code.is_some())
        .map(|contact| ShippingDetails {
            address_line: contact.address_lines.clone(),
            administrative_area: contact.administrative_area.clone(),
            country: contact.country.clone(),
            country_code: contact.country_code.clone(),
            locality: contact.locality.clone(),
            dependent_locality: contact.sub_locality.clone(),
            postal_code: contact.postal_code.clone(),
            name: contact.full_name(),
            phone: contact.phone_number.clone(),
            sorting_code: None,
        });

    PaymentResponse {
        wallet: WalletKind::ApplePay,
        google_api_version: None,
        google_api_minor: None,
        payment_details: payment.token,
        billing_details: (!billing_details.is_empty()).then_some(billing_details),
        shipping_details,
        shipping_option_selected: payment.shipping_method.map(|method| method.identifier),
    }
}

/// Map a provider rejection into the unified error
pub fn normalize_failure(wallet: WalletKind, message: impl Into<String>) -> PaymentError {
    PaymentError::provider(wallet, message)
}
