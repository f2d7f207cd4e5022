//! # webpay-wasm
//!
//! WebAssembly bindings for webpay-rs.
//!
//! The browser glue owns the wallet scripts and sessions; this crate keeps
//! the cart and computes everything the wallets are fed:
//! - Configuration setters taking plain JS objects (snake_case or camelCase keys)
//! - The derived total and the Apple Pay button classes
//! - Google Pay client settings, readiness and payment data requests
//! - Live shipping recalculation for `onPaymentDataChanged`
//! - Normalization of the Google Pay payload into the unified response
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmWebPayments } from 'webpay-wasm';
//!
//! await init();
//!
//! const payments = new WasmWebPayments();
//! payments.set_payment_items([
//!   { label: 'Book', amount: { value: '10.00', currency: 'USD' } },
//! ]);
//!
//! const client = new google.payments.api.PaymentsClient({
//!   ...payments.client_settings(),
//!   paymentDataCallbacks: {
//!     onPaymentAuthorized: () => payments.on_payment_authorized(),
//!     onPaymentDataChanged: (data) => payments.on_payment_data_changed(data),
//!   },
//! });
//! const data = await client.loadPaymentData(payments.payment_data_request());
//! const response = payments.normalize_payment_data(data);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;
use webpay_core::gpay::{
    ClientSettings, IntermediatePaymentData, IsReadyToPayRequest, PaymentAuthorizationResult,
    PaymentDataRequest, PaymentDataUpdate, PaymentMethod,
};
use webpay_core::{
    normalize_google_payment_value, ApplePayConfiguration, GooglePayConfiguration,
    MerchantIdentity, PaymentError, PaymentItem, PaymentOptions, PaymentResponse, PaymentResult,
    ShippingOption, WalletConfiguration,
};

/// Gateway named in the tokenization specification unless overridden
pub const DEFAULT_GATEWAY: &str = "judopay";

/// Wallet configuration held on the page
#[wasm_bindgen]
pub struct WasmWebPayments {
    configuration: WalletConfiguration,
    gateway: String,
}

#[wasm_bindgen]
impl WasmWebPayments {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            configuration: WalletConfiguration::new(),
            gateway: DEFAULT_GATEWAY.to_string(),
        }
    }

    /// Build from a TOML configuration document
    #[wasm_bindgen]
    pub fn from_toml(toml_str: &str) -> Result<WasmWebPayments, JsValue> {
        let configuration = WalletConfiguration::from_toml(toml_str).map_err(to_js_error)?;
        Ok(Self {
            configuration,
            gateway: DEFAULT_GATEWAY.to_string(),
        })
    }

    #[wasm_bindgen]
    pub fn set_gateway(&mut self, gateway: String) {
        self.gateway = gateway;
    }

    #[wasm_bindgen]
    pub fn set_merchant(&mut self, merchant: JsValue) -> Result<(), JsValue> {
        let merchant: MerchantIdentity = from_js(merchant, "merchant")?;
        self.configuration.set_merchant(merchant);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_apple_pay(&mut self, configuration: JsValue) -> Result<(), JsValue> {
        let configuration: ApplePayConfiguration = from_js(configuration, "Apple Pay configuration")?;
        self.configuration.set_apple_pay(configuration);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_google_pay(&mut self, configuration: JsValue) -> Result<(), JsValue> {
        let configuration: GooglePayConfiguration = from_js(configuration, "Google Pay configuration")?;
        self.configuration.set_google_pay(configuration);
        Ok(())
    }

    /// Replace the line items; the total follows
    #[wasm_bindgen]
    pub fn set_payment_items(&mut self, items: JsValue) -> Result<(), JsValue> {
        let items: Vec<PaymentItem> = from_js(items, "payment items")?;
        self.configuration.set_payment_items(items);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_shipping_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: Vec<ShippingOption> = from_js(options, "shipping options")?;
        self.configuration.set_shipping_options(options);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_payment_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: PaymentOptions = from_js(options, "payment options")?;
        self.configuration.set_payment_options(options);
        Ok(())
    }

    /// `{label, amount: {value, currency}, pending}`
    #[wasm_bindgen]
    pub fn total(&self) -> Result<JsValue, JsValue> {
        to_js(&self.configuration.payment_details.total())
    }

    /// Class attribute for the Apple Pay `<button>`
    #[wasm_bindgen]
    pub fn apple_pay_button_class(&self) -> String {
        let apple = &self.configuration.apple_pay;
        format!(
            "ApplePayButton {} {}",
            apple.style.class_name(),
            apple.button_type.class_name()
        )
    }

    /// Whether `onPaymentDataChanged` should be registered with the client
    #[wasm_bindgen]
    pub fn requests_shipping_options(&self) -> bool {
        self.configuration.requests_shipping_options()
    }

    #[wasm_bindgen]
    pub fn client_settings(&self) -> Result<JsValue, JsValue> {
        to_js(&ClientSettings::from_configuration(&self.configuration))
    }

    #[wasm_bindgen]
    pub fn is_ready_to_pay_request(&self) -> Result<JsValue, JsValue> {
        to_js(&IsReadyToPayRequest::new(self.payment_method()))
    }

    #[wasm_bindgen]
    pub fn payment_data_request(&self) -> Result<JsValue, JsValue> {
        to_js(&self.build_payment_data_request())
    }

    /// Answer for `onPaymentAuthorized`
    #[wasm_bindgen]
    pub fn on_payment_authorized(&self) -> Result<JsValue, JsValue> {
        to_js(&PaymentAuthorizationResult::success())
    }

    /// Answer for `onPaymentDataChanged`; `{}` unless a known shipping option was picked
    #[wasm_bindgen]
    pub fn on_payment_data_changed(&self, data: JsValue) -> Result<JsValue, JsValue> {
        let data: IntermediatePaymentData = from_js(data, "intermediate payment data")?;
        to_js(&self.payment_data_update(&data))
    }

    /// Unified response for the payload `loadPaymentData` resolved with
    #[wasm_bindgen]
    pub fn normalize_payment_data(&self, data: JsValue) -> Result<JsValue, JsValue> {
        let raw: serde_json::Value = from_js(data, "payment data")?;
        let response = Self::normalize(raw).map_err(to_js_error)?;
        to_js(&response)
    }
}

impl WasmWebPayments {
    fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::card(&self.configuration, &self.gateway)
    }

    fn build_payment_data_request(&self) -> PaymentDataRequest {
        PaymentDataRequest::from_configuration(&self.configuration, self.payment_method())
    }

    fn payment_data_update(&self, data: &IntermediatePaymentData) -> PaymentDataUpdate {
        PaymentDataUpdate::for_change(&self.configuration.payment_details, data)
    }

    fn normalize(raw: serde_json::Value) -> PaymentResult<PaymentResponse> {
        normalize_google_payment_value(raw)
    }
}

impl Default for WasmWebPayments {
    fn default() -> Self {
        Self::new()
    }
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| to_js_error(PaymentError::InvalidRequest(format!("Invalid {}: {}", what, e))))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| to_js_error(PaymentError::Serialization(e.to_string())))
}

fn to_js_error(err: PaymentError) -> JsValue {
    js_sys::Error::new(&err.message()).into()
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webpay_core::{ApplePayButtonStyle, ApplePayButtonType, CurrencyAmount};

    fn usd(value: &str) -> CurrencyAmount {
        CurrencyAmount::parse(value, "USD").unwrap()
    }

    fn payments() -> WasmWebPayments {
        let mut payments = WasmWebPayments::new();
        payments.configuration = WalletConfiguration::new()
            .with_items(vec![
                PaymentItem::new("Book", usd("10.00")),
                PaymentItem::new("Pen", usd("5.00")),
            ])
            .with_shipping_options(vec![
                ShippingOption::new("std", "Standard", usd("2.00")),
                ShippingOption::new("exp", "Express", usd("9.00")).selected(),
            ])
            .with_payment_options(PaymentOptions::default().with_shipping(None));
        payments
    }

    #[test]
    fn test_apple_pay_button_class() {
        let mut payments = WasmWebPayments::new();
        assert_eq!(
            payments.apple_pay_button_class(),
            "ApplePayButton ApplePayButtonBlack ApplePayButtonPlain"
        );

        payments.configuration.apple_pay = ApplePayConfiguration::new("merchant.example")
            .with_button(ApplePayButtonStyle::White, ApplePayButtonType::Donate);
        assert_eq!(
            payments.apple_pay_button_class(),
            "ApplePayButton ApplePayButtonWhite ApplePayButtonDonate"
        );
    }

    #[test]
    fn test_payment_data_request_uses_gateway() {
        let mut payments = payments();
        payments.set_gateway("other-gateway".to_string());

        let request = payments.build_payment_data_request();
        assert_eq!(request.transaction_info.total_price, "24.00");
        assert_eq!(
            request.allowed_payment_methods[0]
                .tokenization_specification
                .parameters
                .gateway,
            "other-gateway"
        );
        assert!(payments.requests_shipping_options());
    }

    #[test]
    fn test_payment_data_update() {
        let payments = payments();
        let data: IntermediatePaymentData = serde_json::from_value(json!({
            "callbackTrigger": "SHIPPING_OPTION",
            "shippingOptionData": {"id": "std"}
        }))
        .unwrap();

        let update = payments.payment_data_update(&data);
        assert_eq!(update.new_transaction_info.unwrap().total_price, "17.00");
    }

    #[test]
    fn test_normalize() {
        let response = WasmWebPayments::normalize(json!({
            "apiVersion": 2,
            "apiVersionMinor": 0,
            "paymentMethodData": {"type": "CARD"}
        }))
        .unwrap();
        assert!(response.billing_details.is_none());

        assert!(WasmWebPayments::normalize(json!({"apiVersion": 2})).is_err());
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
