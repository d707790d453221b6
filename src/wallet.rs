use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::{Result, StakingError};
use crate::evm::address::encode_hex;
use crate::evm::{Address, TxHash};

const GENERIC_FAILURE: &str = "Transaction failed";

/// Bridge to the injected EIP-1193 provider (`window.ethereum`).
/// Signing happens in the wallet; this only forwards requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletAdapter;

#[derive(Serialize)]
struct TransactionRequest {
    from: String,
    to: String,
    data: String,
}

/// The parts of a provider error worth showing to a user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderError {
    #[serde(default)]
    short_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl ProviderError {
    /// Most specific field first.
    fn best_message(self) -> String {
        let data_message = self.data.as_ref().and_then(|d| match d {
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        });
        [self.short_message, data_message, self.reason, self.message]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}

impl WalletAdapter {
    pub fn new() -> Self {
        Self
    }

    fn provider() -> Result<JsValue> {
        let window = web_sys::window().ok_or_else(|| StakingError::Wallet("window not available".to_string()))?;
        let ethereum = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum"))
            .map_err(|_| StakingError::Wallet("Wallet not found".to_string()))?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return Err(StakingError::Wallet("No Ethereum wallet installed".to_string()));
        }
        Ok(ethereum)
    }

    pub fn is_installed() -> bool {
        Self::provider().is_ok()
    }

    async fn request(method: &str, params: JsValue) -> Result<JsValue> {
        let provider = Self::provider()?;

        let args = js_sys::Object::new();
        js_sys::Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(|_| StakingError::Wallet("failed to build request".to_string()))?;
        js_sys::Reflect::set(&args, &JsValue::from_str("params"), &params)
            .map_err(|_| StakingError::Wallet("failed to build request".to_string()))?;

        let request_fn: js_sys::Function = js_sys::Reflect::get(&provider, &JsValue::from_str("request"))
            .map_err(|_| StakingError::Wallet("request method not found".to_string()))?
            .dyn_into()
            .map_err(|_| StakingError::Wallet("request is not a function".to_string()))?;

        let promise: js_sys::Promise = request_fn
            .call1(&provider, &args)
            .map_err(|e| StakingError::Wallet(js_error_to_string(e)))?
            .dyn_into()
            .map_err(|_| StakingError::Wallet("request didn't return promise".to_string()))?;

        wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| StakingError::Wallet(js_error_to_string(e)))
    }

    fn first_account(value: JsValue) -> Result<Option<Address>> {
        let accounts: Vec<String> = from_value(value).map_err(|e| StakingError::Wallet(e.to_string()))?;
        accounts.first().map(|a| a.parse()).transpose()
    }

    /// Prompts the wallet for access and returns the selected account.
    pub async fn connect_wallet() -> Result<Address> {
        let accounts = Self::request("eth_requestAccounts", js_sys::Array::new().into()).await?;
        Self::first_account(accounts)?.ok_or_else(|| StakingError::Wallet("No account authorized".to_string()))
    }

    /// Already-authorized account, without prompting.
    pub async fn current_account() -> Result<Option<Address>> {
        let accounts = Self::request("eth_accounts", js_sys::Array::new().into()).await?;
        Self::first_account(accounts)
    }

    /// Hands the transaction to the wallet for signing and broadcast.
    pub async fn send_transaction(&self, from: &Address, to: &Address, data: &[u8]) -> Result<TxHash> {
        let tx = TransactionRequest {
            from: from.to_string(),
            to: to.to_string(),
            data: encode_hex(data),
        };
        let params = to_value(&[tx]).map_err(|e| StakingError::Wallet(e.to_string()))?;
        let hash = Self::request("eth_sendTransaction", params).await?;
        hash.as_string()
            .map(TxHash::new)
            .ok_or_else(|| StakingError::Wallet("transaction hash not a string".to_string()))
    }

    /// Calls `callback` with the new primary account whenever the user
    /// switches or disconnects accounts in the wallet.
    pub fn on_accounts_changed(callback: impl Fn(Option<Address>) + 'static) -> Result<()> {
        let provider = Self::provider()?;
        let on_fn: js_sys::Function = js_sys::Reflect::get(&provider, &JsValue::from_str("on"))
            .map_err(|_| StakingError::Wallet("on method not found".to_string()))?
            .dyn_into()
            .map_err(|_| StakingError::Wallet("on is not a function".to_string()))?;

        let listener = Closure::<dyn Fn(JsValue)>::new(move |accounts: JsValue| {
            match Self::first_account(accounts) {
                Ok(account) => callback(account),
                Err(e) => {
                    log::warn!("Ignoring malformed accountsChanged payload: {}", e);
                    callback(None);
                }
            }
        });
        on_fn
            .call2(&provider, &JsValue::from_str("accountsChanged"), listener.as_ref().unchecked_ref())
            .map_err(|e| StakingError::Wallet(js_error_to_string(e)))?;
        // Lives as long as the page.
        listener.forget();
        Ok(())
    }
}

fn js_error_to_string(e: JsValue) -> String {
    if let Some(s) = e.as_string() {
        return s;
    }
    match from_value::<ProviderError>(e) {
        Ok(err) => err.best_message(),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}
