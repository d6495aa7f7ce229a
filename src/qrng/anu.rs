//! ANU Quantum Random Number Generator device
//!
//! Uses the Australian National University's QRNG API as a network-attached
//! device. API documentation: https://qrng.anu.edu.au/contact/api-documentation/
//!
//! Two tiers:
//! - Free: https://qrng.anu.edu.au/API/jsonI.php (rate limited)
//! - Paid: https://api.quantumnumbers.anu.edu.au (requires API key)
//!
//! The API serves at most uint16 values, so each 32-bit sample is assembled
//! from two consecutive values, high half first.

use crate::constants::api::{ANU_FREE_URL, ANU_PAID_URL};
use crate::error::{Error, Result};
use crate::qrng::{check_single_device_index, QrngDevice};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Maximum values per request
const MAX_BLOCK_SIZE: usize = 1024;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which API tier is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnuTier {
    Free,
    Paid,
}

/// ANU API response for uint16 type
///
/// Example: `{"success": true, "type": "uint16", "length": "3", "data": [60221, 8731, 41955]}`
#[derive(Debug, Deserialize)]
struct AnuResponse {
    success: bool,
    #[serde(default)]
    data: Option<Vec<u16>>,
    /// Present on error responses: `{"success": false, "message": "..."}`
    #[serde(default)]
    message: Option<String>,
}

/// ANU QRNG device
///
/// Holds an HTTP client for the lifetime of the connection.
#[derive(Debug)]
pub struct AnuDevice {
    address: String,
    api_key: Option<String>,
    client: Option<Client>,
}

impl AnuDevice {
    /// Connect to the ANU service at `address`
    ///
    /// When an API key is given and `address` is the free endpoint, the paid
    /// endpoint is used instead.
    pub fn connect(address: &str, api_key: Option<&str>) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.is_empty()).map(str::to_string);
        let address = match (&api_key, address) {
            (Some(_), ANU_FREE_URL) | (Some(_), "") => ANU_PAID_URL.to_string(),
            (None, "") => ANU_FREE_URL.to_string(),
            (_, other) => other.to_string(),
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Qrng(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            address,
            api_key,
            client: Some(client),
        })
    }

    /// Get which API tier is being used
    pub fn tier(&self) -> AnuTier {
        match &self.api_key {
            Some(_) => AnuTier::Paid,
            None => AnuTier::Free,
        }
    }

    /// Endpoint requests are sent to
    pub fn address(&self) -> &str {
        &self.address
    }

    fn request_url(&self, count: usize) -> String {
        format!("{}?length={}&type=uint16", self.address, count)
    }

    /// Fetch one batch of uint16 values
    fn fetch_block(&self, client: &Client, count: usize) -> Result<Vec<u16>> {
        let count = count.min(MAX_BLOCK_SIZE);
        let mut request = client.get(self.request_url(count));

        // Paid endpoint uses header auth
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send()?;

        if !response.status().is_success() {
            return Err(Error::Qrng(format!(
                "ANU API returned status: {}",
                response.status()
            )));
        }

        let anu_response: AnuResponse = response.json()?;

        let data = parse_block(anu_response)?;
        if data.len() != count {
            return Err(Error::Qrng(format!(
                "ANU API returned {} values, expected {}",
                data.len(),
                count
            )));
        }
        Ok(data)
    }
}

/// Unwrap a response body into its values
fn parse_block(response: AnuResponse) -> Result<Vec<u16>> {
    if !response.success {
        let msg = response
            .message
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Error::Qrng(format!("ANU API error: {}", msg)));
    }

    response
        .data
        .ok_or_else(|| Error::Qrng("ANU API returned no data".to_string()))
}

/// Join uint16 pairs into u32 samples, high half first
fn join_halves(halves: &[u16]) -> Vec<u32> {
    halves
        .chunks_exact(2)
        .map(|pair| (u32::from(pair[0]) << 16) | u32::from(pair[1]))
        .collect()
}

impl QrngDevice for AnuDevice {
    fn name(&self) -> &'static str {
        "anu"
    }

    fn get_random(&mut self, count: usize, device_index: u32) -> Result<Vec<u32>> {
        check_single_device_index(device_index)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::Qrng("ANU device is disconnected".to_string()))?;

        // For large requests, make multiple API calls
        let needed = count * 2;
        let mut halves = Vec::with_capacity(needed);
        while halves.len() < needed {
            let batch_size = (needed - halves.len()).min(MAX_BLOCK_SIZE);
            let block = self.fetch_block(client, batch_size)?;
            halves.extend(block);
            debug!(received = halves.len(), needed, "ANU batch received");
        }

        Ok(join_halves(&halves))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.client = None;
        Ok(())
    }
}
