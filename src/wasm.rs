//! Browser bindings for the presentation layer.
//!
//! ```typescript
//! const analyzer = new GymSenseAnalyzer(apiKey);
//! try {
//!   feedback.textContent = await analyzer.runAnalysis(previewDataUri);
//! } catch {
//!   feedback.textContent = "Error connecting to GymSense AI. Please try again.";
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::{AnalysisRequest, ClientOptions, GymSenseClient};

/// WASM-exported handle to a configured [`GymSenseClient`].
#[wasm_bindgen]
pub struct GymSenseAnalyzer {
    client: GymSenseClient,
}

#[wasm_bindgen]
impl GymSenseAnalyzer {
    /// Creates an analyzer for the default model.
    #[wasm_bindgen(constructor)]
    pub fn new(api_key: &str) -> GymSenseAnalyzer {
        GymSenseAnalyzer {
            client: GymSenseClient::new(api_key),
        }
    }

    /// Creates an analyzer for an explicit endpoint URL.
    #[wasm_bindgen(js_name = withEndpoint)]
    pub fn with_endpoint(endpoint_url: &str, api_key: &str) -> GymSenseAnalyzer {
        GymSenseAnalyzer {
            client: GymSenseClient::with_endpoint(endpoint_url, api_key),
        }
    }

    /// Overrides the attempt budget and backoff seed.
    #[wasm_bindgen(js_name = setRetry)]
    pub fn set_retry(&mut self, max_attempts: u32, base_delay_ms: u32) {
        let options = ClientOptions {
            max_attempts,
            base_delay_ms: u64::from(base_delay_ms),
            ..self.client.options().clone()
        };
        self.client = self.client.clone().with_options(options);
    }

    /// Analyzes a `data:` image URI. Rejects with the error message once the
    /// attempt budget is spent.
    #[wasm_bindgen(js_name = runAnalysis)]
    pub async fn run_analysis(&self, image_data_uri: String) -> Result<String, String> {
        self.client
            .run_analysis(&image_data_uri)
            .await
            .map_err(|e| e.to_string())
    }

    /// Sends a text-only instruction.
    pub async fn generate(&self, instruction: String) -> Result<String, String> {
        self.client
            .generate(&AnalysisRequest::new(instruction))
            .await
            .map_err(|e| e.to_string())
    }
}
