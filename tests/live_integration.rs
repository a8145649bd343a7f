use gymsense::{AnalysisRequest, ClientOptions, GymSenseClient, ImagePayload};

// 1x1 transparent PNG.
const PIXEL_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

fn live_client() -> Option<GymSenseClient> {
    match GymSenseClient::from_env() {
        Ok(client) => Some(client.with_options(ClientOptions {
            max_attempts: 3,
            base_delay_ms: 500,
            ..ClientOptions::default()
        })),
        Err(reason) => {
            eprintln!("skipping live test: {reason}");
            None
        }
    }
}

#[tokio::test]
async fn live_text_and_image_requests() {
    let Some(client) = live_client() else {
        return;
    };

    let text = client
        .generate(&AnalysisRequest::new("Reply with the single word: ready"))
        .await
        .expect("text-only request must succeed");
    assert!(!text.trim().is_empty());

    let image = ImagePayload::from_base64("image/png", PIXEL_PNG_BASE64);
    client
        .generate(&AnalysisRequest::with_image(
            "Describe this image in five words or fewer.",
            image,
        ))
        .await
        .expect("image request must succeed");

    client
        .run_analysis(&format!("data:image/png;base64,{PIXEL_PNG_BASE64}"))
        .await
        .expect("pose analysis must succeed");
}
