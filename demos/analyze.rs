use gymsense::{AnalysisRequest, GymSenseClient, ImagePayload, POSE_ANALYSIS_PROMPT};

/// Usage: `GYMSENSE_API_KEY=... cargo run --example analyze -- pose.jpg`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: analyze <image-path>"))?;
    let bytes = std::fs::read(&path)?;
    let mime = match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    };

    let client = GymSenseClient::from_env().map_err(anyhow::Error::msg)?;

    let request =
        AnalysisRequest::with_image(POSE_ANALYSIS_PROMPT, ImagePayload::from_bytes(mime, &bytes));
    match client.generate(&request).await {
        Ok(feedback) if feedback.is_empty() => println!("(no feedback returned)"),
        Ok(feedback) => println!("{feedback}"),
        Err(err) => {
            eprintln!("Error connecting to GymSense AI. Please try again. ({err})");
            std::process::exit(1);
        }
    }

    Ok(())
}
