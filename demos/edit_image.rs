//! Image editing example - modifies an existing image with a text prompt.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png> [prompt]`
//!
//! Requires the `API_KEY` environment variable.

use nanoedit::{Config, EditSession, EditState, GeminiEditor, ImageAsset};

#[tokio::main]
async fn main() -> nanoedit::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: edit_image <input_image.png> [prompt]");
    let prompt = args
        .next()
        .unwrap_or_else(|| "Make the colors more vibrant and add a warm sunset glow".into());

    let editor = GeminiEditor::from_config(&Config::from_env())?;

    let mut session = EditSession::new();
    session.select_image(ImageAsset::load(&input_path).await?);
    session.set_prompt(prompt);

    match session.submit(&editor).await {
        EditState::Success => {}
        EditState::Failed(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        other => unreachable!("edit settled in state {other:?}"),
    }

    if let Some(result) = session.edited() {
        let name = session.download_name();
        let size = result.save(&name).await?;
        println!("Edited image saved to {name} ({size} bytes)");
    }

    Ok(())
}
