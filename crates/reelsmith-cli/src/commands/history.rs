use anyhow::Result;
use reelsmith_core::session::{Generation, VideoStatus};

use super::context::AppContext;

pub async fn show(ctx: &AppContext, session_id: &str) -> Result<()> {
    let history = ctx.state.sessions().history(session_id).await?;
    if history.is_empty() {
        println!("Session {session_id} has no generations yet.");
        return Ok(());
    }

    for generation in &history {
        print_generation(generation);
    }
    Ok(())
}

pub(crate) fn print_generation(generation: &Generation) {
    let settings = &generation.settings;
    println!(
        "[{}] {}  ({}, {}, {}/{} completed)",
        generation.timestamp,
        generation.prompt,
        settings.model_version.label(),
        settings.aspect_ratio.label(),
        generation.completed_count(),
        generation.videos.len()
    );
    if let Some(image) = &settings.image {
        println!("    reference image: {} ({})", image.uri, image.mime_type);
    }

    for (n, video) in generation.videos.iter().enumerate() {
        match (&video.status, video.artifact_path()) {
            (VideoStatus::Completed, Some(path)) => {
                println!("    {}. completed  {}", n + 1, path.display());
            }
            (status, _) => match &video.error {
                Some(error) => println!("    {}. {status}  {error}", n + 1),
                None => println!("    {}. {status}", n + 1),
            },
        }
    }
}
