use std::future::Future;

use anyhow::{Context, Result, bail};
use reelsmith_application::GenerateOptions;
use reelsmith_core::settings::{
    AspectRatio, GenerationSettings, ImageMimeType, ImageReference, ModelVersion,
};
use reelsmith_infrastructure::API_KEY_ENV;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::context::AppContext;
use super::history::print_generation;
use crate::GenerateArgs;

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    ctx.ensure_writable()?;
    // Checked before a session is created for the batch.
    if !ctx.state.has_client() {
        bail!("No API key configured. Set {API_KEY_ENV} or add gemini.api_key to secret.json");
    }
    let settings = settings_from_args(ctx, &args)?;

    let session_id = match args.session {
        Some(id) => id,
        None => {
            let id = ctx.state.new_session(None).await?;
            println!("Created session {id}");
            id
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<reelsmith_core::generation::ProgressEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("[{:>3.0}%] {}", event.fraction() * 100.0, event.describe());
        }
    });

    // First Ctrl-C lets the running variation finish; a second one exits.
    let cancellation = CancellationToken::new();
    let interrupt = {
        let token = cancellation.clone();
        tokio::spawn(async move {
            let second = escalate_interrupts(token, || async {
                tokio::signal::ctrl_c().await.is_ok()
            })
            .await;
            if second {
                eprintln!("Interrupted, abandoning the batch");
                std::process::exit(130);
            }
        })
    };

    let result = ctx
        .state
        .generate(
            &session_id,
            &args.prompt,
            settings,
            GenerateOptions {
                progress: Some(tx),
                cancellation: Some(cancellation),
            },
        )
        .await;
    interrupt.abort();
    // The sender was moved into the job; the printer ends once it drains.
    let _ = printer.await;

    let generation = result?;
    print_generation(&generation);
    Ok(())
}

/// Cancels `token` on the first signal and returns `true` on the second.
///
/// `next_signal` resolves to `false` when the signal source is gone, in which
/// case this returns `false` without escalating.
async fn escalate_interrupts<F, Fut>(token: CancellationToken, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !next_signal().await {
        return false;
    }
    eprintln!("Cancelling remaining variations (Ctrl-C again to abort)...");
    token.cancel();
    next_signal().await
}

fn settings_from_args(ctx: &AppContext, args: &GenerateArgs) -> Result<GenerationSettings> {
    let aspect_ratio = match &args.aspect_ratio {
        Some(value) => AspectRatio::parse(value)?,
        None => ctx.config.generation.default_aspect_ratio,
    };
    let model = match &args.model {
        Some(value) => ModelVersion::parse(value)?,
        None => ctx.config.generation.default_model,
    };
    let mime_type: ImageMimeType = args
        .image_mime
        .trim()
        .parse()
        .with_context(|| format!("unsupported image MIME type: {}", args.image_mime))?;

    let settings = GenerationSettings::new(aspect_ratio, model, args.variations)
        .with_image(ImageReference::from_optional(args.image_uri.as_deref(), mime_type));
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reelsmith_application::{GenerationJobConfig, OrchestratorState};
    use reelsmith_core::config::AppConfig;
    use reelsmith_infrastructure::{FsArtifactStore, JsonSessionStore};
    use tempfile::TempDir;

    fn signals(sequence: Vec<bool>) -> impl FnMut() -> std::future::Ready<bool> {
        let mut sequence = sequence.into_iter();
        move || std::future::ready(sequence.next().unwrap_or(false))
    }

    fn args(session: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            session: session.map(str::to_string),
            prompt: "a lighthouse at dusk".to_string(),
            aspect_ratio: None,
            model: None,
            variations: 1,
            image_uri: None,
            image_mime: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn second_interrupt_escalates() {
        let token = CancellationToken::new();
        assert!(escalate_interrupts(token.clone(), signals(vec![true, true])).await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn single_interrupt_only_cancels() {
        let token = CancellationToken::new();
        assert!(!escalate_interrupts(token.clone(), signals(vec![true, false])).await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn unavailable_signal_source_does_nothing() {
        let token = CancellationToken::new();
        assert!(!escalate_interrupts(token.clone(), signals(vec![false])).await);
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn missing_api_key_leaves_no_session_behind() {
        let dir = TempDir::new().unwrap();
        let sessions_path = dir.path().join("sessions.json");
        let state = OrchestratorState::new(
            Arc::new(JsonSessionStore::new(&sessions_path)),
            Arc::new(FsArtifactStore::new(dir.path())),
            GenerationJobConfig::default(),
        );
        let ctx = AppContext::new(state, AppConfig::default());

        let err = run(&ctx, args(None)).await.unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
        assert!(ctx.state.sessions().list_sessions().await.is_empty());
        assert!(!sessions_path.exists());
    }
}
