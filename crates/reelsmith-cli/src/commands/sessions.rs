use anyhow::Result;

use super::context::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.state.sessions().list_sessions().await;
    if sessions.is_empty() {
        println!("No sessions yet. Create one with `reelsmith sessions new`.");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {}  ({} generations, {} videos, created {})",
            session.id,
            session.name,
            session.generations.len(),
            session.video_count(),
            session.created_at
        );
    }
    Ok(())
}

pub async fn create(ctx: &AppContext, name: Option<&str>) -> Result<()> {
    ctx.ensure_writable()?;
    let id = ctx.state.new_session(name).await?;
    println!("Created session {id}");
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.ensure_writable()?;
    if ctx.state.sessions().get_session(id).await.is_none() {
        println!("No session {id}; nothing to delete");
        return Ok(());
    }

    let removed = ctx.state.delete_session(id).await?;
    println!("Deleted session {id} ({removed} video files removed)");
    Ok(())
}

pub async fn rename(ctx: &AppContext, id: &str, name: &str) -> Result<()> {
    ctx.ensure_writable()?;
    ctx.state.rename_session(id, name).await?;
    println!("Renamed session {id} to {}", name.trim());
    Ok(())
}
