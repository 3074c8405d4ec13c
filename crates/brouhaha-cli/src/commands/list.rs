use anyhow::Result;

use super::context::AppContext;

pub async fn run(context: &AppContext) -> Result<()> {
    let sessions = context.archive.list().await?;
    if sessions.is_empty() {
        println!("No archived sessions");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {:>10.6} {:>11.6}  {}",
            session.id, session.coordinate.latitude, session.coordinate.longitude, session.map_ref
        );
    }
    Ok(())
}
