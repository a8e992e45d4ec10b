use anyhow::{Context, Result, bail};
use faculty::{FacultyClient, FacultyConsole, FacultySettings, render};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = FacultySettings::load().context("Failed to load faculty settings")?;
    let client = FacultyClient::new(&settings.api_base_url);

    let user = client
        .sign_in(&settings.email, &settings.password)
        .await
        .context("Failed to sign in")?;
    let Some(teacher_id) = user.teacher_id else {
        bail!("{} is not a faculty account", user.email);
    };

    let courses = client.courses(&teacher_id).await?;
    let course = match &settings.course_code {
        Some(code) => courses.iter().find(|c| &c.course_code == code),
        None => courses.first(),
    };
    let Some(course) = course.cloned() else {
        bail!("No matching course found for {}", teacher_id);
    };

    let mut console = FacultyConsole::new(&teacher_id, Arc::new(client), settings.periods());
    let mut updates = console.qr_updates();
    console.select_course(&course).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(text) = updates.borrow_and_update().clone() else {
                    continue;
                };
                match render::to_terminal(&text) {
                    Ok(symbol) => println!("\x1B[2J\x1B[H{}\n{} ({})", symbol, course.name, course.course_code),
                    Err(e) => warn!("Failed to render QR: {}", e),
                }
            }
        }
    }

    let present = console.roster().await.len();
    console.end_session().await;
    info!("Session closed with {} students present", present);

    Ok(())
}
