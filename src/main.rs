use actix_web::middleware;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;

use venue_hub::config::{self, Settings};
use venue_hub::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("reading configuration")?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("actix_web=info,venue_hub=info"),
    )
    .init();

    // SQLite
    let pool = config::sqlite::connect(&settings)
        .await
        .with_context(|| format!("opening {}", settings.database_url))?;
    config::sqlite::init(&pool)
        .await
        .context("creating the schema")?;

    let state = Data::new(AppState::new(pool, &settings));
    let address = settings.bind_address();
    log::info!("listening on {}:{}", address.0, address.1);

    // Server HTTP
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::new(
                "%{r}a %r %s %b %{Referer}i %{User-Agent}i %T",
            ))
            .app_data(state.clone())
            .configure(app::configure)
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
