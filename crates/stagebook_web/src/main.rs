use actix_web::{middleware, web, App, HttpServer};
use log::info;
use stagebook_core::{init_logging, open_db};
use stagebook_web::handlers::configure;
use stagebook_web::{AppState, ServerConfig};
use std::error::Error;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    info!(
        "event=server_start module=web status=start db_path={} host={} port={}",
        config.db_path.display(),
        config.host,
        config.port
    );
    let conn = open_db(&config.db_path)?;
    let state = web::Data::new(AppState::new(conn));

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("event=server_stop module=web status=ok");
    Ok(())
}
