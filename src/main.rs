use std::io;

use dotenvy::dotenv;
use register_pos::config::Config;
use register_pos::domain::session::Session;
use register_pos::realtime::{ChangeKind, SALES};
use register_pos::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let session = Session::load(config.passphrase.clone(), config.session_file.clone());
    if session.is_authenticated() {
        log::info!("register session restored from {}", config.session_file.display());
    }

    let state = AppState::with_pool(pool, session);
    let _sales_log = state.feed.subscribe(SALES, |event| {
        if let ChangeKind::Broadcast(name) = &event.kind {
            log::debug!("{name}: {}", event.payload);
        }
    });

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
