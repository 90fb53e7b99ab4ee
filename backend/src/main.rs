use rocket::launch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[launch]
fn rocket() -> _ {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("🚀 Starting flatpoll server");
    flatpoll::build(rocket::Config::figment())
}
