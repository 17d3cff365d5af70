#![recursion_limit = "512"]

#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

mod api;
mod db;
mod upload;


embed_migrations!();

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("Failed to create directory {0:?}")]
    CreateDirError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Failed to connect to database")]
    DatabaseInitError(#[from] db::NewSystemError),
    #[error("Failed to bind listen socket")]
    BindError(#[source] std::io::Error),
    #[error("Failed to run server")]
    RunError(#[source] std::io::Error),
}

fn ensure_dir(dir_path: &std::path::Path) -> Result<(), ServerError> {
    if dir_path.as_os_str().is_empty() || dir_path.is_dir() {
        return Ok(());
    }

    std::fs::create_dir_all(dir_path)
        .map_err(|err| ServerError::CreateDirError(dir_path.to_path_buf(), err))?;

    log::info!("Created directory {:?}", dir_path);

    Ok(())
}

/// Registers shared state and every route. The same configuration is used by
/// each server worker.
fn configure(
    db: db::System,
    upload_dir_path: std::path::PathBuf,
    file_names: upload::FileNameGenerator,
) -> impl Fn(&mut actix_web::web::ServiceConfig) + Clone + Send + 'static {
    move |cfg: &mut actix_web::web::ServiceConfig| {
        cfg.data(db.clone())
            .data(api::UploadDirPath::from(upload_dir_path.clone()))
            .data(file_names.clone())
            .service(actix_web::web::scope("/api").configure(api::configure))
            .service(actix_files::Files::new(
                "/uploads",
                upload_dir_path.clone(),
            ));
    }
}

async fn run(
    db_file_path: std::path::PathBuf,
    upload_dir_path: std::path::PathBuf,
    host: &str,
    port: u16,
) -> Result<(), ServerError> {
    if let Some(db_dir_path) = db_file_path.parent() {
        ensure_dir(db_dir_path)?;
    }
    ensure_dir(&upload_dir_path)?;

    let db = db::System::new(&db_file_path)?;

    log::info!("Opened database {:?}", db_file_path);

    let configure = configure(db, upload_dir_path, upload::FileNameGenerator::new());

    let server = actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(actix_cors::Cors::permissive())
            .configure(configure.clone())
    })
    .bind((host, port))
    .map_err(|err| ServerError::BindError(err))?;

    log::info!("Listening on {}:{}", host, port);

    server
        .run()
        .await
        .map_err(|err| ServerError::RunError(err))
}

#[derive(structopt::StructOpt)]
struct CliOptions {
    #[structopt(long, default_value = "database/database.sqlite")]
    db_file_path: std::path::PathBuf,
    #[structopt(long, default_value = "uploads")]
    upload_dir_path: std::path::PathBuf,
    #[structopt(short, long, default_value = "0.0.0.0")]
    host: String,
    #[structopt(short, long, env = "PORT", default_value = "5000")]
    port: u16,
}

#[actix_web::main]
async fn main() {
    use structopt::StructOpt;

    env_logger::init_from_env(env_logger::Env::new().filter("SUBMISSIONSD_LOG"));

    std::panic::set_hook(Box::new(|info| {
        log::error!("Unhandled panic: {}", info);
        std::process::exit(1);
    }));

    let cli_options = CliOptions::from_args();

    if let Err(error) = run(
        cli_options.db_file_path,
        cli_options.upload_dir_path,
        &cli_options.host,
        cli_options.port,
    )
    .await
    {
        use std::error::Error;

        println!("Error: {}", error);

        let mut current = error.source();
        if current.is_some() {
            println!("");
            println!("Caused by:");
            while let Some(error) = current {
                println!("  {}", error);
                current = error.source();
            }
        }

        std::process::exit(1);
    }
}
