use keystone::auth::{
    defaults::ADMIN_ROLE_NAME, AccountRepository, AuthError, RoleRepository, SledAccountRepository,
    SledRoleRepository,
};
use server_http::{build_router, AppState};
use shared::config::Config;
use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Keystone HTTP Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    info!("Initializing authentication system...");
    let state = init_auth_system(&config).await?;

    let router = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("HTTP Server listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}

async fn init_auth_system(config: &Config) -> Result<AppState, AuthError> {
    let base_path = std::path::Path::new(&config.data_dir);

    if let Err(e) = std::fs::create_dir_all(base_path) {
        warn!("Failed to create data directory {}: {}", config.data_dir, e);
    }

    let account_repo: Arc<dyn AccountRepository> =
        Arc::new(SledAccountRepository::new(base_path.join("accounts.sled"))?);
    let role_repo: Arc<dyn RoleRepository> =
        Arc::new(SledRoleRepository::new(base_path.join("roles.sled"))?);

    let state = AppState::new(account_repo.clone(), role_repo, &config.auth);

    // Registration depends on the "user" role being present
    info!("Initializing default roles...");
    let roles = state.role_service.initialize_default_roles().await?;
    info!("Default roles ready: {}", roles.len());

    if let Some(admin) = &config.admin {
        if account_repo
            .find_by_username_or_email(&admin.username, &admin.email)
            .await?
            .is_some()
        {
            info!("Admin account already exists: {}", admin.username);
        } else {
            let admin_role = state.role_service.get_role(ADMIN_ROLE_NAME).await?;

            info!("Creating admin account: {}", admin.username);
            state
                .account_service
                .create_account(
                    admin.username.clone(),
                    admin.email.clone(),
                    &admin.password,
                    admin_role.id,
                )
                .await?;
        }
    }

    Ok(state)
}
