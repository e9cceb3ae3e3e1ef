//! # Contact Gateway
//!
//! HTTP functions and automation actions in front of a site's contacts and
//! event guests. Configures logging, the remote API clients, SSL and route
//! handling.

#![recursion_limit = "256"]

pub mod api;
pub mod config;
pub mod consts;
pub mod errors;
pub mod metric;
pub mod models;
pub mod services;
pub mod utils;
pub mod webhook;

use anyhow::Context;
use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use services::{
    contacts::WixContactsClient,
    crm::WixCrmClient,
    data::WixDataClient,
    events::WixEventsClient,
    secrets::{CachedSecretStore, WixSecretsClient},
    wix::WixApi,
};
use std::{sync::Arc, time::Duration};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    config::init_config()?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // Initialize logging and metrics
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    // Every remote client acts with the service credential, never the caller's
    let wix_api = WixApi::new(
        &app_config.wix_api_base_url,
        app_config.service_credential(),
    );

    // One secret cache shared by all workers
    let secrets: services::ImplSecretStore = Arc::new(CachedSecretStore::new(
        WixSecretsClient {
            api: wix_api.clone(),
        },
        Duration::from_secs(app_config.secret_cache_ttl_secs),
    ));

    logfire::info!(
        "starting contact gateway env={env} port={port}",
        env = app_config.env.clone(),
        port = i64::from(app_config.web_server_port)
    );

    configure_and_run_server(app_config, wix_api, secrets).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(
    app_config: &config::AppConfig,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates application state from the shared clients
fn create_app_state(
    app_config: &config::AppConfig,
    wix_api: &WixApi,
    secrets: &services::ImplSecretStore,
) -> webhook::AppState {
    webhook::AppState {
        auth_gate: api::auth_gate::AuthGate::new(
            secrets.clone(),
            app_config.endpoint_secrets(),
            &app_config.jwt_expected_subject,
        ),
        secrets: secrets.clone(),
        contacts: Box::new(WixContactsClient {
            api: wix_api.clone(),
        }),
        guests: Box::new(WixEventsClient {
            api: wix_api.clone(),
        }),
        emails: Box::new(WixCrmClient {
            api: wix_api.clone(),
        }),
        labels: Box::new(WixCrmClient {
            api: wix_api.clone(),
        }),
        collections: Box::new(WixDataClient {
            api: wix_api.clone(),
        }),
        settings: app_config.gateway_settings(),
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: &'static config::AppConfig,
    wix_api: WixApi,
    secrets: services::ImplSecretStore,
) -> anyhow::Result<()> {
    let server_addr = (
        app_config.web_server_host.as_str(),
        app_config.web_server_port,
    );

    let server = web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(app_config, &wix_api, &secrets))
            .configure(webhook::routes::functions)
            .configure(webhook::routes::automation)
            .default_service(web::route().to(webhook::routes::not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor(app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
