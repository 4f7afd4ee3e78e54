//! Gantry Server
//!
//! Self-service deployment coordinator: users register git repos, bind
//! applications to a manifest path inside a repo, and launch ad-hoc jobs
//! against a cluster backend.
//!
//! Architecture:
//! - Repositories: typed CRUD over the Postgres store (the only shared
//!   mutable state between concurrent callers)
//! - Services: the coordinators binding entity lifecycle to the sync
//!   service and the cluster backend
//! - Reconcilers: the periodic repo refresher and the cluster event
//!   reconciler, spawned once at startup
//! - API: axum boundary exposing the coordinators over HTTP

use std::future::IntoFuture;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod reconcile;
pub mod repository;
pub mod service;

use gantry_client::{ClusterClient, RepoSyncClient};

use crate::api::AppState;
use crate::config::Config;
use crate::reconcile::{ClusterEventReconciler, RepoRefresher};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gantry_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gantry server...");

    let config = Config::from_env();
    config.validate().expect("Invalid configuration");

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Upstream clients are created once and reused for every call
    let sync = RepoSyncClient::new(&config.sync_url, config.upstream_timeout)
        .expect("Failed to create sync-service client");
    let cluster = ClusterClient::new(&config.cluster_url, config.upstream_timeout)
        .expect("Failed to create cluster client");

    // Spawn the background loops. They communicate with request handlers
    // only through the store; if either dies, so does the process.
    let refresher = RepoRefresher::new(pool.clone(), sync.clone(), config.refresh_interval);
    let refresher_handle = tokio::spawn(async move { refresher.run().await });

    let reconciler = ClusterEventReconciler::new(pool.clone(), cluster.clone());
    let reconciler_handle = tokio::spawn(async move { reconciler.run().await });

    // Build router with all API endpoints
    let state = AppState {
        pool,
        sync,
        cluster,
        logs_path: config.logs_path.clone(),
    };
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            tracing::error!("HTTP server exited: {:?}", result);
        }
        result = refresher_handle => {
            tracing::error!("Repo refresher exited: {:?}", result);
        }
        result = reconciler_handle => {
            tracing::error!("Cluster event reconciler exited: {:?}", result);
        }
    }

    std::process::exit(1);
}
