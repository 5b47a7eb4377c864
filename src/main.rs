use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use catalog_api::{app, config, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    } else {
        println!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::init(&cfg)?;

    // The route table is built once; specs are immutable from here on
    let routes = app::build_routes()?;
    logger::log_server_start(&addr, &cfg, routes.len());
    for route in routes.routes() {
        logger::log_registered_route(route.method.as_str(), route.template.raw(), route.name);
    }

    let state = Arc::new(config::AppState::new(cfg, routes));
    let connections = Arc::new(AtomicUsize::new(0));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(run_server(listener, state, connections))
        .await
}

/// Accept loop: every connection is served on its own local task
async fn run_server(
    listener: tokio::net::TcpListener,
    state: Arc<config::AppState>,
    connections: Arc<AtomicUsize>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                server::accept_connection(stream, peer_addr, &state, &connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
