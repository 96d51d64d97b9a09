use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use course_equivalency::db::establish_connection_pool;
use course_equivalency::models::config::ServerConfig;
use course_equivalency::processing::comparison::{
    process_comparison_message, reject_malformed_message,
};
use course_equivalency::processing::{ComparisonRequest, ComparisonResponse};
use course_equivalency::repository::DieselRepository;

/// Push every response to `address` from a dedicated thread owning the socket.
fn spawn_results_publisher(
    context: &zmq::Context,
    address: &str,
) -> Result<mpsc::Sender<ComparisonResponse>, zmq::Error> {
    let socket = context.socket(zmq::PUSH)?;
    socket.connect(address)?;

    let (sender, receiver) = mpsc::channel::<ComparisonResponse>();
    thread::spawn(move || {
        for response in receiver {
            match serde_json::to_vec(&response) {
                Ok(payload) => {
                    if let Err(e) = socket.send(payload, 0) {
                        log::error!(
                            "Failed to publish response {}: {e}",
                            response.request_id()
                        );
                    }
                }
                Err(e) => log::error!("Failed to serialize response: {e}"),
            }
        }
    });

    Ok(sender)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = Arc::new(DieselRepository::new(pool));

    let matcher = match config.build_matcher() {
        Ok(matcher) => Arc::new(matcher),
        Err(e) => {
            log::error!("Failed to configure embedding provider: {e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Using embedding model {} (catalog cache: {})",
        config.embedding.model,
        config.embedding.cache_catalog
    );
    let thresholds = matcher.thresholds();
    log::info!(
        "Decision thresholds: accepted >= {}, partial >= {}",
        thresholds.accepted,
        thresholds.partial
    );

    let context = zmq::Context::new();

    let publisher = match config.zmq_results_address.as_deref() {
        Some(address) => match spawn_results_publisher(&context, address) {
            Ok(sender) => Some(sender),
            Err(e) => {
                log::error!("Cannot connect results socket to {address}: {e}");
                std::process::exit(1);
            }
        },
        None => {
            log::warn!(
                "No zmq_results_address configured; comparison results will only be logged"
            );
            None
        }
    };

    let responder = match context.socket(zmq::PULL) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot create zmq socket: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = responder.bind(&config.zmq_address) {
        log::error!("Cannot bind to {}: {e}", config.zmq_address);
        std::process::exit(1);
    }
    log::info!("Listening for comparison requests on {}", config.zmq_address);

    loop {
        let msg = match responder.recv_bytes(0) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to receive message: {e}");
                continue;
            }
        };
        match serde_json::from_slice::<ComparisonRequest>(&msg) {
            Ok(request) => {
                let repo = Arc::clone(&repo);
                let matcher = Arc::clone(&matcher);
                let publisher = publisher.clone();
                tokio::task::spawn_blocking(move || {
                    let response = process_comparison_message(request, repo.as_ref(), &matcher);
                    if let Some(publisher) = publisher
                        && publisher.send(response).is_err()
                    {
                        log::error!("Results publisher stopped");
                    }
                });
            }
            Err(e) => {
                let response = reject_malformed_message(&msg, &e);
                if let Some(publisher) = &publisher
                    && publisher.send(response).is_err()
                {
                    log::error!("Results publisher stopped");
                }
            }
        }
    }
}
