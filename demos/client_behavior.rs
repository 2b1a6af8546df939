use fusion_sd_client::logging;
use fusion_sd_client::{BehaviorState, ClientBehaviorConfig, ClientBehaviorHandle, Event};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::main]
async fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => match ClientBehaviorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => ClientBehaviorConfig::default(),
    };
    log::info!("Using {:?}", config);

    let shutdown = Arc::new(Notify::new());
    let notify = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || notify.notify_one()) {
        log::warn!("Ctrl-C handler unavailable: {}", e);
    }

    let searches = Arc::new(AtomicU32::new(0));
    let counter = searches.clone();
    let mut handle = ClientBehaviorHandle::spawn(&config, move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[Demo] -> FindService #{}", n);
    });

    let mut states = handle.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            println!("[Demo] state: {}", state);
        }
    });

    for event in [
        Event::ConfigurationStatusChange { is_configured: true },
        Event::RequestChange { is_requested: true },
    ] {
        if let Err(e) = handle.process_event(event) {
            log::warn!("[Demo] Failed to deliver {}: {}", event.kind(), e);
        }
    }

    // A peer shows up after a while and later withdraws its offer.
    tokio::select! {
        _ = shutdown.notified() => {}
        _ = async {
            tokio::time::sleep(Duration::from_secs(8)).await;
            println!("[Demo] <- OfferService");
            if let Err(e) = handle.process_event(Event::OfferService) {
                log::warn!("[Demo] Failed to deliver offer: {}", e);
            }
            if let Err(e) = handle.wait_for_state(|s| matches!(s, BehaviorState::Available(_))).await {
                log::warn!("[Demo] Service never became available: {}", e);
            }

            tokio::time::sleep(Duration::from_secs(3)).await;
            println!("[Demo] <- StopOfferService");
            if let Err(e) = handle.process_event(Event::StopOfferService) {
                log::warn!("[Demo] Failed to deliver stop offer: {}", e);
            }

            std::future::pending::<()>().await;
        } => {}
    }

    println!("[Demo] Stopping after {} searches", searches.load(Ordering::SeqCst));
    handle.stop().await;
}
