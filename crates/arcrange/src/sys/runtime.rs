use crate::events::HostEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;

/// Runs the socket server and config watcher on a single-threaded Tokio
/// runtime of their own, feeding events to the host loop through `tx`.
pub fn start_background_services(
    tx: Sender<HostEvent>,
    socket_path: PathBuf,
) -> std::io::Result<thread::JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("arcrange-services".into())
        .spawn(move || {
            rt.block_on(async {
                let server = tokio::spawn(crate::sys::server::run_server(tx.clone(), socket_path));
                let watcher = tokio::spawn(crate::config::run_async_watcher(tx));

                // both services only return once they cannot go on
                let (server, watcher) = tokio::join!(server, watcher);
                if let Err(e) = server.and(watcher) {
                    log::error!("Background service panicked: {}", e);
                }
                log::warn!("Background services stopped");
            });
        })
}
