#![allow(missing_docs, reason = "TODO remove before release")]

pub mod application;
pub mod config;
pub mod event;
pub mod logging;
mod render_surface;
pub mod renderer;

use event::ApplicationEvent;
use log::{debug, error, warn};
use winit::event_loop::EventLoopProxy;

pub use render_surface::RenderSurfaceError;

/// Makes Ctrl-C shut down the event loop the same way closing the window does.
pub fn register_ctrlc(proxy: EventLoopProxy<ApplicationEvent>) {
    let result = ctrlc::set_handler(move || {
        debug!("received Ctrl-C");
        if proxy.send_event(ApplicationEvent::Exit).is_err() {
            error!("event loop is already gone, cannot forward Ctrl-C");
        }
    });
    if let Err(err) = result {
        warn!("failed to register Ctrl-C handler: {err}");
    }
}
