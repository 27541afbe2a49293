use winit::event::{DeviceEvent, WindowEvent};

/// Input forwarded from the window event loop to the renderer.
#[derive(Clone, Debug)]
pub enum FrameworkEvent {
    Window { event: WindowEvent },
    Device { event: DeviceEvent },
}

/// Events that may be sent to the event loop from outside (see [`crate::register_ctrlc`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplicationEvent {
    Exit,
}
