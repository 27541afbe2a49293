use log::LevelFilter;

/// Sets up `env_logger` with defaults that keep the graphics stack quiet.
///
/// `RUST_LOG` is applied on top of these filters.
pub fn init_logger() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        // We keep wgpu at Error level, as it's very noisy.
        .filter_module("wgpu_core", LevelFilter::Warn)
        // Workaround for https://github.com/gfx-rs/wgpu/issues/6043
        .filter_module("wgpu_core::device::resource", LevelFilter::Warn)
        .filter_module("wgpu_hal", LevelFilter::Error)
        .filter_module("naga", LevelFilter::Error)
        .filter_module("calloop", LevelFilter::Info)
        .filter_module("lib_gltf_model", LevelFilter::Info)
        .parse_default_env()
        .init();
}
