//! Native entry point for the LightMapper editor.

use lightmapper_frontend::LightMapperApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Endpoint resolution (ingress paths, supervisor tokens) is an
    // external deployment concern; plain env overrides cover it here.
    let api_base_url = std::env::var("LIGHTMAPPER_API_URL")
        .unwrap_or_else(|_| format!("http://localhost:{}/api", lightmapper_types::DEFAULT_PORT));
    let ha_ws_url = std::env::var("LIGHTMAPPER_HA_WS_URL")
        .unwrap_or_else(|_| "ws://homeassistant.local:8123/api/websocket".to_string());

    tracing::info!("Starting LightMapper (api: {})", api_base_url);

    // eframe owns the main thread; async work runs on this runtime and
    // reports back over the app channel.
    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    let _enter = runtime.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 860.0])
            .with_title("LightMapper"),
        ..Default::default()
    };

    eframe::run_native(
        "LightMapper",
        native_options,
        Box::new(move |cc| Ok(Box::new(LightMapperApp::new(cc, api_base_url, ha_ws_url)))),
    )
}
