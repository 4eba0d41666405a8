use eframe::egui;

use fundme_gui::app::App;
use fundme_gui::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    env_logger::init();

    let config = Config::load().unwrap_or_default();
    // An interface descriptor that doesn't match the deployment is a
    // configuration error — refuse to start rather than fail at call time.
    let descriptor = config.load_descriptor()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 640.0])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "FundMe Wallet",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, config, descriptor)))),
    );

    drop(_guard);
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    result.map_err(Into::into)
}
