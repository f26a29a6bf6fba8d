use std::io::BufRead;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use weatherdash_core::{AppError, Config, ConfigError};
use weatherdash_ui::{bridge, render, WeatherFormModel};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    weatherdash_core::init()?;

    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = AppError::Config(ConfigError::Invalid(e.to_string()));
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            return Err(e);
        }
    };

    let runtime = bridge::get_or_init_runtime()?;
    let services = bridge::build_form_services(&config, runtime)?;
    let mut model = WeatherFormModel::new(services);

    tracing::info!("WeatherDash started");
    model.mount();
    print!("{}", render(model.state()));

    // Each line is a submission. A blank line submits the current text, which
    // may have been filled in by the geolocation probe.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut input_closed = false;
    loop {
        let mut changed = model.poll_channel();

        match line_rx.try_recv() {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    model.set_location_text(line);
                }
                model.submit();
                changed = true;
            }
            Err(TryRecvError::Disconnected) => input_closed = true,
            Err(TryRecvError::Empty) => {}
        }

        if changed {
            println!();
            print!("{}", render(model.state()));
        }

        if input_closed && !model.loading() {
            break;
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
