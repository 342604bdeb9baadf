/*
 *  main.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use skycard::app::{App, QUIT_COMMAND};
use skycard::clock::SystemClock;
use skycard::config::{self, Cli};
use skycard::render::{Renderer, render_frame};
use skycard::weather::WeatherClient;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
#[cfg(unix)]
async fn signal_handler() {
    let (mut sigint, mut sigterm, mut sighup) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
    ) {
        (Ok(i), Ok(t), Ok(h)) => (i, t, h),
        _ => {
            error!("Unable to install signal handlers, falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received. Initiating graceful shutdown."),
        _ = sigterm.recv() => info!("SIGTERM received. Initiating graceful shutdown."),
        _ = sighup.recv() => info!("SIGHUP received. Initiating graceful shutdown."),
    }
}

#[cfg(not(unix))]
async fn signal_handler() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Ctrl-C received. Initiating graceful shutdown.");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::resolve(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::to_yaml(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level.as_deref().unwrap_or("info")))
        .format_timestamp_secs()
        .init();

    info!("{} - weather at a glance", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} for {}", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_TARGET);

    let client = WeatherClient::new(cfg.api_key.as_deref().unwrap_or_default(), &cfg.api)?;
    let map = cfg.map.clone();
    let color = cfg.color;
    let city = cfg.city.clone();
    let mut app = App::new(client, cfg, Arc::new(SystemClock));

    if cli.once {
        app.fetch(&city).await;
        print!("{}", render_frame(app.state(), &map, color));
        if !app.state().card_visible() {
            anyhow::bail!("no weather for {}", city);
        }
        return Ok(());
    }

    info!("Type a city and press enter to search, {} to quit", QUIT_COMMAND);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut renderer = Renderer::new(std::io::stdout(), map, color);
    app.run(input, &mut renderer, signal_handler()).await?;

    info!("Bye");
    Ok(())
}
