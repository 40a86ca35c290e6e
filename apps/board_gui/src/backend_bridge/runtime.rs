//! Backend worker: owns the tokio runtime and the HTTP client, runs every
//! queued effect as its own task and reports completions as UI events.

use std::{sync::Arc, thread};

use client_core::{execute, ActivityApi, ClientSettings, HttpActivityApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api: Arc<dyn ActivityApi> = match HttpActivityApi::from_settings(&settings) {
            Ok(api) => Arc::new(api),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    err.to_string(),
                )));
                tracing::error!(server_url = %settings.server_url, "failed to build http client: {err}");
                return;
            }
        };
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Connected to {}",
            settings.server_url
        )));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Execute(effect) => {
                        let api = Arc::clone(&api);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = execute(api.as_ref(), effect).await;
                            let name = event.name();
                            if ui_tx.try_send(UiEvent::Board(event)).is_err() {
                                tracing::warn!(event = name, "ui event queue unavailable; dropping");
                            }
                        });
                    }
                    BackendCommand::Shutdown => break,
                }
            }
            tracing::info!("backend worker stopped");
        });
    });
}
