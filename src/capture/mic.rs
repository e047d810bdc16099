//! Microphone input via cpal.
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread for
//! the duration of a recording; the handle only carries channels. Start
//! errors (no device, stream refused) surface synchronously through a
//! ready handshake.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error, info};

use super::{AudioInput, ChunkedSink};

pub struct MicInput {
    sample_rate: u32,
    active: bool,
    stop_tx: Option<std_mpsc::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MicInput {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            active: false,
            stop_tx: None,
            worker: None,
        }
    }
}

impl AudioInput for MicInput {
    fn start(&mut self, sink: Arc<Mutex<ChunkedSink>>) -> Result<()> {
        if self.active {
            return Err(anyhow!("Mic input already recording"));
        }

        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<()>>();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let sample_rate = self.sample_rate;

        let worker = thread::spawn(move || {
            let host = cpal::default_host();
            let device = match host.default_input_device() {
                Some(device) => device,
                None => {
                    let _ = ready_tx.send(Err(anyhow!("No input device available")));
                    return;
                }
            };

            info!(
                "Using input device: {}",
                device.name().unwrap_or_else(|_| "unknown".to_string())
            );

            let config = cpal::StreamConfig {
                channels: 1,
                sample_rate: cpal::SampleRate(sample_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let err_fn = |err| error!("Mic stream error: {}", err);
            let stream = match device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut sink) = sink.lock() {
                        sink.push(data);
                    }
                },
                err_fn,
                None,
            ) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx
                        .send(Err(anyhow!(err).context("Failed to open microphone stream")));
                    return;
                }
            };

            if let Err(err) = stream.play() {
                let _ = ready_tx
                    .send(Err(anyhow!(err).context("Failed to start microphone stream")));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Park until stop is requested (or the handle is dropped).
            let _ = stop_rx.recv();

            // Dropping the stream stops capture and releases the device,
            // so the OS microphone indicator goes off.
            debug!("Stopping microphone stream");
            drop(stream);
        });

        ready_rx
            .recv()
            .context("Microphone thread exited before reporting readiness")??;

        self.stop_tx = Some(stop_tx);
        self.worker = Some(worker);
        self.active = true;

        info!("Microphone recording started");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        self.active = false;
        info!("Microphone recording stopped");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for MicInput {
    fn drop(&mut self) {
        if self.active {
            debug!("Dropping active MicInput, cleaning up");
            let _ = self.stop();
        }
    }
}
