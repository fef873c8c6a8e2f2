use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::watch;

use crate::config::Config;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::errors::Fatal;
use crate::membership::NodeId;
use crate::metrics::Metrics;

/// UnisonInner is the internal handle and provides internally used APIs to
/// communicate with `Core`.
pub(in crate::unison) struct UnisonInner {
    pub(in crate::unison) id: NodeId,
    pub(in crate::unison) config: Arc<Config>,
    pub(in crate::unison) tx_api: mpsc::UnboundedSender<APIMessage>,
    pub(in crate::unison) rx_metrics: watch::Receiver<Metrics>,
    pub(in crate::unison) core_state: std::sync::Mutex<CoreState>,
}

impl UnisonInner {
    /// Send a [`APIMessage`] to Core
    pub(crate) async fn send_msg(&self, mes: APIMessage) -> Result<(), Fatal> {
        let send_res = self.tx_api.send(mes);

        if let Err(e) = send_res {
            let fatal = self
                .get_core_stopped_error(
                    "sending APIMessage to Core",
                    Some(e.0.to_string()),
                )
                .await;
            return Err(fatal);
        }
        Ok(())
    }

    #[allow(dead_code)]
    pub(in crate::unison) fn is_core_running(&self) -> bool {
        let state = self.core_state.lock().unwrap();
        state.is_running()
    }

    /// Get the error that caused Core to stop.
    pub(in crate::unison) async fn get_core_stopped_error(
        &self,
        when: impl fmt::Display,
        message_summary: Option<impl fmt::Display + Default>,
    ) -> Fatal {
        // Wait for the core task to finish.
        self.join_core_task().await;

        // Retrieve the result.
        let core_res = {
            let state = self.core_state.lock().unwrap();
            if let CoreState::Done(core_task_res) = &*state {
                core_task_res.clone()
            } else {
                unreachable!("Core should have already quit")
            }
        };

        tracing::debug!(
            core_result = debug(&core_res),
            "quit {}; message: {}",
            when,
            message_summary.unwrap_or_default()
        );

        // Safe unwrap: core_res is always an error
        core_res.unwrap_err()
    }

    /// Wait for `Core` task to finish and record the returned value from
    /// the task.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(in crate::unison) async fn join_core_task(&self) {
        // Get the Running state of Core,
        // or an error if Core has been in Joining state.
        let running_res = {
            let mut state = self.core_state.lock().unwrap();

            match &*state {
                CoreState::Running(_) => {
                    let (tx, rx) = watch::channel::<bool>(false);

                    let prev =
                        std::mem::replace(&mut *state, CoreState::Joining(rx));

                    let CoreState::Running(join_handle) = prev else {
                        unreachable!()
                    };

                    Ok((join_handle, tx))
                }
                CoreState::Joining(watch_rx) => Err(watch_rx.clone()),
                CoreState::Done(_) => {
                    // Core has already finished exiting, nothing to do
                    return;
                }
            }
        };

        match running_res {
            Ok((join_handle, tx)) => {
                let join_res = join_handle.await;

                tracing::info!(res = debug(&join_res), "Core exited");

                let core_task_res = match join_res {
                    Err(err) => {
                        if err.is_panic() {
                            Err(Fatal::Panicked)
                        } else {
                            Err(Fatal::Stopped)
                        }
                    }
                    Ok(returned_res) => returned_res,
                };

                {
                    let mut state = self.core_state.lock().unwrap();
                    *state = CoreState::Done(core_task_res);
                }
                tx.send(true).ok();
            }
            Err(mut rx) => {
                // Other thread is waiting for the core to finish.
                loop {
                    let res = rx.changed().await;
                    if res.is_err() {
                        break;
                    }
                    if *rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
