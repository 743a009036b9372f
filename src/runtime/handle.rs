use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::{
    calc::{CalcError, Operation, stack::OperandStack},
    core::coordinator::{PersistenceCoordinator, filter_by_flavor},
    record::OperationRecord,
    types::{Flavor, Operand},
};

use super::events::CalcEvent;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("calculator runtime channel closed")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub persist_queue_bound: usize,
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            persist_queue_bound: 64,
            event_capacity: 1024,
        }
    }
}

pub struct CalculatorHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<CalcEvent>,
}

impl Clone for CalculatorHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Independent {
        operation: String,
        arguments: Vec<Operand>,
        resp: oneshot::Sender<Result<Operand, RuntimeError>>,
    },
    StackSize {
        resp: oneshot::Sender<usize>,
    },
    PushArguments {
        arguments: Vec<Operand>,
        resp: oneshot::Sender<usize>,
    },
    StackOperate {
        operation: String,
        resp: oneshot::Sender<Result<Operand, RuntimeError>>,
    },
    RemoveArguments {
        count: usize,
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    History {
        selector: String,
        flavor: Option<String>,
        resp: oneshot::Sender<Vec<OperationRecord>>,
    },
    Flush {
        resp: oneshot::Sender<()>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

enum PersistMsg {
    Save {
        flavor: Flavor,
        operation: &'static str,
        result: Operand,
        arguments: Vec<Operand>,
    },
    History {
        selector: String,
        flavor: Option<String>,
        resp: oneshot::Sender<Vec<OperationRecord>>,
    },
    Flush {
        resp: oneshot::Sender<()>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Starts the command loop and its persistence worker.
///
/// The loop owns the operand stack, so stack reads and writes from concurrent
/// callers are applied one command at a time. Saves and history reads share
/// one FIFO queue, so a history read observes every save queued before it.
pub fn spawn_calculator(
    coordinator: Arc<PersistenceCoordinator>,
    config: RuntimeConfig,
) -> CalculatorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<CalcEvent>(config.event_capacity);
    let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound);

    spawn_persistence_worker(coordinator, persist_rx, events_tx.clone());

    let events_tx_loop = events_tx.clone();
    tokio::spawn(async move {
        let mut stack = OperandStack::new();
        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut stack, &events_tx_loop, &persist_tx).await {
                break;
            }
        }
    });

    CalculatorHandle { cmd_tx, events_tx }
}

impl CalculatorHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<CalcEvent> {
        self.events_tx.subscribe()
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Evaluates `operation` over `arguments` without touching the stack.
    pub async fn independent_calculate(
        &self,
        operation: impl Into<String>,
        arguments: Vec<Operand>,
    ) -> Result<Operand, RuntimeError> {
        let operation = operation.into();
        self.call(|resp| Command::Independent {
            operation,
            arguments,
            resp,
        })
        .await?
    }

    pub async fn stack_size(&self) -> Result<usize, RuntimeError> {
        self.call(|resp| Command::StackSize { resp }).await
    }

    /// Pushes `arguments` in order. Returns the new stack size.
    pub async fn push_arguments(&self, arguments: Vec<Operand>) -> Result<usize, RuntimeError> {
        self.call(|resp| Command::PushArguments { arguments, resp })
            .await
    }

    /// Pops operands for `operation` and evaluates it.
    pub async fn stack_operate(&self, operation: impl Into<String>) -> Result<Operand, RuntimeError> {
        let operation = operation.into();
        self.call(|resp| Command::StackOperate { operation, resp })
            .await?
    }

    /// Drops `count` operands. Returns the new stack size.
    pub async fn remove_arguments(&self, count: usize) -> Result<usize, RuntimeError> {
        self.call(|resp| Command::RemoveArguments { count, resp })
            .await?
    }

    /// Reads history from the selected store, optionally keeping one flavor.
    pub async fn history(
        &self,
        selector: impl Into<String>,
        flavor: Option<&str>,
    ) -> Result<Vec<OperationRecord>, RuntimeError> {
        let selector = selector.into();
        let flavor = flavor.map(str::to_string);
        self.call(|resp| Command::History {
            selector,
            flavor,
            resp,
        })
        .await
    }

    /// Waits until every save queued so far has been handed to the coordinator.
    pub async fn flush(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Flush { resp }).await
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Shutdown { resp }).await?
    }
}

async fn handle_command(
    cmd: Command,
    stack: &mut OperandStack,
    events_tx: &broadcast::Sender<CalcEvent>,
    persist_tx: &mpsc::Sender<PersistMsg>,
) -> bool {
    match cmd {
        Command::Independent {
            operation,
            arguments,
            resp,
        } => {
            let res = Operation::parse(&operation).and_then(|op| {
                let result = op.evaluate(&arguments)?;
                Ok((op, result))
            });
            let out = match res {
                Ok((op, result)) => {
                    record_success(events_tx, persist_tx, Flavor::Independent, op, result, arguments).await;
                    Ok(result)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(out);
        }
        Command::StackSize { resp } => {
            let _ = resp.send(stack.len());
        }
        Command::PushArguments { arguments, resp } => {
            let size = stack.push_all(&arguments);
            let _ = events_tx.send(CalcEvent::StackChanged { size });
            let _ = resp.send(size);
        }
        Command::StackOperate { operation, resp } => {
            let res = Operation::parse(&operation).and_then(|op| {
                let (result, args) = stack.operate(op)?;
                Ok((op, result, args))
            });
            let out = match res {
                Ok((op, result, args)) => {
                    let _ = events_tx.send(CalcEvent::StackChanged { size: stack.len() });
                    record_success(events_tx, persist_tx, Flavor::Stack, op, result, args).await;
                    Ok(result)
                }
                Err(err) => Err(RuntimeError::from(err)),
            };
            let _ = resp.send(out);
        }
        Command::RemoveArguments { count, resp } => {
            let out = stack.remove(count).map_err(RuntimeError::from);
            if let Ok(size) = out {
                let _ = events_tx.send(CalcEvent::StackChanged { size });
            }
            let _ = resp.send(out);
        }
        Command::History {
            selector,
            flavor,
            resp,
        } => {
            if persist_tx
                .send(PersistMsg::History {
                    selector,
                    flavor,
                    resp,
                })
                .await
                .is_err()
            {
                warn!("persistence worker gone, history request dropped");
            }
        }
        Command::Flush { resp } => {
            if persist_tx.send(PersistMsg::Flush { resp }).await.is_err() {
                warn!("persistence worker gone, flush request dropped");
            }
        }
        Command::Shutdown { resp } => {
            let (done_tx, done_rx) = oneshot::channel();
            let out = if persist_tx
                .send(PersistMsg::Shutdown { resp: done_tx })
                .await
                .is_err()
            {
                Err(RuntimeError::ChannelClosed)
            } else {
                done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

async fn record_success(
    events_tx: &broadcast::Sender<CalcEvent>,
    persist_tx: &mpsc::Sender<PersistMsg>,
    flavor: Flavor,
    op: Operation,
    result: Operand,
    arguments: Vec<Operand>,
) {
    let _ = events_tx.send(CalcEvent::Evaluated {
        flavor,
        operation: op.name(),
        result,
    });
    let msg = PersistMsg::Save {
        flavor,
        operation: op.name(),
        result,
        arguments,
    };
    if persist_tx.send(msg).await.is_err() {
        warn!(operation = op.name(), "persistence worker gone, save dropped");
    }
}

fn spawn_persistence_worker(
    coordinator: Arc<PersistenceCoordinator>,
    mut rx: mpsc::Receiver<PersistMsg>,
    events_tx: broadcast::Sender<CalcEvent>,
) {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                PersistMsg::Save {
                    flavor,
                    operation,
                    result,
                    arguments,
                } => {
                    let coord = Arc::clone(&coordinator);
                    let joined = tokio::task::spawn_blocking(move || {
                        coord.save(flavor, operation, result, &arguments);
                    })
                    .await;
                    match joined {
                        Ok(()) => {
                            let _ = events_tx.send(CalcEvent::Persisted { operation });
                        }
                        Err(err) => warn!(error = %err, operation, "save task failed"),
                    }
                }
                PersistMsg::History {
                    selector,
                    flavor,
                    resp,
                } => {
                    let coord = Arc::clone(&coordinator);
                    let records = tokio::task::spawn_blocking(move || {
                        filter_by_flavor(coord.fetch(&selector), flavor.as_deref())
                    })
                    .await
                    .unwrap_or_else(|err| {
                        warn!(error = %err, "history task failed");
                        Vec::new()
                    });
                    let _ = resp.send(records);
                }
                PersistMsg::Flush { resp } => {
                    let _ = resp.send(());
                }
                PersistMsg::Shutdown { resp } => {
                    debug!("persistence worker stopping");
                    let _ = resp.send(());
                    break;
                }
            }
        }
    });
}
