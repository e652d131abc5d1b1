//! Asynchronous adapter around [`Explorer`]
//!
//! The explorer runs on a dedicated blocking thread and processes one command
//! at a time. Trees are moved into a command and handed back with its reply,
//! so the worker is their only owner while an activation runs.

use std::path::PathBuf;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    analyzer::PdfAnalyzer,
    content::StreamPreview,
    error::{Error, Result},
    explorer::{ActivationOutcome, AnalysisMode, Explorer},
    session::DocumentSession,
    types::{ExplorerTree, NodeId},
};

const COMMAND_QUEUE_DEPTH: usize = 32;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Open {
        path: PathBuf,
        reply: Reply<DocumentSession>,
    },
    BuildTree {
        session: DocumentSession,
        mode: AnalysisMode,
        reply: Reply<ExplorerTree>,
    },
    Activate {
        tree: ExplorerTree,
        node: NodeId,
        session: DocumentSession,
        auto_resolve: bool,
        reply: oneshot::Sender<(ExplorerTree, Result<ActivationOutcome>)>,
    },
    Preview {
        session: DocumentSession,
        object_index: u32,
        reply: Reply<Option<StreamPreview>>,
    },
    Export {
        session: DocumentSession,
        object_index: u32,
        destination: Option<PathBuf>,
        reply: Reply<Option<PathBuf>>,
    },
    Save {
        session: DocumentSession,
        path: PathBuf,
        reply: Reply<()>,
    },
    UpdateValue {
        session: DocumentSession,
        object_index: u32,
        key: String,
        value: String,
        reply: Reply<bool>,
    },
    UpdateStream {
        session: DocumentSession,
        object_index: u32,
        bytes: Vec<u8>,
        reply: Reply<bool>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

fn run<A: PdfAnalyzer>(mut explorer: Explorer<A>, mut commands: mpsc::Receiver<Command>) {
    while let Some(command) = commands.blocking_recv() {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Open { path, reply } => {
                let _ = reply.send(explorer.open_session(&path));
            }
            Command::BuildTree {
                session,
                mode,
                reply,
            } => {
                let _ = reply.send(explorer.build_initial_tree(&session, mode));
            }
            Command::Activate {
                mut tree,
                node,
                session,
                auto_resolve,
                reply,
            } => {
                let outcome = explorer.on_node_activated(&mut tree, node, &session, auto_resolve);
                let _ = reply.send((tree, outcome));
            }
            Command::Preview {
                session,
                object_index,
                reply,
            } => {
                let _ = reply.send(explorer.get_stream_for_preview(&session, object_index));
            }
            Command::Export {
                session,
                object_index,
                destination,
                reply,
            } => {
                let _ = reply.send(explorer.export_stream(
                    &session,
                    object_index,
                    destination.as_deref(),
                ));
            }
            Command::Save {
                session,
                path,
                reply,
            } => {
                let _ = reply.send(explorer.save_session(&session, &path));
            }
            Command::UpdateValue {
                session,
                object_index,
                key,
                value,
                reply,
            } => {
                let _ = reply.send(explorer.update_object_value(
                    &session,
                    object_index,
                    &key,
                    &value,
                ));
            }
            Command::UpdateStream {
                session,
                object_index,
                bytes,
                reply,
            } => {
                let _ = reply.send(explorer.update_object_stream(&session, object_index, &bytes));
            }
            Command::Close { reply } => {
                explorer.close_session();
                let _ = reply.send(());
            }
        }
    }
    debug!("Command channel closed, worker exiting");
}

/// Handle to an explorer running on a blocking worker thread
pub struct ExplorerWorker {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl ExplorerWorker {
    /// Moves `explorer` onto a blocking thread. Must be called inside a tokio runtime.
    pub fn spawn<A>(explorer: Explorer<A>) -> Self
    where
        A: PdfAnalyzer + Send + 'static,
    {
        let (commands, receiver) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let task = tokio::task::spawn_blocking(move || run(explorer, receiver));
        info!("Explorer worker started");
        Self { commands, task }
    }

    async fn call<T>(&self, command: Command, reply: oneshot::Receiver<T>) -> Result<T> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::WorkerError("worker is not running".into()))?;
        reply
            .await
            .map_err(|_| Error::WorkerError("worker dropped the reply".into()))
    }

    pub async fn open(&self, path: PathBuf) -> Result<DocumentSession> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Open { path, reply }, rx).await?
    }

    pub async fn build_tree(
        &self,
        session: DocumentSession,
        mode: AnalysisMode,
    ) -> Result<ExplorerTree> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::BuildTree {
                session,
                mode,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Activates `node`. The tree comes back with the outcome, modified or not.
    ///
    /// If the worker is gone the tree is lost along with it and only the
    /// error is returned.
    pub async fn activate(
        &self,
        tree: ExplorerTree,
        node: NodeId,
        session: DocumentSession,
        auto_resolve: bool,
    ) -> Result<(ExplorerTree, Result<ActivationOutcome>)> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Activate {
                tree,
                node,
                session,
                auto_resolve,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn preview(
        &self,
        session: DocumentSession,
        object_index: u32,
    ) -> Result<Option<StreamPreview>> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Preview {
                session,
                object_index,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn export(
        &self,
        session: DocumentSession,
        object_index: u32,
        destination: Option<PathBuf>,
    ) -> Result<Option<PathBuf>> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Export {
                session,
                object_index,
                destination,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn save(&self, session: DocumentSession, path: PathBuf) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::Save {
                session,
                path,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn update_object_value(
        &self,
        session: DocumentSession,
        object_index: u32,
        key: String,
        value: String,
    ) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::UpdateValue {
                session,
                object_index,
                key,
                value,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn update_object_stream(
        &self,
        session: DocumentSession,
        object_index: u32,
        bytes: Vec<u8>,
    ) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::UpdateStream {
                session,
                object_index,
                bytes,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn close(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Close { reply }, rx).await
    }

    /// Stops accepting commands and waits for the worker thread to finish.
    ///
    /// The explorer is dropped on the worker, which closes any open document.
    pub async fn shutdown(self) -> Result<()> {
        let Self { commands, task } = self;
        drop(commands);
        task.await
            .map_err(|e| Error::WorkerError(format!("worker panicked: {}", e)))?;
        info!("Explorer worker stopped");
        Ok(())
    }
}
