//! Background worker that owns the [`Session`]
//!
//! Every call on a [`SessionHandle`] becomes one [`SessionCommand`] carrying
//! its own reply channel. The worker processes commands strictly in arrival
//! order, which serializes all mutations of the open project.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{IconDetails, Session};
use crate::error::{StudioError, StudioResult};
use crate::import::RequestImport;
use crate::project::{ProjectInfo, ProjectKind, Stage};
use crate::storage::Document;

type Reply<T> = oneshot::Sender<StudioResult<T>>;

#[derive(Debug)]
enum SessionCommand {
    Detect { path: PathBuf, reply: Reply<ProjectKind> },
    Open { path: PathBuf, reply: Reply<ProjectInfo> },
    Convert { pack_root: PathBuf, reply: Reply<ProjectInfo> },
    Close { reply: Reply<Option<ProjectInfo>> },
    Info { reply: Reply<ProjectInfo> },
    SetTitle { title: String, reply: Reply<()> },
    Icons { stage: Stage, reply: Reply<Vec<String>> },
    Icon { id: String, reply: Reply<IconDetails> },
    SetCategory { id: String, target: Stage, reply: Reply<bool> },
    UpdateIcon {
        id: String,
        metadata: Document,
        image: Option<PathBuf>,
        target: Stage,
        reply: Reply<()>,
    },
    ImportRequest { archive: PathBuf, reply: Reply<RequestImport> },
    GetConfig { reply: Reply<Document> },
    SetConfig { document: Document, reply: Reply<()> },
    GetChangelog { reply: Reply<Document> },
    SetChangelog { document: Document, reply: Reply<()> },
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Detect { .. } => "detect",
            Self::Open { .. } => "open",
            Self::Convert { .. } => "convert",
            Self::Close { .. } => "close",
            Self::Info { .. } => "info",
            Self::SetTitle { .. } => "set_title",
            Self::Icons { .. } => "icons",
            Self::Icon { .. } => "icon",
            Self::SetCategory { .. } => "set_icon_category",
            Self::UpdateIcon { .. } => "update_icon",
            Self::ImportRequest { .. } => "import_request",
            Self::GetConfig { .. } => "config",
            Self::SetConfig { .. } => "set_config",
            Self::GetChangelog { .. } => "changelog",
            Self::SetChangelog { .. } => "set_changelog",
        }
    }
}

// Reply send errors are ignored: the caller may have stopped waiting.
async fn dispatch(session: &mut Session, command: SessionCommand) {
    match command {
        SessionCommand::Detect { path, reply } => {
            let _ = reply.send(session.detect(&path).await);
        }
        SessionCommand::Open { path, reply } => {
            let _ = reply.send(session.open(&path).await);
        }
        SessionCommand::Convert { pack_root, reply } => {
            let _ = reply.send(session.convert(&pack_root).await);
        }
        SessionCommand::Close { reply } => {
            let _ = reply.send(Ok(session.close()));
        }
        SessionCommand::Info { reply } => {
            let _ = reply.send(session.info());
        }
        SessionCommand::SetTitle { title, reply } => {
            let _ = reply.send(session.set_title(title).await);
        }
        SessionCommand::Icons { stage, reply } => {
            let _ = reply.send(session.icons(stage));
        }
        SessionCommand::Icon { id, reply } => {
            let _ = reply.send(session.icon(&id).await);
        }
        SessionCommand::SetCategory { id, target, reply } => {
            let _ = reply.send(session.set_icon_category(&id, target).await);
        }
        SessionCommand::UpdateIcon {
            id,
            metadata,
            image,
            target,
            reply,
        } => {
            let result = session
                .update_icon(&id, &metadata, image.as_deref(), target)
                .await;
            let _ = reply.send(result);
        }
        SessionCommand::ImportRequest { archive, reply } => {
            let _ = reply.send(session.import_request(&archive).await);
        }
        SessionCommand::GetConfig { reply } => {
            let _ = reply.send(session.config_document().await);
        }
        SessionCommand::SetConfig { document, reply } => {
            let _ = reply.send(session.set_config_document(&document).await);
        }
        SessionCommand::GetChangelog { reply } => {
            let _ = reply.send(session.changelog().await);
        }
        SessionCommand::SetChangelog { document, reply } => {
            let _ = reply.send(session.set_changelog(&document).await);
        }
    }
}

/// Cloneable front door to a session running on its own task
///
/// The worker stops once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
    _worker_handle: Arc<JoinHandle<()>>,
}

impl SessionHandle {
    /// Move `session` onto a background worker task
    pub fn spawn(mut session: Session) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionCommand>();

        let worker_handle = tokio::spawn(async move {
            debug!("Session worker started");
            let mut processed = 0usize;

            while let Some(command) = rx.recv().await {
                debug!("Processing session command {}", command.name());
                dispatch(&mut session, command).await;
                processed += 1;
            }

            if let Some(info) = session.close() {
                debug!("Released project {} on shutdown", info.id);
            }
            info!(
                "Session worker shutting down (processed {} commands)",
                processed
            );
        });

        Self {
            tx,
            _worker_handle: Arc::new(worker_handle),
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> StudioResult<T> {
        let (reply, response_rx) = oneshot::channel();
        let command = make(reply);
        let name = command.name();

        self.tx.send(command).map_err(|_| {
            StudioError::SessionClosed(format!("cannot submit {name}: worker stopped"))
        })?;

        response_rx.await.map_err(|_| {
            StudioError::SessionClosed(format!("worker dropped the {name} reply"))
        })?
    }

    pub async fn detect(&self, path: impl Into<PathBuf>) -> StudioResult<ProjectKind> {
        let path = path.into();
        self.request(|reply| SessionCommand::Detect { path, reply })
            .await
    }

    pub async fn open(&self, path: impl Into<PathBuf>) -> StudioResult<ProjectInfo> {
        let path = path.into();
        self.request(|reply| SessionCommand::Open { path, reply }).await
    }

    pub async fn convert(&self, pack_root: impl Into<PathBuf>) -> StudioResult<ProjectInfo> {
        let pack_root = pack_root.into();
        self.request(|reply| SessionCommand::Convert { pack_root, reply })
            .await
    }

    pub async fn close(&self) -> StudioResult<Option<ProjectInfo>> {
        self.request(|reply| SessionCommand::Close { reply }).await
    }

    pub async fn info(&self) -> StudioResult<ProjectInfo> {
        self.request(|reply| SessionCommand::Info { reply }).await
    }

    pub async fn set_title(&self, title: impl Into<String>) -> StudioResult<()> {
        let title = title.into();
        self.request(|reply| SessionCommand::SetTitle { title, reply })
            .await
    }

    pub async fn icons(&self, stage: Stage) -> StudioResult<Vec<String>> {
        self.request(|reply| SessionCommand::Icons { stage, reply })
            .await
    }

    pub async fn icon(&self, id: impl Into<String>) -> StudioResult<IconDetails> {
        let id = id.into();
        self.request(|reply| SessionCommand::Icon { id, reply }).await
    }

    pub async fn set_icon_category(
        &self,
        id: impl Into<String>,
        target: Stage,
    ) -> StudioResult<bool> {
        let id = id.into();
        self.request(|reply| SessionCommand::SetCategory { id, target, reply })
            .await
    }

    pub async fn update_icon(
        &self,
        id: impl Into<String>,
        metadata: Document,
        image: Option<PathBuf>,
        target: Stage,
    ) -> StudioResult<()> {
        let id = id.into();
        self.request(|reply| SessionCommand::UpdateIcon {
            id,
            metadata,
            image,
            target,
            reply,
        })
        .await
    }

    pub async fn import_request(&self, archive: impl Into<PathBuf>) -> StudioResult<RequestImport> {
        let archive = archive.into();
        self.request(|reply| SessionCommand::ImportRequest { archive, reply })
            .await
    }

    pub async fn config_document(&self) -> StudioResult<Document> {
        self.request(|reply| SessionCommand::GetConfig { reply }).await
    }

    pub async fn set_config_document(&self, document: Document) -> StudioResult<()> {
        self.request(|reply| SessionCommand::SetConfig { document, reply })
            .await
    }

    pub async fn changelog(&self) -> StudioResult<Document> {
        self.request(|reply| SessionCommand::GetChangelog { reply })
            .await
    }

    pub async fn set_changelog(&self, document: Document) -> StudioResult<()> {
        self.request(|reply| SessionCommand::SetChangelog { document, reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn spawn_with_pack(temp_dir: &TempDir) -> (SessionHandle, PathBuf) {
        let pack = temp_dir.path().join("pack");
        write(
            &pack.join("appfilter.xml"),
            r#"<resources><item drawable="a"/><item drawable="b"/><item drawable="c"/></resources>"#,
        );
        for id in ["a", "b", "c"] {
            write(
                &pack.join(format!("app/src/main/res/drawable-nodpi/{id}.png")),
                id,
            );
        }
        let config = StudioConfig::with_projects_dir(temp_dir.path().join("projects"));
        (SessionHandle::spawn(Session::new(config)), pack)
    }

    #[tokio::test]
    async fn test_commands_round_trip_through_worker() {
        let temp_dir = TempDir::new().unwrap();
        let (handle, pack) = spawn_with_pack(&temp_dir);

        assert_eq!(handle.detect(&pack).await.unwrap(), ProjectKind::Pack);
        let info = handle.open(&pack).await.unwrap();
        assert_eq!(info.id, "pack");

        assert!(handle.set_icon_category("b", Stage::Requested).await.unwrap());
        assert_eq!(handle.icons(Stage::Requested).await.unwrap(), vec!["b"]);

        handle.set_title("Pack").await.unwrap();
        assert_eq!(handle.info().await.unwrap().title, "Pack");

        handle
            .set_config_document(json!({"theme": "dark"}))
            .await
            .unwrap();
        assert_eq!(
            handle.config_document().await.unwrap(),
            json!({"theme": "dark"})
        );

        assert_eq!(handle.close().await.unwrap().map(|i| i.id), Some(info.id));
        assert!(matches!(
            handle.info().await,
            Err(StudioError::NoProjectOpen)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_moves_are_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let (handle, pack) = spawn_with_pack(&temp_dir);
        handle.open(&pack).await.unwrap();

        // Same icon toggled from many tasks; every command sees a settled state
        let mut tasks = Vec::new();
        for i in 0..10 {
            let handle = handle.clone();
            let target = if i % 2 == 0 {
                Stage::Requested
            } else {
                Stage::Finished
            };
            tasks.push(tokio::spawn(async move {
                handle.set_icon_category("a", target).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let requested = handle.icons(Stage::Requested).await.unwrap();
        let finished = handle.icons(Stage::Finished).await.unwrap();
        let in_requested = requested.contains(&"a".to_string());
        assert_ne!(in_requested, finished.contains(&"a".to_string()));

        let stage = if in_requested {
            Stage::Requested
        } else {
            Stage::Finished
        };
        let layout = crate::storage::ProjectLayout::new(temp_dir.path().join("projects/pack"));
        assert!(layout.image_exists(stage, "a").await.unwrap());
        assert!(!layout.image_exists(stage.other(), "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_worker_reports_session_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = SessionHandle {
            tx,
            _worker_handle: Arc::new(tokio::spawn(async {})),
        };

        let err = handle.info().await.unwrap_err();
        assert!(matches!(err, StudioError::SessionClosed(_)));
    }
}
