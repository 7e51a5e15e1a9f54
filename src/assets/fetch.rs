use std::sync::{Arc, OnceLock};

use flume::{Receiver, TryRecvError};
use tokio::runtime::Runtime;

use crate::assets::io::{AssetReaderVariant, join_path, parent_dir};
use crate::errors::{Result, SinewError};
use crate::import::{Dependencies, SceneImporter};

fn get_asset_runtime() -> Result<&'static Runtime> {
    static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| Runtime::new().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|err| SinewError::SceneLoad(format!("Failed to create asset loader runtime: {err}")))
}

/// Raw bytes of a scene and every external file it references.
#[derive(Debug, Clone)]
pub struct FetchedScene {
    /// Reader-relative path that was requested.
    pub path: String,
    /// Directory of the scene file including the reader root. Texture
    /// paths are resolved against it.
    pub asset_path: String,
    pub bytes: Vec<u8>,
    pub dependencies: Dependencies,
}

/// A fetch running in the background.
#[derive(Debug)]
pub struct PendingLoad {
    receiver: Receiver<Result<FetchedScene>>,
    finished: bool,
}

impl PendingLoad {
    /// Non-blocking. Yields the result exactly once.
    pub fn poll(&mut self) -> Option<Result<FetchedScene>> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(SinewError::LoadChannelClosed))
            }
        }
    }

    /// Blocks until the fetch delivers.
    pub fn wait(mut self) -> Result<FetchedScene> {
        if self.finished {
            return Err(SinewError::LoadChannelClosed);
        }
        self.finished = true;
        self.receiver
            .recv()
            .map_err(|_| SinewError::LoadChannelClosed)?
    }
}

/// Starts fetching `path` and the files its importer depends on. Returns immediately.
pub fn fetch_scene(
    reader: AssetReaderVariant,
    path: &str,
    importer: Arc<dyn SceneImporter>,
) -> PendingLoad {
    let (tx, rx) = flume::bounded(1);
    let pending = PendingLoad {
        receiver: rx,
        finished: false,
    };

    let runtime = match get_asset_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = tx.send(Err(err));
            return pending;
        }
    };

    let path = path.to_string();
    runtime.spawn(async move {
        let result = fetch(&reader, &path, importer.as_ref()).await;
        if tx.send(result).is_err() {
            log::debug!("Fetch of '{path}' finished after its receiver was dropped");
        }
    });

    pending
}

async fn fetch(
    reader: &AssetReaderVariant,
    path: &str,
    importer: &dyn SceneImporter,
) -> Result<FetchedScene> {
    let bytes = reader.read_bytes(path).await?;
    let directory = parent_dir(path);

    let mut dependencies = Dependencies::default();
    for uri in importer.dependencies(&bytes)? {
        let data = reader.read_bytes(&join_path(directory, &uri)).await?;
        dependencies.insert(uri, data);
    }

    log::debug!(
        "Fetched '{path}' ({} bytes, {} dependencies) for the {} importer",
        bytes.len(),
        dependencies.len(),
        importer.name()
    );

    Ok(FetchedScene {
        path: path.to_string(),
        asset_path: join_path(&reader.base_path(), directory),
        bytes,
        dependencies,
    })
}
