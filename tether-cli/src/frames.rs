use anyhow::{Context, Result, bail};
use bytes::Bytes;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tether_peer::{BroadcastSource, EncodedFrame};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;
use webrtc::media::io::ivf_reader::IVFReader;

/// 1x1 VP8 key frame header, enough for clients to see packets arrive.
const PLACEHOLDER_FRAME: &[u8] = &[0x10, 0x02, 0x00, 0x9d, 0x01, 0x2a, 0x01, 0x00, 0x01, 0x00];

pub fn spawn_placeholder(source: Arc<BroadcastSource>, frame_interval: Duration) -> JoinHandle<()> {
    spawn_loop(source, vec![Bytes::from_static(PLACEHOLDER_FRAME)], frame_interval)
}

/// Loads every frame of `path` up front and replays them forever.
pub async fn spawn_ivf_loop(
    source: Arc<BroadcastSource>,
    path: PathBuf,
    frame_interval: Duration,
) -> Result<JoinHandle<()>> {
    let frames = tokio::task::spawn_blocking(move || load_ivf(&path))
        .await
        .context("IVF loader panicked")??;
    Ok(spawn_loop(source, frames, frame_interval))
}

fn load_ivf(path: &Path) -> Result<Vec<Bytes>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let (mut reader, header) = IVFReader::new(BufReader::new(file))
        .with_context(|| format!("{} is not an IVF file", path.display()))?;

    let mut frames = Vec::new();
    while let Ok((frame, _)) = reader.parse_next_frame() {
        frames.push(frame.freeze());
    }
    if frames.is_empty() {
        bail!("{} contains no frames", path.display());
    }

    info!(
        "Loaded {} frames ({}x{}) from {}",
        frames.len(),
        header.width,
        header.height,
        path.display()
    );
    Ok(frames)
}

fn spawn_loop(
    source: Arc<BroadcastSource>,
    frames: Vec<Bytes>,
    frame_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for data in frames.iter().cycle() {
            ticker.tick().await;
            if source.subscriber_count() == 0 {
                continue;
            }
            source.publish(EncodedFrame {
                data: data.clone(),
                duration: frame_interval,
            });
        }
    })
}
