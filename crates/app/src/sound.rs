//! Capture and upload-complete sounds, read from `assets/sounds` next to the executable

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    Capture,
    Complete,
}

impl Clip {
    pub fn file_name(self) -> &'static str {
        match self {
            Clip::Capture => "cap.wav",
            Clip::Complete => "complete.wav",
        }
    }
}

pub fn clip_path(base: &Path, clip: Clip) -> PathBuf {
    base.join("assets").join("sounds").join(clip.file_name())
}

#[cfg(windows)]
fn sounds_base() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Play a clip on its own thread; a missing file or audio device is only logged
#[cfg(windows)]
pub fn play(clip: Clip) {
    use std::fs::File;
    use std::io::BufReader;

    let Some(path) = sounds_base().map(|base| clip_path(&base, clip)) else {
        return;
    };

    let spawned = std::thread::Builder::new()
        .name("sound".into())
        .spawn(move || {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    tracing::debug!(path = %path.display(), "sound not played: {e}");
                    return;
                }
            };
            // The stream has to outlive playback
            let Ok((_stream, handle)) = rodio::OutputStream::try_default() else {
                tracing::debug!("no audio output device");
                return;
            };
            match (
                rodio::Decoder::new(BufReader::new(file)),
                rodio::Sink::try_new(&handle),
            ) {
                (Ok(source), Ok(sink)) => {
                    sink.append(source);
                    sink.sleep_until_end();
                }
                (Err(e), _) => tracing::warn!(path = %path.display(), "failed to decode sound: {e}"),
                (_, Err(e)) => tracing::warn!("failed to open audio sink: {e}"),
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("failed to start sound thread: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_live_under_assets() {
        let base = Path::new("install");
        assert_eq!(
            clip_path(base, Clip::Capture),
            base.join("assets").join("sounds").join("cap.wav")
        );
        assert_eq!(
            clip_path(base, Clip::Complete),
            base.join("assets").join("sounds").join("complete.wav")
        );
    }
}
