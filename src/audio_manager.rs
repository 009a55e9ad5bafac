use std::{fs::File, io::BufReader, io::Cursor, io::Read, sync::Arc};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

fn load_bytes(path: &str) -> Option<Vec<u8>> {
    let mut f = File::open(path).ok()?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn load_bytes_any(paths: &[&str]) -> Option<Vec<u8>> {
    let found = paths.iter().find_map(|p| load_bytes(p).map(|b| (*p, b)));
    match found {
        Some((path, bytes)) => {
            debug!(path, "loaded sound");
            Some(bytes)
        }
        None => None,
    }
}

/// Sound effects and the background loop. Missing files are silent.
pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bg_sink: Option<Sink>,
    sfx_sink: Sink,
    player_shot: Option<Arc<Vec<u8>>>,
    enemy_shot: Option<Arc<Vec<u8>>>,
    enemy_death: Option<Arc<Vec<u8>>>,
    player_death: Option<Arc<Vec<u8>>>,
    door_open: Option<Arc<Vec<u8>>>,
    door_close: Option<Arc<Vec<u8>>>,
    item_pickup: Option<Arc<Vec<u8>>>,
    shot_volume: f32,
}

impl AudioManager {
    /// `None` when no output device is available.
    pub fn new() -> Option<Self> {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "no audio device, running muted");
                return None;
            }
        };
        let sfx_sink = Sink::try_new(&handle).ok()?;
        Some(Self {
            _stream,
            handle,
            bg_sink: None,
            sfx_sink,
            player_shot: None,
            enemy_shot: None,
            enemy_death: None,
            player_death: None,
            door_open: None,
            door_close: None,
            item_pickup: None,
            shot_volume: 0.8,
        })
    }

    pub fn load_sfx_auto(&mut self) {
        self.player_shot = load_bytes_any(&[
            "assets/sfx_player_shot.wav",
            "assets/sounds/shot.wav",
            "assets/sounds/pistol.wav",
        ]).map(Arc::new);
        self.enemy_shot = load_bytes_any(&[
            "assets/sfx_enemy_shot.wav",
            "assets/sounds/enemy_shot.wav",
        ]).map(Arc::new);
        self.enemy_death = load_bytes_any(&[
            "assets/sfx_enemy_death.wav",
            "assets/sounds/enemy_death.wav",
            "assets/sounds/scream.wav",
        ]).map(Arc::new);
        self.player_death = load_bytes_any(&[
            "assets/sfx_player_death.wav",
            "assets/sounds/player_death.wav",
        ]).map(Arc::new);
        self.door_open = load_bytes_any(&[
            "assets/sfx_door_open.wav",
            "assets/sounds/dooropen.wav",
            "assets/sounds/dooropen.ogg",
        ]).map(Arc::new);
        self.door_close = load_bytes_any(&[
            "assets/sfx_door_close.wav",
            "assets/sounds/doorclose.wav",
            "assets/sounds/doorclose.ogg",
        ]).map(Arc::new);
        self.item_pickup = load_bytes_any(&[
            "assets/sfx_pickup.wav",
            "assets/sounds/pickup.wav",
        ]).map(Arc::new);
    }

    /// Own detached sink so rapid shots overlap instead of queueing.
    pub fn play_player_shot(&self) {
        if let Some(d) = self.player_shot.clone() {
            if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
                if let Ok(sink) = Sink::try_new(&self.handle) {
                    sink.append(dec.amplify(self.shot_volume.clamp(0.0, 2.5)));
                    sink.detach();
                }
            }
        }
    }

    pub fn play_enemy_shot(&self) { self.play_data(self.enemy_shot.clone()); }
    pub fn play_enemy_death(&self) { self.play_data(self.enemy_death.clone()); }
    pub fn play_player_death(&self) { self.play_data(self.player_death.clone()); }
    pub fn play_door_open(&self) { self.play_data(self.door_open.clone()); }
    pub fn play_door_close(&self) { self.play_data(self.door_close.clone()); }
    pub fn play_item_pickup(&self) { self.play_data(self.item_pickup.clone()); }

    fn play_data(&self, data: Option<Arc<Vec<u8>>>) {
        if let Some(d) = data {
            if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
                self.sfx_sink.append(dec);
            }
        }
    }

    pub fn play_music_loop_auto(&mut self, volume: f32) {
        if self.bg_sink.is_some() { return; }
        let candidates = [
            "assets/music_bg.wav",
            "assets/sounds/music.wav",
            "assets/sounds/loop.ogg",
        ];
        if let Some(bytes) = load_bytes_any(&candidates) {
            if let Ok(dec) = Decoder::new_looped(Cursor::new(bytes)) {
                if let Ok(sink) = Sink::try_new(&self.handle) {
                    sink.append(dec);
                    sink.set_volume(volume.clamp(0.0, 1.0));
                    self.bg_sink = Some(sink);
                }
            }
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(s) = self.bg_sink.take() { s.stop(); }
    }
}
