use rand::SeedableRng;
use rand::rngs::StdRng;
use raylib::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use raycaster_combat::audio_manager::AudioManager;
use raycaster_combat::config::GameConfig;
use raycaster_combat::core::door::DoorEvent;
use raycaster_combat::core::entity::Damageable;
use raycaster_combat::core::maze::{DEFAULT_LEVEL, Maze};
use raycaster_combat::core::process_events::process_events;
use raycaster_combat::core::world::World;
use raycaster_combat::error::GameError;
use raycaster_combat::render::casters::cast_walls;
use raycaster_combat::render::framebuffer::Framebuffer;
use raycaster_combat::render::projector::SpriteProjector;
use raycaster_combat::render::render3d::{draw_weapon, render_3d, weapon_bob};
use raycaster_combat::render::textures::TextureManager;

/// How long the firing frame stays up after a shot.
const MUZZLE_FLASH_SECONDS: f32 = 0.12;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_maze(cfg: &GameConfig) -> Result<Maze, GameError> {
    match &cfg.map_path {
        Some(path) => {
            info!(path = %path, "loading map");
            Maze::load(path)
        }
        None => Maze::parse(DEFAULT_LEVEL),
    }
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GameError> {
    let cfg = GameConfig::from_env()?;
    let maze = load_maze(&cfg)?;
    let mut world = World::new(maze, &cfg);

    let (mut window, raylib_thread) = raylib::init()
        .size(cfg.screen_width as i32, cfg.screen_height as i32)
        .title("Raycaster Combat")
        .build();
    window.set_target_fps(cfg.target_fps);

    let texman = TextureManager::new(&cfg.enemy_animation);
    let mut framebuffer = Framebuffer::new(cfg.screen_width, cfg.screen_height);
    let image = Image::gen_image_color(cfg.screen_width as i32, cfg.screen_height as i32, Color::BLACK);
    let mut screen_tex = window
        .load_texture_from_image(&raylib_thread, &image)
        .map_err(|e| GameError::Graphics(format!("{e:?}")))?;

    let proj_dist = cfg.distance_to_projection();
    let mut projector = SpriteProjector::new(&cfg);
    let mut rng = StdRng::from_entropy();
    let mut depths = Vec::with_capacity(cfg.screen_width as usize);
    let mut hits = Vec::with_capacity(cfg.screen_width as usize);
    let mut flash_left = 0.0f32;

    let mut audio = AudioManager::new();
    if let Some(a) = audio.as_mut() {
        a.load_sfx_auto();
        a.play_music_loop_auto(cfg.music_volume);
    }

    info!(width = cfg.screen_width, height = cfg.screen_height, fov = cfg.fov, "starting");

    while !window.window_should_close() {
        let dt = window.get_frame_time();

        // shots resolve against what was on screen last frame
        let alive_before = world.enemies_alive();
        let (input, outcome) = process_events(&window, &mut world, projector.projection().center_owner());
        if outcome.fired {
            flash_left = MUZZLE_FLASH_SECONDS;
        } else {
            flash_left = (flash_left - dt).max(0.0);
        }

        let health_before = world.player.health();
        let events = {
            let projection = projector.projection();
            world.tick(dt, |id| projection.is_visible(id), &mut rng)
        };

        if let Some(a) = audio.as_ref() {
            if outcome.fired { a.play_player_shot(); }
            match outcome.door {
                Some(DoorEvent::Opened) => a.play_door_open(),
                Some(DoorEvent::Closed) => a.play_door_close(),
                None => {}
            }
            if events.doors_closed > 0 { a.play_door_close(); }
            if events.items_taken > 0 { a.play_item_pickup(); }
            if world.enemies_alive() < alive_before { a.play_enemy_death(); }
            if world.player.health() < health_before {
                a.play_enemy_shot();
                if world.player.is_dead() { a.play_player_death(); }
            }
        }

        cast_walls(&world.maze, world.player.pos, cfg.screen_width, cfg.fov, &mut depths, &mut hits);
        let billboards = world.billboards();
        projector.project(world.player.pos, &billboards, &depths);

        render_3d(&mut framebuffer, &texman, &hits, &depths, projector.projection(), proj_dist);
        if !world.player.is_dead() {
            let bob = weapon_bob(world.clock(), input.forward || input.backward);
            draw_weapon(&mut framebuffer, &texman, flash_left > 0.0, bob);
        }
        framebuffer.upload_to_texture(&mut screen_tex);

        let fps_now = window.get_fps();
        let health = world.player.health();
        let alive = world.enemies_alive();
        let banner = if world.player.is_dead() {
            Some(("YOU DIED", Color::RED))
        } else if alive == 0 {
            Some(("ALL CLEAR", Color::GREEN))
        } else {
            None
        };

        let mut d = window.begin_drawing(&raylib_thread);
        d.clear_background(Color::BLACK);
        d.draw_texture(&screen_tex, 0, 0, Color::WHITE);
        d.draw_text(&format!("FPS: {}", fps_now), 10, 10, 20, Color::WHITE);
        d.draw_text(&format!("HEALTH: {}", health), 10, cfg.screen_height as i32 - 30, 20, Color::WHITE);
        d.draw_text(&format!("ENEMIES: {}", alive), cfg.screen_width as i32 - 140, cfg.screen_height as i32 - 30, 20, Color::WHITE);
        if let Some((text, color)) = banner {
            let size = 40;
            // default font is roughly half as wide as it is tall
            let tw = text.len() as i32 * size / 2;
            d.draw_text(text, (cfg.screen_width as i32 - tw) / 2, cfg.screen_height as i32 / 2 - 60, size, color);
        }
    }

    if let Some(a) = audio.as_mut() {
        a.stop_music();
    }
    info!("bye");
    Ok(())
}
