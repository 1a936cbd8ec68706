use antsim_app::{
    renderer::{Renderer, RendererContext},
    terminal::TerminalRenderer,
};
use antsim_core::{ColonyConfig, WorldState};
use anyhow::Result;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let world = bootstrap_world()?;
    let renderer = TerminalRenderer::default();
    info!(renderer = renderer.name(), "Starting ant colony shell");
    renderer.run(RendererContext { world })?;
    info!("Session ended");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bootstrap_world() -> Result<WorldState> {
    let config = ColonyConfig::default();
    let mut world = WorldState::new(config)?;
    world.spawn_initial_population();

    info!(
        map_width = world.config().map_width,
        map_height = world.config().map_height,
        colony_size = world.colony_size(),
        food_sources = world.food().len(),
        seed = ?world.config().rng_seed,
        "Colony world ready",
    );

    Ok(world)
}
