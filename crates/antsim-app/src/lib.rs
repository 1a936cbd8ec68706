//! Shared application plumbing for the colony simulation frontends.

pub mod terminal;

pub mod renderer {
    use antsim_core::WorldState;
    use anyhow::Result;

    /// State handed to a renderer implementation for the whole session.
    ///
    /// The simulation is single-threaded, so the renderer takes ownership of
    /// the world and is its only mutator for the lifetime of the run.
    pub struct RendererContext {
        pub world: WorldState,
    }

    pub trait Renderer {
        /// Stable identifier describing the renderer implementation (e.g., "terminal").
        fn name(&self) -> &'static str;

        /// Launch the renderer; blocks until the rendering session completes.
        fn run(&self, ctx: RendererContext) -> Result<()>;
    }
}

pub use terminal::TerminalRenderer;
