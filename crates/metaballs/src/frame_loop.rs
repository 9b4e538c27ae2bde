//! Host-side frame loop: feeds ticks to an engine and hands each mesh to a
//! renderer.

use liquid_metal_core::error::EngineError;
use liquid_metal_core::{Engine, PointerInput, Renderer};
use tracing::debug;

/// One host frame: elapsed seconds plus the pointer state, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub delta: f32,
    pub pointer: Option<PointerInput>,
}

impl Tick {
    pub fn new(delta: f32) -> Self {
        Self {
            delta,
            pointer: None,
        }
    }

    pub fn with_pointer(mut self, pointer: PointerInput) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// `count` ticks of a fixed `delta` without pointer input.
pub fn fixed_ticks(delta: f32, count: usize) -> impl Iterator<Item = Tick> {
    std::iter::repeat(Tick::new(delta)).take(count)
}

/// Totals over a run of frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub last_triangle_count: usize,
    pub max_triangle_count: usize,
    pub truncated_frames: u64,
}

/// Drives an [`Engine`] and a [`Renderer`] in lockstep.
pub struct FrameLoop<'a, E: ?Sized, R: ?Sized> {
    engine: &'a mut E,
    renderer: &'a mut R,
    stats: FrameStats,
}

impl<'a, E, R> FrameLoop<'a, E, R>
where
    E: Engine + ?Sized,
    R: Renderer + ?Sized,
{
    pub fn new(engine: &'a mut E, renderer: &'a mut R) -> Self {
        Self {
            engine,
            renderer,
            stats: FrameStats::default(),
        }
    }

    /// Applies the tick's pointer, steps, presents and acknowledges one frame.
    pub fn run_frame(&mut self, tick: Tick) -> Result<(), EngineError> {
        if let Some(pointer) = tick.pointer {
            self.engine.pointer_moved(pointer);
        }
        self.engine.step(tick.delta)?;

        let mesh = self.engine.mesh();
        self.renderer.present(mesh, self.engine.material())?;

        self.stats.frames += 1;
        self.stats.last_triangle_count = mesh.triangle_count();
        self.stats.max_triangle_count = self.stats.max_triangle_count.max(mesh.triangle_count());
        if mesh.is_truncated() {
            self.stats.truncated_frames += 1;
        }
        self.engine.frame_presented();
        Ok(())
    }

    /// Runs every tick in order, stopping at the first error.
    pub fn run<I>(&mut self, ticks: I) -> Result<FrameStats, EngineError>
    where
        I: IntoIterator<Item = Tick>,
    {
        for tick in ticks {
            self.run_frame(tick)?;
        }
        debug!(
            frames = self.stats.frames,
            truncated = self.stats.truncated_frames,
            "frame loop finished"
        );
        Ok(self.stats.clone())
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}
