use crate::{archetype::Archetype, signature::Signature};

///
/// Simulation system which processes whole archetypes at once.
/// `C` is per-tick context owned by the caller (delta time and such).
///
pub trait System<C> {
    /// Components the system needs, matching archetypes contain all of them
    fn signature(&self) -> Signature;

    fn run(&mut self, archetype: &mut Archetype, context: &C);
}
