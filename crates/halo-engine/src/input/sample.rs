use crate::coords::Vec2;

/// The latest known pointer position.
///
/// Owned and written only by [`PointerHub`](super::PointerHub); consumers
/// receive copies. `seq` is the capture-order counter of the move event that
/// produced the sample, with `0` reserved for the origin sample that exists
/// before any event arrived.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub seq: u64,
}

impl PointerSample {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// `false` until the first pointer move has been captured.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.seq != 0
    }
}
