/// Primary pointing device reported by the host.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PointerCapability {
    /// A precise pointer that can hover (mouse, trackpad, stylus).
    #[default]
    Fine,
    /// An imprecise pointer without hover (finger).
    Coarse,
    /// No pointing device.
    None,
}

/// Environment signals read once when the hub and consumers initialize.
///
/// These are consumed, never produced: the host decides them and nothing in
/// the crate changes them afterwards.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Environment {
    pub pointer: PointerCapability,
    /// Simultaneous touch points the host supports.
    pub max_touch_points: u32,
    /// Host exposes touch events.
    pub touch_events: bool,
    /// User asked for reduced motion.
    pub prefers_reduced_motion: bool,
}

impl Environment {
    /// A mouse-driven desktop host.
    pub fn desktop() -> Self {
        Self::default()
    }

    /// A touch-only host (phone, tablet).
    pub fn touch() -> Self {
        Self {
            pointer: PointerCapability::Coarse,
            max_touch_points: 5,
            touch_events: true,
            prefers_reduced_motion: false,
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.prefers_reduced_motion = reduced;
        self
    }

    /// `true` when no hovering pointer should be assumed.
    ///
    /// Any touch capability counts, matching how hosts that expose touch
    /// events are treated as touch devices.
    pub fn is_touch_only(&self) -> bool {
        self.pointer != PointerCapability::Fine || self.touch_events || self.max_touch_points > 0
    }

    /// Reads `HALO_POINTER` (`fine|coarse|none`), `HALO_TOUCH_POINTS` and
    /// `HALO_REDUCED_MOTION` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut env = Self::desktop();

        if let Some(raw) = lookup("HALO_POINTER") {
            env.pointer = match raw.trim().to_ascii_lowercase().as_str() {
                "fine" => PointerCapability::Fine,
                "coarse" => PointerCapability::Coarse,
                "none" => PointerCapability::None,
                other => {
                    log::warn!("ignoring unknown HALO_POINTER value {other:?}");
                    PointerCapability::Fine
                }
            };
        }

        if let Some(raw) = lookup("HALO_TOUCH_POINTS") {
            match raw.trim().parse::<u32>() {
                Ok(n) => {
                    env.max_touch_points = n;
                    env.touch_events = n > 0;
                }
                Err(_) => log::warn!("ignoring non-numeric HALO_TOUCH_POINTS value {raw:?}"),
            }
        }

        if let Some(raw) = lookup("HALO_REDUCED_MOTION") {
            env.prefers_reduced_motion =
                matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "reduce");
        }

        env
    }
}
