use anyhow::{Context as _, Result};

use halo_engine::core::{App, AppControl, Host};
use halo_engine::input::Initialization;
use halo_engine::logging::{LoggingConfig, init_logging};
use halo_engine::window::{Runtime, RuntimeConfig};
use halo_ui::prelude::*;

/// Frames between scripted page mutations.
const MUTATION_PERIOD: u64 = 180;

fn main() -> Result<()> {
    init_logging(LoggingConfig::verbose());

    let environment = Environment::from_env();
    log::info!("environment: {environment:?}");

    let config = RuntimeConfig {
        title: "Halo Studio".to_string(),
        environment,
        ..RuntimeConfig::default()
    };
    Runtime::run(config, Studio::new())
}

// ── surfaces ──────────────────────────────────────────────────────────────

/// Logs cursor frames whenever their visible state changes.
#[derive(Default)]
struct CursorLog {
    last: Option<(CursorVariant, bool, bool)>,
}

impl CursorSurface for CursorLog {
    fn write(&mut self, frame: &CursorFrame) {
        let state = (frame.variant.clone(), frame.pressed, frame.visible);
        if self.last.as_ref() != Some(&state) {
            log::info!(
                "cursor {:?} pressed={} visible={} at ({:.1}, {:.1})",
                frame.variant,
                frame.pressed,
                frame.visible,
                frame.position.x,
                frame.position.y
            );
            self.last = Some(state);
        }
    }
}

struct LayerLog;

impl LayerSurface for LayerLog {
    fn write_offset(&mut self, offset: Vec2) {
        log::trace!("parallax offset ({:.2}, {:.2})", offset.x, offset.y);
    }
}

// ── page ──────────────────────────────────────────────────────────────────

struct Card {
    node: NodeId,
    rect: Rect,
}

struct Services {
    hub: PointerHub,
    _renderer: CursorRenderer,
    parallax: ParallaxLayer,
}

/// A grid of project cards; some carry a cursor label, one is toggled
/// reactive and one is removed and re-inserted on a timer.
struct Studio {
    doc: Document,
    cursor: Rc<CursorState>,
    registry: MagneticRegistry,
    grid: NodeId,
    cards: Vec<Card>,
    hovered: Option<NodeId>,
    services: Option<Services>,
}

impl Studio {
    fn new() -> Self {
        let mut doc = Document::new();
        let grid = doc.create_element("section");
        let cursor = Rc::new(CursorState::new());
        let registry = MagneticRegistry::new(cursor.clone());

        Self {
            doc,
            cursor,
            registry,
            grid,
            cards: Vec::new(),
            hovered: None,
            services: None,
        }
    }

    fn build_page(&mut self) -> Result<()> {
        let root = self.doc.root();
        self.doc
            .append_child(root, self.grid)
            .context("failed to mount card grid")?;

        for i in 0..6 {
            let node = self.doc.create_element("article");
            if i % 3 != 2 {
                self.doc.set_attribute(node, "data-reactive", "")?;
            }
            if i % 2 == 0 {
                self.doc.set_attribute(node, "data-reactive-label", "VIEW")?;
            }
            self.doc
                .append_child(self.grid, node)
                .with_context(|| format!("failed to append card {i}"))?;
            self.cards.push(Card {
                node,
                rect: Rect::default(),
            });
        }
        Ok(())
    }

    fn layout(&mut self, viewport: Vec2) {
        const COLS: usize = 3;
        const GAP: f32 = 24.0;

        let rows = self.cards.len().div_ceil(COLS).max(1);
        let w = (viewport.x - GAP * (COLS as f32 + 1.0)) / COLS as f32;
        let h = (viewport.y - GAP * (rows as f32 + 1.0)) / rows as f32;

        for (i, card) in self.cards.iter_mut().enumerate() {
            let (col, row) = ((i % COLS) as f32, (i / COLS) as f32);
            card.rect = Rect::new(GAP + col * (w + GAP), GAP + row * (h + GAP), w.max(0.0), h.max(0.0));
        }

        if let Some(services) = &self.services {
            services.parallax.set_container(Rect::new(0.0, 0.0, viewport.x, viewport.y));
        }
    }

    /// Dispatches enter/leave when the card under the pointer changes.
    fn hit_test(&mut self, pointer: Option<Vec2>) {
        let under = pointer.and_then(|p| {
            self.cards
                .iter()
                .find(|c| c.rect.contains(p) && self.doc.is_connected(c.node))
                .map(|c| c.node)
        });

        if under == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.doc.dispatch_hover(old, HoverPhase::Leave);
        }
        if let Some(new) = under {
            self.doc.dispatch_hover(new, HoverPhase::Enter);
            self.hovered = Some(new);
        }
    }

    fn mutate(&mut self, step: u64) -> Result<()> {
        let (Some(last), Some(toggled)) = (self.cards.last(), self.cards.get(2)) else {
            return Ok(());
        };
        let (last, toggled) = (last.node, toggled.node);

        match step % 4 {
            0 => self.doc.remove(last)?,
            1 => self.doc.append_child(self.grid, last)?,
            2 => self.doc.set_attribute(toggled, "data-reactive", "")?,
            _ => {
                self.doc.remove_attribute(toggled, "data-reactive")?;
            }
        }
        Ok(())
    }
}

impl App for Studio {
    fn on_start(&mut self, host: &Host) -> Result<()> {
        self.build_page()?;

        let hub = PointerHub::new(host.pointer_target(), host.environment());
        match hub.initialize() {
            Initialization::SkippedTouchOnly => log::info!("touch-only host; pointer effects disabled"),
            other => log::debug!("pointer hub: {other:?}"),
        }

        let attached = self.registry.start_observing(&mut self.doc);
        log::info!("{attached} reactive card(s) attached");

        let providers = Providers::empty()
            .with_pointer(hub.clone())
            .with_cursor(self.cursor.clone())
            .with_scheduler(host.scheduler().clone());

        let renderer = CursorRenderer::mount(&providers, CursorConfig::default(), CursorLog::default())
            .context("failed to mount cursor renderer")?;
        let parallax = ParallaxLayer::mount(&providers, Rect::default(), ParallaxConfig::default(), LayerLog)
            .context("failed to mount parallax layer")?;

        self.services = Some(Services {
            hub,
            _renderer: renderer,
            parallax,
        });
        self.layout(host.viewport());
        Ok(())
    }

    fn on_frame(&mut self, _host: &Host, time: FrameTime) -> AppControl {
        if time.frame_index > 0 && time.frame_index % MUTATION_PERIOD == 0 {
            if let Err(e) = self.mutate(time.frame_index / MUTATION_PERIOD) {
                log::warn!("scripted mutation failed: {e:#}");
            }
        }

        let stats = self.registry.flush(&mut self.doc);
        if stats.attached + stats.detached > 0 {
            log::info!(
                "registry: +{} -{} ({} tracked)",
                stats.attached,
                stats.detached,
                self.registry.tracked_count()
            );
        }

        let pointer = self.services.as_ref().and_then(|s| {
            let sample = s.hub.latest_sample();
            (sample.is_initialized() && s.hub.pointer_inside()).then(|| sample.position())
        });
        self.hit_test(pointer);

        AppControl::Continue
    }

    fn on_resize(&mut self, _host: &Host, viewport: Vec2) {
        self.layout(viewport);
    }

    fn on_exit(&mut self) {
        self.registry.stop(&mut self.doc);
        if let Some(services) = self.services.take() {
            services.hub.teardown();
        }
        log::info!("studio closed");
    }
}
