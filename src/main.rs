//! Ink Card entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_card {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use glam::Vec2;
    use ink_card::renderer::{RenderState, ShapeBatch};
    use ink_card::sim::Rect;
    use ink_card::{InkCard, Settings};

    /// Canvas attribute holding JSON setting overrides
    const SETTINGS_ATTR: &str = "data-ink-settings";
    /// Elements whose boxes the ink can reveal
    const GLYPH_SELECTOR: &str = ".char-wrapper";

    /// Card instance holding all host state
    struct Host {
        card: InkCard,
        batch: ShapeBatch,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        /// Glyph elements, indexed like the reveal regions
        glyphs: Vec<Element>,
    }

    impl Host {
        /// Run due ticks, draw them and present
        fn frame(&mut self, time: f64) {
            self.card.frame(time, &mut self.batch);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.batch.vertices()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.batch.clear();

            for index in self.card.take_newly_revealed() {
                if let Some(glyph) = self.glyphs.get(index) {
                    let _ = glyph.class_list().add_1("revealed");
                }
            }
        }

        /// Canvas pixels per CSS pixel
        fn canvas_scale(&self) -> (f32, f32) {
            let rect = self.canvas.get_bounding_client_rect();
            let sx = if rect.width() > 0.0 {
                self.canvas.width() as f64 / rect.width()
            } else {
                1.0
            };
            let sy = if rect.height() > 0.0 {
                self.canvas.height() as f64 / rect.height()
            } else {
                1.0
            };
            (sx as f32, sy as f32)
        }

        /// Re-read glyph boxes in canvas pixels
        fn refresh_glyphs(&mut self, document: &Document) {
            let Ok(nodes) = document.query_selector_all(GLYPH_SELECTOR) else {
                return;
            };
            let canvas_rect = self.canvas.get_bounding_client_rect();
            let (sx, sy) = self.canvas_scale();

            self.glyphs = (0..nodes.length())
                .filter_map(|i| nodes.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect();
            let boxes: Vec<Rect> = self
                .glyphs
                .iter()
                .map(|glyph| {
                    let r = glyph.get_bounding_client_rect();
                    let min = Vec2::new(
                        ((r.left() - canvas_rect.left()) as f32) * sx,
                        ((r.top() - canvas_rect.top()) as f32) * sy,
                    );
                    let max = min + Vec2::new(r.width() as f32 * sx, r.height() as f32 * sy);
                    Rect::new(min, max)
                })
                .collect();
            log::debug!("Tracking {} glyph(s)", boxes.len());
            self.card.set_glyph_regions(boxes);
        }

        /// Match the canvas to its preset or displayed size
        fn fit_canvas(&mut self, window: &web_sys::Window) -> (u32, u32) {
            let (width, height) = match self.card.settings().preset.canvas_size() {
                Some(size) => size,
                None => {
                    let dpr = window.device_pixel_ratio();
                    (
                        (self.canvas.client_width() as f64 * dpr) as u32,
                        (self.canvas.client_height() as f64 * dpr) as u32,
                    )
                }
            };
            let (width, height) = (width.max(1), height.max(1));
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            (width, height)
        }
    }

    fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&format!("{}: {}", context, e))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| js_err("logger", e))?;

        log::info!("Ink card starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load_or_default(canvas.get_attribute(SETTINGS_ATTR).as_deref());
        let seed = js_sys::Date::now() as u64;
        let paper = settings.style.paper_color;

        let mut host = Host {
            card: InkCard::new(settings, seed, 1.0, 1.0),
            batch: ShapeBatch::new(1.0, 1.0),
            render_state: None,
            canvas: canvas.clone(),
            glyphs: Vec::new(),
        };
        let (width, height) = host.fit_canvas(&window);
        host.card.resize(width as f32, height as f32);
        host.batch.set_size(width as f32, height as f32);
        host.refresh_glyphs(&document);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| js_err("surface", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_err("adapter", e))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, paper)
            .await
            .map_err(|e| js_err("device", e))?;
        host.render_state = Some(render_state);

        let host = Rc::new(RefCell::new(host));
        setup_input_handlers(&window, &canvas, host.clone())?;

        request_animation_frame(host)?;

        log::info!("Ink card running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        host: Rc<RefCell<Host>>,
    ) -> Result<(), JsValue> {
        // Pointer down - seed ink at the canvas position
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut h = host.borrow_mut();
                let (sx, sy) = h.canvas_scale();
                let x = event.offset_x() as f32 * sx;
                let y = event.offset_y() as f32 * sy;
                h.card.pointer_down(x, y);
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if host.borrow_mut().card.key(&event.key()) {
                    log::info!("Card cleared");
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window resize
        {
            let window_clone = window.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut h = host.borrow_mut();
                let (width, height) = h.fit_canvas(&window_clone);
                if let Some(ref mut render_state) = h.render_state {
                    render_state.resize(width, height);
                }
                h.card.resize(width as f32, height as f32);
                h.batch.set_size(width as f32, height as f32);
                if let Some(document) = window_clone.document() {
                    h.refresh_glyphs(&document);
                }
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::once(move |time: f64| {
            frame_loop(host, time);
        });
        window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn frame_loop(host: Rc<RefCell<Host>>, time: f64) {
        host.borrow_mut().frame(time);

        if let Err(e) = request_animation_frame(host) {
            log::error!("Frame loop stopped: {:?}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_card::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ink_card::surface::RecordingSurface;
    use ink_card::{InkCard, Preset, Settings};

    env_logger::init();
    log::info!("Ink card (native) starting...");
    log::info!("Native mode runs a headless demo - serve index.html for the web version");

    let preset = std::env::args()
        .nth(1)
        .and_then(|name| Preset::from_str(&name))
        .unwrap_or_default();
    let settings = Settings::from_preset(preset);
    let (width, height) = preset.canvas_size().unwrap_or((800, 600));

    let mut card = InkCard::new(settings, 42, width as f32, height as f32);
    let mut surface = RecordingSurface::new();
    card.pointer_down(width as f32 / 2.0, height as f32 / 2.0);

    let frame_ms = 1000.0 / 60.0;
    let mut frames = 0u32;
    while frames == 0 || !card.sim().is_empty() {
        card.frame(frames as f64 * frame_ms, &mut surface);
        frames += 1;
        if frames % 60 == 0 {
            log::info!(
                "t={}s: {} live, {} created",
                frames / 60,
                card.sim().len(),
                card.sim().created_total()
            );
        }
    }

    println!(
        "{} preset: {} branches over {} frames, {} strokes, {} circles",
        preset.as_str(),
        card.sim().created_total(),
        frames,
        surface.strokes(),
        surface.circles()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
