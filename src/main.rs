//! Stylish 404 entry point
//!
//! On the web this wires DOM events into a `Stage` and runs the frame loop.
//! Natively it plays a short scripted session on a software surface.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

    use stylish_404::platform::web::{
        CanvasSurface, DomLayers, GsapChoreography, Hud, Overlay, PageSurface, element_center,
        viewport,
    };
    use stylish_404::renderer::GpuSurface;
    use stylish_404::settings::RendererKind;
    use stylish_404::stage::{Card, Stage, StageEvent};
    use stylish_404::{Error, Result, Rgb, Settings};

    /// Element id, name, color and quote of each showcase card
    const CARDS: [(&str, &str, Rgb, &str); 4] = [
        (
            "dante",
            "Dante",
            Rgb::CRIMSON,
            "\"This party's getting crazy! Let's rock!\"",
        ),
        ("vergil", "Vergil", Rgb::SKY, "\"Power. Give me more power!\""),
        (
            "nero",
            "Nero",
            Rgb::BLUE,
            "\"Jackpot! ...wait, that's not my line.\"",
        ),
        (
            "vCharacter",
            "V",
            Rgb::VIOLET,
            "\"As the air to a bird or the sea to a fish...\"",
        ),
    ];

    /// Page instance holding all state
    struct Page {
        stage: Stage<PageSurface>,
        layers: DomLayers,
        hud: Hud,
        shown_card: usize,
    }

    impl Page {
        /// Re-read card and rank anchors from the layout
        fn measure_anchors(&mut self, document: &Document) {
            for (i, (id, ..)) in CARDS.iter().enumerate() {
                if let Some(center) = element_center(document, id) {
                    self.stage.set_card_anchor(i, center);
                }
            }
            if let Some(center) = element_center(document, "rankContainer") {
                self.stage.set_rank_anchor(center);
            }
        }

        /// Run one frame; `Ok(true)` when the page should navigate away
        fn frame(&mut self, time: f64) -> Result<bool> {
            let report = self.stage.frame(time, &mut self.layers)?;

            if !report.rank_changes.is_empty() {
                self.hud.set_rank(self.stage.rank().tier());
            }
            self.hud.set_score(report.score);

            let active = self.stage.active_card();
            if active != self.shown_card {
                self.shown_card = active;
                self.hud.set_quote(CARDS[active].3);
            }
            Ok(report.navigate)
        }
    }

    fn document(window: &Window) -> Result<Document> {
        window
            .document()
            .ok_or_else(|| Error::Platform("no document".into()))
    }

    async fn create_gpu(canvas: HtmlCanvasElement, width: u32, height: u32) -> Result<GpuSurface> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        // Ask for an adapter before touching the canvas so a failure
        // leaves it free for a 2D context
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| Error::Gpu(e.to_string()))?;

        GpuSurface::new(surface, &adapter, width, height).await
    }

    async fn create_surface(
        settings: &Settings,
        canvas: HtmlCanvasElement,
        overlay: Overlay,
        width: u32,
        height: u32,
    ) -> Result<PageSurface> {
        if settings.renderer == RendererKind::WebGpu {
            match create_gpu(canvas.clone(), width, height).await {
                Ok(gpu) => return Ok(PageSurface::gpu(gpu, overlay)),
                Err(e) => log::warn!("WebGPU unavailable ({}), falling back to canvas 2D", e),
            }
        }
        Ok(PageSurface::canvas(CanvasSurface::new(canvas)?, overlay))
    }

    pub async fn run() -> Result<()> {
        log::info!("Stylish 404 starting...");

        let settings = Settings::load();
        let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;
        let document = document(&window)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("particles")
            .ok_or(Error::SurfaceMissing {
                subsystem: "#particles canvas",
            })?
            .dyn_into()
            .map_err(|_| Error::Platform("#particles is not a canvas".into()))?;

        let (width, height) = viewport(&window);
        canvas.set_width(width);
        canvas.set_height(height);

        let overlay = Overlay::new(&document)?;
        let surface = create_surface(&settings, canvas, overlay, width, height).await?;
        log::info!("Renderer: {} ({}x{})", surface.kind(), width, height);

        let seed = js_sys::Date::now() as u64;
        let mut stage = Stage::new(&settings, seed);
        stage.attach(surface);
        stage.set_cards(
            CARDS
                .iter()
                .map(|(_, name, color, _)| Card::new(name, *color))
                .collect(),
        );

        let selectors = CARDS.iter().map(|(id, ..)| format!("#{}", id)).collect();
        match GsapChoreography::detect(&window, selectors) {
            Some(gsap) => {
                log::info!("gsap found, choreography enabled");
                stage.set_choreography(Box::new(gsap));
            }
            None => log::warn!("gsap not loaded, choreography disabled"),
        }

        let mut page = Page {
            stage,
            layers: DomLayers::new(document.clone()),
            hud: Hud::new(&document),
            shown_card: 0,
        };
        page.measure_anchors(&document);
        page.hud.set_rank(page.stage.rank().tier());
        page.hud.set_quote(CARDS[0].3);

        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        page.stage.start(now)?;

        let page = Rc::new(RefCell::new(page));
        setup_input_handlers(&window, &document, page.clone());
        setup_cards(&document, page.clone());
        setup_return_button(&document, page.clone());

        request_animation_frame(page);

        log::info!("Stylish 404 running (seed {})", seed);
        Ok(())
    }

    fn setup_input_handlers(window: &Window, document: &Document, page: Rc<RefCell<Page>>) {
        // Mouse move anywhere on the page
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                page.borrow_mut().stage.push(StageEvent::PointerMoved { pos });
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    page.borrow_mut().stage.push(StageEvent::TouchMoved { pos });
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let (width, height) = viewport(&window);
                let mut p = page.borrow_mut();
                p.stage.push(StageEvent::Resized { width, height });
                if let Some(document) = window.document() {
                    p.measure_anchors(&document);
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_cards(document: &Document, page: Rc<RefCell<Page>>) {
        for (card, (id, ..)) in CARDS.iter().enumerate() {
            let Some(el) = document.get_element_by_id(id) else {
                log::warn!("No #{} card", id);
                continue;
            };

            {
                let page = page.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    page.borrow_mut().stage.push(StageEvent::CardHovered { card });
                });
                let _ = el
                    .add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            {
                let page = page.clone();
                let target = el.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    let rect = target.get_bounding_client_rect();
                    let center = Vec2::new(
                        (rect.left() + rect.width() / 2.0) as f32,
                        (rect.top() + rect.height() / 2.0) as f32,
                    );
                    let mut p = page.borrow_mut();
                    p.stage.set_card_anchor(card, center);
                    p.stage.push(StageEvent::CardClicked { card });
                });
                let _ = el
                    .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_return_button(document: &Document, page: Rc<RefCell<Page>>) {
        let Some(btn) = document.get_element_by_id("returnBtn") else {
            log::warn!("No #returnBtn");
            return;
        };

        {
            let page = page.clone();
            let target = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let rect = target.get_bounding_client_rect();
                let anchor = Vec2::new(
                    (rect.left() + rect.width() / 2.0) as f32,
                    (rect.top() + rect.height() / 2.0) as f32,
                );
                page.borrow_mut()
                    .stage
                    .push(StageEvent::ReturnHovered { anchor });
            });
            let _ = btn
                .add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                page.borrow_mut().stage.push(StageEvent::ReturnClicked);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(page: Rc<RefCell<Page>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(page, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(page: Rc<RefCell<Page>>, time: f64) {
        let result = page.borrow_mut().frame(time);
        match result {
            Ok(false) => request_animation_frame(page),
            Ok(true) => {
                log::info!("Leaving for home");
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href("/");
                }
            }
            Err(e) => log::error!("Frame loop stopped: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(e) = wasm_page::run().await {
        log::error!("Stylish 404 failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stylish 404 (native) starting...");
    log::info!("The page itself needs a browser - run with `trunk serve` for the web version");

    if let Err(e) = headless::run() {
        log::error!("Headless session failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session on a software surface
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use stylish_404::consts::EXPECTED_FPS;
    use stylish_404::renderer::PixelSurface;
    use stylish_404::stage::{Card, Stage, StageEvent};
    use stylish_404::{LayerSink, Result, Rgb, Settings};

    const WIDTH: u32 = 320;
    const HEIGHT: u32 = 180;
    const FRAMES: u32 = 900;

    /// Remembers the last offset written to each layer
    #[derive(Default)]
    struct Layers(Vec<(String, Vec2)>);

    impl LayerSink for Layers {
        fn translate(&mut self, layer: &str, offset: Vec2) -> Result<()> {
            match self.0.iter_mut().find(|(id, _)| id == layer) {
                Some(entry) => entry.1 = offset,
                None => self.0.push((layer.to_string(), offset)),
            }
            Ok(())
        }
    }

    pub fn run() -> Result<()> {
        let settings = Settings::load();
        let mut stage = Stage::new(&settings, 404);
        stage.attach(PixelSurface::new(WIDTH, HEIGHT));
        stage.set_cards(vec![
            Card::new("Dante", Rgb::CRIMSON),
            Card::new("Vergil", Rgb::SKY),
            Card::new("Nero", Rgb::BLUE),
            Card::new("V", Rgb::VIOLET),
        ]);
        for i in 0..4 {
            stage.set_card_anchor(i, Vec2::new(40.0 + 80.0 * i as f32, 120.0));
        }
        stage.set_rank_anchor(Vec2::new(40.0, 20.0));
        stage.start(0.0)?;

        let mut layers = Layers::default();
        let frame_ms = 1000.0 / EXPECTED_FPS as f64;
        let mut changes = 0;

        for frame in 0..FRAMES {
            let now = frame as f64 * frame_ms;

            // Sweep the pointer for the first five seconds, then go idle
            if frame < 300 {
                let t = frame as f32 / 300.0;
                let pos = Vec2::new(t * WIDTH as f32, HEIGHT as f32 * (0.5 + 0.4 * (t * 6.0).sin()));
                stage.push(StageEvent::PointerMoved { pos });
            }
            match frame {
                60 => stage.push(StageEvent::CardHovered { card: 1 }),
                90 => stage.push(StageEvent::CardClicked { card: 1 }),
                120 => stage.push(StageEvent::ReturnHovered {
                    anchor: Vec2::new(WIDTH as f32 / 2.0, 160.0),
                }),
                f if f == FRAMES - 1 => stage.push(StageEvent::ReturnClicked),
                _ => {}
            }

            let report = stage.frame(now, &mut layers)?;
            for change in &report.rank_changes {
                changes += 1;
                println!("  rank {} at {:.1}", change.name, change.score);
            }
            if report.navigate {
                println!("  navigate home after frame {}", frame);
            }
        }

        let surface = stage.engine().surface();
        println!("\nSession summary:");
        println!("  score        {:.1}", stage.rank().score());
        println!("  tier         {}", stage.rank().tier().name);
        println!("  rank changes {}", changes);
        println!("  particles    {} live, {} evicted", stage.engine().len(), stage.engine().evicted());
        println!("  camera       {:?} at {:?}", stage.camera().mode(), stage.camera().offset());
        for (id, offset) in &layers.0 {
            println!("  layer {:16} ({:.2}, {:.2})", id, offset.x, offset.y);
        }
        if let Some(surface) = surface {
            println!(
                "  frames       {} ({} pixels lit)",
                surface.frames(),
                surface.covered_pixels()
            );
        }
        Ok(())
    }
}
