//! DOM and canvas bindings

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::Vec2;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use crate::camera::LayerSink;
use crate::color::TierColor;
use crate::error::{Error, Result};
use crate::fx::Glitch;
use crate::rank::RankTier;
use crate::renderer::{Glow, GpuSurface, Surface};
use crate::stage::Choreography;
use crate::RankChange;

fn js_err(e: JsValue) -> Error {
    Error::Platform(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Viewport size in CSS pixels
pub fn viewport(window: &Window) -> (u32, u32) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w.max(1.0) as u32, h.max(1.0) as u32)
}

/// Center of an element in viewport pixels
pub fn element_center(document: &Document, id: &str) -> Option<Vec2> {
    let rect = document.get_element_by_id(id)?.get_bounding_client_rect();
    Some(Vec2::new(
        (rect.left() + rect.width() / 2.0) as f32,
        (rect.top() + rect.height() / 2.0) as f32,
    ))
}

/// Canvas 2D radial-gradient renderer
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or(Error::SurfaceMissing {
                subsystem: "canvas 2d",
            })?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Platform("not a 2d context".into()))?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn draw_glow(&mut self, glow: &Glow) {
        let (x, y, r) = (
            glow.center.x as f64,
            glow.center.y as f64,
            glow.extent as f64,
        );
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, &glow.color.css(glow.alpha));
        let _ = gradient.add_color_stop(0.5, &glow.color.css(glow.alpha / 2.0));
        let _ = gradient.add_color_stop(1.0, &glow.color.css(0.0));

        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        if self.ctx.arc(x, y, r, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }
}

/// Full-screen DOM overlays for the glitch and the white flash
pub struct Overlay {
    glitch: HtmlElement,
    flash: HtmlElement,
    glitch_shown: bool,
}

impl Overlay {
    const FIXED: &'static str =
        "position:fixed;inset:0;pointer-events:none;z-index:9999;opacity:0;";

    /// Use `#glitchOverlay` when the page has one, create both elements otherwise
    pub fn new(document: &Document) -> Result<Self> {
        let glitch = match document.get_element_by_id("glitchOverlay") {
            Some(el) => el.dyn_into::<HtmlElement>().map_err(|_| {
                Error::Platform("#glitchOverlay is not an HTML element".into())
            })?,
            None => Self::create(document, "glitchOverlay", "")?,
        };
        let flash = Self::create(document, "rankFlash", "background:#fff;")?;
        Ok(Self {
            glitch,
            flash,
            glitch_shown: false,
        })
    }

    fn create(document: &Document, id: &str, extra: &str) -> Result<HtmlElement> {
        let el = document
            .create_element("div")
            .map_err(js_err)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| Error::Platform("div is not an HTML element".into()))?;
        el.set_id(id);
        el.set_attribute("style", &format!("{}{}", Self::FIXED, extra))
            .map_err(js_err)?;
        let body = document
            .body()
            .ok_or_else(|| Error::Platform("document has no body".into()))?;
        body.append_child(&el).map_err(js_err)?;
        Ok(el)
    }

    pub fn set_glitch(&mut self, glitch: Option<&Glitch>) {
        let style = self.glitch.style();
        match glitch {
            Some(glitch) => {
                let _ = style.set_property("background", &glitch.css());
                let _ = style.set_property("opacity", "1");
                self.glitch_shown = true;
            }
            None if self.glitch_shown => {
                let _ = style.set_property("opacity", "0");
                self.glitch_shown = false;
            }
            None => {}
        }
    }

    pub fn set_flash(&mut self, alpha: f32) {
        let _ = self
            .flash
            .style()
            .set_property("opacity", &format!("{:.3}", alpha));
    }
}

enum Backend {
    Gpu(GpuSurface),
    Canvas(CanvasSurface),
}

/// The page's particle surface: WebGPU or canvas 2D, plus DOM overlays
pub struct PageSurface {
    backend: Backend,
    overlay: Overlay,
}

impl PageSurface {
    pub fn gpu(surface: GpuSurface, overlay: Overlay) -> Self {
        Self {
            backend: Backend::Gpu(surface),
            overlay,
        }
    }

    pub fn canvas(surface: CanvasSurface, overlay: Overlay) -> Self {
        Self {
            backend: Backend::Canvas(surface),
            overlay,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.backend {
            Backend::Gpu(_) => "webgpu",
            Backend::Canvas(_) => "canvas2d",
        }
    }

    fn inner(&mut self) -> &mut dyn Surface {
        match &mut self.backend {
            Backend::Gpu(s) => s as &mut dyn Surface,
            Backend::Canvas(s) => s as &mut dyn Surface,
        }
    }
}

impl Surface for PageSurface {
    fn size(&self) -> (u32, u32) {
        match &self.backend {
            Backend::Gpu(s) => s.size(),
            Backend::Canvas(s) => s.size(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.inner().resize(width, height);
    }

    fn clear(&mut self) {
        self.inner().clear();
    }

    fn draw_glow(&mut self, glow: &Glow) {
        self.inner().draw_glow(glow);
    }

    fn set_glitch(&mut self, glitch: Option<&Glitch>) {
        self.overlay.set_glitch(glitch);
    }

    fn set_flash(&mut self, alpha: f32) {
        // WebGPU draws the flash itself
        match &mut self.backend {
            Backend::Gpu(s) => s.set_flash(alpha),
            Backend::Canvas(_) => self.overlay.set_flash(alpha),
        }
    }

    fn present(&mut self) -> Result<()> {
        self.inner().present()
    }
}

/// Parallax layers looked up by element id
pub struct DomLayers {
    document: Document,
    cache: HashMap<String, HtmlElement>,
}

impl DomLayers {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            cache: HashMap::new(),
        }
    }

    fn element(&mut self, id: &str) -> Result<&HtmlElement> {
        if !self.cache.contains_key(id) {
            let el = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                .ok_or_else(|| Error::LayerMissing(id.to_string()))?;
            self.cache.insert(id.to_string(), el);
        }
        self.cache
            .get(id)
            .ok_or_else(|| Error::LayerMissing(id.to_string()))
    }
}

impl LayerSink for DomLayers {
    fn translate(&mut self, layer: &str, offset: Vec2) -> Result<()> {
        let el = self.element(layer)?;
        el.style()
            .set_property(
                "transform",
                &format!("translate({:.2}px, {:.2}px)", offset.x, offset.y),
            )
            .map_err(js_err)
    }
}

/// Score, rank and quote labels; all optional
pub struct Hud {
    score: Option<HtmlElement>,
    rank: Option<HtmlElement>,
    quote: Option<HtmlElement>,
    last_score: Option<i64>,
}

impl Hud {
    pub fn new(document: &Document) -> Self {
        let find = |id: &str| {
            let el = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            if el.is_none() {
                log::warn!("No #{} element, HUD label skipped", id);
            }
            el
        };
        Self {
            score: find("rankScore"),
            rank: find("rankValue"),
            quote: find("quote"),
            last_score: None,
        }
    }

    pub fn set_score(&mut self, score: i64) {
        if self.last_score == Some(score) {
            return;
        }
        self.last_score = Some(score);
        if let Some(el) = &self.score {
            el.set_text_content(Some(&score.to_string()));
        }
    }

    pub fn set_quote(&self, quote: &str) {
        if let Some(el) = &self.quote {
            el.set_text_content(Some(quote));
        }
    }

    pub fn set_rank(&self, tier: &RankTier) {
        let Some(el) = &self.rank else {
            return;
        };
        el.set_text_content(Some(&tier.name));
        let style = el.style();
        match &tier.color {
            TierColor::Solid(color) => {
                let _ = style.set_property("color", &color.hex());
                let _ = style.remove_property("background");
                let _ = style.remove_property("-webkit-background-clip");
            }
            TierColor::Gradient(_) => {
                let _ = style.set_property("background", &tier.color.css());
                let _ = style.set_property("-webkit-background-clip", "text");
                let _ = style.set_property("color", "transparent");
            }
        }
    }
}

/// Choreography backed by a global `gsap`, when the page loaded one
pub struct GsapChoreography {
    gsap: JsValue,
    to: Function,
    cards: Vec<String>,
}

impl GsapChoreography {
    /// `None` when `window.gsap` is missing
    pub fn detect(window: &Window, cards: Vec<String>) -> Option<Self> {
        let gsap = Reflect::get(window, &JsValue::from_str("gsap")).ok()?;
        if !gsap.is_object() {
            return None;
        }
        let to = Reflect::get(&gsap, &JsValue::from_str("to"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some(Self { gsap, to, cards })
    }

    fn tween(&self, target: &str, vars: &[(&str, JsValue)]) {
        let props = Object::new();
        for (key, value) in vars {
            let _ = Reflect::set(&props, &JsValue::from_str(key), value);
        }
        if let Err(e) = self.to.call2(&self.gsap, &JsValue::from_str(target), &props) {
            log::warn!("gsap.to({}) failed: {:?}", target, e);
        }
    }

    fn pop(&self, target: &str, scale: f64, duration: f64) {
        self.tween(
            target,
            &[
                ("scale", JsValue::from_f64(scale)),
                ("duration", JsValue::from_f64(duration)),
                ("yoyo", JsValue::TRUE),
                ("repeat", JsValue::from_f64(1.0)),
            ],
        );
    }
}

impl Choreography for GsapChoreography {
    fn rank_pulse(&mut self, _change: &RankChange) {
        self.pop("#rankValue", 1.3, 0.2);
    }

    fn card_hovered(&mut self, card: usize) {
        if let Some(sel) = self.cards.get(card) {
            self.pop(sel, 1.05, 0.15);
        }
    }

    fn card_selected(&mut self, card: usize) {
        if let Some(sel) = self.cards.get(card) {
            self.pop(sel, 1.15, 0.3);
        }
    }

    fn showcase(&mut self, card: usize) {
        if let Some(sel) = self.cards.get(card) {
            self.tween(
                sel,
                &[
                    ("y", JsValue::from_f64(-10.0)),
                    ("duration", JsValue::from_f64(0.5)),
                    ("yoyo", JsValue::TRUE),
                    ("repeat", JsValue::from_f64(1.0)),
                ],
            );
        }
    }

    fn exit_wipe(&mut self) -> bool {
        self.tween(
            "body",
            &[
                ("opacity", JsValue::from_f64(0.0)),
                ("duration", JsValue::from_f64(0.8)),
            ],
        );
        true
    }
}
