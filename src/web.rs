//! Browser bindings
//!
//! The page owns the canvas and draws from JSON snapshots. Pointer and touch
//! listeners write straight into the game's pointer cell; `frame` is meant to
//! be called from `requestAnimationFrame`.

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

use crate::audio::WebAudio;
use crate::game::{Game, PointerCell, client_to_canvas};
use crate::persistence::default_store;
use crate::settings::{Loadout, TrailStyle};
use crate::sim::events::GameEvent;
use crate::sim::state::{GameMode, Screen};

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Nebula Strike starting...");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    /// Handle on the game's audio context, for unlocking it on a user gesture
    audio: WebAudio,
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let audio = WebAudio::new();
        let game = Game::new(
            seed,
            Screen::new(width, height),
            default_store(),
            Box::new(audio.clone()),
        );
        WebGame {
            game,
            audio,
            events: Vec::new(),
        }
    }

    /// Route mouse and touch movement on `canvas_id` into the pointer cell and
    /// resume audio on the first press
    pub fn attach(&self, canvas_id: &str) -> Result<(), JsValue> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(canvas_id))
            .ok_or_else(|| JsValue::from_str("canvas not found"))?
            .dyn_into::<HtmlCanvasElement>()?;

        {
            let pointer = self.game.pointer();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                write_pointer(&pointer, &target, event.client_x(), event.client_y());
            });
            canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let pointer = self.game.pointer();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    write_pointer(&pointer, &target, touch.client_x(), touch.client_y());
                }
            });
            canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Browsers keep the AudioContext suspended until a user gesture
        for gesture in ["pointerdown", "touchstart"] {
            let audio = self.audio.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                audio.resume();
            });
            canvas.add_event_listener_with_callback(gesture, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// "menu", "playing", "customize" or "gameover"
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "menu" => GameMode::Menu,
            "playing" => GameMode::Playing,
            "customize" => GameMode::Customize,
            "gameover" => GameMode::GameOver,
            other => return Err(JsValue::from_str(&format!("unknown mode: {other}"))),
        };
        self.game.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        format!("{:?}", self.game.mode()).to_lowercase()
    }

    pub fn set_loadout(&mut self, color: u32, trail: &str) {
        let trail = match trail {
            "plasma" => TrailStyle::Plasma,
            "turbo" => TrailStyle::Turbo,
            _ => TrailStyle::Standard,
        };
        self.game.set_loadout(Loadout { color, trail });
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.set_screen(Screen::new(width, height));
    }

    /// Step once; returns this frame's events as JSON
    pub fn frame(&mut self) -> Result<String, JsValue> {
        self.events.clear();
        self.game.frame(&mut self.events);
        serde_json::to_string(&self.events).map_err(js_err)
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(js_err)
    }

    pub fn high_score(&self) -> f64 {
        self.game.high_score() as f64
    }

    pub fn debrief(&self) -> Option<String> {
        self.game.debrief().map(str::to_string)
    }
}

fn write_pointer(pointer: &PointerCell, canvas: &HtmlCanvasElement, x: i32, y: i32) {
    let rect = canvas.get_bounding_client_rect();
    let point = client_to_canvas(
        Vec2::new(x as f32, y as f32),
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
        Vec2::new(canvas.width() as f32, canvas.height() as f32),
    );
    pointer.set(Some(point));
}
