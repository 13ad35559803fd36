//! Browser host wrapper
//!
//! Exposes one `SessionEngine` to the play page. The page forwards clicks as
//! `pop(id)`, drives `frame(now)` from `requestAnimationFrame`, and applies
//! the render commands returned as JSON.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::highscores::LocalStorageBestScores;
use crate::presentation::Presenter;
use crate::settings::Settings;
use crate::sim::{EngineConfig, PowerUpKind, SessionEngine};

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Click n' Pop starting...");
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Game instance owned by the page
#[wasm_bindgen]
pub struct WebGame {
    engine: SessionEngine<Presenter, LocalStorageBestScores>,
    settings: Settings,
    accumulator: f32,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a game for an arena of the given size; `config_json` overrides
    /// the default tables when non-empty
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, config_json: &str) -> Result<WebGame, JsValue> {
        let settings = Settings::load();
        let mut config = if config_json.is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json(config_json).map_err(to_js)?
        };
        config.arena.width = width;
        config.arena.height = height;

        let rules = config.clone().validate().map_err(to_js)?;
        let presenter = Presenter::new(&rules, &settings);
        let seed = settings.effective_seed(js_sys::Date::now() as u64);
        let engine = SessionEngine::new(config, presenter, LocalStorageBestScores)
            .map_err(to_js)?
            .with_seed(seed)
            .with_player(settings.player_id.clone());

        Ok(WebGame {
            engine,
            settings,
            accumulator: 0.0,
            last_time: None,
        })
    }

    /// Start, or restart if a session is already underway
    pub fn start(&mut self) {
        if self.engine.start().is_err() {
            self.engine.restart();
        }
        self.last_time = None;
        self.accumulator = 0.0;
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) -> bool {
        self.last_time = None;
        self.engine.toggle_pause()
    }

    pub fn end(&mut self) -> Result<(), JsValue> {
        self.engine.end().map(|_| ()).map_err(to_js)
    }

    pub fn pop(&mut self, id: u32) -> bool {
        self.engine.pop(id).is_some()
    }

    #[wasm_bindgen(js_name = activatePowerUp)]
    pub fn activate_power_up(&mut self, kind: &str) -> bool {
        match PowerUpKind::from_str(kind) {
            Some(kind) => self.engine.activate_power_up(kind),
            None => false,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.engine.resize(width, height)
    }

    /// Advance by the time since the previous frame (`now` in ms)
    pub fn frame(&mut self, now: f64) {
        let dt = match self.last_time {
            Some(last) => ((now - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);

        self.accumulator += dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.engine.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Pending render commands as a JSON array
    #[wasm_bindgen(js_name = drainCommands)]
    pub fn drain_commands(&mut self) -> Result<String, JsValue> {
        let commands = self.engine.sink_mut().drain();
        serde_json::to_string(&commands).map_err(to_js)
    }

    /// Session state snapshot (bubble positions, timer, score) as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.state()).map_err(to_js)
    }

    /// HUD text as JSON
    pub fn hud(&self) -> Result<String, JsValue> {
        let presenter = self.engine.sink();
        let hud = presenter.hud();
        let view = serde_json::json!({
            "score": hud.score_text(),
            "level": hud.level,
            "speed": presenter.level_name(),
            "combo": hud.combo_text(),
            "accuracy": hud.accuracy_text(),
            "popped": hud.popped,
            "timeLeft": (self.engine.state().time_left_ms().max(0) as u64).div_ceil(1000),
        });
        Ok(view.to_string())
    }

    #[wasm_bindgen(js_name = setSoundEnabled)]
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.settings.save();
        self.engine.sink_mut().apply_settings(&self.settings);
    }

    #[wasm_bindgen(js_name = setReducedMotion)]
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.settings.reduced_motion = enabled;
        self.settings.save();
        self.engine.sink_mut().apply_settings(&self.settings);
    }

    #[wasm_bindgen(js_name = shareText)]
    pub fn share_text(&self) -> Option<String> {
        self.engine.final_stats().map(|s| s.share_text())
    }
}
