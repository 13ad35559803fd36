//! Click n' Pop entry point
//!
//! The browser build is driven by `web::WebGame`. Natively this runs one
//! headless session with an autopilot doing the clicking and logs the result.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use click_n_pop::consts::{MAX_SUBSTEPS, SIM_DT};
    use click_n_pop::highscores::FileBestScores;
    use click_n_pop::presentation::{LogSink, Presenter, Tee};
    use click_n_pop::sim::{EngineConfig, Phase, SessionEngine};
    use click_n_pop::Settings;

    type Engine = SessionEngine<Tee<LogSink, Presenter>, FileBestScores>;

    /// Frames the autopilot waits between clicks
    const CLICK_COOLDOWN_FRAMES: u32 = 9;

    /// Pops the highest bubble on screen, avoiding bombs
    struct Autopilot {
        cooldown: u32,
    }

    impl Autopilot {
        fn step(&mut self, engine: &mut Engine) {
            if self.cooldown > 0 {
                self.cooldown -= 1;
                return;
            }
            let height = engine.arena().height;
            let target = engine
                .state()
                .bubbles
                .iter()
                .filter(|b| b.pos.y + b.radius < height && b.points >= 0)
                .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
                .map(|b| b.id);
            if let Some(id) = target {
                engine.pop(id);
                self.cooldown = CLICK_COOLDOWN_FRAMES;
            }
        }
    }

    fn load_config() -> EngineConfig {
        let Some(path) = std::env::args().nth(1) else {
            return EngineConfig::default();
        };
        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| EngineConfig::from_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(config) => {
                log::info!("Loaded engine config from {}", path);
                config
            }
            Err(e) => {
                log::error!("Could not load {}: {} - using defaults", path, e);
                EngineConfig::default()
            }
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Click n' Pop (native) starting...");

        let settings = Settings::load();
        let config = load_config();
        let rules = match config.clone().validate() {
            Ok(rules) => rules,
            Err(e) => {
                log::error!("Invalid engine config: {}", e);
                return;
            }
        };

        let clock_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let store = FileBestScores::new(std::env::temp_dir().join("clicknpop_best_scores.json"));
        let sink = Tee(LogSink, Presenter::new(&rules, &settings));
        let mut engine = match SessionEngine::new(config, sink, store) {
            Ok(engine) => engine
                .with_seed(settings.effective_seed(clock_seed))
                .with_player(settings.player_id.clone()),
            Err(e) => {
                log::error!("Invalid engine config: {}", e);
                return;
            }
        };

        if let Err(e) = engine.start() {
            log::error!("{}", e);
            return;
        }

        // Simulated display at ~50 fps, fed through a fixed-step accumulator
        let frame_dt = 0.02_f32;
        let mut accumulator = 0.0_f32;
        let mut autopilot = Autopilot { cooldown: 0 };
        while engine.phase() == Phase::Running {
            accumulator += frame_dt;
            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                engine.tick(SIM_DT);
                accumulator -= SIM_DT;
                substeps += 1;
            }
            autopilot.step(&mut engine);
            // The demo has no screen; discard drawing commands
            engine.sink_mut().1.drain();
        }

        let presenter = &engine.sink().1;
        let hud = presenter.hud();
        println!("Score:    {}", hud.score_text());
        println!("Accuracy: {}", hud.accuracy_text());
        println!("Level:    {} ({})", hud.level, presenter.level_name());
        if let Some(stats) = engine.final_stats() {
            println!("Popped:   {} / missed {}", stats.bubbles_popped, stats.bubbles_missed);
            println!("Streak:   {} (final combo x{:.1})", stats.best_streak, stats.final_combo);
            if stats.new_high_score {
                println!("New High Score!");
            }
            println!("{}", stats.share_text());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
