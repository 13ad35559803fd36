//! Presentation adapter
//!
//! Translates engine events into render commands for the host page: bubble
//! elements, pop bursts, score popups, feedback messages, sound cues and HUD
//! text. The engine never sees any of this.

use glam::Vec2;
use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{ComboLossReason, Effect, EventSink, FinalStats, GameEvent, GameRules};

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundEffect {
    /// Regular bubble popped
    Pop,
    /// Golden bubble popped
    GoldenPop,
    /// Bomb popped
    Bomb,
    /// Power-up activated
    PowerUp,
    GameStart,
    GameOver,
    HighScore,
}

impl SoundEffect {
    /// Id of the `<audio>` element on the play page
    pub fn element_id(&self) -> &'static str {
        match self {
            SoundEffect::Pop => "pop-sound",
            SoundEffect::GoldenPop => "golden-pop",
            SoundEffect::Bomb => "bomb-sound",
            SoundEffect::PowerUp => "powerup-sound",
            SoundEffect::GameStart => "game-start",
            SoundEffect::GameOver | SoundEffect::HighScore => "game-over-sound",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackTone {
    Info,
    Success,
    Warning,
    Danger,
}

impl FeedbackTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            FeedbackTone::Info => "feedback-info",
            FeedbackTone::Success => "feedback-success",
            FeedbackTone::Warning => "feedback-warning",
            FeedbackTone::Danger => "feedback-danger",
        }
    }
}

/// Something for the host to draw or play
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum RenderCommand {
    AddBubble { id: u32, pos: Vec2, radius: f32, color: String, kind: String },
    RemoveBubble { id: u32 },
    PopBurst { pos: Vec2, radius: f32, color: String },
    ScorePopup { pos: Vec2, text: String, color: &'static str },
    Feedback { message: String, tone: FeedbackTone },
    Sound { effect: SoundEffect },
    ShowGameOver { stats: FinalStats },
}

/// HUD values, folded from the event stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: i64,
    pub level: u32,
    pub combo: f32,
    pub hits: u32,
    pub total: u32,
    pub popped: u32,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            combo: 1.0,
            hits: 0,
            total: 0,
            popped: 0,
        }
    }
}

impl Hud {
    pub fn score_text(&self) -> String {
        format_score(self.score)
    }

    pub fn combo_text(&self) -> String {
        format!("x{:.1}", self.combo)
    }

    pub fn accuracy_text(&self) -> String {
        let percent = if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64 * 100.0
        };
        format!("{:.1}%", percent)
    }
}

/// Group thousands with commas ("1,250")
pub fn format_score(score: i64) -> String {
    let digits = score.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if score < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

const POSITIVE_POPUP: &str = "#00FF88";
const NEGATIVE_POPUP: &str = "#FF4444";

/// Event sink that builds render commands
#[derive(Debug, Clone)]
pub struct Presenter {
    level_names: Vec<String>,
    sound_enabled: bool,
    reduced_motion: bool,
    hud: Hud,
    commands: Vec<RenderCommand>,
}

impl Presenter {
    pub fn new(rules: &GameRules, settings: &Settings) -> Self {
        Self {
            level_names: rules.levels.iter().map(|l| l.name.clone()).collect(),
            sound_enabled: settings.sound_enabled,
            reduced_motion: settings.reduced_motion,
            hud: Hud::default(),
            commands: Vec::new(),
        }
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Speed label for the current level
    pub fn level_name(&self) -> &str {
        self.level_names
            .get(self.hud.level as usize - 1)
            .map(String::as_str)
            .unwrap_or("Normal")
    }

    /// Pick up changed audio/motion preferences mid-session
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sound_enabled = settings.sound_enabled;
        self.reduced_motion = settings.reduced_motion;
    }

    pub fn pending(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take queued commands for this frame
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    fn feedback(&mut self, message: impl Into<String>, tone: FeedbackTone) {
        self.commands.push(RenderCommand::Feedback {
            message: message.into(),
            tone,
        });
    }

    fn sound(&mut self, effect: SoundEffect) {
        if self.sound_enabled {
            self.commands.push(RenderCommand::Sound { effect });
        }
    }
}

impl EventSink for Presenter {
    fn emit(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameStarted => {
                self.hud = Hud::default();
                self.sound(SoundEffect::GameStart);
                self.feedback("Game started! Pop those bubbles!", FeedbackTone::Info);
            }
            GameEvent::GamePaused => self.feedback("Game Paused", FeedbackTone::Warning),
            GameEvent::GameResumed => self.feedback("Game Resumed!", FeedbackTone::Success),
            GameEvent::Spawned { bubble } => {
                self.commands.push(RenderCommand::AddBubble {
                    id: bubble.id,
                    pos: bubble.pos,
                    radius: bubble.radius,
                    color: bubble.color,
                    kind: bubble.kind,
                });
            }
            GameEvent::Popped {
                bubble,
                points_awarded,
                score,
                combo_multiplier,
            } => {
                self.hud.score = score;
                self.hud.combo = combo_multiplier;
                self.hud.hits += 1;
                self.hud.total += 1;
                self.hud.popped += 1;

                self.commands.push(RenderCommand::RemoveBubble { id: bubble.id });
                if !self.reduced_motion {
                    self.commands.push(RenderCommand::PopBurst {
                        pos: bubble.pos,
                        radius: bubble.radius,
                        color: bubble.color.clone(),
                    });
                }
                let (text, color) = if points_awarded > 0 {
                    (format!("+{}", points_awarded), POSITIVE_POPUP)
                } else {
                    (points_awarded.to_string(), NEGATIVE_POPUP)
                };
                self.commands.push(RenderCommand::ScorePopup {
                    pos: bubble.pos,
                    text,
                    color,
                });

                if bubble.effect == Effect::ResetCombo {
                    self.sound(SoundEffect::Bomb);
                    self.feedback(format!("Bomb! -{}", points_awarded.abs()), FeedbackTone::Danger);
                } else if bubble.kind == "golden" {
                    self.sound(SoundEffect::GoldenPop);
                    self.feedback(format!("Golden Bubble! +{}", points_awarded), FeedbackTone::Success);
                } else {
                    self.sound(SoundEffect::Pop);
                }
            }
            GameEvent::Missed { bubble } => {
                self.hud.total += 1;
                self.commands.push(RenderCommand::RemoveBubble { id: bubble.id });
            }
            GameEvent::LevelChanged { level, .. } => {
                self.hud.level = level;
                self.feedback(format!("Level {}!", level), FeedbackTone::Info);
            }
            GameEvent::ComboLost { reason } => {
                self.hud.combo = 1.0;
                match reason {
                    ComboLossReason::Timeout => self.feedback("Combo lost!", FeedbackTone::Warning),
                    ComboLossReason::Reset => self.feedback("Combo Reset!", FeedbackTone::Danger),
                }
            }
            GameEvent::ComboBoosted { multiplier } => {
                self.hud.combo = multiplier;
                self.feedback(format!("Combo Boost! x{:.1}", multiplier), FeedbackTone::Success);
            }
            GameEvent::TimeAdded { added_ms, .. } => {
                self.feedback(format!("+{} seconds!", added_ms / 1000), FeedbackTone::Success);
            }
            GameEvent::PowerUpActivated { kind, .. } => {
                self.sound(SoundEffect::PowerUp);
                self.feedback(format!("Activated {}!", kind.as_str()), FeedbackTone::Success);
            }
            GameEvent::PowerUpExpired { kind } => {
                self.feedback(format!("{} wore off", kind.as_str()), FeedbackTone::Info);
            }
            GameEvent::GameEnded { stats } => {
                self.hud.score = stats.score;
                if stats.new_high_score {
                    self.sound(SoundEffect::HighScore);
                    self.feedback("New High Score!", FeedbackTone::Success);
                } else {
                    self.sound(SoundEffect::GameOver);
                }
                self.commands.push(RenderCommand::ShowGameOver { stats });
            }
            GameEvent::ArenaCleared { bubble_ids } => {
                self.hud = Hud::default();
                self.commands
                    .extend(bubble_ids.into_iter().map(|id| RenderCommand::RemoveBubble { id }));
            }
        }
    }
}

/// Sink that logs every event (used by the native demo)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: GameEvent) {
        match &event {
            GameEvent::Spawned { .. } | GameEvent::Missed { .. } => log::trace!("{:?}", event),
            GameEvent::Popped { .. } => log::debug!("{:?}", event),
            _ => log::info!("{:?}", event),
        }
    }
}

/// Fan one event stream out to two sinks
#[derive(Debug, Default, Clone)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: GameEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Bubble, EngineConfig, PowerUpKind};

    fn presenter(settings: &Settings) -> Presenter {
        let rules = EngineConfig::default().validate().unwrap();
        Presenter::new(&rules, settings)
    }

    fn bubble(kind: &str, points: i32, effect: Effect) -> Bubble {
        Bubble {
            id: 9,
            kind: kind.to_string(),
            color: "#FFD700".to_string(),
            pos: Vec2::new(120.0, 240.0),
            radius: 30.0,
            speed: 60.0,
            points,
            effect,
            spawned_at_ms: 0,
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1250), "1,250");
        assert_eq!(format_score(1234567), "1,234,567");
        assert_eq!(format_score(-20), "-20");
        assert_eq!(format_score(-4000), "-4,000");
    }

    #[test]
    fn test_golden_pop_commands() {
        let mut p = presenter(&Settings::default());
        p.emit(GameEvent::Popped {
            bubble: bubble("golden", 50, Effect::None),
            points_awarded: 100,
            score: 100,
            combo_multiplier: 2.0,
        });

        let cmds = p.drain();
        assert_eq!(cmds[0], RenderCommand::RemoveBubble { id: 9 });
        assert!(matches!(cmds[1], RenderCommand::PopBurst { .. }));
        assert_eq!(
            cmds[2],
            RenderCommand::ScorePopup {
                pos: Vec2::new(120.0, 240.0),
                text: "+100".to_string(),
                color: POSITIVE_POPUP
            }
        );
        assert!(cmds.contains(&RenderCommand::Sound {
            effect: SoundEffect::GoldenPop
        }));
        assert!(cmds.contains(&RenderCommand::Feedback {
            message: "Golden Bubble! +100".to_string(),
            tone: FeedbackTone::Success
        }));
        assert_eq!(p.hud().score_text(), "100");
        assert_eq!(p.hud().combo_text(), "x2.0");
        assert_eq!(p.hud().accuracy_text(), "100.0%");
        assert!(p.pending().is_empty());
    }

    #[test]
    fn test_bomb_pop_commands() {
        let mut p = presenter(&Settings::default());
        p.emit(GameEvent::Popped {
            bubble: bubble("bomb", -20, Effect::ResetCombo),
            points_awarded: -20,
            score: -20,
            combo_multiplier: 1.0,
        });
        let cmds = p.drain();
        assert!(cmds.contains(&RenderCommand::ScorePopup {
            pos: Vec2::new(120.0, 240.0),
            text: "-20".to_string(),
            color: NEGATIVE_POPUP
        }));
        assert!(cmds.contains(&RenderCommand::Feedback {
            message: "Bomb! -20".to_string(),
            tone: FeedbackTone::Danger
        }));
        assert!(cmds.contains(&RenderCommand::Sound {
            effect: SoundEffect::Bomb
        }));
    }

    #[test]
    fn test_settings_gate_sound_and_motion() {
        let settings = Settings {
            sound_enabled: false,
            reduced_motion: true,
            ..Settings::default()
        };
        let mut p = presenter(&settings);
        p.emit(GameEvent::GameStarted);
        p.emit(GameEvent::Popped {
            bubble: bubble("normal", 10, Effect::None),
            points_awarded: 10,
            score: 10,
            combo_multiplier: 1.0,
        });
        p.emit(GameEvent::PowerUpActivated {
            kind: PowerUpKind::Magnet,
            expires_in_ms: 15_000,
        });
        for cmd in p.drain() {
            assert!(!matches!(cmd, RenderCommand::Sound { .. }));
            assert!(!matches!(cmd, RenderCommand::PopBurst { .. }));
        }

        p.apply_settings(&Settings::default());
        p.emit(GameEvent::GameStarted);
        assert!(p.pending().contains(&RenderCommand::Sound {
            effect: SoundEffect::GameStart
        }));
    }

    #[test]
    fn test_hud_tracks_level_and_misses() {
        let mut p = presenter(&Settings::default());
        p.emit(GameEvent::Popped {
            bubble: bubble("normal", 10, Effect::None),
            points_awarded: 10,
            score: 10,
            combo_multiplier: 1.0,
        });
        p.emit(GameEvent::Missed {
            bubble: bubble("normal", 10, Effect::None),
        });
        p.emit(GameEvent::LevelChanged {
            level: 3,
            spawn_interval_ms: 500,
        });
        assert_eq!(p.hud().accuracy_text(), "50.0%");
        assert_eq!(p.level_name(), "Faster");
        assert!(p.pending().contains(&RenderCommand::Feedback {
            message: "Level 3!".to_string(),
            tone: FeedbackTone::Info
        }));
    }

    #[test]
    fn test_combo_messages() {
        let mut p = presenter(&Settings::default());
        p.emit(GameEvent::ComboBoosted { multiplier: 4.0 });
        assert_eq!(p.hud().combo_text(), "x4.0");
        p.emit(GameEvent::ComboLost {
            reason: ComboLossReason::Timeout,
        });
        assert_eq!(p.hud().combo_text(), "x1.0");
        p.emit(GameEvent::TimeAdded {
            added_ms: 5_000,
            time_left_ms: 30_000,
        });

        let messages: Vec<String> = p
            .drain()
            .into_iter()
            .filter_map(|c| match c {
                RenderCommand::Feedback { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["Combo Boost! x4.0", "Combo lost!", "+5 seconds!"]);
    }

    #[test]
    fn test_restart_removes_old_bubble_elements() {
        use crate::highscores::MemoryBestScores;
        use crate::sim::SessionEngine;

        let rules = EngineConfig::default().validate().unwrap();
        let sink = Presenter::new(&rules, &Settings::default());
        let mut engine = SessionEngine::new(EngineConfig::default(), sink, MemoryBestScores::new()).unwrap();
        engine.start().unwrap();
        engine.tick(3.0);
        let live: Vec<u32> = engine.state().bubbles.iter().map(|b| b.id).collect();
        assert_eq!(live.len(), 3);
        engine.sink_mut().drain();

        engine.restart();
        engine.tick(0.9);
        let cmds = engine.sink_mut().drain();

        let removed: Vec<u32> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::RemoveBubble { id } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(removed, live);

        // Old elements go before the reused id 1 comes back
        let last_remove = cmds
            .iter()
            .rposition(|c| matches!(c, RenderCommand::RemoveBubble { .. }))
            .unwrap();
        let first_add = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::AddBubble { id: 1, .. }))
            .unwrap();
        assert!(last_remove < first_add);
        assert_eq!(engine.sink().hud().score, 0);
    }

    #[test]
    fn test_tee_delivers_to_both() {
        let mut tee = Tee(Vec::new(), presenter(&Settings::default()));
        tee.emit(GameEvent::GamePaused);
        assert_eq!(tee.0, vec![GameEvent::GamePaused]);
        assert_eq!(tee.1.pending().len(), 1);
    }
}
