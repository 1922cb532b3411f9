use foundation::time::Time;

use crate::scroll::ScrollLock;
use crate::sequencer::Command;

/// Delay between the story intro appearing and the panel lift.
pub const PANEL_INTRO_DELAY_S: f64 = 0.8;
/// Delay between the lift and the panel expansion.
pub const PANEL_EXPAND_DELAY_S: f64 = 0.7;
/// Duration of the expansion stretch; scroll stays locked throughout.
pub const PANEL_STRETCH_S: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelPhase {
    Hidden,
    IntroDelay,
    Lift,
    Stretch,
    Expanded,
}

/// The bar-chart-race side panel choreography.
///
/// Runs once per story intro: wait, lift (locking scroll), expand, then
/// unlock and start the race. The race itself is initialized exactly once
/// per session, no matter how often the panel reopens.
#[derive(Debug)]
pub struct RacePanel {
    phase: PanelPhase,
    entered: Time,
    race_started: bool,
}

impl Default for RacePanel {
    fn default() -> Self {
        Self {
            phase: PanelPhase::Hidden,
            entered: Time::ZERO,
            race_started: false,
        }
    }
}

impl RacePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase != PanelPhase::Hidden
    }

    /// Kicks off the expand sequence. No-op if already running.
    pub fn begin(&mut self, now: Time) {
        if self.phase == PanelPhase::Hidden {
            self.phase = PanelPhase::IntroDelay;
            self.entered = now;
        }
    }

    /// Collapses immediately. Returns whether the panel was visible.
    pub fn collapse(&mut self) -> bool {
        let was_visible = self.is_visible();
        self.phase = PanelPhase::Hidden;
        was_visible
    }

    pub fn tick(&mut self, now: Time, scroll: &mut ScrollLock) -> Vec<Command> {
        let mut cmds = Vec::new();
        loop {
            let elapsed = now.since(self.entered);
            match self.phase {
                PanelPhase::IntroDelay if elapsed >= PANEL_INTRO_DELAY_S => {
                    if !scroll.is_locked() {
                        scroll.lock();
                    }
                    self.phase = PanelPhase::Lift;
                    self.entered = self.entered.after(PANEL_INTRO_DELAY_S);
                    cmds.push(Command::LiftRacePanel);
                }
                PanelPhase::Lift if elapsed >= PANEL_EXPAND_DELAY_S => {
                    self.phase = PanelPhase::Stretch;
                    self.entered = self.entered.after(PANEL_EXPAND_DELAY_S);
                    cmds.push(Command::ExpandRacePanel);
                }
                PanelPhase::Stretch if elapsed >= PANEL_STRETCH_S => {
                    self.phase = PanelPhase::Expanded;
                    self.entered = self.entered.after(PANEL_STRETCH_S);
                    scroll.unlock();
                    if !self.race_started {
                        self.race_started = true;
                        cmds.push(Command::StartRace);
                    }
                }
                _ => break,
            }
        }
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::{PanelPhase, RacePanel};
    use crate::scroll::ScrollLock;
    use crate::sequencer::Command;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    #[test]
    fn expand_sequence_locks_then_unlocks_scroll() {
        let mut panel = RacePanel::new();
        let mut scroll = ScrollLock::new();
        panel.begin(Time::ZERO);

        assert!(panel.tick(Time(0.5), &mut scroll).is_empty());
        assert!(!scroll.is_locked());

        let cmds = panel.tick(Time(0.8), &mut scroll);
        assert_eq!(cmds, vec![Command::LiftRacePanel]);
        assert!(scroll.is_locked());

        let cmds = panel.tick(Time(1.5), &mut scroll);
        assert_eq!(cmds, vec![Command::ExpandRacePanel]);
        assert!(scroll.is_locked());

        let cmds = panel.tick(Time(2.0), &mut scroll);
        assert_eq!(cmds, vec![Command::StartRace]);
        assert!(!scroll.is_locked());
        assert_eq!(panel.phase(), PanelPhase::Expanded);
    }

    #[test]
    fn race_starts_exactly_once_across_reopenings() {
        let mut panel = RacePanel::new();
        let mut scroll = ScrollLock::new();
        panel.begin(Time::ZERO);
        let cmds = panel.tick(Time(2.0), &mut scroll);
        assert!(cmds.contains(&Command::StartRace));

        assert!(panel.collapse());
        panel.begin(Time(10.0));
        let cmds = panel.tick(Time(12.0), &mut scroll);
        assert!(!cmds.contains(&Command::StartRace));
        assert_eq!(panel.phase(), PanelPhase::Expanded);
    }

    #[test]
    fn begin_is_idempotent_while_running() {
        let mut panel = RacePanel::new();
        let mut scroll = ScrollLock::new();
        panel.begin(Time::ZERO);
        panel.begin(Time(0.7));
        let cmds = panel.tick(Time(0.8), &mut scroll);
        // The second begin must not restart the delay window.
        assert_eq!(cmds, vec![Command::LiftRacePanel]);
    }

    #[test]
    fn big_time_jump_replays_the_whole_sequence_in_order() {
        let mut panel = RacePanel::new();
        let mut scroll = ScrollLock::new();
        panel.begin(Time::ZERO);
        let cmds = panel.tick(Time(5.0), &mut scroll);
        assert_eq!(
            cmds,
            vec![
                Command::LiftRacePanel,
                Command::ExpandRacePanel,
                Command::StartRace
            ]
        );
        assert!(!scroll.is_locked());
    }
}
