use foundation::time::Time;
use runtime::animation::AnimationState;
use runtime::event_bus::{EventBus, Topic};
use runtime::frame::Frame;
use runtime::timer::TimerSet;
use starfield::engine::{WARP_BURST, WARP_CRUISE, WARP_IDLE};
use streaming::rows::{EmissionRow, GeoPoint};
use streaming::source::DataError;
use streaming::store::{CompleteOutcome, PendingLoad, SnapshotStore};
use symbology::domain::{resolve_domain, ColorDomain, DomainCache, Sample};

use crate::catalog::{StepCatalog, StepType, YearMode};
use crate::panel::RacePanel;
use crate::scroll::ScrollLock;

/// Warp burst hold before decelerating.
pub const WARP_BURST_S: f64 = 1.3;
/// Cruise/deceleration hold before the zoom starts.
pub const WARP_DECEL_S: f64 = 0.7;
/// Zoom-in-from-orbit duration.
pub const ZOOM_S: f64 = 1.2;
/// Zoom start/end scale as fractions of the resting scale.
pub const ZOOM_START_FRACTION: f64 = 0.12;
pub const ZOOM_END_FRACTION: f64 = 0.9;
/// Per-step focus rotation duration.
pub const STEP_ROTATE_S: f64 = 1.6;
/// Delay between the zoom settling and the story intro reveal.
pub const INTRO_REVEAL_DELAY_S: f64 = 1.2;

const ZOOM_WARP_TARGET: f64 = 0.05;
const ZOOM_STAR_ALPHA: f64 = 0.3;
const DOT_FADE_RATE: f64 = 0.08;

const INTRO_TIMER: &str = "story-intro";

/// Narrative phase of the scroll story.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoryPhase {
    Idle,
    WarpingBurst,
    WarpingCruise,
    Zooming,
    StoryActive,
    Leaving,
}

/// External triggers from the scroll observer and user controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryEvent {
    /// The intro section scrolled out of view.
    EnterStory,
    /// The intro section scrolled back into view.
    LeaveStory,
    /// A step crossed its visibility threshold.
    StepEnter { step_id: String },
}

/// A highlighted region for the globe's halo and label.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTarget {
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

/// Instructions the sequencer issues to the engines and the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ScatterStars,
    RotateTo {
        lon: f64,
        lat: f64,
        duration_s: f64,
    },
    BeginZoom {
        start_fraction: f64,
        end_fraction: f64,
        duration_s: f64,
    },
    /// Replace the globe's snapshot wholesale.
    ApplySnapshot {
        points: Vec<GeoPoint>,
        domain: ColorDomain,
    },
    SetFocus {
        focus: Option<FocusTarget>,
    },
    ShowStoryIntro,
    HideStoryIntro,
    LiftRacePanel,
    ExpandRacePanel,
    CollapseRacePanel,
    StartRace,
    UpdateRegionChart {
        region: String,
        chart_key: String,
        event_year: i32,
    },
}

/// Pure transition function of the warp/zoom machine: given the phase and
/// the time spent in it, the phase to enter next.
pub fn phase_after(phase: StoryPhase, elapsed_s: f64) -> Option<StoryPhase> {
    match phase {
        StoryPhase::WarpingBurst if elapsed_s >= WARP_BURST_S => Some(StoryPhase::WarpingCruise),
        StoryPhase::WarpingCruise if elapsed_s >= WARP_DECEL_S => Some(StoryPhase::Zooming),
        StoryPhase::Zooming if elapsed_s >= ZOOM_S => Some(StoryPhase::StoryActive),
        StoryPhase::Leaving => Some(StoryPhase::Idle),
        _ => None,
    }
}

/// The scroll/story sequencer.
///
/// Owns the `AnimationState`, the scroll lock, the step catalog, the
/// snapshot store, and the domain cache; coordinates every narrative
/// transition by mutating the state directly and issuing `Command`s for the
/// engines it does not own. All timing runs off the frame clock, so the
/// whole choreography is testable with synthetic frames.
pub struct Sequencer {
    state: AnimationState,
    phase: StoryPhase,
    phase_entered: Time,
    in_story: bool,
    warping: bool,
    intro_visible: bool,
    scroll: ScrollLock,
    panel: RacePanel,
    timers: TimerSet,
    steps: StepCatalog,
    current_step: Option<usize>,
    year_mode: YearMode,
    store: SnapshotStore,
    domains: DomainCache,
    domain: ColorDomain,
}

impl Sequencer {
    pub fn new(steps: StepCatalog) -> Self {
        Self {
            state: AnimationState::resting(),
            phase: StoryPhase::Idle,
            phase_entered: Time::ZERO,
            in_story: false,
            warping: false,
            intro_visible: false,
            scroll: ScrollLock::new(),
            panel: RacePanel::new(),
            timers: TimerSet::new(),
            steps,
            current_step: None,
            year_mode: YearMode::default(),
            store: SnapshotStore::new(),
            domains: DomainCache::new(),
            domain: ColorDomain::UNIT,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    pub fn phase(&self) -> StoryPhase {
        self.phase
    }

    pub fn year_mode(&self) -> YearMode {
        self.year_mode
    }

    pub fn domain(&self) -> ColorDomain {
        self.domain
    }

    pub fn intro_visible(&self) -> bool {
        self.intro_visible
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll.is_locked()
    }

    /// Host-side scroll filter; consumes the absorb-one guard.
    pub fn scroll_allows(&mut self) -> bool {
        self.scroll.allow()
    }

    /// Next queued data load for the host to fetch.
    pub fn take_pending_load(&mut self) -> Option<PendingLoad> {
        self.store.take_pending()
    }

    pub fn handle_event(
        &mut self,
        event: StoryEvent,
        frame: Frame,
        bus: &mut EventBus,
    ) -> Vec<Command> {
        match event {
            StoryEvent::EnterStory => self.enter_story(frame, bus),
            StoryEvent::LeaveStory => self.leave_story(frame, bus),
            StoryEvent::StepEnter { step_id } => self.step_enter(&step_id, frame, bus),
        }
    }

    fn enter_story(&mut self, frame: Frame, bus: &mut EventBus) -> Vec<Command> {
        if self.in_story || self.warping {
            bus.emit(frame, Topic::Story, "enter ignored: run already active");
            return Vec::new();
        }
        self.in_story = true;
        self.warping = true;

        self.scroll.lock();
        self.timers.cancel_all();
        self.intro_visible = false;

        let mut cmds = vec![Command::HideStoryIntro];
        if self.panel.collapse() {
            cmds.push(Command::CollapseRacePanel);
        }

        self.state.cinematic = true;
        self.state.earth_visible = false;
        self.state.warp_factor.snap(WARP_IDLE);
        self.state.warp_factor.set_target(WARP_BURST);
        self.state.star_alpha.snap(1.0);

        self.phase = StoryPhase::WarpingBurst;
        self.phase_entered = frame.time;
        bus.emit(frame, Topic::Story, "phase -> WarpingBurst");

        cmds.push(Command::ScatterStars);
        cmds
    }

    fn leave_story(&mut self, frame: Frame, bus: &mut EventBus) -> Vec<Command> {
        if self.warping {
            bus.emit(frame, Topic::Story, "leave refused: mid-warp");
            return Vec::new();
        }

        self.scroll.unlock();
        self.timers.cancel_all();
        self.intro_visible = false;
        self.in_story = false;

        let mut cmds = vec![Command::HideStoryIntro];
        if self.panel.collapse() {
            cmds.push(Command::CollapseRacePanel);
        }
        cmds.push(Command::SetFocus { focus: None });

        self.state.warp_factor.set_target(WARP_IDLE);
        self.state.star_alpha.snap(1.0);
        self.state.dot_transition.snap(1.0);
        self.state.earth_visible = true;
        self.state.cinematic = false;
        self.state.zooming = false;

        self.phase = StoryPhase::Leaving;
        self.phase_entered = frame.time;
        bus.emit(frame, Topic::Story, "phase -> Leaving");
        cmds
    }

    fn step_enter(&mut self, step_id: &str, frame: Frame, bus: &mut EventBus) -> Vec<Command> {
        if !self.in_story || self.warping {
            bus.emit(frame, Topic::Story, format!("step {step_id} ignored outside story"));
            return Vec::new();
        }
        let Some(index) = self.steps.index_of(step_id) else {
            bus.emit(frame, Topic::Story, format!("unknown step {step_id}"));
            return Vec::new();
        };
        self.current_step = Some(index);

        let step = match self.steps.get(index) {
            Some(step) => step.clone(),
            None => return Vec::new(),
        };

        match step.step_type {
            StepType::Landing | StepType::Approach => {
                self.state.cinematic = true;
                self.state.earth_visible = true;
                return Vec::new();
            }
            StepType::Data => {}
        }

        self.state.cinematic = false;
        self.state.earth_visible = true;
        self.state.warp_factor.snap(0.0);
        self.state.star_alpha.snap(0.0);

        let mut cmds = Vec::new();
        if self.panel.collapse() {
            cmds.push(Command::CollapseRacePanel);
        }

        if let Some([lon, lat]) = step.focus {
            cmds.push(Command::RotateTo {
                lon,
                lat,
                duration_s: STEP_ROTATE_S,
            });
        } else {
            bus.emit(frame, Topic::Story, format!("step {step_id} has no focus"));
        }

        let focus = match (&step.region, step.focus) {
            (Some(region), Some([lon, lat])) => Some(FocusTarget {
                lon,
                lat,
                label: region.clone(),
            }),
            _ => None,
        };
        cmds.push(Command::SetFocus { focus });

        self.store.advance_generation();
        if step.fixed_domain {
            for key in step.data_keys() {
                self.store.request(key);
            }
        } else if let Some(key) = step.active_data_key(self.year_mode) {
            self.store.request(key);
        }
        if let Some(cmd) = self.snapshot_command(index) {
            cmds.push(cmd);
        }

        if let (Some(region), Some(chart_key), Some(event_year)) =
            (&step.region, &step.chart_key, step.event_year)
        {
            cmds.push(Command::UpdateRegionChart {
                region: region.clone(),
                chart_key: chart_key.clone(),
                event_year,
            });
        }

        cmds
    }

    /// Switches the event/event+10 dataset for the current step.
    pub fn set_year_mode(
        &mut self,
        mode: YearMode,
        frame: Frame,
        bus: &mut EventBus,
    ) -> Vec<Command> {
        if self.year_mode == mode {
            return Vec::new();
        }
        self.year_mode = mode;
        bus.emit(frame, Topic::Story, format!("year mode -> {mode:?}"));

        let Some(index) = self.current_step else {
            return Vec::new();
        };
        self.store.advance_generation();
        if let Some(step) = self.steps.get(index) {
            let keys: Vec<String> = step
                .active_data_key(mode)
                .map(str::to_string)
                .into_iter()
                .collect();
            for key in keys {
                self.store.request(&key);
            }
        }
        self.snapshot_command(index).into_iter().collect()
    }

    /// Requests the first data-bearing step's snapshot ahead of any step
    /// enter, so the globe is colored as soon as geometry is up.
    pub fn preload_first_story_step(&mut self, frame: Frame, bus: &mut EventBus) -> Vec<Command> {
        let Some(index) = self.steps.first_data_step() else {
            return Vec::new();
        };
        let keys: Vec<String> = match self.steps.get(index) {
            Some(step) => step
                .active_data_key(self.year_mode)
                .map(str::to_string)
                .into_iter()
                .collect(),
            None => Vec::new(),
        };
        for key in &keys {
            self.store.request(key);
            bus.emit(frame, Topic::Load, format!("preload {key}"));
        }
        self.snapshot_command(index).into_iter().collect()
    }

    /// Feeds a finished fetch back in. Stale completions are memoized but
    /// never touch the active snapshot; failures leave the last good state.
    pub fn complete_load(
        &mut self,
        load: &PendingLoad,
        result: Result<Vec<EmissionRow>, DataError>,
        frame: Frame,
        bus: &mut EventBus,
    ) -> Vec<Command> {
        match self.store.complete(load, result) {
            CompleteOutcome::Failed(err) => {
                bus.emit(frame, Topic::Load, format!("{} failed: {err}", load.key));
                Vec::new()
            }
            CompleteOutcome::Stale => {
                bus.emit(frame, Topic::Load, format!("{} stale, discarded", load.key));
                Vec::new()
            }
            CompleteOutcome::Applied => {
                let target = self.current_step.or_else(|| self.steps.first_data_step());
                let Some(index) = target else {
                    return Vec::new();
                };
                let belongs = self
                    .steps
                    .get(index)
                    .map(|s| s.data_keys().any(|k| k == load.key))
                    .unwrap_or(false);
                if !belongs {
                    return Vec::new();
                }
                self.snapshot_command(index).into_iter().collect()
            }
        }
    }

    /// Advances phase transitions, timers, the panel machine, and the dot
    /// fade for one frame.
    pub fn tick(&mut self, frame: Frame, bus: &mut EventBus) -> Vec<Command> {
        let now = frame.time;
        let mut cmds = Vec::new();

        while let Some(next) = phase_after(self.phase, now.since(self.phase_entered)) {
            self.enter_phase(next, frame, bus, &mut cmds);
        }

        for tag in self.timers.fire_due(now) {
            if tag == INTRO_TIMER && self.in_story && !self.intro_visible {
                self.intro_visible = true;
                cmds.push(Command::ShowStoryIntro);
                self.panel.begin(now);
            }
        }

        cmds.extend(self.panel.tick(now, &mut self.scroll));
        self.state.dot_transition.advance(DOT_FADE_RATE, frame.dt_norm());
        cmds
    }

    fn enter_phase(
        &mut self,
        next: StoryPhase,
        frame: Frame,
        bus: &mut EventBus,
        cmds: &mut Vec<Command>,
    ) {
        // Advance the phase clock by the nominal duration so chained
        // transitions stay aligned under coarse frames.
        self.phase_entered = match self.phase {
            StoryPhase::WarpingBurst => self.phase_entered.after(WARP_BURST_S),
            StoryPhase::WarpingCruise => self.phase_entered.after(WARP_DECEL_S),
            StoryPhase::Zooming => self.phase_entered.after(ZOOM_S),
            _ => frame.time,
        };
        self.phase = next;
        bus.emit(frame, Topic::Story, format!("phase -> {next:?}"));

        match next {
            StoryPhase::WarpingCruise => {
                self.state.warp_factor.set_target(WARP_CRUISE);
            }
            StoryPhase::Zooming => {
                self.state.warp_factor.set_target(ZOOM_WARP_TARGET);
                self.state.star_alpha.set_target(ZOOM_STAR_ALPHA);
                self.state.earth_visible = true;
                self.state.zooming = true;
                self.state.dot_transition.snap(0.0);
                cmds.push(Command::BeginZoom {
                    start_fraction: ZOOM_START_FRACTION,
                    end_fraction: ZOOM_END_FRACTION,
                    duration_s: ZOOM_S,
                });
            }
            StoryPhase::StoryActive => {
                self.state.zooming = false;
                self.state.warp_factor.set_target(WARP_IDLE);
                self.state.star_alpha.set_target(0.0);
                self.state.dot_transition.set_target(1.0);
                self.warping = false;
                self.scroll.unlock();
                self.timers
                    .schedule_in(INTRO_TIMER, self.phase_entered, INTRO_REVEAL_DELAY_S);
            }
            StoryPhase::Idle | StoryPhase::WarpingBurst | StoryPhase::Leaving => {}
        }
    }

    /// Builds the snapshot-apply command for a step if its active dataset
    /// is memoized, resolving the color domain on the way.
    fn snapshot_command(&mut self, step_index: usize) -> Option<Command> {
        let (step_id, active_key, fixed, keys) = {
            let step = self.steps.get(step_index)?;
            let active = step.active_data_key(self.year_mode)?.to_string();
            let keys: Vec<String> = step.data_keys().map(str::to_string).collect();
            (step.id.clone(), active, step.fixed_domain, keys)
        };

        let points = self.store.get(&active_key)?.to_vec();
        let samples: Vec<Sample> = points
            .iter()
            .map(|p| Sample::new(p.value, p.weight))
            .collect();

        let sets: Vec<Vec<Sample>> = keys
            .iter()
            .filter_map(|k| self.store.get(k))
            .map(|pts| pts.iter().map(|p| Sample::new(p.value, p.weight)).collect())
            .collect();

        let domain = if fixed && sets.len() == keys.len() {
            let slices: Vec<&[Sample]> = sets.iter().map(|s| s.as_slice()).collect();
            self.domains.resolve_fixed(&step_id, &slices, self.domain)
        } else {
            resolve_domain(&samples, None, self.domain)
        };
        self.domain = domain;

        Some(Command::ApplySnapshot { points, domain })
    }
}
