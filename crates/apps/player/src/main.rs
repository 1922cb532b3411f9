use std::collections::BTreeMap;
use std::env;

use charts::race::{RaceEngine, RaceParams, RaceRow, RaceTable};
use charts::series::{split_region_series, SeriesRow};
use foundation::time::Time;
use globe::animator::Animator;
use globe::geometry::FeatureSet;
use globe::renderer::{Focus, GlobeRenderer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use render::commands::RenderFrame;
use runtime::clock::FrameClock;
use runtime::event_bus::EventBus;
use starfield::engine::Starfield;
use story::catalog::{StepCatalog, YearMode};
use story::sequencer::{Command, Sequencer, StoryEvent};
use streaming::rows::EmissionRow;
use streaming::source::{DataSource, InMemoryDataSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const STEPS_JSON: &str = r#"{
    "steps": [
        {"id": "step-landing", "step_type": "landing"},
        {"id": "step-approach", "step_type": "approach"},
        {"id": "step-1850", "step_type": "data",
         "focus": [0.0, 0.0],
         "data_key": "em-1850",
         "chart_key": "series-global", "region": "Alba", "event_year": 1850},
        {"id": "step-1952", "step_type": "data",
         "focus": [-120.0, 30.0],
         "data_key": "em-1952", "late_data_key": "em-1962",
         "chart_key": "series-west", "region": "Borea", "event_year": 1952,
         "fixed_domain": true}
    ]
}"#;

const COUNTRIES_JSON: &str = r#"{
    "features": [
        {"name": "Alba", "rings": [[
            [-10.0, 35.0], [15.0, 38.0], [25.0, 50.0], [10.0, 60.0],
            [-8.0, 55.0], [-12.0, 44.0]
        ]]},
        {"name": "Borea", "rings": [[
            [-125.0, 28.0], [-98.0, 25.0], [-80.0, 32.0], [-72.0, 45.0],
            [-95.0, 52.0], [-122.0, 48.0]
        ]]},
        {"name": "Cimeria", "rings": [[
            [70.0, 8.0], [95.0, 10.0], [110.0, 25.0], [100.0, 40.0],
            [78.0, 35.0], [68.0, 20.0]
        ]]}
    ]
}"#;

const RACE_JSON: &str = r#"[
    {"year": 1950, "region": "Alba", "value": 12.0},
    {"year": 1950, "region": "Borea", "value": 28.0},
    {"year": 1950, "region": "Cimeria", "value": 4.0},
    {"year": 1950, "region": "Darien", "value": 2.5},
    {"year": 1960, "region": "Alba", "value": 18.0},
    {"year": 1960, "region": "Borea", "value": 41.0},
    {"year": 1960, "region": "Cimeria", "value": 9.0},
    {"year": 1960, "region": "Darien", "value": 3.1},
    {"year": 1970, "region": "Alba", "value": 24.0},
    {"year": 1970, "region": "Borea", "value": 52.0},
    {"year": 1970, "region": "Cimeria", "value": 21.0},
    {"year": 1970, "region": "Darien", "value": 4.4},
    {"year": 1980, "region": "Alba", "value": 23.0},
    {"year": 1980, "region": "Borea", "value": 55.0},
    {"year": 1980, "region": "Cimeria", "value": 36.0},
    {"year": 1980, "region": "Darien", "value": 6.0}
]"#;

const SERIES_WEST_JSON: &str = r#"[
    {"time": 1940, "Alba": 8.0, "Borea": 20.0},
    {"time": 1946, "Alba": 9.5, "Borea": 24.0},
    {"time": 1952, "Alba": 10.2, "Borea": 30.0},
    {"time": 1958, "Alba": 12.0, "Borea": 37.5},
    {"time": 1964, "Alba": 13.1, "Borea": 43.0}
]"#;

const SERIES_GLOBAL_JSON: &str = r#"[
    {"time": 1840, "Alba": 1.0, "Borea": 0.4},
    {"time": 1850, "Alba": 1.8, "Borea": 0.7},
    {"time": 1860, "Alba": 2.9, "Borea": 1.5},
    {"time": 1870, "Alba": 4.2, "Borea": 2.8}
]"#;

enum ScriptAction {
    Story(StoryEvent),
    YearMode(YearMode),
    RestartRace,
    Resize(f64, f64),
}

struct Script {
    actions: Vec<(f64, ScriptAction)>,
    cursor: usize,
}

impl Script {
    fn narrative() -> Self {
        use ScriptAction::*;
        Self {
            actions: vec![
                (1.0, Story(StoryEvent::EnterStory)),
                // A second trigger mid-warp must be a no-op.
                (1.5, Story(StoryEvent::EnterStory)),
                (8.0, Story(StoryEvent::StepEnter { step_id: "step-landing".into() })),
                (9.0, Story(StoryEvent::StepEnter { step_id: "step-approach".into() })),
                (10.0, Story(StoryEvent::StepEnter { step_id: "step-1850".into() })),
                (12.0, Resize(1024.0, 768.0)),
                (13.0, Story(StoryEvent::StepEnter { step_id: "step-1952".into() })),
                (15.0, YearMode(story::catalog::YearMode::EventPlusTen)),
                (16.5, Story(StoryEvent::StepEnter { step_id: "step-1850".into() })),
                (18.0, RestartRace),
                (19.0, Story(StoryEvent::LeaveStory)),
            ],
            cursor: 0,
        }
    }

    fn due(&mut self, now: Time) -> Vec<&ScriptAction> {
        let mut fired = Vec::new();
        while self.cursor < self.actions.len() && self.actions[self.cursor].0 <= now.0 {
            fired.push(&self.actions[self.cursor].1);
            self.cursor += 1;
        }
        fired
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn env_var_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Synthetic emission rows clustered around a lat/lon center, deterministic
/// per data key.
fn synthesize_rows(seed: u64, center: (f64, f64), scale: f64) -> Vec<EmissionRow> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(400);
    for _ in 0..400 {
        let lat = center.0 + rng.gen_range(-25.0..25.0);
        let lon = center.1 + rng.gen_range(-40.0..40.0);
        let value = scale * rng.gen_range(0.0..1.0f64).powi(2);
        rows.push(EmissionRow {
            lat: lat.clamp(-85.0, 85.0),
            lon,
            value,
            weight: 1.0,
        });
    }
    rows
}

fn build_data_source() -> InMemoryDataSource {
    let mut source = InMemoryDataSource::new();
    source.insert_rows("em-1850", synthesize_rows(1850, (48.0, 5.0), 2.0));
    source.insert_rows("em-1952", synthesize_rows(1952, (38.0, -100.0), 9.0));
    source.insert_rows("em-1962", synthesize_rows(1962, (38.0, -100.0), 14.0));
    source
}

struct Engines {
    starfield: Starfield,
    globe: GlobeRenderer,
    animator: Animator,
    race: RaceEngine,
    series_tables: BTreeMap<String, Vec<SeriesRow>>,
}

fn apply_command(
    cmd: Command,
    engines: &mut Engines,
    now: Time,
    rng: &mut ChaCha8Rng,
) -> Result<(), String> {
    match cmd {
        Command::ScatterStars => engines.starfield.scatter(rng),
        Command::RotateTo { lon, lat, duration_s } => {
            let projection = *engines.globe.projection();
            engines
                .animator
                .tween_rotation(&projection, lon, lat, duration_s, now);
        }
        Command::BeginZoom {
            start_fraction,
            end_fraction,
            duration_s,
        } => {
            let resting = engines.globe.resting_scale();
            engines.animator.tween_scale(
                engines.globe.projection_mut(),
                resting * start_fraction,
                resting * end_fraction,
                duration_s,
                now,
            );
        }
        Command::ApplySnapshot { points, domain } => {
            info!(points = points.len(), ?domain, "snapshot applied");
            engines.globe.set_snapshot(points, domain);
        }
        Command::SetFocus { focus } => {
            engines.globe.set_focus(focus.map(|f| Focus {
                lon: f.lon,
                lat: f.lat,
                label: f.label,
            }));
        }
        Command::ShowStoryIntro => info!("story intro revealed"),
        Command::HideStoryIntro => info!("story intro hidden"),
        Command::LiftRacePanel => info!("race panel lifted"),
        Command::ExpandRacePanel => info!("race panel expanded"),
        Command::CollapseRacePanel => info!("race panel collapsed"),
        Command::StartRace => engines.race.start(now),
        Command::UpdateRegionChart {
            region,
            chart_key,
            event_year,
        } => {
            let Some(rows) = engines.series_tables.get(&chart_key) else {
                warn!(chart_key = chart_key.as_str(), "missing series table");
                return Ok(());
            };
            match split_region_series(rows, &region, event_year) {
                Some(series) => info!(
                    region = region.as_str(),
                    event_year,
                    pre = series.pre.len(),
                    post = series.post.len(),
                    "region chart updated"
                ),
                None => warn!(
                    region = region.as_str(),
                    chart_key = chart_key.as_str(),
                    "region missing from series table"
                ),
            }
        }
    }
    Ok(())
}

fn real_main() -> Result<(), String> {
    let width = env_var_f64("PLAYER_WIDTH", 1280.0);
    let height = env_var_f64("PLAYER_HEIGHT", 720.0);
    let dt_s = env_var_f64("PLAYER_DT_MS", 1000.0 / 60.0) / 1000.0;
    let total_frames = env_var_u64("PLAYER_FRAMES", 1260);
    let seed = env_var_u64("PLAYER_SEED", 7);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut clock = FrameClock::new();
    let mut bus = EventBus::new();

    let catalog = StepCatalog::from_json(STEPS_JSON).map_err(|e| e.to_string())?;
    let mut sequencer = Sequencer::new(catalog);
    let mut source = build_data_source();

    let race_rows: Vec<RaceRow> =
        serde_json::from_str(RACE_JSON).map_err(|e| format!("race data: {e}"))?;
    let mut series_tables: BTreeMap<String, Vec<SeriesRow>> = BTreeMap::new();
    series_tables.insert(
        "series-west".to_string(),
        serde_json::from_str(SERIES_WEST_JSON).map_err(|e| format!("series data: {e}"))?,
    );
    series_tables.insert(
        "series-global".to_string(),
        serde_json::from_str(SERIES_GLOBAL_JSON).map_err(|e| format!("series data: {e}"))?,
    );

    let mut engines = Engines {
        starfield: Starfield::new(width, height, &mut rng),
        globe: GlobeRenderer::new(width, height),
        animator: Animator::new(),
        race: RaceEngine::new(RaceTable::from_rows(&race_rows), RaceParams::default()),
        series_tables,
    };

    engines
        .globe
        .set_countries(FeatureSet::from_json(COUNTRIES_JSON).map_err(|e| e.to_string())?);
    info!(width, height, dt_s, total_frames, "player starting");

    let mut script = Script::narrative();
    let mut out = RenderFrame::new();

    // Country geometry is up, so the first data step preloads immediately.
    {
        let frame = clock.tick(0.0);
        let mut commands = sequencer.preload_first_story_step(frame, &mut bus);
        while let Some(load) = sequencer.take_pending_load() {
            let result = source.fetch(&load.key);
            commands.extend(sequencer.complete_load(&load, result, frame, &mut bus));
        }
        for cmd in commands {
            apply_command(cmd, &mut engines, frame.time, &mut rng)?;
        }
    }

    for _ in 0..total_frames {
        let frame = clock.tick(dt_s);
        let mut commands = Vec::new();

        for action in script.due(frame.time) {
            match action {
                ScriptAction::Story(event) => {
                    commands.extend(sequencer.handle_event(event.clone(), frame, &mut bus));
                }
                ScriptAction::YearMode(mode) => {
                    commands.extend(sequencer.set_year_mode(*mode, frame, &mut bus));
                }
                ScriptAction::RestartRace => engines.race.restart(frame.time),
                ScriptAction::Resize(w, h) => {
                    engines.starfield.resize(*w, *h);
                    engines.globe.resize(*w, *h);
                    info!(w = *w, h = *h, "viewport resized");
                }
            }
        }

        commands.extend(sequencer.tick(frame, &mut bus));

        while let Some(load) = sequencer.take_pending_load() {
            let result = source.fetch(&load.key);
            commands.extend(sequencer.complete_load(&load, result, frame, &mut bus));
        }

        for cmd in commands {
            apply_command(cmd, &mut engines, frame.time, &mut rng)?;
        }

        engines
            .starfield
            .advance(frame, sequencer.state_mut(), &mut rng);
        engines
            .animator
            .advance(frame.time, engines.globe.projection_mut());
        engines.race.advance(frame);

        out.reset();
        engines.starfield.render(sequencer.state(), &mut out);
        engines.globe.render(
            sequencer.state(),
            engines.animator.rotation_settled(),
            &mut rng,
            &mut out,
        );

        for event in bus.drain() {
            info!(
                frame = event.frame_index,
                topic = event.topic.label(),
                "{}",
                event.message
            );
        }
    }

    let final_bars = engines.race.bars();
    info!(
        phase = ?sequencer.phase(),
        race_year = ?engines.race.current_year(),
        race_bars = final_bars.len(),
        last_frame_commands = out.len(),
        "player finished"
    );
    for bar in final_bars {
        info!(
            region = bar.region.as_str(),
            value = format!("{:.1}", bar.label_value).as_str(),
            "final standing"
        );
    }

    Ok(())
}
