use std::collections::BTreeMap;

use foundation::easing::cubic_in_out;
use foundation::time::{Time, TimeSpan};
use runtime::frame::Frame;
use serde::{Deserialize, Serialize};

/// Regions kept per year.
pub const TOP_N: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRow {
    pub year: i32,
    pub region: String,
    pub value: f64,
}

/// One year of the race: regions sorted descending by value, truncated to
/// the top N. Immutable after derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceYear {
    pub year: i32,
    pub entries: Vec<(String, f64)>,
}

/// The full precomputed race sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceTable {
    pub years: Vec<RaceYear>,
    pub max_value: f64,
}

impl RaceTable {
    /// Groups rows by year and keeps the top N regions per year, sorted
    /// descending by value (ties broken by region name for determinism).
    pub fn from_rows(rows: &[RaceRow]) -> Self {
        let mut grouped: BTreeMap<i32, Vec<(String, f64)>> = BTreeMap::new();
        for row in rows {
            grouped
                .entry(row.year)
                .or_default()
                .push((row.region.clone(), row.value));
        }

        let mut max_value = 0.0f64;
        let years = grouped
            .into_iter()
            .map(|(year, mut entries)| {
                entries.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.0.cmp(&b.0))
                });
                entries.truncate(TOP_N);
                if let Some(top) = entries.first() {
                    max_value = max_value.max(top.1);
                }
                RaceYear { year, entries }
            })
            .collect();

        Self { years, max_value }
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaceParams {
    /// Seconds between year advances.
    pub interval_s: f64,
    /// Seconds a bar takes to reach its new value/position.
    pub anim_s: f64,
    /// Years stepped per tick.
    pub stride: usize,
}

impl Default for RaceParams {
    fn default() -> Self {
        Self {
            interval_s: 0.22,
            anim_s: 0.2,
            stride: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct Bar {
    value_from: f64,
    value_to: f64,
    label_from: f64,
    label_to: f64,
    rank_from: f64,
    rank_to: f64,
    span: TimeSpan,
    leaving: bool,
    display_value: f64,
    display_label: f64,
    display_rank: f64,
}

impl Bar {
    fn entering(rank: usize, value: f64, now: Time, anim_s: f64) -> Self {
        let rank = rank as f64;
        Self {
            value_from: 0.0,
            value_to: value,
            label_from: 0.0,
            label_to: value,
            rank_from: rank,
            rank_to: rank,
            span: TimeSpan::starting_at(now, anim_s),
            leaving: false,
            display_value: 0.0,
            display_label: 0.0,
            display_rank: rank,
        }
    }

    fn retween(&mut self, rank: f64, value: f64, leaving: bool, now: Time, anim_s: f64) {
        self.value_from = self.display_value;
        self.label_from = self.display_label;
        self.rank_from = self.display_rank;
        self.value_to = value;
        self.label_to = value;
        self.rank_to = rank;
        self.leaving = leaving;
        self.span = TimeSpan::starting_at(now, anim_s);
    }

    fn advance(&mut self, now: Time) {
        let k = cubic_in_out(self.span.progress(now));
        self.display_value = self.value_from + (self.value_to - self.value_from) * k;
        self.display_label = self.label_from + (self.label_to - self.label_from) * k;
        self.display_rank = self.rank_from + (self.rank_to - self.rank_from) * k;
    }
}

/// A bar as the host should draw it this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BarView {
    pub region: String,
    /// Interpolated bar value; width is `value / table.max_value`.
    pub value: f64,
    /// Numerically tweened label value (not just faded).
    pub label_value: f64,
    /// Interpolated vertical slot, 0 at the top.
    pub rank: f64,
    pub leaving: bool,
}

/// Time-stepped ranked-bar animation, independent of scroll.
///
/// Region identity is stable: a region's bar retweens across years rather
/// than being destroyed and recreated. Playback halts exactly at the final
/// year; further ticks are no-ops until `restart`.
pub struct RaceEngine {
    table: RaceTable,
    params: RaceParams,
    year_index: usize,
    playing: bool,
    started: bool,
    next_tick_at: Option<Time>,
    bars: BTreeMap<String, Bar>,
}

impl RaceEngine {
    pub fn new(table: RaceTable, params: RaceParams) -> Self {
        Self {
            table,
            params,
            year_index: 0,
            playing: false,
            started: false,
            next_tick_at: None,
            bars: BTreeMap::new(),
        }
    }

    pub fn table(&self) -> &RaceTable {
        &self.table
    }

    /// Begins playback from the first year. Idempotent: a second call while
    /// the race is already initialized is a no-op.
    pub fn start(&mut self, now: Time) {
        if self.started || self.table.is_empty() {
            return;
        }
        self.started = true;
        self.rewind(now);
    }

    /// Manual restart control; rewinds to the first year and plays again.
    pub fn restart(&mut self, now: Time) {
        if !self.started || self.table.is_empty() {
            return;
        }
        self.bars.clear();
        self.rewind(now);
    }

    fn rewind(&mut self, now: Time) {
        self.year_index = 0;
        self.playing = self.table.len() > 1;
        self.next_tick_at = Some(Time(now.0 + self.params.interval_s));
        self.apply_year(now);
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn finished(&self) -> bool {
        self.started && !self.playing
    }

    pub fn current_year(&self) -> Option<i32> {
        self.table.years.get(self.year_index).map(|y| y.year)
    }

    /// Advances playback and bar interpolation for one frame.
    pub fn advance(&mut self, frame: Frame) {
        let now = frame.time;
        if self.playing {
            if let Some(due) = self.next_tick_at {
                if now.0 >= due.0 {
                    self.step_year(now);
                }
            }
        }
        for bar in self.bars.values_mut() {
            bar.advance(now);
        }
        self.bars
            .retain(|_, bar| !(bar.leaving && bar.span.is_complete(now)));
    }

    fn step_year(&mut self, now: Time) {
        let last = self.table.len() - 1;
        let next = (self.year_index + self.params.stride.max(1)).min(last);
        self.year_index = next;
        if next == last {
            // Halt exactly on the final year.
            self.playing = false;
            self.next_tick_at = None;
        } else {
            self.next_tick_at = Some(Time(now.0 + self.params.interval_s));
        }
        self.apply_year(now);
    }

    fn apply_year(&mut self, now: Time) {
        let Some(year) = self.table.years.get(self.year_index) else {
            return;
        };
        let anim_s = self.params.anim_s;

        for (rank, (region, value)) in year.entries.iter().enumerate() {
            match self.bars.get_mut(region) {
                Some(bar) => bar.retween(rank as f64, *value, false, now, anim_s),
                None => {
                    self.bars
                        .insert(region.clone(), Bar::entering(rank, *value, now, anim_s));
                }
            }
        }

        for (region, bar) in self.bars.iter_mut() {
            let still_ranked = year.entries.iter().any(|(r, _)| r == region);
            if !still_ranked && !bar.leaving {
                let rank = bar.rank_to;
                bar.retween(rank, 0.0, true, now, anim_s);
            }
        }
    }

    /// Current bar views, ordered by interpolated rank.
    pub fn bars(&self) -> Vec<BarView> {
        let mut views: Vec<BarView> = self
            .bars
            .iter()
            .map(|(region, bar)| BarView {
                region: region.clone(),
                value: bar.display_value,
                label_value: bar.display_label,
                rank: bar.display_rank,
                leaving: bar.leaving,
            })
            .collect();
        views.sort_by(|a, b| {
            a.rank
                .partial_cmp(&b.rank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.region.cmp(&b.region))
        });
        views
    }
}

#[cfg(test)]
mod tests {
    use super::{RaceEngine, RaceParams, RaceRow, RaceTable, TOP_N};
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use runtime::clock::FrameClock;

    fn row(year: i32, region: &str, value: f64) -> RaceRow {
        RaceRow {
            year,
            region: region.to_string(),
            value,
        }
    }

    fn small_table() -> RaceTable {
        RaceTable::from_rows(&[
            row(1950, "Alba", 10.0),
            row(1950, "Borea", 20.0),
            row(1950, "Cimer", 5.0),
            row(1951, "Alba", 30.0),
            row(1951, "Borea", 25.0),
            row(1951, "Cimer", 6.0),
            row(1952, "Alba", 40.0),
            row(1952, "Borea", 26.0),
            row(1952, "Darien", 35.0),
        ])
    }

    #[test]
    fn derivation_is_sorted_descending_and_truncated() {
        let mut rows = Vec::new();
        for i in 0..12 {
            rows.push(row(2000, &format!("r{i:02}"), i as f64));
        }
        let table = RaceTable::from_rows(&rows);
        assert_eq!(table.len(), 1);
        let entries = &table.years[0].entries;
        assert_eq!(entries.len(), TOP_N);
        assert_eq!(entries[0], ("r11".to_string(), 11.0));
        for pair in entries.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        assert_eq!(table.max_value, 11.0);
    }

    #[test]
    fn derivation_is_deterministic() {
        let rows = [
            row(2000, "b", 5.0),
            row(2000, "a", 5.0),
            row(2000, "c", 9.0),
        ];
        let a = RaceTable::from_rows(&rows);
        let b = RaceTable::from_rows(&rows);
        assert_eq!(a, b);
        // Equal values tie-break by region name.
        assert_eq!(a.years[0].entries[1].0, "a");
        assert_eq!(a.years[0].entries[2].0, "b");
    }

    #[test]
    fn playback_halts_exactly_at_the_final_year() {
        let mut engine = RaceEngine::new(small_table(), RaceParams::default());
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        engine.start(Time::ZERO);
        assert_eq!(engine.current_year(), Some(1950));

        for _ in 0..200 {
            let frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        assert_eq!(engine.current_year(), Some(1952));
        assert!(engine.finished());

        // More ticks never advance past the final year.
        for _ in 0..100 {
            let frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        assert_eq!(engine.current_year(), Some(1952));
    }

    #[test]
    fn start_is_idempotent() {
        let mut engine = RaceEngine::new(small_table(), RaceParams::default());
        engine.start(Time::ZERO);
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        for _ in 0..30 {
            engine.advance(clock.tick(1.0 / 60.0));
        }
        let year_before = engine.current_year();
        // A stray second start must not rewind a running race.
        engine.start(Time(0.5));
        assert_eq!(engine.current_year(), year_before);
    }

    #[test]
    fn restart_rewinds_and_plays_again() {
        let mut engine = RaceEngine::new(small_table(), RaceParams::default());
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        engine.start(Time::ZERO);
        let mut frame = clock.tick(0.0);
        for _ in 0..200 {
            frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        assert!(engine.finished());

        engine.restart(frame.time);
        assert_eq!(engine.current_year(), Some(1950));
        assert!(engine.playing());
    }

    #[test]
    fn labels_tween_numerically_between_years() {
        let mut engine = RaceEngine::new(small_table(), RaceParams::default());
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        engine.start(Time::ZERO);

        // Land mid-animation right after the first year advance.
        let mut frame = clock.tick(0.0);
        while engine.current_year() == Some(1950) {
            frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        frame = clock.tick(1.0 / 60.0);
        engine.advance(frame);

        let alba = engine
            .bars()
            .into_iter()
            .find(|b| b.region == "Alba")
            .unwrap();
        // Alba moves 10 -> 30; mid-tween the label is strictly between.
        assert!(alba.label_value > 10.0 && alba.label_value < 30.0);
    }

    #[test]
    fn dropped_region_shrinks_out_and_is_removed() {
        let mut engine = RaceEngine::new(small_table(), RaceParams::default());
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        engine.start(Time::ZERO);

        let mut frame = clock.tick(0.0);
        while engine.current_year() != Some(1952) {
            frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        // Cimer fell out of the 1952 top three-entry list; first it shrinks.
        frame = clock.tick(1.0 / 60.0);
        engine.advance(frame);
        let cimer = engine.bars().into_iter().find(|b| b.region == "Cimer");
        assert!(cimer.map(|b| b.leaving).unwrap_or(true));

        // After the animation window it is gone entirely.
        for _ in 0..30 {
            frame = clock.tick(1.0 / 60.0);
            engine.advance(frame);
        }
        assert!(engine.bars().iter().all(|b| b.region != "Cimer"));
    }

    #[test]
    fn stride_skips_years() {
        let params = RaceParams {
            stride: 2,
            ..RaceParams::default()
        };
        let mut engine = RaceEngine::new(small_table(), params);
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        engine.start(Time::ZERO);
        for _ in 0..30 {
            engine.advance(clock.tick(1.0 / 60.0));
        }
        // 1950 -> 1952 in a single tick, clamped to the final year.
        assert_eq!(engine.current_year(), Some(1952));
        assert!(engine.finished());
    }
}
