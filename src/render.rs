/*
 *  render.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Terminal rendering of the view state
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;

use crate::color::{Rgb, RESET, badge, paint};
use crate::config::MapConfig;
use crate::map::{ATTRIBUTION, MapView};
use crate::view::{SnapshotView, ViewState};

/// Full frame for `state`: loading line, or overlay, clouds, map and card.
pub fn render_frame(state: &ViewState, map_cfg: &MapConfig, color: bool) -> String {
    let mut out = String::new();

    if state.loading {
        let _ = writeln!(out, "Loading {}...", state.query);
        return out;
    }

    let map = MapView::for_snapshot(state.snapshot(), map_cfg);
    let _ = writeln!(out, "Map    {} @ z{}  {}", map.marker, map.zoom, map.tile.url());
    let _ = writeln!(out, "       {}", ATTRIBUTION);

    if let Some(view) = state.current.as_deref() {
        render_scene(&mut out, view, color);
    }

    if state.card_visible() {
        render_card(&mut out, state, color);
    }
    out
}

fn render_scene(out: &mut String, view: &SnapshotView, color: bool) {
    if let Some(fx) = view.effects {
        let tint = fx.tint();
        let _ = writeln!(
            out,
            "Sky    {} tint {} @ {}%{}",
            if fx.night { "night" } else { "day" },
            tint.color_code,
            tint.opacity,
            if fx.rain { ", raining" } else { "" }
        );
    }

    if let Some(clouds) = view.clouds.as_ref() {
        let cloud_color = view.effects.map(|fx| fx.cloud_color()).unwrap_or("#daefff");
        let drops = view.effects.map(|fx| fx.drops_per_cloud()).unwrap_or(0);
        for (i, sprite) in clouds.sprites().enumerate() {
            let glyph = if color { paint("☁", cloud_color) } else { "☁".to_string() };
            let _ = write!(
                out,
                "Cloud  {:>2} {} scale {:.2} top {:>2}% drift {:>2}s",
                i + 1,
                glyph,
                sprite.scale,
                sprite.top_pct,
                sprite.duration_secs
            );
            if drops > 0 {
                let _ = write!(out, " {}", "╎".repeat(drops));
            }
            out.push('\n');
        }
    }
}

fn render_card(out: &mut String, state: &ViewState, color: bool) {
    let Some(view) = state.current.as_deref() else { return };
    let Some(style) = view.style else { return };
    let snap = &view.snapshot;
    let (date, time) = state.clock_lines();

    let temp = format!("{} °C", snap.temp_c().unwrap_or_default());
    let condition = snap.condition_text().unwrap_or_default();
    let lines = [
        if color { paint(&temp, style.color_code) } else { temp },
        if color { paint(condition, style.color_code) } else { condition.to_string() },
        snap.location.name.clone().unwrap_or_default(),
        snap.location.country.clone().unwrap_or_default(),
        date,
        time,
    ];

    let border = match (color, Rgb::from_hex(style.color_code)) {
        (true, Some(rgb)) => format!("{}{}{}", rgb.fg(), "─".repeat(28), RESET),
        _ => "─".repeat(28),
    };
    let _ = writeln!(out, "{}", border);
    for line in lines.iter().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "  {}", line);
    }
    if let Some(icon) = snap.icon_url() {
        let _ = writeln!(out, "  {}", icon);
    }
    let tag = if color { badge(style.class, style.color_code) } else { format!("[{}]", style.class) };
    let _ = writeln!(out, "  {} {}", tag, style.gradient());
    let _ = writeln!(out, "{}", border);
}

/// Writes frames to `W`. A full frame goes out when the snapshot or loading
/// state changes; clock-only changes rewrite a single status line.
pub struct Renderer<W: Write> {
    out: W,
    map: MapConfig,
    color: bool,
    last: Option<(bool, Option<Arc<SnapshotView>>)>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, map: MapConfig, color: bool) -> Self {
        Self { out, map, color, last: None }
    }

    pub fn render(&mut self, state: &ViewState) -> io::Result<()> {
        let key = (state.loading, state.current.clone());
        let same_frame = match &self.last {
            Some((loading, current)) => {
                *loading == key.0
                    && match (current, &key.1) {
                        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                        (None, None) => true,
                        _ => false,
                    }
            }
            None => false,
        };

        if same_frame {
            if state.card_visible() {
                let (date, time) = state.clock_lines();
                writeln!(self.out, "Clock  {} {}", date, time)?;
            }
        } else {
            self.out.write_all(render_frame(state, &self.map, self.color).as_bytes())?;
            self.last = Some(key);
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
