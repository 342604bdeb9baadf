/*
 *  map.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Marker position and the OpenStreetMap tile under it
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
use std::f64::consts::PI;
use std::fmt;

use crate::config::MapConfig;
use crate::weather::WeatherSnapshot;

pub const ATTRIBUTION: &str = "© OpenStreetMap contributors";

// Web Mercator stops short of the poles
const MAX_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    /// Tile containing `pos` at `zoom`.
    pub fn containing(pos: LatLon, zoom: u8) -> Self {
        let n = 2_f64.powi(zoom as i32);
        let lat_rad = pos.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
        let x = ((pos.lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();
        let max = n as u32 - 1;
        Self {
            x: (x.max(0.0) as u32).min(max),
            y: (y.max(0.0) as u32).min(max),
            zoom,
        }
    }

    pub fn url(&self) -> String {
        let subdomain = ['a', 'b', 'c'][((self.x as u64 + self.y as u64) % 3) as usize];
        format!("https://{}.tile.openstreetmap.org/{}/{}/{}.png", subdomain, self.zoom, self.x, self.y)
    }
}

/// What the map layer needs: where the marker goes and which tile shows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub marker: LatLon,
    pub zoom: u8,
    pub tile: TileCoord,
}

impl MapView {
    /// Centers on the snapshot, or the configured default when there is none
    /// or it has no coordinates.
    pub fn for_snapshot(snapshot: Option<&WeatherSnapshot>, cfg: &MapConfig) -> Self {
        let marker = snapshot
            .and_then(|s| s.coordinates())
            .map(|(lat, lon)| LatLon { lat, lon })
            .unwrap_or(LatLon { lat: cfg.default_lat, lon: cfg.default_lon });
        Self {
            marker,
            zoom: cfg.zoom,
            tile: TileCoord::containing(marker, cfg.zoom),
        }
    }
}
