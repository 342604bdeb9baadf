/*
 *  effects.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Day/night tint and rain overlay
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
use crate::weather::WeatherSnapshot;

/// Drop lanes hung under each rendered cloud when it rains.
pub const RAIN_DROPS_PER_CLOUD: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint {
    pub color_code: &'static str,
    /// Percent.
    pub opacity: u8,
}

pub const NIGHT_TINT: Tint = Tint { color_code: "#000000", opacity: 30 };
pub const DAY_TINT: Tint = Tint { color_code: "#93C5FD", opacity: 30 };

const NIGHT_CLOUD: &str = "#D2D9E0";
const DAY_CLOUD: &str = "#daefff";

/// Overlay state layered over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneEffects {
    pub night: bool,
    pub rain: bool,
}

impl SceneEffects {
    /// Needs both the condition text and the day flag, otherwise `None`.
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Option<Self> {
        let text = snapshot.condition_text()?;
        let is_day = snapshot.current.is_day?;
        Some(Self {
            night: is_day != 1,
            rain: text.to_lowercase().contains("rain"),
        })
    }

    pub fn tint(&self) -> Tint {
        if self.night { NIGHT_TINT } else { DAY_TINT }
    }

    pub fn cloud_color(&self) -> &'static str {
        if self.night { NIGHT_CLOUD } else { DAY_CLOUD }
    }

    pub fn drops_per_cloud(&self) -> usize {
        if self.rain { RAIN_DROPS_PER_CLOUD } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{Condition, CurrentWeather};

    fn snap(text: Option<&str>, is_day: Option<u8>) -> WeatherSnapshot {
        WeatherSnapshot {
            current: CurrentWeather {
                is_day,
                condition: Some(Condition { text: text.map(str::to_string), icon: None }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_night_rain() {
        let fx = SceneEffects::from_snapshot(&snap(Some("Moderate RAIN at times"), Some(0))).unwrap();
        assert!(fx.night);
        assert!(fx.rain);
        assert_eq!(fx.tint(), NIGHT_TINT);
        assert_eq!(fx.cloud_color(), "#D2D9E0");
        assert_eq!(fx.drops_per_cloud(), 15);
    }

    #[test]
    fn test_dry_day() {
        let fx = SceneEffects::from_snapshot(&snap(Some("Partly cloudy"), Some(1))).unwrap();
        assert!(!fx.night);
        assert!(!fx.rain);
        assert_eq!(fx.tint(), DAY_TINT);
        assert_eq!(fx.drops_per_cloud(), 0);
    }

    #[test]
    fn test_requires_both_fields() {
        assert_eq!(SceneEffects::from_snapshot(&snap(None, Some(1))), None);
        assert_eq!(SceneEffects::from_snapshot(&snap(Some("Sunny"), None)), None);
    }
}
