/*
 *  temperature.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Temperature to card style buckets
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

/// One entry of the temperature style table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleBucket {
    /// Inclusive upper bound in °C, `f64::INFINITY` for the catch-all.
    pub max_temp: f64,
    /// Tailwind-style class tag, e.g. "blue-400".
    pub class: &'static str,
    /// Hex color code used for the card gradient and border.
    pub color_code: &'static str,
}

/// Ascending by `max_temp`, last entry unbounded.
pub static TEMPERATURE_BUCKETS: [StyleBucket; 8] = [
    StyleBucket { max_temp: 0.0, class: "blue-400", color_code: "#60CCFA" },
    StyleBucket { max_temp: 10.0, class: "blue-500", color_code: "#3B82F6" },
    StyleBucket { max_temp: 20.0, class: "blue-600", color_code: "#2563EB" },
    StyleBucket { max_temp: 25.0, class: "blue-700", color_code: "#1D4ED8" },
    StyleBucket { max_temp: 30.0, class: "blue-800", color_code: "#1D7CD8" },
    StyleBucket { max_temp: 40.0, class: "orange-800", color_code: "#9a3412" },
    StyleBucket { max_temp: 50.0, class: "orange-900", color_code: "#7c2d12" },
    StyleBucket { max_temp: f64::INFINITY, class: "red-600", color_code: "#7c2d12" },
];

/// Returns the first bucket whose inclusive upper bound holds `temp_c`.
pub fn classify(temp_c: f64) -> &'static StyleBucket {
    TEMPERATURE_BUCKETS
        .iter()
        .find(|b| temp_c <= b.max_temp)
        // NaN never compares; park it in the catch-all
        .unwrap_or(&TEMPERATURE_BUCKETS[TEMPERATURE_BUCKETS.len() - 1])
}

impl StyleBucket {
    /// CSS-style gradient for the card background.
    pub fn gradient(&self) -> String {
        format!("linear-gradient(90deg, {} 0%, rgba(255,255,255,1) 120%)", self.color_code)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_temp.is_infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_buckets() {
        assert_eq!(classify(0.0).class, "blue-400");
        assert_eq!(classify(25.0).class, "blue-700");
        assert_eq!(classify(999.0).class, "red-600");
        assert!(classify(999.0).is_unbounded());
    }

    #[test]
    fn test_inclusive_upper_bounds() {
        assert_eq!(classify(10.0).class, "blue-500");
        assert_eq!(classify(10.01).class, "blue-600");
        assert_eq!(classify(50.0).class, "orange-900");
        assert_eq!(classify(50.1).class, "red-600");
        assert_eq!(classify(-40.0).class, "blue-400");
    }

    #[test]
    fn test_minimal_bound_selected() {
        let mut t = -20.0;
        while t < 80.0 {
            let hit = classify(t);
            assert!(t <= hit.max_temp);
            // no lower bucket would have held it
            for b in TEMPERATURE_BUCKETS.iter().take_while(|b| b.max_temp < hit.max_temp) {
                assert!(t > b.max_temp, "{} should not skip {}", t, b.class);
            }
            t += 0.25;
        }
    }

    #[test]
    fn test_table_is_ascending() {
        for pair in TEMPERATURE_BUCKETS.windows(2) {
            assert!(pair[0].max_temp < pair[1].max_temp);
        }
    }

    #[test]
    fn test_gradient() {
        assert_eq!(
            classify(5.0).gradient(),
            "linear-gradient(90deg, #3B82F6 0%, rgba(255,255,255,1) 120%)"
        );
    }
}
