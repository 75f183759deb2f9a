//! Reshapes a CWA location record into a [`LocationForecast`].

use crate::model::{CwaLocation, CwaWeatherElement, ForecastPeriod, LocationForecast};

/// Element name whose time periods define the forecast timeline.
const TIMELINE_ELEMENT: &str = "Wx";

/// Weather elements the proxy knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Weather,
    Rain,
    MinTemp,
    MaxTemp,
    Comfort,
}

impl ElementKind {
    /// Element names requested from the upstream dataset.
    pub const REQUESTED: &'static str = "Wx,PoP,MinT,MaxT,CI";

    pub fn from_element_name(name: &str) -> Option<Self> {
        match name {
            "Wx" => Some(ElementKind::Weather),
            "PoP" | "PoP6h" => Some(ElementKind::Rain),
            "MinT" => Some(ElementKind::MinTemp),
            "MaxT" => Some(ElementKind::MaxTemp),
            "CI" => Some(ElementKind::Comfort),
            _ => None,
        }
    }

    /// Attach the display unit for this element.
    pub fn tag(&self, value: &str) -> String {
        match self {
            ElementKind::Weather | ElementKind::Comfort => value.to_string(),
            ElementKind::Rain => format!("{value}%"),
            ElementKind::MinTemp | ElementKind::MaxTemp => format!("{value}°C"),
        }
    }

    fn slot<'a>(&self, period: &'a mut ForecastPeriod) -> &'a mut String {
        match self {
            ElementKind::Weather => &mut period.weather,
            ElementKind::Rain => &mut period.rain,
            ElementKind::MinTemp => &mut period.min_temp,
            ElementKind::MaxTemp => &mut period.max_temp,
            ElementKind::Comfort => &mut period.comfort,
        }
    }
}

/// Build the simplified forecast for one upstream location record.
///
/// The `Wx` element (or the first element when `Wx` is absent) supplies the
/// timeline. Other elements are joined by index; an element without a value
/// at some index leaves that field empty.
pub fn transform(record: &CwaLocation, update_time: &str) -> LocationForecast {
    let Some(timeline) = timeline_element(&record.weather_element) else {
        return LocationForecast {
            city: record.location_name.clone(),
            update_time: update_time.to_string(),
            forecasts: Vec::new(),
        };
    };

    let forecasts = timeline
        .time
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let mut period = ForecastPeriod {
                start_time: slot.start_time.clone().unwrap_or_default(),
                end_time: slot.end_time.clone().unwrap_or_default(),
                ..ForecastPeriod::default()
            };

            for element in &record.weather_element {
                let Some(kind) = ElementKind::from_element_name(&element.element_name) else {
                    continue;
                };
                if let Some(value) = element.time.get(i).and_then(|t| t.value()) {
                    *kind.slot(&mut period) = kind.tag(value);
                }
            }

            period
        })
        .collect();

    LocationForecast {
        city: record.location_name.clone(),
        update_time: update_time.to_string(),
        forecasts,
    }
}

fn timeline_element(elements: &[CwaWeatherElement]) -> Option<&CwaWeatherElement> {
    elements
        .iter()
        .find(|e| e.element_name == TIMELINE_ELEMENT)
        .or_else(|| elements.first())
}
